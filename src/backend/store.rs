// src/backend/store.rs
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AuthBackend, BackendError, LoginOutcome, SignupOutcome};
use crate::db::Database;
use crate::models::{LoginRequest, SignupRequest, UserProfile};
use crate::utils::validation;

pub const USERS_KEY: &str = "users";
const SIGNUP_CREATED_MESSAGE: &str = "Account created successfully!";

/// The `users` document as stored: three sequences aligned by index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsersDocument {
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub usernames: Vec<String>,
    #[serde(default)]
    pub passwords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl UsersDocument {
    /// Zips the sequences into records. Entries past the shortest sequence
    /// have no complete record and are dropped.
    pub fn into_users(self) -> Vec<StoredUser> {
        let aligned = self
            .emails
            .len()
            .min(self.usernames.len())
            .min(self.passwords.len());
        if aligned != self.emails.len()
            || aligned != self.usernames.len()
            || aligned != self.passwords.len()
        {
            tracing::warn!(
                "users document misaligned (emails={}, usernames={}, passwords={}); keeping {} records",
                self.emails.len(),
                self.usernames.len(),
                self.passwords.len(),
                aligned
            );
        }

        self.emails
            .into_iter()
            .zip(self.usernames)
            .zip(self.passwords)
            .map(|((email, username), password)| StoredUser {
                email,
                username,
                password,
            })
            .collect()
    }

    pub fn from_users(users: &[StoredUser]) -> Self {
        Self {
            emails: users.iter().map(|u| u.email.clone()).collect(),
            usernames: users.iter().map(|u| u.username.clone()).collect(),
            passwords: users.iter().map(|u| u.password.clone()).collect(),
        }
    }
}

/// Keeps every account in the single `users` document.
pub struct StoreBackend {
    db: Database,
}

impl StoreBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn load_users(&self) -> Result<Vec<StoredUser>, BackendError> {
        let Some(raw) = self.db.get_document(USERS_KEY).await? else {
            return Ok(Vec::new());
        };
        let document: UsersDocument =
            serde_json::from_str(&raw).map_err(|source| BackendError::Document {
                key: USERS_KEY.to_string(),
                source,
            })?;
        let users = document.into_users();
        tracing::debug!("Loaded {} users from document store", users.len());
        Ok(users)
    }

    pub async fn save_users(&self, users: &[StoredUser]) -> Result<(), BackendError> {
        let raw = serde_json::to_string(&UsersDocument::from_users(users)).map_err(|source| {
            BackendError::Document {
                key: USERS_KEY.to_string(),
                source,
            }
        })?;
        self.db.put_document(USERS_KEY, &raw).await?;
        tracing::debug!("Saved {} users to document store", users.len());
        Ok(())
    }
}

#[async_trait]
impl AuthBackend for StoreBackend {
    async fn login(&self, request: &LoginRequest) -> Result<LoginOutcome, BackendError> {
        let users = self.load_users().await?;
        let by_email = validation::is_email(&request.email);

        let found = users.into_iter().find(|user| {
            let identifier = if by_email { &user.email } else { &user.username };
            *identifier == request.email && user.password == request.password
        });

        Ok(match found {
            Some(user) => {
                let mut profile = UserProfile::from_email(user.email);
                profile.name = Some(user.username);
                LoginOutcome::Authenticated(profile)
            }
            None => LoginOutcome::Invalid(None),
        })
    }

    async fn signup(&self, request: &SignupRequest) -> Result<SignupOutcome, BackendError> {
        let mut users = self.load_users().await?;
        users.push(StoredUser {
            email: request.email.clone(),
            username: request.name.clone(),
            password: request.password.clone(),
        });
        self.save_users(&users).await?;

        Ok(SignupOutcome::Created {
            message: SIGNUP_CREATED_MESSAGE.to_string(),
            pending_approval: false,
        })
    }

    async fn known_usernames(&self) -> Result<Vec<String>, BackendError> {
        Ok(self
            .load_users()
            .await?
            .into_iter()
            .map(|user| user.username)
            .collect())
    }

    fn name(&self) -> &'static str {
        "store"
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) async fn memory_store() -> StoreBackend {
        let db = Database::new("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        StoreBackend::new(db)
    }

    fn signup(email: &str, username: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            password: "Ab1!aaaa".to_string(),
            name: username.to_string(),
            role: "student".to_string(),
            team_code: "MECH5103".to_string(),
            phone: String::new(),
            subteam: String::new(),
        }
    }

    fn login(identifier: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: identifier.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_misaligned_document_is_truncated() {
        let document: UsersDocument = serde_json::from_value(json!({
            "emails": ["a@b.co", "c@d.co"],
            "usernames": ["a", "c", "e"],
            "passwords": ["pa"]
        }))
        .unwrap();
        assert_eq!(
            document.into_users(),
            vec![StoredUser {
                email: "a@b.co".into(),
                username: "a".into(),
                password: "pa".into(),
            }]
        );
    }

    #[test]
    fn test_missing_sequences_default_to_empty() {
        let document: UsersDocument = serde_json::from_value(json!({"emails": ["a@b.co"]})).unwrap();
        assert!(document.into_users().is_empty());
    }

    #[tokio::test]
    async fn test_signup_writes_aligned_sequences() {
        let store = memory_store().await;
        store.signup(&signup("link@hyrule.org", "link")).await.unwrap();
        store.signup(&signup("zelda@hyrule.org", "zelda")).await.unwrap();

        let raw = store.db.get_document(USERS_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            json!({
                "emails": ["link@hyrule.org", "zelda@hyrule.org"],
                "usernames": ["link", "zelda"],
                "passwords": ["Ab1!aaaa", "Ab1!aaaa"]
            })
        );
        assert_eq!(store.known_usernames().await.unwrap(), vec!["link", "zelda"]);
    }

    #[tokio::test]
    async fn test_login_by_email_or_username() {
        let store = memory_store().await;
        store.signup(&signup("link@hyrule.org", "link")).await.unwrap();

        assert!(matches!(
            store.login(&login("link@hyrule.org", "Ab1!aaaa")).await.unwrap(),
            LoginOutcome::Authenticated(ref user) if user.email == "link@hyrule.org"
        ));
        assert!(matches!(
            store.login(&login("link", "Ab1!aaaa")).await.unwrap(),
            LoginOutcome::Authenticated(_)
        ));
        assert_eq!(
            store.login(&login("link", "wrong")).await.unwrap(),
            LoginOutcome::Invalid(None)
        );
        // Usernames are not matched against the email column
        assert_eq!(
            store.login(&login("link@hyrule.org", "wrong")).await.unwrap(),
            LoginOutcome::Invalid(None)
        );
    }

    #[tokio::test]
    async fn test_password_must_match_same_record() {
        let store = memory_store().await;
        store
            .save_users(&[
                StoredUser {
                    email: "a@b.co".into(),
                    username: "a".into(),
                    password: "first".into(),
                },
                StoredUser {
                    email: "c@d.co".into(),
                    username: "c".into(),
                    password: "second".into(),
                },
            ])
            .await
            .unwrap();

        assert_eq!(
            store.login(&login("a", "second")).await.unwrap(),
            LoginOutcome::Invalid(None)
        );
        assert!(matches!(
            store.login(&login("c", "second")).await.unwrap(),
            LoginOutcome::Authenticated(_)
        ));
    }

    #[tokio::test]
    async fn test_malformed_document_is_an_error() {
        let store = memory_store().await;
        store.db.put_document(USERS_KEY, "not json").await.unwrap();
        assert!(matches!(
            store.load_users().await,
            Err(BackendError::Document { .. })
        ));
    }
}
