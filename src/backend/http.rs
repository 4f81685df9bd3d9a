// src/backend/http.rs
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::{AuthBackend, BackendError, LoginOutcome, SignupOutcome};
use crate::models::{AccountStatus, ApiResponse, LoginRequest, SignupRequest};

const SIGNUP_CREATED_MESSAGE: &str = "Account created! Waiting for coach approval.";

/// Talks to the portal API over JSON.
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("teamgate/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
        })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|source| BackendError::Endpoint {
                path: path.to_string(),
                source,
            })
    }

    async fn post<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<(bool, ApiResponse), BackendError> {
        let url = self.endpoint(path)?;
        tracing::debug!("POST {}", url);

        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let parsed: ApiResponse =
            serde_json::from_str(&text).map_err(|e| BackendError::InvalidResponse {
                status: status.as_u16(),
                reason: e.to_string(),
            })?;

        Ok((status.is_success(), parsed))
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[async_trait]
impl AuthBackend for HttpBackend {
    async fn login(&self, request: &LoginRequest) -> Result<LoginOutcome, BackendError> {
        let (ok, result) = self.post("api/login", request).await?;

        if ok && result.success {
            let user = result.user.ok_or_else(|| BackendError::InvalidResponse {
                status: 200,
                reason: "login succeeded without a user".to_string(),
            })?;
            return Ok(LoginOutcome::Authenticated(user));
        }

        Ok(match result.status {
            Some(AccountStatus::Pending) => LoginOutcome::Pending,
            Some(AccountStatus::Denied) => LoginOutcome::Denied,
            _ => LoginOutcome::Invalid(result.error),
        })
    }

    async fn signup(&self, request: &SignupRequest) -> Result<SignupOutcome, BackendError> {
        let (ok, result) = self.post("api/signup", request).await?;

        if ok && result.success {
            Ok(SignupOutcome::Created {
                message: SIGNUP_CREATED_MESSAGE.to_string(),
                pending_approval: true,
            })
        } else {
            Ok(SignupOutcome::Rejected(result.error))
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    /// Requests seen by the fake portal, as `(path, body)`.
    pub(crate) type Seen = Arc<Mutex<Vec<(String, Value)>>>;

    async fn fake_login(State(seen): State<Seen>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        seen.lock().unwrap().push(("/api/login".into(), body.clone()));
        let email = body["email"].as_str().unwrap_or_default();
        match (email, body["password"].as_str()) {
            ("link@hyrule.org", Some("Ab1!aaaa")) => (
                StatusCode::OK,
                Json(json!({"success": true, "user": {"email": email, "name": "Link", "role": "student"}})),
            ),
            ("pending@hyrule.org", _) => (
                StatusCode::FORBIDDEN,
                Json(json!({"success": false, "status": "pending"})),
            ),
            ("denied@hyrule.org", _) => (
                StatusCode::FORBIDDEN,
                Json(json!({"success": false, "status": "denied"})),
            ),
            ("nouser@hyrule.org", _) => (StatusCode::OK, Json(json!({"success": true}))),
            ("broken@hyrule.org", _) => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!("oops"))),
            _ => (
                StatusCode::UNAUTHORIZED,
                Json(json!({"success": false, "error": "No such account"})),
            ),
        }
    }

    async fn fake_signup(State(seen): State<Seen>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        seen.lock().unwrap().push(("/api/signup".into(), body.clone()));
        if body["email"] == "taken@hyrule.org" {
            return (
                StatusCode::CONFLICT,
                Json(json!({"success": false, "error": "Email already registered"})),
            );
        }
        (StatusCode::CREATED, Json(json!({"success": true})))
    }

    /// Serves a fake portal API on an ephemeral port and returns its base URL.
    pub(crate) async fn spawn_portal() -> (Url, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/portal/api/login", post(fake_login))
            .route("/portal/api/signup", post(fake_signup))
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base = Url::parse(&format!("http://{}/portal", addr)).unwrap();
        (base, seen)
    }

    fn backend(base: Url) -> HttpBackend {
        HttpBackend::new(base, Duration::from_secs(5)).unwrap()
    }

    fn login(email: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: "Ab1!aaaa".to_string(),
        }
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let nested = backend(Url::parse("https://portal.example.com/v2").unwrap());
        assert_eq!(
            nested.endpoint("api/login").unwrap().as_str(),
            "https://portal.example.com/v2/api/login"
        );

        let root = backend(Url::parse("https://portal.example.com").unwrap());
        assert_eq!(
            root.endpoint("api/signup").unwrap().as_str(),
            "https://portal.example.com/api/signup"
        );
    }

    #[tokio::test]
    async fn test_unusable_base_url_is_an_endpoint_error() {
        let opaque = backend(Url::parse("mailto:coach@hyrule.org").unwrap());
        assert!(matches!(
            opaque.endpoint("api/login"),
            Err(BackendError::Endpoint { ref path, .. }) if path == "api/login"
        ));
        assert!(matches!(
            opaque.login(&login("link@hyrule.org")).await,
            Err(BackendError::Endpoint { .. })
        ));
    }

    #[tokio::test]
    async fn test_login_outcomes() {
        let (base, seen) = spawn_portal().await;
        let backend = backend(base);

        match backend.login(&login("link@hyrule.org")).await.unwrap() {
            LoginOutcome::Authenticated(user) => {
                assert_eq!(user.email, "link@hyrule.org");
                assert_eq!(user.name.as_deref(), Some("Link"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(
            backend.login(&login("pending@hyrule.org")).await.unwrap(),
            LoginOutcome::Pending
        );
        assert_eq!(
            backend.login(&login("denied@hyrule.org")).await.unwrap(),
            LoginOutcome::Denied
        );
        assert_eq!(
            backend.login(&login("ganon@hyrule.org")).await.unwrap(),
            LoginOutcome::Invalid(Some("No such account".to_string()))
        );

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert_eq!(
            seen[0].1,
            json!({"email": "link@hyrule.org", "password": "Ab1!aaaa"})
        );
    }

    #[tokio::test]
    async fn test_login_unreadable_responses_are_errors() {
        let (base, _) = spawn_portal().await;
        let backend = backend(base);

        assert!(matches!(
            backend.login(&login("broken@hyrule.org")).await,
            Err(BackendError::InvalidResponse { status: 500, .. })
        ));
        assert!(matches!(
            backend.login(&login("nouser@hyrule.org")).await,
            Err(BackendError::InvalidResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = backend(Url::parse(&format!("http://{}", addr)).unwrap());
        assert!(matches!(
            backend.login(&login("link@hyrule.org")).await,
            Err(BackendError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_signup_outcomes() {
        let (base, seen) = spawn_portal().await;
        let backend = backend(base);

        let mut request = SignupRequest {
            email: "link@hyrule.org".into(),
            password: "Ab1!aaaa".into(),
            name: "link".into(),
            role: "student".into(),
            team_code: "MECH5103".into(),
            phone: String::new(),
            subteam: String::new(),
        };
        assert_eq!(
            backend.signup(&request).await.unwrap(),
            SignupOutcome::Created {
                message: SIGNUP_CREATED_MESSAGE.to_string(),
                pending_approval: true,
            }
        );

        request.email = "taken@hyrule.org".into();
        assert_eq!(
            backend.signup(&request).await.unwrap(),
            SignupOutcome::Rejected(Some("Email already registered".to_string()))
        );

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].0, "/api/signup");
        assert_eq!(seen[0].1["teamCode"], "MECH5103");
        assert_eq!(seen[0].1["name"], "link");
    }

    #[tokio::test]
    async fn test_http_backend_knows_no_usernames() {
        let backend = backend(Url::parse("http://127.0.0.1:9").unwrap());
        assert!(backend.known_usernames().await.unwrap().is_empty());
    }
}
