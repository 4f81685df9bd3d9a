// src/backend/mod.rs
pub mod http;
pub mod store;

use async_trait::async_trait;

use crate::models::{LoginRequest, SignupRequest, UserProfile};

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("cannot build endpoint `{path}`: {source}")]
    Endpoint {
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unexpected response ({status}): {reason}")]
    InvalidResponse { status: u16, reason: String },

    #[error("document store failed: {0}")]
    Store(#[from] sqlx::Error),

    #[error("malformed document `{key}`: {source}")]
    Document {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// How the backend answered a login attempt it was able to process.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Authenticated(UserProfile),
    Pending,
    Denied,
    Invalid(Option<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignupOutcome {
    Created {
        message: String,
        pending_approval: bool,
    },
    Rejected(Option<String>),
}

/// Where credentials go. `Err` means the backend could not be reached or
/// answered with something unreadable; a refused login is an `Ok` outcome.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<LoginOutcome, BackendError>;

    async fn signup(&self, request: &SignupRequest) -> Result<SignupOutcome, BackendError>;

    /// Usernames already registered, for the duplicate check on signup.
    /// Backends that cannot tell return an empty list.
    async fn known_usernames(&self) -> Result<Vec<String>, BackendError> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str;
}
