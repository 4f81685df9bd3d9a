// src/config.rs
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::form::controller::FormSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Http,
    Store,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" | "api" => Ok(BackendKind::Http),
            "store" | "document" => Ok(BackendKind::Store),
            other => Err(format!("unknown backend '{}', expected 'http' or 'store'", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub backend: BackendKind,
    pub backend_url: Url,
    pub store_database_url: String,
    pub team_code: String,
    pub default_role: String,
    pub request_timeout_secs: u64,
    pub signup_error_ttl_ms: u64,
    pub client_state_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            backend: std::env::var("TEAMGATE_BACKEND")
                .unwrap_or_else(|_| "http".to_string())
                .parse()?,
            backend_url: std::env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .parse()?,
            store_database_url: std::env::var("STORE_DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://teamgate.db?mode=rwc".to_string()),
            team_code: std::env::var("TEAM_CODE")
                .unwrap_or_else(|_| "MECH5103".to_string()),
            default_role: std::env::var("DEFAULT_ROLE")
                .unwrap_or_else(|_| "student".to_string()),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            signup_error_ttl_ms: std::env::var("SIGNUP_ERROR_TTL_MS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()?,
            client_state_path: std::env::var("CLIENT_STATE_PATH")
                .unwrap_or_else(|_| ".teamgate/state.json".to_string())
                .into(),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn form_settings(&self) -> FormSettings {
        FormSettings {
            team_code: self.team_code.clone(),
            default_role: self.default_role.clone(),
            signup_error_ttl: Duration::from_millis(self.signup_error_ttl_ms),
        }
    }
}
