// src/form/controller.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::banner::Banner;
use super::errors::{ErrorCode, ErrorQueue};
use super::fields::{LoginForm, SignupForm};
use super::rules;
use crate::backend::{AuthBackend, LoginOutcome, SignupOutcome};
use crate::models::{LoginRequest, SignupRequest, UserProfile};
use crate::storage::client_state::ClientState;

pub const DASHBOARD_PAGE: &str = "dashboard.html";

/// Codes that report how a finished submit ended. No field rule owns them,
/// so each new submit drops them before it validates.
const SUBMIT_RESULTS: [ErrorCode; 6] = [
    ErrorCode::Success,
    ErrorCode::InvalidCreds,
    ErrorCode::PendingApproval,
    ErrorCode::AccountDenied,
    ErrorCode::ServerError,
    ErrorCode::SignupFailed,
];

#[derive(Debug, Clone)]
pub struct FormSettings {
    pub team_code: String,
    pub default_role: String,
    pub signup_error_ttl: Duration,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            team_code: "MECH5103".to_string(),
            default_role: "student".to_string(),
            signup_error_ttl: Duration::from_millis(2000),
        }
    }
}

/// How a submit ended. Every failure has already been pushed to the queue
/// by the time this is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Another submit was still running; nothing was done.
    Busy,
    /// Validation failed locally and no request was made.
    Invalid,
    LoggedIn {
        user: UserProfile,
        redirect: &'static str,
    },
    SignedUp {
        pending_approval: bool,
    },
    /// The backend answered and said no.
    Refused(ErrorCode),
    NetworkError,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            SubmitOutcome::LoggedIn { .. } | SubmitOutcome::SignedUp { .. }
        )
    }
}

/// Marks a submit as running until dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the error queue and drives the login and signup flows against
/// one backend.
pub struct FormController {
    queue: Arc<Mutex<ErrorQueue>>,
    backend: Arc<dyn AuthBackend>,
    client_state: Mutex<ClientState>,
    settings: FormSettings,
    in_flight: AtomicBool,
}

impl FormController {
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        banner: Arc<dyn Banner>,
        client_state: ClientState,
        settings: FormSettings,
    ) -> Self {
        Self {
            queue: Arc::new(Mutex::new(ErrorQueue::new(banner))),
            backend,
            client_state: Mutex::new(client_state),
            settings,
            in_flight: AtomicBool::new(false),
        }
    }

    pub async fn error_codes(&self) -> Vec<ErrorCode> {
        self.queue.lock().await.codes()
    }

    pub async fn current_message(&self) -> Option<String> {
        self.queue
            .lock()
            .await
            .current()
            .map(|entry| entry.message.clone())
    }

    pub async fn login(&self, form: &LoginForm) -> SubmitOutcome {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            warn!("Login ignored, a submit is already in flight");
            return SubmitOutcome::Busy;
        };

        let email = form.email.value();
        let password = form.password.value();

        {
            let mut queue = self.queue.lock().await;
            queue.remove_all(&SUBMIT_RESULTS);

            let missing = match (email.is_empty(), password.is_empty()) {
                (true, true) => Some((ErrorCode::EmptyBoth, ErrorCode::EmptyBoth.default_message())),
                (true, false) => Some((ErrorCode::EmptyUsername, "Email cannot be empty.")),
                (false, true) => Some((
                    ErrorCode::EmptyPassword,
                    ErrorCode::EmptyPassword.default_message(),
                )),
                (false, false) => None,
            };
            if let Some((code, message)) = missing {
                queue.add(code, message);
                return SubmitOutcome::Invalid;
            }
        }

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        info!("Submitting login for {} via {}", request.email, self.backend.name());
        let result = self.backend.login(&request).await;
        let mut queue = self.queue.lock().await;

        match result {
            Ok(LoginOutcome::Authenticated(user)) => {
                queue.clear();
                drop(queue);
                self.persist_login(&user).await;
                info!("✓ Logged in as {}", user.email);
                SubmitOutcome::LoggedIn {
                    user,
                    redirect: DASHBOARD_PAGE,
                }
            }
            Ok(LoginOutcome::Pending) => {
                warn!("Login refused for {}: pending approval", request.email);
                queue.add_default(ErrorCode::PendingApproval);
                SubmitOutcome::Refused(ErrorCode::PendingApproval)
            }
            Ok(LoginOutcome::Denied) => {
                warn!("Login refused for {}: account denied", request.email);
                queue.add_default(ErrorCode::AccountDenied);
                SubmitOutcome::Refused(ErrorCode::AccountDenied)
            }
            Ok(LoginOutcome::Invalid(reason)) => {
                warn!("Login refused for {}: invalid credentials", request.email);
                let message =
                    reason.unwrap_or_else(|| ErrorCode::InvalidCreds.default_message().to_string());
                queue.add(ErrorCode::InvalidCreds, message);
                SubmitOutcome::Refused(ErrorCode::InvalidCreds)
            }
            Err(e) => {
                error!("Login error: {}", e);
                queue.add_default(ErrorCode::ServerError);
                SubmitOutcome::NetworkError
            }
        }
    }

    pub async fn signup(&self, form: &mut SignupForm) -> SubmitOutcome {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            warn!("Signup ignored, a submit is already in flight");
            return SubmitOutcome::Busy;
        };

        let taken = match self.backend.known_usernames().await {
            Ok(names) => names,
            Err(e) => {
                warn!("Could not load existing usernames: {}", e);
                Vec::new()
            }
        };

        {
            let mut queue = self.queue.lock().await;
            queue.remove_all(&SUBMIT_RESULTS);
            // Only the login form raises this one
            queue.remove(ErrorCode::EmptyBoth);

            rules::check_for_invalid_email(&mut queue, form.email.value());
            rules::check_for_invalid_username(&mut queue, form.username.value(), &taken);
            rules::check_for_invalid_password(&mut queue, form.password.value());
            rules::check_for_non_matching_passwords(
                &mut queue,
                form.password.value(),
                form.confirm_password.value(),
            );

            if queue.has_errors() {
                info!("Signup blocked by {} validation error(s)", queue.len());
                queue.add_default(ErrorCode::SignupError);
                self.expire_later(ErrorCode::SignupError, self.settings.signup_error_ttl);
                return SubmitOutcome::Invalid;
            }
        }

        let request = SignupRequest {
            email: form.email.value().to_string(),
            password: form.password.value().to_string(),
            name: form.username.value().to_string(),
            role: self.settings.default_role.clone(),
            team_code: self.settings.team_code.clone(),
            phone: String::new(),
            subteam: String::new(),
        };

        info!("Submitting signup for {} via {}", request.email, self.backend.name());
        let result = self.backend.signup(&request).await;
        let mut queue = self.queue.lock().await;

        match result {
            Ok(SignupOutcome::Created {
                message,
                pending_approval,
            }) => {
                queue.clear();
                queue.add(ErrorCode::Success, message);
                form.clear();
                info!("✓ Account created for {}", request.email);
                SubmitOutcome::SignedUp { pending_approval }
            }
            Ok(SignupOutcome::Rejected(reason)) => {
                warn!("Signup refused for {}", request.email);
                let message =
                    reason.unwrap_or_else(|| ErrorCode::SignupFailed.default_message().to_string());
                queue.add(ErrorCode::SignupFailed, message);
                SubmitOutcome::Refused(ErrorCode::SignupFailed)
            }
            Err(e) => {
                error!("Signup error: {}", e);
                queue.add_default(ErrorCode::ServerError);
                SubmitOutcome::NetworkError
            }
        }
    }

    /// Drops `code` from the queue after `ttl`. Not cancelled if the queue
    /// changes in the meantime.
    fn expire_later(&self, code: ErrorCode, ttl: Duration) {
        let queue = Arc::clone(&self.queue);
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            queue.lock().await.remove(code);
        });
    }

    async fn persist_login(&self, user: &UserProfile) {
        let mut state = self.client_state.lock().await;
        if let Err(e) = state.record_login(user) {
            warn!("Could not save login state: {}", e);
        }
    }
}
