// src/form/errors.rs
use std::fmt;
use std::sync::Arc;

use super::banner::Banner;

/// Stable identifiers for everything the banner can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    EmptyBoth,
    EmptyUsername,
    EmptyPassword,
    EmptyEmail,
    InvalidEmailFormat,
    InvalidUsernameEmail,
    UsernameTaken,
    PasswordTooShort,
    NoUppercase,
    NoNumber,
    NoSpecialChar,
    PasswordsDoNotMatch,
    SignupError,
    SignupFailed,
    InvalidCreds,
    PendingApproval,
    AccountDenied,
    ServerError,
    Success,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::EmptyBoth => "EMPTY_BOTH",
            ErrorCode::EmptyUsername => "EMPTY_USERNAME",
            ErrorCode::EmptyPassword => "EMPTY_PASSWORD",
            ErrorCode::EmptyEmail => "EMPTY_EMAIL",
            ErrorCode::InvalidEmailFormat => "INVALID_EMAIL_FORMAT",
            ErrorCode::InvalidUsernameEmail => "INVALID_USERNAME_EMAIL",
            ErrorCode::UsernameTaken => "USERNAME_TAKEN",
            ErrorCode::PasswordTooShort => "PASSWORD_TOO_SHORT",
            ErrorCode::NoUppercase => "NO_UPPERCASE",
            ErrorCode::NoNumber => "NO_NUMBER",
            ErrorCode::NoSpecialChar => "NO_SPECIAL_CHAR",
            ErrorCode::PasswordsDoNotMatch => "PASSWORDS_DO_NOT_MATCH",
            ErrorCode::SignupError => "SIGNUP_ERROR",
            ErrorCode::SignupFailed => "SIGNUP_FAILED",
            ErrorCode::InvalidCreds => "INVALID_CREDS",
            ErrorCode::PendingApproval => "PENDING_APPROVAL",
            ErrorCode::AccountDenied => "ACCOUNT_DENIED",
            ErrorCode::ServerError => "SERVER_ERROR",
            ErrorCode::Success => "SUCCESS",
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::EmptyBoth => "Email and password cannot be empty.",
            ErrorCode::EmptyUsername => "Username cannot be empty.",
            ErrorCode::EmptyPassword => "Password cannot be empty.",
            ErrorCode::EmptyEmail => "Email cannot be empty.",
            ErrorCode::InvalidEmailFormat => "Please enter a valid email address.",
            ErrorCode::InvalidUsernameEmail => {
                "Username cannot include the following characters: @"
            }
            ErrorCode::UsernameTaken => "Username is already taken.",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters long.",
            ErrorCode::NoUppercase => "Password must contain at least one uppercase letter.",
            ErrorCode::NoNumber => "Password must contain at least one number.",
            ErrorCode::NoSpecialChar => "Password must contain at least one special character.",
            ErrorCode::PasswordsDoNotMatch => "Passwords do not match.",
            ErrorCode::SignupError => "Please fix all errors before signing up.",
            ErrorCode::SignupFailed => "Failed to create account",
            ErrorCode::InvalidCreds => "Invalid email or password.",
            ErrorCode::PendingApproval => "Your account is pending approval by a coach.",
            ErrorCode::AccountDenied => "Your account has been denied access.",
            ErrorCode::ServerError => {
                "Could not connect to server. Please check your connection."
            }
            ErrorCode::Success => "Success",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub code: ErrorCode,
    pub message: String,
}

/// Insertion-ordered, code-unique list of pending errors. The banner always
/// shows the tail; older entries stay queued until removed.
pub struct ErrorQueue {
    entries: Vec<ErrorEntry>,
    banner: Arc<dyn Banner>,
}

impl ErrorQueue {
    pub fn new(banner: Arc<dyn Banner>) -> Self {
        Self {
            entries: Vec::new(),
            banner,
        }
    }

    /// Appends unless the code is already queued.
    pub fn add(&mut self, code: ErrorCode, message: impl Into<String>) {
        if self.exists(code) {
            return;
        }
        self.entries.push(ErrorEntry {
            code,
            message: message.into(),
        });
        tracing::debug!(code = %code, "Error queued");
        self.display();
    }

    pub fn add_default(&mut self, code: ErrorCode) {
        self.add(code, code.default_message());
    }

    pub fn remove(&mut self, code: ErrorCode) {
        self.entries.retain(|entry| entry.code != code);
        self.display();
    }

    /// Removes every listed code and refreshes the banner once.
    pub fn remove_all(&mut self, codes: &[ErrorCode]) {
        self.entries.retain(|entry| !codes.contains(&entry.code));
        self.display();
    }

    pub fn exists(&self, code: ErrorCode) -> bool {
        self.entries.iter().any(|entry| entry.code == code)
    }

    pub fn has_errors(&self) -> bool {
        !self.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn codes(&self) -> Vec<ErrorCode> {
        self.entries.iter().map(|entry| entry.code).collect()
    }

    /// The entry the banner is showing.
    pub fn current(&self) -> Option<&ErrorEntry> {
        self.entries.last()
    }

    pub fn display(&self) {
        match self.entries.last() {
            Some(entry) => self.banner.show(&entry.message),
            None => self.banner.hide(),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.display();
    }
}
