// src/form/rules.rs
use super::errors::{ErrorCode, ErrorQueue};
use crate::utils::validation;

/// One failure condition of a field, paired with the code it raises.
pub struct Rule<'a> {
    pub code: ErrorCode,
    violated: Box<dyn Fn(&str) -> bool + Send + Sync + 'a>,
}

impl<'a> Rule<'a> {
    pub fn new(code: ErrorCode, violated: impl Fn(&str) -> bool + Send + Sync + 'a) -> Self {
        Self {
            code,
            violated: Box::new(violated),
        }
    }

    pub fn is_violated(&self, value: &str) -> bool {
        (self.violated)(value)
    }
}

/// Rules in priority order plus every code the field may leave behind.
pub struct FieldRules<'a> {
    rules: Vec<Rule<'a>>,
    owned: Vec<ErrorCode>,
}

impl<'a> FieldRules<'a> {
    pub fn new(rules: Vec<Rule<'a>>) -> Self {
        let owned = rules.iter().map(|rule| rule.code).collect();
        Self { rules, owned }
    }

    #[cfg(test)]
    pub fn owned_codes(&self) -> &[ErrorCode] {
        &self.owned
    }

    /// The first failing rule, if any.
    pub fn evaluate(&self, value: &str) -> Option<ErrorCode> {
        self.rules
            .iter()
            .find(|rule| rule.is_violated(value))
            .map(|rule| rule.code)
    }

    /// Queues the first failure, or clears every code this field owns.
    /// A failure leaves the field's other queued codes alone.
    pub fn apply(&self, queue: &mut ErrorQueue, value: &str) -> Option<ErrorCode> {
        match self.evaluate(value) {
            Some(code) => {
                queue.add_default(code);
                Some(code)
            }
            None => {
                for code in &self.owned {
                    queue.remove(*code);
                }
                None
            }
        }
    }
}

pub fn email_rules() -> FieldRules<'static> {
    FieldRules::new(vec![
        Rule::new(ErrorCode::EmptyEmail, str::is_empty),
        Rule::new(ErrorCode::InvalidEmailFormat, |v| !validation::is_email(v)),
    ])
}

/// `taken` holds usernames already registered with the backend.
pub fn username_rules(taken: &[String]) -> FieldRules<'_> {
    FieldRules::new(vec![
        Rule::new(ErrorCode::EmptyUsername, str::is_empty),
        Rule::new(ErrorCode::InvalidUsernameEmail, validation::is_email),
        Rule::new(ErrorCode::UsernameTaken, move |v| {
            taken.iter().any(|name| name == v)
        }),
    ])
}

pub fn password_rules() -> FieldRules<'static> {
    FieldRules::new(vec![
        Rule::new(ErrorCode::EmptyPassword, str::is_empty),
        Rule::new(ErrorCode::PasswordTooShort, validation::is_too_short),
        Rule::new(ErrorCode::NoUppercase, |v| !validation::has_uppercase(v)),
        Rule::new(ErrorCode::NoNumber, |v| !validation::has_number(v)),
        Rule::new(ErrorCode::NoSpecialChar, |v| !validation::has_special_char(v)),
    ])
}

pub fn check_for_invalid_email(queue: &mut ErrorQueue, email: &str) -> Option<ErrorCode> {
    email_rules().apply(queue, email)
}

pub fn check_for_invalid_username(
    queue: &mut ErrorQueue,
    username: &str,
    taken: &[String],
) -> Option<ErrorCode> {
    username_rules(taken).apply(queue, username)
}

pub fn check_for_invalid_password(queue: &mut ErrorQueue, password: &str) -> Option<ErrorCode> {
    password_rules().apply(queue, password)
}

pub fn check_for_non_matching_passwords(
    queue: &mut ErrorQueue,
    password: &str,
    confirm_password: &str,
) -> Option<ErrorCode> {
    FieldRules::new(vec![Rule::new(ErrorCode::PasswordsDoNotMatch, |v| {
        v != confirm_password
    })])
    .apply(queue, password)
}
