// src/utils/validation.rs
use regex::Regex;

/// Minimum number of characters a password needs
pub const MIN_PASSWORD_LENGTH: usize = 8;

lazy_static::lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref UPPERCASE_REGEX: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref NUMBER_REGEX: Regex = Regex::new(r"[0-9]").unwrap();
    static ref SPECIAL_CHAR_REGEX: Regex =
        Regex::new(r#"[!@#$%^&*()_+\-=\[\]{};':"\\|,.<>/?]"#).unwrap();
}

/// Checks the `local@domain.tld` shape, nothing stricter
pub fn is_email(input: &str) -> bool {
    EMAIL_REGEX.is_match(input)
}

pub fn has_uppercase(password: &str) -> bool {
    UPPERCASE_REGEX.is_match(password)
}

pub fn has_number(password: &str) -> bool {
    NUMBER_REGEX.is_match(password)
}

pub fn has_special_char(password: &str) -> bool {
    SPECIAL_CHAR_REGEX.is_match(password)
}

/// Length in characters; multi-byte input must not count double
pub fn is_too_short(password: &str) -> bool {
    password.chars().count() < MIN_PASSWORD_LENGTH
}
