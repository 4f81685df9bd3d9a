// src/form/fields.rs

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Password,
}

/// A single text input. Password inputs start masked and can be toggled.
#[derive(Debug, Clone)]
pub struct InputField {
    value: String,
    kind: InputKind,
    secret: bool,
}

impl InputField {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: InputKind::Text,
            secret: false,
        }
    }

    pub fn password(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: InputKind::Password,
            secret: true,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    #[cfg(test)]
    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    #[cfg(test)]
    pub fn kind(&self) -> InputKind {
        self.kind
    }

    /// Swaps between password and text presentation and returns the label
    /// the toggle button should now carry.
    pub fn toggle_visibility(&mut self) -> &'static str {
        if !self.secret {
            return "Show Password";
        }
        self.kind = match self.kind {
            InputKind::Password => InputKind::Text,
            InputKind::Text => InputKind::Password,
        };
        match self.kind {
            InputKind::Password => "Show Password",
            InputKind::Text => "Hide Password",
        }
    }

    /// What a viewer would see in the input.
    pub fn rendered(&self) -> String {
        match self.kind {
            InputKind::Password => "•".repeat(self.value.chars().count()),
            InputKind::Text => self.value.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: InputField,
    pub password: InputField,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: InputField::text(email),
            password: InputField::password(password),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignupForm {
    pub email: InputField,
    pub username: InputField,
    pub password: InputField,
    pub confirm_password: InputField,
}

impl SignupForm {
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            email: InputField::text(email),
            username: InputField::text(username),
            password: InputField::password(password),
            confirm_password: InputField::password(confirm_password),
        }
    }

    pub fn clear(&mut self) {
        self.email.clear();
        self.username.clear();
        self.password.clear();
        self.confirm_password.clear();
    }
}
