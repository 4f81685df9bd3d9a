// src/form/banner.rs
use std::sync::Mutex;

/// The single element that shows the current error.
pub trait Banner: Send + Sync {
    fn show(&self, message: &str);
    fn hide(&self);
}

/// Writes banner changes to stderr. Refreshes that leave the message
/// unchanged print nothing.
pub struct TerminalBanner {
    current: Mutex<Option<String>>,
}

impl TerminalBanner {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    fn swap(&self, next: Option<String>) -> bool {
        let mut current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *current == next {
            return false;
        }
        *current = next;
        true
    }
}

impl Default for TerminalBanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Banner for TerminalBanner {
    fn show(&self, message: &str) {
        if self.swap(Some(message.to_string())) {
            eprintln!("» {}", message);
        }
    }

    fn hide(&self) {
        if self.swap(None) {
            tracing::debug!("Banner hidden");
        }
    }
}

#[cfg(test)]
pub use recording::{BannerState, RecordingBanner};
