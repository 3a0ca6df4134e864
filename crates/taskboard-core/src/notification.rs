use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ids::NotificationId;

/// Visual category of a notification.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    #[default]
    Info,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ephemeral user-facing message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    /// `0` keeps the notification until it is dismissed.
    pub lifetime_ms: u64,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity, lifetime_ms: u64) -> Self {
        Self {
            id: NotificationId::new(),
            message: message.into(),
            severity,
            lifetime_ms,
        }
    }

    pub fn is_sticky(&self) -> bool {
        self.lifetime_ms == 0
    }

    pub fn lifetime(&self) -> Option<Duration> {
        (!self.is_sticky()).then(|| Duration::from_millis(self.lifetime_ms))
    }
}
