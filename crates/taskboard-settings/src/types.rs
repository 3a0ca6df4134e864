use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings object. Every section falls back to its defaults when
/// missing from the settings file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskboardSettings {
    pub api: ApiSettings,
    pub notifications: NotificationSettings,
    pub logging: LoggingSettings,
}

impl TaskboardSettings {
    pub fn validate(&self) -> Result<()> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SettingsError::Invalid(format!(
                "api.baseUrl must be an http(s) URL, got {url:?}"
            )));
        }
        if self.api.timeout_ms == 0 {
            return Err(SettingsError::Invalid("api.timeoutMs must be positive".into()));
        }
        Ok(())
    }
}

/// Where and how to reach the task API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiSettings {
    pub base_url: String,
    pub resource_path: String,
    pub timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            resource_path: "/tarefas".into(),
            timeout_ms: 10_000,
            connect_timeout_ms: 5_000,
            user_agent: concat!("taskboard/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl ApiSettings {
    /// Collection URL, e.g. `http://localhost:8080/tarefas`.
    pub fn resource_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.resource_path.trim_start_matches('/')
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Auto-dismiss lifetimes per severity, in milliseconds. `0` keeps a
/// notification until it is dismissed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub success_lifetime_ms: u64,
    pub error_lifetime_ms: u64,
    pub info_lifetime_ms: u64,
    pub warning_lifetime_ms: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            success_lifetime_ms: 3_000,
            error_lifetime_ms: 5_000,
            info_lifetime_ms: 3_000,
            warning_lifetime_ms: 3_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default level; `RUST_LOG` still wins when set.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            json: false,
        }
    }
}
