use serde::{Deserialize, Serialize};

use super::Validate;

/// Notification category; unknown categories are kept verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationKind {
    Alert,
    Success,
    Info,
    Error,
    Other(String),
}

impl From<String> for NotificationKind {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "alert" => NotificationKind::Alert,
            "success" => NotificationKind::Success,
            "info" => NotificationKind::Info,
            "error" => NotificationKind::Error,
            _ => NotificationKind::Other(raw),
        }
    }
}

impl From<NotificationKind> for String {
    fn from(kind: NotificationKind) -> Self {
        kind.as_str().to_string()
    }
}

impl NotificationKind {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationKind::Alert => "alert",
            NotificationKind::Success => "success",
            NotificationKind::Info => "info",
            NotificationKind::Error => "error",
            NotificationKind::Other(raw) => raw,
        }
    }

    /// Single-glyph marker shown in front of the message
    pub fn marker(&self) -> &'static str {
        match self {
            NotificationKind::Alert => "!",
            NotificationKind::Success => "✓",
            NotificationKind::Info => "i",
            NotificationKind::Error => "✗",
            NotificationKind::Other(_) => "•",
        }
    }
}

/// Entry from `GET /notifications/{user_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: NotificationKind,
    pub message: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub timestamp: String,
}

fn default_kind() -> NotificationKind {
    NotificationKind::Info
}

impl Validate for Notification {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}
