//! Request/response envelopes exchanged between contexts.
//!
//! Requests are discriminated by their `action` field; the JSON shape matches the
//! one persisted and logged by every context.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::CopyRecord;
use crate::scan::ScanResult;
use crate::settings::Settings;

/// Every action a context may recognise.
pub const ACTIONS: &[&str] = &[
    "copyToClipboard",
    "recordCopy",
    "getCopyHistory",
    "clearHistory",
    "getSettings",
    "saveSettings",
    "toggle",
    "getStatus",
    "scanDisabledElements",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "action",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Request {
    CopyToClipboard {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        element_tag: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },
    RecordCopy {
        text: String,
        element_tag: String,
        timestamp: i64,
    },
    GetCopyHistory,
    ClearHistory,
    GetSettings,
    SaveSettings {
        settings: Settings,
    },
    Toggle {
        enabled: bool,
    },
    GetStatus,
    ScanDisabledElements,
}

impl Request {
    /// Validates a raw JSON request at the router boundary.
    pub fn from_value(value: Value) -> Result<Self, RouteError> {
        let action = value
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if !ACTIONS.contains(&action.as_str()) {
            return Err(RouteError::UnknownAction(action));
        }
        serde_json::from_value(value).map_err(|err| RouteError::InvalidPayload {
            action,
            message: err.to_string(),
        })
    }

    pub fn action(&self) -> &'static str {
        match self {
            Request::CopyToClipboard { .. } => "copyToClipboard",
            Request::RecordCopy { .. } => "recordCopy",
            Request::GetCopyHistory => "getCopyHistory",
            Request::ClearHistory => "clearHistory",
            Request::GetSettings => "getSettings",
            Request::SaveSettings { .. } => "saveSettings",
            Request::Toggle { .. } => "toggle",
            Request::GetStatus => "getStatus",
            Request::ScanDisabledElements => "scanDisabledElements",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("Unknown action")]
    UnknownAction(String),
    #[error("Invalid request: {message}")]
    InvalidPayload { action: String, message: String },
}

/// Reply to a [`Request`]. Variant order matters for untagged decoding: the
/// most specific shapes come first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Scan {
        success: bool,
        data: ScanResult,
    },
    History {
        history: Vec<CopyRecord>,
    },
    Settings {
        settings: Settings,
    },
    Status {
        enabled: bool,
    },
    Outcome {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Error {
        error: String,
    },
}

impl Response {
    pub fn ok() -> Self {
        Response::Outcome {
            success: true,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Response::Outcome {
            success: false,
            error: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            error: message.into(),
        }
    }

    pub fn unknown_action() -> Self {
        Self::error(RouteError::UnknownAction(String::new()).to_string())
    }

    /// `true` only for an explicit `success: true`.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Response::Outcome { success: true, .. } | Response::Scan { success: true, .. }
        )
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Response::Outcome { error, .. } => error.as_deref(),
            Response::Error { error } => Some(error),
            _ => None,
        }
    }
}

impl From<RouteError> for Response {
    fn from(err: RouteError) -> Self {
        Response::error(err.to_string())
    }
}
