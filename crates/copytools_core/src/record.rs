use serde::{Deserialize, Serialize};

/// Metadata about the page a request came from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderInfo {
    pub url: String,
    pub title: String,
    pub favicon: String,
}

/// One successful copy. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyRecord {
    /// Creation time in epoch milliseconds, unique within a history list.
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub element_tag: String,
    /// Capture time reported by the page, epoch milliseconds.
    pub timestamp: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub favicon: String,
}
