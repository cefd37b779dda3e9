use serde::{Deserialize, Serialize};

/// Outcome of one scan of a page for disabled form controls. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub total: usize,
    pub elements: Vec<ElementInfo>,
    pub timestamp: i64,
    pub url: String,
}

impl ScanResult {
    pub fn new(elements: Vec<ElementInfo>, timestamp: i64, url: impl Into<String>) -> Self {
        Self {
            total: elements.len(),
            elements,
            timestamp,
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfo {
    /// Position among all distinct disabled candidates, before empty-text filtering.
    pub index: usize,
    pub tag_name: String,
    pub text: String,
    pub id: Option<String>,
    pub class_name: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub placeholder: Option<String>,
    pub value: Option<String>,
    pub title: Option<String>,
    pub aria_label: Option<String>,
    pub xpath: String,
    pub position: Position,
    pub is_visible: bool,
    pub disabled_by: DisabledBy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub top: i64,
    pub left: i64,
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisabledBy {
    #[serde(rename = "disabled attribute")]
    Attribute,
    #[serde(rename = "aria-disabled")]
    Aria,
    #[serde(rename = "disabled by parent fieldset")]
    ParentFieldset,
    #[serde(rename = "unknown")]
    Unknown,
}

impl DisabledBy {
    pub fn as_str(self) -> &'static str {
        match self {
            DisabledBy::Attribute => "disabled attribute",
            DisabledBy::Aria => "aria-disabled",
            DisabledBy::ParentFieldset => "disabled by parent fieldset",
            DisabledBy::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DisabledBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
