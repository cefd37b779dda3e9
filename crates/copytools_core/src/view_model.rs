use crate::{CopyRecord, ScanResult, Settings};

pub const UNKNOWN_TAG: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PopupViewModel {
    pub enabled: bool,
    pub settings: Settings,
    pub history: Vec<HistoryRowView>,
    pub scan: Option<ScanView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRowView {
    pub index: usize,
    pub text: String,
    pub element_tag: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanView {
    pub total: usize,
    pub rows: Vec<ScanRowView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRowView {
    pub tag_name: String,
    pub is_visible: bool,
    pub text: String,
    /// `ID: .. | Type: .. | Reason: ..`, omitting absent parts.
    pub meta: String,
}

pub fn popup_view(
    settings: &Settings,
    history: &[CopyRecord],
    scan: Option<&ScanResult>,
) -> PopupViewModel {
    PopupViewModel {
        enabled: settings.enabled,
        settings: settings.clone(),
        history: history
            .iter()
            .enumerate()
            .map(|(index, record)| HistoryRowView {
                index,
                text: record.text.clone(),
                element_tag: if record.element_tag.is_empty() {
                    UNKNOWN_TAG.to_string()
                } else {
                    record.element_tag.clone()
                },
                timestamp: record.timestamp,
            })
            .collect(),
        scan: scan.map(scan_view),
    }
}

fn scan_view(result: &ScanResult) -> ScanView {
    let rows = result
        .elements
        .iter()
        .map(|element| {
            let mut meta = String::new();
            if let Some(id) = &element.id {
                meta.push_str(&format!("ID: {id} | "));
            }
            if let Some(kind) = &element.kind {
                meta.push_str(&format!("Type: {kind} | "));
            }
            meta.push_str(&format!("Reason: {}", element.disabled_by));
            ScanRowView {
                tag_name: element.tag_name.clone(),
                is_visible: element.is_visible,
                text: element.text.clone(),
                meta,
            }
        })
        .collect();
    ScanView {
        total: result.total,
        rows,
    }
}
