use chrono::{Local, TimeZone};
use copytools_core::{HistoryRowView, PopupViewModel, ScanView, Settings};

use super::constants::*;
use crate::platform::popup::Notification;

pub(crate) fn render_history(view: &PopupViewModel) -> String {
    let status = if view.enabled { STATUS_ENABLED } else { STATUS_DISABLED };
    let mut out = format!("Copy tools: {status}\n");
    if view.history.is_empty() {
        out.push_str(EMPTY_HISTORY);
        out.push('\n');
        return out;
    }
    for row in &view.history {
        out.push_str(&format_history_row(row));
        out.push('\n');
    }
    out
}

fn format_history_row(row: &HistoryRowView) -> String {
    format!(
        "[{:>2}] {}  <{}>  {}",
        row.index,
        format_time(row.timestamp),
        row.element_tag,
        preview(&row.text)
    )
}

pub(crate) fn render_scan(scan: &ScanView) -> String {
    if scan.rows.is_empty() {
        return format!("{EMPTY_SCAN}\n");
    }
    let mut out = format!("Found {} disabled elements\n", scan.total);
    for (index, row) in scan.rows.iter().enumerate() {
        let badge = if row.is_visible { BADGE_VISIBLE } else { BADGE_HIDDEN };
        out.push_str(&format!("[{index:>2}] <{}> {badge}\n", row.tag_name));
        out.push_str(&format!("     {}\n", preview(&row.text)));
        out.push_str(&format!("     {}\n", row.meta));
    }
    out
}

pub(crate) fn render_settings(settings: &Settings) -> String {
    format!(
        "enabled: {}\nshow tooltip: {}\nsound: {}\nmax history: {}\n",
        settings.enabled, settings.show_tooltip, settings.sound_enabled, settings.max_history_size
    )
}

pub(crate) fn render_notification(notification: &Notification) -> String {
    if notification.is_error {
        format!("error: {}", notification.message)
    } else {
        notification.message.clone()
    }
}

/// Local wall-clock `HH:MM` of an epoch-millisecond timestamp.
pub(crate) fn format_time(timestamp_ms: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|time| time.format("%H:%M").to_string())
        .unwrap_or_else(|| UNKNOWN_TIME.to_string())
}

/// Single-line preview, cut at `PREVIEW_CHARS`.
fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let mut cut: String = flat.chars().take(PREVIEW_CHARS - 1).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use copytools_core::ScanRowView;
    use pretty_assertions::assert_eq;

    fn row(index: usize, text: &str, tag: &str) -> HistoryRowView {
        HistoryRowView {
            index,
            text: text.to_string(),
            element_tag: tag.to_string(),
            timestamp: 0,
        }
    }

    #[test]
    fn empty_history_shows_empty_state() {
        let view = PopupViewModel {
            enabled: true,
            ..PopupViewModel::default()
        };
        assert_eq!(
            render_history(&view),
            format!("Copy tools: {STATUS_ENABLED}\n{EMPTY_HISTORY}\n")
        );
    }

    #[test]
    fn history_rows_show_index_tag_and_flattened_text() {
        let view = PopupViewModel {
            enabled: false,
            history: vec![row(0, "two\nlines", "INPUT")],
            ..PopupViewModel::default()
        };
        let rendered = render_history(&view);
        assert!(rendered.starts_with(&format!("Copy tools: {STATUS_DISABLED}\n")));
        assert!(rendered.contains("[ 0] "));
        assert!(rendered.contains("<INPUT>  two lines"));
    }

    #[test]
    fn long_text_is_cut() {
        let long = "x".repeat(PREVIEW_CHARS + 10);
        let cut = preview(&long);
        assert_eq!(cut.chars().count(), PREVIEW_CHARS);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn time_is_hours_and_minutes() {
        let time = format_time(1_700_000_000_000);
        assert_eq!(time.len(), 5);
        assert_eq!(&time[2..3], ":");
    }

    #[test]
    fn scan_rows_show_badge_and_meta() {
        let scan = ScanView {
            total: 1,
            rows: vec![ScanRowView {
                tag_name: "select".to_string(),
                is_visible: false,
                text: "A".to_string(),
                meta: "Type: select-one | Reason: disabled attribute".to_string(),
            }],
        };
        assert_eq!(
            render_scan(&scan),
            format!(
                "Found 1 disabled elements\n[ 0] <select> {BADGE_HIDDEN}\n     A\n     Type: select-one | Reason: disabled attribute\n"
            )
        );
    }

    #[test]
    fn empty_scan_has_its_own_line() {
        let scan = ScanView {
            total: 0,
            rows: Vec::new(),
        };
        assert_eq!(render_scan(&scan), format!("{EMPTY_SCAN}\n"));
    }

    #[test]
    fn errors_are_prefixed() {
        assert_eq!(
            render_notification(&Notification::error("Copy failed")),
            "error: Copy failed"
        );
        assert_eq!(render_notification(&Notification::info("Saved")), "Saved");
    }
}
