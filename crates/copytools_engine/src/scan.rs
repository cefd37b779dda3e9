use std::collections::HashSet;

use copytools_core::{DisabledBy, ElementInfo, Position, ScanResult};
use copytools_logging::{copy_debug, copy_warn};
use scraper::{ElementRef, Selector};

use crate::extract::{current_value, has_disabled_attribute};
use crate::layout::{is_visible, Layout};
use crate::page::Page;
use crate::xpath::element_xpath;

/// Base selectors first, ARIA equivalents last; discovery order follows this list.
const DISABLED_SELECTORS: [&str; 6] = [
    "input[disabled]",
    "textarea[disabled]",
    "select[disabled]",
    r#"input[aria-disabled="true"]"#,
    r#"textarea[aria-disabled="true"]"#,
    r#"select[aria-disabled="true"]"#,
];

/// Lists every disabled form control whose extracted text is nonempty.
///
/// Read-only: the page is never modified. Result order is discovery order and
/// carries no meaning beyond that.
pub fn scan_disabled_elements(page: &Page, layout: &dyn Layout, timestamp: i64) -> ScanResult {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for css in DISABLED_SELECTORS {
        let selector = match Selector::parse(css) {
            Ok(selector) => selector,
            Err(err) => {
                copy_warn!("Skipping selector {}: {}", css, err);
                continue;
            }
        };
        for element in page.document().select(&selector) {
            if seen.insert(element.id()) {
                candidates.push(element);
            }
        }
    }

    let elements: Vec<ElementInfo> = candidates
        .into_iter()
        .enumerate()
        .filter_map(|(index, element)| describe(page, layout, element, index))
        .collect();
    copy_debug!(
        "Scan of {} found {} disabled elements with text ({} candidates)",
        page.url(),
        elements.len(),
        seen.len()
    );
    ScanResult::new(elements, timestamp, page.url())
}

/// Why `element` counts as disabled, checked in a fixed order.
pub fn disabled_reason(element: ElementRef<'_>) -> DisabledBy {
    if has_disabled_attribute(element) {
        return DisabledBy::Attribute;
    }
    if element.value().attr("aria-disabled") == Some("true") {
        return DisabledBy::Aria;
    }
    if inside_disabled_fieldset(element) {
        return DisabledBy::ParentFieldset;
    }
    DisabledBy::Unknown
}

/// Disabled in the sense that the browser suppresses native double-clicks: the
/// control's own attribute or an enclosing disabled fieldset.
pub fn is_inert_control(element: ElementRef<'_>) -> bool {
    has_disabled_attribute(element) || inside_disabled_fieldset(element)
}

fn inside_disabled_fieldset(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == "fieldset" && has_disabled_attribute(ancestor))
}

fn describe(
    page: &Page,
    layout: &dyn Layout,
    element: ElementRef<'_>,
    index: usize,
) -> Option<ElementInfo> {
    let text = page.extract_text(element);
    if text.is_empty() {
        return None;
    }

    let el = element.value();
    let rect = layout.bounding_rect(element);
    Some(ElementInfo {
        index,
        tag_name: el.name().to_ascii_lowercase(),
        text,
        id: non_empty(el.attr("id")),
        class_name: non_empty(el.attr("class")),
        name: non_empty(el.attr("name")),
        kind: control_type(element),
        placeholder: non_empty(el.attr("placeholder")),
        value: non_empty(Some(&current_value(element, page.live_values()))),
        title: non_empty(el.attr("title")),
        aria_label: non_empty(el.attr("aria-label")),
        xpath: element_xpath(element),
        position: Position {
            top: rect.top.round() as i64,
            left: rect.left.round() as i64,
            width: rect.width.round() as i64,
            height: rect.height.round() as i64,
        },
        is_visible: is_visible(layout, element),
        disabled_by: disabled_reason(element),
    })
}

/// The control's `type` as scripts report it.
fn control_type(element: ElementRef<'_>) -> Option<String> {
    let el = element.value();
    match el.name() {
        "input" => Some(
            el.attr("type")
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "text".to_string()),
        ),
        "textarea" => Some("textarea".to_string()),
        "select" if el.attr("multiple").is_some() => Some("select-multiple".to_string()),
        "select" => Some("select-one".to_string()),
        _ => non_empty(el.attr("type")),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
