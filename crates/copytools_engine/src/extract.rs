//! Best-effort text extraction for a single element.
//!
//! Each element category has its own chain of sources; the first nonempty source
//! wins and the result is trimmed. Disabled controls get extra fallbacks because
//! they often carry no value of their own.
use std::collections::HashMap;

use ego_tree::{NodeId, NodeRef};
use scraper::node::Node;
use scraper::ElementRef;

/// Values typed into form controls after the page loaded, keyed by node.
pub type LiveValues = HashMap<NodeId, String>;

/// Elements whose content never renders as text.
const NON_RENDERED: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that break the flow of rendered text.
const BLOCK_LIKE: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "legend", "li",
    "main", "nav", "ol", "optgroup", "option", "p", "pre", "section", "table", "td", "th", "tr",
    "ul",
];

/// Derives the most meaningful text for `element`. Never fails; returns an empty
/// string when nothing useful exists.
pub fn extract_text(element: ElementRef<'_>, live: &LiveValues) -> String {
    let text = match tag_name(element) {
        "input" | "textarea" => form_control_text(element, live),
        "select" => select_text(element, live),
        "button" => button_text(element),
        "img" => first_non_empty([attr(element, "alt"), attr(element, "title")]),
        "fieldset" | "optgroup" | "option" => grouping_text(element),
        _ => generic_text(element),
    };
    text.trim().to_string()
}

/// Current value of a form control as scripts would read it: the live value if the
/// user edited it, otherwise the markup default.
pub fn current_value(element: ElementRef<'_>, live: &LiveValues) -> String {
    match tag_name(element) {
        "select" => selected_option(element, live)
            .map(option_value)
            .unwrap_or_default(),
        "input" | "textarea" => {
            if let Some(value) = live.get(&element.id()) {
                return value.clone();
            }
            let default = default_value(element);
            if default.is_empty() && is_checkable(element) && attr(element, "value").is_none() {
                return "on".to_string();
            }
            default
        }
        _ => attr(element, "value").unwrap_or_default().to_string(),
    }
}

/// `true` when the element itself carries a `disabled` attribute.
pub fn has_disabled_attribute(element: ElementRef<'_>) -> bool {
    element.value().attr("disabled").is_some()
}

/// Text of all descendants as a reader would see it: hidden content skipped and
/// whitespace collapsed.
pub fn rendered_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_rendered(*element, &mut raw);
    collapse_whitespace(&raw)
}

fn form_control_text(element: ElementRef<'_>, live: &LiveValues) -> String {
    let value = current_value(element, live);
    if !value.is_empty() || !has_disabled_attribute(element) {
        return value;
    }
    let default = default_value(element);
    first_non_empty([
        attr(element, "placeholder"),
        Some(default.as_str()),
        attr(element, "data-value"),
    ])
}

fn select_text(element: ElementRef<'_>, live: &LiveValues) -> String {
    let text = selected_option(element, live)
        .map(|option| {
            let text = option_text(option);
            if text.is_empty() {
                option_value(option)
            } else {
                text
            }
        })
        .unwrap_or_default();
    if !text.is_empty() || !has_disabled_attribute(element) {
        return text;
    }
    match options(element).first() {
        Some(first) => {
            let text = option_text(*first);
            if text.is_empty() {
                option_value(*first)
            } else {
                text
            }
        }
        None => String::new(),
    }
}

fn button_text(element: ElementRef<'_>) -> String {
    let rendered = rendered_text(element);
    let content = text_content(element);
    let text = first_non_empty([
        Some(rendered.as_str()),
        Some(content.as_str()),
        attr(element, "value"),
    ]);
    if !text.is_empty() || !has_disabled_attribute(element) {
        return text;
    }
    first_non_empty([attr(element, "aria-label"), attr(element, "title")])
}

fn grouping_text(element: ElementRef<'_>) -> String {
    let rendered = rendered_text(element);
    let content = text_content(element);
    let text = first_non_empty([
        Some(rendered.as_str()),
        Some(content.as_str()),
        attr(element, "label"),
    ]);
    if !text.is_empty() || !has_disabled_attribute(element) {
        return text;
    }
    first_non_empty([attr(element, "aria-label"), attr(element, "title")])
}

fn generic_text(element: ElementRef<'_>) -> String {
    let direct = direct_text(element);
    if !direct.trim().is_empty() {
        return direct;
    }
    let rendered = rendered_text(element);
    let content = text_content(element);
    let text = first_non_empty([Some(rendered.as_str()), Some(content.as_str())]);
    if !text.trim().is_empty() || !has_disabled_attribute(element) {
        return text;
    }
    first_non_empty([
        attr(element, "aria-label"),
        attr(element, "title"),
        attr(element, "data-text"),
        attr(element, "alt"),
    ])
}

/// The markup default: `value` attribute for inputs, initial content for textareas.
fn default_value(element: ElementRef<'_>) -> String {
    if tag_name(element) == "textarea" {
        text_content(element)
    } else {
        attr(element, "value").unwrap_or_default().to_string()
    }
}

fn is_checkable(element: ElementRef<'_>) -> bool {
    tag_name(element) == "input"
        && attr(element, "type")
            .map(|t| t.eq_ignore_ascii_case("checkbox") || t.eq_ignore_ascii_case("radio"))
            .unwrap_or(false)
}

fn options(select: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    select
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|candidate| tag_name(*candidate) == "option")
        .collect()
}

/// Mirrors the browser's selectedness rules for markup-only pages.
fn selected_option<'a>(select: ElementRef<'a>, live: &LiveValues) -> Option<ElementRef<'a>> {
    let options = options(select);
    if let Some(value) = live.get(&select.id()) {
        return options.into_iter().find(|o| option_value(*o) == *value);
    }

    let multiple = attr(select, "multiple").is_some();
    let mut marked = options.iter().copied().filter(|o| attr(*o, "selected").is_some());
    let chosen = if multiple { marked.next() } else { marked.last() };
    if chosen.is_some() {
        return chosen;
    }

    let display_size = attr(select, "size")
        .and_then(|size| size.trim().parse::<u32>().ok())
        .unwrap_or(1);
    if multiple || display_size > 1 {
        return None;
    }
    options
        .into_iter()
        .find(|o| attr(*o, "disabled").is_none())
}

fn option_text(option: ElementRef<'_>) -> String {
    rendered_text(option)
}

fn option_value(option: ElementRef<'_>) -> String {
    match attr(option, "value") {
        Some(value) => value.to_string(),
        None => option_text(option),
    }
}

fn direct_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|child| child.value().as_text())
        .map(|text| &**text)
        .collect()
}

fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect()
}

fn collect_rendered(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if NON_RENDERED.contains(&name) {
                    continue;
                }
                let block = BLOCK_LIKE.contains(&name);
                if block {
                    out.push(' ');
                }
                collect_rendered(child, out);
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_non_empty<'a, const N: usize>(candidates: [Option<&'a str>; N]) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|candidate| !candidate.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name)
}

fn tag_name<'a>(element: ElementRef<'a>) -> &'a str {
    element.value().name()
}
