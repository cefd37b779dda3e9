//! Geometry and computed style for elements of a page that is never rendered.
use scraper::ElementRef;

/// Border box of an element relative to the viewport, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedStyle {
    pub display: String,
    pub visibility: String,
    pub opacity: String,
}

pub trait Layout {
    fn bounding_rect(&self, element: ElementRef<'_>) -> Rect;
    fn computed_style(&self, element: ElementRef<'_>) -> ComputedStyle;
}

/// Visible means: has area, is displayed, is not `visibility: hidden`, and is not
/// fully transparent.
pub fn is_visible(layout: &dyn Layout, element: ElementRef<'_>) -> bool {
    let style = layout.computed_style(element);
    let rect = layout.bounding_rect(element);
    let transparent = style
        .opacity
        .trim()
        .parse::<f64>()
        .map(|opacity| opacity == 0.0)
        .unwrap_or(false);
    style.display != "none"
        && style.visibility != "hidden"
        && !transparent
        && rect.width > 0.0
        && rect.height > 0.0
}

/// Layout derived from inline `style` attributes only.
///
/// `display: none` (including the `hidden` attribute and hidden inputs) on the
/// element or any ancestor collapses the rect; `visibility` inherits unless
/// overridden; opacity is the element's own. Controls without an explicit size use
/// fixed intrinsic sizes close to common user-agent defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineStyleLayout;

impl Layout for InlineStyleLayout {
    fn bounding_rect(&self, element: ElementRef<'_>) -> Rect {
        let displayed = std::iter::once(element)
            .chain(element.ancestors().filter_map(ElementRef::wrap))
            .all(|el| !is_display_none(el));
        if !displayed {
            return Rect::default();
        }

        let style = inline_style(element);
        let (default_width, default_height) = intrinsic_size(element);
        Rect {
            top: px(&style, "top").unwrap_or(0.0),
            left: px(&style, "left").unwrap_or(0.0),
            width: px(&style, "width").unwrap_or(default_width),
            height: px(&style, "height").unwrap_or(default_height),
        }
    }

    fn computed_style(&self, element: ElementRef<'_>) -> ComputedStyle {
        let own = inline_style(element);
        let display = if is_display_none(element) {
            "none".to_string()
        } else {
            declared(&own, "display").unwrap_or_else(|| "inline-block".to_string())
        };
        let visibility = std::iter::once(element)
            .chain(element.ancestors().filter_map(ElementRef::wrap))
            .find_map(|el| declared(&inline_style(el), "visibility"))
            .unwrap_or_else(|| "visible".to_string());
        let opacity = declared(&own, "opacity").unwrap_or_else(|| "1".to_string());
        ComputedStyle {
            display,
            visibility,
            opacity,
        }
    }
}

fn is_display_none(element: ElementRef<'_>) -> bool {
    let el = element.value();
    if el.attr("hidden").is_some() {
        return true;
    }
    if el.name() == "input"
        && el
            .attr("type")
            .map(|t| t.eq_ignore_ascii_case("hidden"))
            .unwrap_or(false)
    {
        return true;
    }
    declared(&inline_style(element), "display").as_deref() == Some("none")
}

fn intrinsic_size(element: ElementRef<'_>) -> (f64, f64) {
    let el = element.value();
    match el.name() {
        "input" => match el.attr("type").map(str::to_ascii_lowercase).as_deref() {
            Some("checkbox") | Some("radio") => (13.0, 13.0),
            Some("button") | Some("submit") | Some("reset") => (54.0, 21.0),
            _ => (153.0, 21.0),
        },
        "textarea" => (182.0, 36.0),
        "select" => (61.0, 19.0),
        "button" => (54.0, 21.0),
        _ => (0.0, 0.0),
    }
}

/// Inline declarations as lowercase `(property, value)` pairs, in source order.
fn inline_style(element: ElementRef<'_>) -> Vec<(String, String)> {
    element
        .value()
        .attr("style")
        .map(|style| {
            style
                .split(';')
                .filter_map(|decl| decl.split_once(':'))
                .map(|(property, value)| {
                    let value = value.trim();
                    let value = value
                        .strip_suffix("!important")
                        .unwrap_or(value)
                        .trim()
                        .to_ascii_lowercase();
                    (property.trim().to_ascii_lowercase(), value)
                })
                .filter(|(property, value)| !property.is_empty() && !value.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Last declaration wins, as in the cascade.
fn declared(style: &[(String, String)], property: &str) -> Option<String> {
    style
        .iter()
        .rev()
        .find(|(name, _)| name == property)
        .map(|(_, value)| value.clone())
}

fn px(style: &[(String, String)], property: &str) -> Option<f64> {
    let value = declared(style, property)?;
    let number = value.strip_suffix("px").unwrap_or(&value).trim();
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn with_first<R>(html: &str, css: &str, f: impl FnOnce(ElementRef<'_>) -> R) -> R {
        let doc = Html::parse_document(html);
        let selector = Selector::parse(css).unwrap();
        let element = doc.select(&selector).next().unwrap();
        f(element)
    }

    #[test]
    fn plain_control_is_visible_with_intrinsic_size() {
        with_first("<input id='a'>", "#a", |el| {
            let rect = InlineStyleLayout.bounding_rect(el);
            assert_eq!((rect.width, rect.height), (153.0, 21.0));
            assert!(is_visible(&InlineStyleLayout, el));
        });
    }

    #[test]
    fn inline_geometry_is_read_in_pixels() {
        with_first(
            "<textarea id='a' style='top: 10px; left:4.6px; width: 300px; height:40PX'></textarea>",
            "#a",
            |el| {
                let rect = InlineStyleLayout.bounding_rect(el);
                assert_eq!(rect.top, 10.0);
                assert_eq!(rect.left, 4.6);
                assert_eq!(rect.width, 300.0);
                assert_eq!(rect.height, 40.0);
            },
        );
    }

    #[test]
    fn hidden_ancestor_collapses_rect() {
        with_first(
            "<div style='display:none'><select id='a'></select></div>",
            "#a",
            |el| {
                assert_eq!(InlineStyleLayout.bounding_rect(el), Rect::default());
                assert!(!is_visible(&InlineStyleLayout, el));
            },
        );
    }

    #[test]
    fn visibility_inherits_and_can_be_overridden() {
        with_first(
            "<div style='visibility: hidden'><input id='a'><input id='b' style='visibility:visible'></div>",
            "#a",
            |el| assert!(!is_visible(&InlineStyleLayout, el)),
        );
        with_first(
            "<div style='visibility: hidden'><input id='a'><input id='b' style='visibility:visible'></div>",
            "#b",
            |el| assert!(is_visible(&InlineStyleLayout, el)),
        );
    }

    #[test]
    fn transparent_and_hidden_inputs_are_invisible() {
        with_first("<input id='a' style='opacity: 0'>", "#a", |el| {
            assert!(!is_visible(&InlineStyleLayout, el))
        });
        with_first("<input id='a' type='hidden' value='x'>", "#a", |el| {
            assert_eq!(InlineStyleLayout.computed_style(el).display, "none");
            assert!(!is_visible(&InlineStyleLayout, el));
        });
        with_first("<input id='a' hidden>", "#a", |el| {
            assert!(!is_visible(&InlineStyleLayout, el))
        });
    }
}
