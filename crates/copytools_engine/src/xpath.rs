use scraper::{ElementRef, Html};

/// Locator for `element`: `//*[@id="..."]` when it has an id, otherwise an
/// absolute path with 1-based same-tag sibling positions (`/html/body/div[2]/input`).
pub fn element_xpath(element: ElementRef<'_>) -> String {
    if let Some(id) = element.value().id().filter(|id| !id.is_empty()) {
        return format!("//*[@id=\"{id}\"]");
    }

    let mut parts = Vec::new();
    let mut current = Some(element);
    while let Some(el) = current {
        let name = el.value().name();
        let preceding = el
            .prev_siblings()
            .filter_map(ElementRef::wrap)
            .filter(|sibling| sibling.value().name() == name)
            .count();
        if preceding > 0 {
            parts.push(format!("{}[{}]", name.to_ascii_lowercase(), preceding + 1));
        } else {
            parts.push(name.to_ascii_lowercase());
        }
        current = el.parent().and_then(ElementRef::wrap);
    }
    parts.reverse();

    if parts.is_empty() {
        String::new()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Resolves a locator produced by [`element_xpath`]. Other XPath forms are not
/// understood and yield `None`.
pub fn resolve_xpath<'a>(document: &'a Html, xpath: &str) -> Option<ElementRef<'a>> {
    let xpath = xpath.trim();
    if let Some(id) = xpath
        .strip_prefix("//*[@id=\"")
        .and_then(|rest| rest.strip_suffix("\"]"))
    {
        return document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().id() == Some(id));
    }

    let mut segments = xpath.strip_prefix('/')?.split('/');
    let root = document.root_element();
    let (root_name, root_position) = parse_segment(segments.next()?)?;
    if root.value().name() != root_name || root_position != 1 {
        return None;
    }

    segments.try_fold(root, |parent, segment| {
        let (name, position) = parse_segment(segment)?;
        parent
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == name)
            .nth(position - 1)
    })
}

fn parse_segment(segment: &str) -> Option<(&str, usize)> {
    match segment.split_once('[') {
        Some((name, rest)) => {
            let position = rest.strip_suffix(']')?.parse::<usize>().ok()?;
            (position > 0 && !name.is_empty()).then_some((name, position))
        }
        None => (!segment.is_empty()).then_some((segment, 1)),
    }
}
