use std::fmt;
use std::fs;
use std::path::PathBuf;

use copytools_core::SenderInfo;
use copytools_logging::copy_info;
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

use crate::decode::{decode_html, DecodeError};
use crate::extract::{extract_text, LiveValues};
use crate::fetch::{FetchError, Fetcher};
use crate::xpath::resolve_xpath;

/// A loaded document plus the values typed into its controls since loading.
pub struct Page {
    document: Html,
    url: String,
    live_values: LiveValues,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("url", &self.url)
            .field("live_values", &self.live_values.len())
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error("invalid selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },
    #[error("no element matches {0}")]
    NotFound(String),
}

/// How a caller points at one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(css) => write!(f, "selector {css:?}"),
            Locator::XPath(xpath) => write!(f, "xpath {xpath:?}"),
        }
    }
}

impl Page {
    pub fn parse(html: &str, url: impl Into<String>) -> Self {
        Self {
            document: Html::parse_document(html),
            url: url.into(),
            live_values: LiveValues::new(),
        }
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> String {
        Selector::parse("title")
            .ok()
            .and_then(|sel| {
                self.document
                    .select(&sel)
                    .next()
                    .map(|t| t.text().collect::<String>().trim().to_string())
            })
            .unwrap_or_default()
    }

    /// Declared icon link resolved against the page URL, else `/favicon.ico` for
    /// http(s) pages, else empty.
    pub fn favicon(&self) -> String {
        let base = Url::parse(&self.url).ok();
        let declared = Selector::parse("link[rel][href]").ok().and_then(|sel| {
            self.document
                .select(&sel)
                .find(|link| {
                    link.value()
                        .attr("rel")
                        .map(|rel| {
                            rel.split_ascii_whitespace()
                                .any(|token| token.eq_ignore_ascii_case("icon"))
                        })
                        .unwrap_or(false)
                })
                .and_then(|link| link.value().attr("href"))
                .map(str::trim)
                .filter(|href| !href.is_empty())
                .map(str::to_string)
        });

        match (declared, base) {
            (Some(href), Some(base)) => base.join(&href).map(String::from).unwrap_or(href),
            (Some(href), None) => href,
            (None, Some(base)) if matches!(base.scheme(), "http" | "https") => base
                .join("/favicon.ico")
                .map(String::from)
                .unwrap_or_default(),
            (None, _) => String::new(),
        }
    }

    pub fn sender_info(&self) -> SenderInfo {
        SenderInfo {
            url: self.url.clone(),
            title: self.title(),
            favicon: self.favicon(),
        }
    }

    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.document.tree.get(id).and_then(ElementRef::wrap)
    }

    pub fn select_first(&self, css: &str) -> Result<Option<ElementRef<'_>>, PageError> {
        let selector = Selector::parse(css).map_err(|err| PageError::InvalidSelector {
            selector: css.to_string(),
            message: err.to_string(),
        })?;
        Ok(self.document.select(&selector).next())
    }

    pub fn locate(&self, locator: &Locator) -> Result<ElementRef<'_>, PageError> {
        let found = match locator {
            Locator::Css(css) => self.select_first(css)?,
            Locator::XPath(xpath) => resolve_xpath(&self.document, xpath),
        };
        found.ok_or_else(|| PageError::NotFound(locator.to_string()))
    }

    /// Records a value typed into a control; extraction reads it as the current value.
    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) {
        self.live_values.insert(id, value.into());
    }

    pub fn live_values(&self) -> &LiveValues {
        &self.live_values
    }

    pub fn extract_text(&self, element: ElementRef<'_>) -> String {
        extract_text(element, &self.live_values)
    }
}

/// Where a page comes from: a local file or an http(s) URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    File(PathBuf),
    Url(String),
}

impl PageSource {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            PageSource::Url(trimmed.to_string())
        } else {
            PageSource::File(PathBuf::from(trimmed))
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to fetch page: {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

pub async fn load_page(source: &PageSource, fetcher: &dyn Fetcher) -> Result<Page, LoadError> {
    match source {
        PageSource::File(path) => {
            let bytes = fs::read(path).map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
            let decoded = decode_html(&bytes, None)?;
            let url = fs::canonicalize(path)
                .ok()
                .and_then(|absolute| Url::from_file_path(absolute).ok())
                .map(String::from)
                .unwrap_or_else(|| path.display().to_string());
            copy_info!("Loaded {} ({})", url, decoded.encoding_label);
            Ok(Page::parse(&decoded.html, url))
        }
        PageSource::Url(url) => {
            let remote = fetcher.fetch(url).await?;
            let decoded = decode_html(&remote.body, remote.content_type.as_deref())?;
            copy_info!(
                "Loaded {} ({}, {} bytes)",
                remote.url,
                decoded.encoding_label,
                remote.body.len()
            );
            Ok(Page::parse(&decoded.html, remote.url))
        }
    }
}
