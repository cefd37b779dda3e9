//! Downloads a remote page so it can be opened like a local file.
use std::time::Duration;

use copytools_logging::copy_debug;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use thiserror::Error;

/// Media types a page may be served with.
const HTML_TYPES: [&str; 2] = ["text/html", "application/xhtml+xml"];

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// The body of a page together with where it was finally served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePage {
    /// Address after redirects; relative links resolve against it.
    pub url: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("not a valid address: {0}")]
    InvalidUrl(String),
    #[error("server answered {0}")]
    Status(u16),
    #[error("no answer in time")]
    Timeout,
    #[error("more than {0} redirects")]
    TooManyRedirects(usize),
    #[error("page exceeds {limit} bytes")]
    TooLarge { limit: u64 },
    #[error("{0} is not an HTML page")]
    NotHtml(String),
    #[error("{0}")]
    Network(String),
}

/// Retrieves a page by URL.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RemotePage, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn client(&self) -> Result<reqwest::Client, FetchError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(Policy::limited(self.settings.redirect_limit))
            .build()
            .map_err(|err| FetchError::Network(err.to_string()))
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_redirect() {
            FetchError::TooManyRedirects(self.settings.redirect_limit)
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

fn is_html(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    HTML_TYPES.iter().any(|html| html.eq_ignore_ascii_case(essence))
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<RemotePage, FetchError> {
        let target = reqwest::Url::parse(url).map_err(|err| FetchError::InvalidUrl(err.to_string()))?;
        let limit = self.settings.max_bytes;

        let response = self
            .client()?
            .get(target)
            .send()
            .await
            .map_err(|err| self.classify(err))?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }
        if response.content_length().is_some_and(|len| len > limit) {
            return Err(FetchError::TooLarge { limit });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        if let Some(declared) = content_type.as_deref().filter(|ct| !is_html(ct)) {
            return Err(FetchError::NotHtml(declared.to_string()));
        }

        let url = response.url().to_string();
        let mut body = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|err| self.classify(err))?;
            if (body.len() + chunk.len()) as u64 > limit {
                return Err(FetchError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }
        copy_debug!("Fetched {} bytes from {}", body.len(), url);

        Ok(RemotePage {
            url,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_types_ignore_parameters_and_case() {
        assert!(is_html("text/html; charset=utf-8"));
        assert!(is_html("Application/XHTML+XML"));
        assert!(!is_html("application/json"));
        assert!(!is_html(""));
    }
}
