use crate::normalize::normalize_text;
use crate::selectors::PageSelectors;
use async_trait::async_trait;
use scraper::{Html, Selector};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("no elements matched '{selector}' at {url}")]
    NotFound { selector: String, url: String },

    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// One matched container on the page, queryable for child text.
///
/// Holds the container's own HTML so it can outlive the page it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementGroup {
    html: String,
}

impl ElementGroup {
    pub fn from_html(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    /// Normalized text of the first descendant matching `selector`, or `None`
    /// if nothing matches.
    pub fn text(&self, selector: &Selector) -> Option<String> {
        let fragment = Html::parse_fragment(&self.html);
        let element = fragment.select(selector).next()?;
        let raw: String = element.text().collect();
        Some(normalize_text(&raw))
    }
}

/// Loads a page and returns the containers matched by the selectors.
///
/// Implementations acquire whatever session they need inside `fetch` and
/// release it before returning, on success and on error.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        selectors: &PageSelectors,
    ) -> Result<Vec<ElementGroup>, FetchError>;
}
