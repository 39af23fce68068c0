use crate::fetcher::{ElementGroup, FetchError, PageFetcher};
use crate::selectors::PageSelectors;
use async_trait::async_trait;
use scraper::Html;
use std::time::Duration;

const USER_AGENT: &str = "parkwait/0.1 (wait time logger)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Fetches server-rendered attraction pages over HTTP.
///
/// A fresh client is built for every fetch and dropped before `fetch`
/// returns, so no connection state is carried from one poll cycle to the next.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    timeout: Duration,
}

impl HttpPageFetcher {
    pub fn new() -> Self {
        Self {
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .build()?;

        let response = client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

impl Default for HttpPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(
        &self,
        url: &str,
        selectors: &PageSelectors,
    ) -> Result<Vec<ElementGroup>, FetchError> {
        tracing::debug!(url = %url, "Fetching attraction page");
        let html = self.fetch_page(url).await?;
        tracing::debug!(bytes = html.len(), "Received HTML");

        let groups = extract_groups(&html, selectors);
        if groups.is_empty() {
            return Err(FetchError::NotFound {
                selector: selectors.container_src().to_string(),
                url: url.to_string(),
            });
        }
        tracing::debug!(containers = groups.len(), "Matched attraction containers");
        Ok(groups)
    }
}

/// Split a page into the containers matched by the container selector.
fn extract_groups(html: &str, selectors: &PageSelectors) -> Vec<ElementGroup> {
    let document = Html::parse_document(html);
    document
        .select(&selectors.container)
        .map(|el| ElementGroup::from_html(el.html()))
        .collect()
}
