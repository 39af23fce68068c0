use crate::fetcher::FetchError;
use scraper::Selector;

/// Container holding one attraction's heading and realtime information.
pub const ALL_ATTRACTION: &str = "div.listTextArea";
/// Attraction name within a container.
pub const ATTRACTION_NAME: &str = "h3.heading3";
/// Realtime wait time within a container.
pub const WAITING_TIME: &str = "div.realtimeInformation span.time";

/// Compiled CSS selectors handed to the page fetcher and the snapshot builder.
#[derive(Debug, Clone)]
pub struct PageSelectors {
    pub container: Selector,
    pub name: Selector,
    pub waiting_time: Selector,
    container_src: String,
}

impl PageSelectors {
    pub fn new(container: &str, name: &str, waiting_time: &str) -> Result<Self, FetchError> {
        Ok(Self {
            container: parse(container)?,
            name: parse(name)?,
            waiting_time: parse(waiting_time)?,
            container_src: container.to_string(),
        })
    }

    /// Source text of the container selector, for diagnostics.
    pub fn container_src(&self) -> &str {
        &self.container_src
    }
}

impl Default for PageSelectors {
    fn default() -> Self {
        // The built-in selectors are constants known to parse.
        Self::new(ALL_ATTRACTION, ATTRACTION_NAME, WAITING_TIME).expect("valid selector")
    }
}

fn parse(src: &str) -> Result<Selector, FetchError> {
    Selector::parse(src).map_err(|e| FetchError::InvalidSelector {
        selector: src.to_string(),
        reason: e.to_string(),
    })
}
