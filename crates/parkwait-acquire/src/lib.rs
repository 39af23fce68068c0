pub mod fetcher;
pub mod http;
pub mod normalize;
pub mod selectors;
pub mod snapshot;

pub use fetcher::{ElementGroup, FetchError, PageFetcher};
pub use http::HttpPageFetcher;
pub use selectors::PageSelectors;
pub use snapshot::build_snapshot;
