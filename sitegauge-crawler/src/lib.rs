pub mod crawler;
pub mod error;
pub mod fetch;
pub mod parse;
pub mod snapshot;
pub mod synthetic;

pub use crawler::{CrawlOptions, CrawlOutcome, SiteCrawler, MAX_CANDIDATE_LINKS, MIN_PAGES};
pub use error::{CrawlError, FetchError};
pub use fetch::{FetchedPage, Fetcher};
pub use parse::PageParser;
pub use snapshot::{BrandSignals, ImageRef, LinkRef, PageSnapshot};
