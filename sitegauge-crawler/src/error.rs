use thiserror::Error;

/// Failure to retrieve a single page. Recoverable: the crawler logs it and
/// moves on to the next candidate.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl FetchError {
    /// The URL that failed, for logging and skip bookkeeping.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. } => url,
            FetchError::Status { url, .. } => url,
            FetchError::InvalidUrl { url, .. } => url,
        }
    }
}

/// Total crawl failure. Only raised when the seed page itself cannot be
/// fetched; everything else degrades to a partial crawl.
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("seed page unreachable: {0}")]
    SeedUnreachable(#[from] FetchError),

    #[error("invalid seed URL {url}: {reason}")]
    InvalidSeed { url: String, reason: String },
}

pub type Result<T> = std::result::Result<T, CrawlError>;
