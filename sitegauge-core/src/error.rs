use sitegauge_crawler::CrawlError;
use thiserror::Error;

/// Lab performance service failure. Always absorbed: the analyzer falls
/// back to a simulated profile.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("lab request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("lab service returned HTTP {0}")]
    Status(u16),

    #[error("malformed lab response: {0}")]
    Malformed(String),
}

/// Creative-insight collaborator failure. Always absorbed: the
/// synthesizer substitutes the deterministic local fallback.
#[derive(Error, Debug)]
pub enum InsightError {
    #[error("creative service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("creative service returned HTTP {0}")]
    Status(u16),

    #[error("creative service is not configured")]
    Disabled,

    #[error("no parsable insight payload in creative response")]
    Unparsable,
}

/// The only errors that reach the caller of an audit. Everything else
/// degrades inside its component.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error(transparent)]
    Crawl(#[from] CrawlError),

    #[error("audit cancelled")]
    Cancelled,
}
