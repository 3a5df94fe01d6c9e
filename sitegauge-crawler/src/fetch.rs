use crate::error::FetchError;
use reqwest::Client;
use std::time::Instant;
use tracing::debug;
use url::Url;

/// Raw fetch output for one page, before parsing.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL as requested (post-canonicalization by the crawler).
    pub url: String,
    pub html: String,
    pub status: u16,
    pub load_time_ms: f64,
    /// Scheme heuristic: `https` counts as valid. No certificate chain
    /// validation is performed.
    pub ssl_valid: bool,
}

/// HTTP fetcher shared by one crawl. Every request carries an explicit
/// timeout; failures come back as `FetchError`, never a panic.
pub struct Fetcher {
    client: Client,
    timeout_secs: u64,
}

impl Fetcher {
    pub fn new() -> Self {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent("Sitegauge/0.2 (https://github.com/sitegauge/sitegauge)")
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_max_idle_per_host(16)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            timeout_secs,
        }
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Fetch one page. Non-2xx statuses are failures: the audit only ever
    /// reasons about pages it actually rendered.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        debug!("Fetching {}", url);

        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let ssl_valid = parsed.scheme() == "https";

        let start = Instant::now();
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let html = response
            .text()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;
        let load_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        Ok(FetchedPage {
            url: url.to_string(),
            html,
            status,
            load_time_ms,
            ssl_valid,
        })
    }

    /// Probe `<origin>/robots.txt`. Absence is `None`, never an error.
    pub async fn fetch_robots_txt(&self, seed: &Url) -> Option<String> {
        let robots_url = seed.join("/robots.txt").ok()?;
        let response = self.client.get(robots_url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.text().await.ok()
    }

    /// Find the sitemap URL: a `Sitemap:` directive in robots.txt wins,
    /// otherwise probe `<origin>/sitemap.xml`.
    pub async fn discover_sitemap(&self, seed: &Url, robots_txt: Option<&str>) -> Option<String> {
        if let Some(robots) = robots_txt {
            for line in robots.lines() {
                let line = line.trim();
                if let Some(rest) = line
                    .strip_prefix("Sitemap:")
                    .or_else(|| line.strip_prefix("sitemap:"))
                {
                    let candidate = rest.trim();
                    if !candidate.is_empty() {
                        return Some(candidate.to_string());
                    }
                }
            }
        }

        let sitemap_url = seed.join("/sitemap.xml").ok()?;
        let response = self.client.get(sitemap_url.clone()).send().await.ok()?;
        if response.status().is_success() {
            Some(sitemap_url.to_string())
        } else {
            None
        }
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}
