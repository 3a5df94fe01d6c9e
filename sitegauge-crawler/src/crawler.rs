use crate::error::{CrawlError, FetchError};
use crate::fetch::Fetcher;
use crate::parse::{canonicalize, PageParser};
use crate::snapshot::PageSnapshot;
use crate::synthetic::synthesize_pages;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

/// Every audit reasons over at least this many pages; thin crawls are
/// padded with synthetic snapshots.
pub const MIN_PAGES: usize = 4;

/// Internal links taken from the seed page, in discovery order.
pub const MAX_CANDIDATE_LINKS: usize = 15;

/// Knobs for one crawl.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Concurrent candidate fetches.
    pub concurrency: usize,
    pub timeout_secs: u64,
    /// Seed for the synthetic-page generator; injectable for tests.
    pub synthetic_seed: u64,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            timeout_secs: 10,
            synthetic_seed: 0x5176_a0d1,
        }
    }
}

/// Pages gathered for one site. Per-candidate failures are retained so
/// callers can see that partial success is the normal case.
#[derive(Debug)]
pub struct CrawlOutcome {
    pub main_page: PageSnapshot,
    pub other_pages: Vec<PageSnapshot>,
    pub failures: Vec<FetchError>,
}

impl CrawlOutcome {
    pub fn page_count(&self) -> usize {
        1 + self.other_pages.len()
    }

    /// Main page first, then the rest.
    pub fn all_pages(&self) -> impl Iterator<Item = &PageSnapshot> {
        std::iter::once(&self.main_page).chain(self.other_pages.iter())
    }
}

/// Crawls the seed page plus a bounded set of same-domain links.
pub struct SiteCrawler {
    fetcher: Fetcher,
    options: CrawlOptions,
}

impl SiteCrawler {
    pub fn new() -> Self {
        Self::with_options(CrawlOptions::default())
    }

    pub fn with_options(options: CrawlOptions) -> Self {
        Self {
            fetcher: Fetcher::with_timeout(options.timeout_secs),
            options,
        }
    }

    /// Crawl one site. The seed page being unreachable is the only fatal
    /// condition; candidate failures are logged and skipped.
    pub async fn crawl(&self, seed_url: &str) -> Result<CrawlOutcome, CrawlError> {
        let seed = Url::parse(seed_url).map_err(|e| CrawlError::InvalidSeed {
            url: seed_url.to_string(),
            reason: e.to_string(),
        })?;
        let canonical_seed = canonicalize(&seed);
        info!("Starting crawl of {}", canonical_seed);

        let parser = PageParser::new(&seed);
        let fetched = self.fetcher.fetch(&canonical_seed).await?;

        // Site-level data, probed once and attached to every real page.
        let robots_txt = self.fetcher.fetch_robots_txt(&seed).await;
        let sitemap_url = self
            .fetcher
            .discover_sitemap(&seed, robots_txt.as_deref())
            .await;

        let mut main_page = parser.parse(&fetched.url, &fetched.html);
        main_page.load_time_ms = fetched.load_time_ms;
        main_page.ssl_valid = fetched.ssl_valid;
        main_page.robots_txt = robots_txt.clone();
        main_page.sitemap_url = sitemap_url.clone();

        let candidates: Vec<String> = main_page
            .links
            .iter()
            .filter(|l| l.is_internal)
            .filter_map(|l| Url::parse(&l.href).ok())
            .map(|u| canonicalize(&u))
            .take(MAX_CANDIDATE_LINKS)
            .collect();
        debug!("Seed page yielded {} candidate links", candidates.len());

        let processed: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));
        processed.lock().await.insert(canonical_seed);

        let results: Vec<Option<Result<PageSnapshot, FetchError>>> = stream::iter(candidates)
            .map(|url| {
                let processed = processed.clone();
                let fetcher = &self.fetcher;
                let parser = &parser;
                let robots_txt = robots_txt.clone();
                let sitemap_url = sitemap_url.clone();
                async move {
                    // Check-and-insert under the lock; the lock is never
                    // held across the fetch itself.
                    {
                        let mut seen = processed.lock().await;
                        if !seen.insert(url.clone()) {
                            debug!("Skipping already processed {}", url);
                            return None;
                        }
                    }

                    match fetcher.fetch(&url).await {
                        Ok(fetched) => {
                            let mut page = parser.parse(&fetched.url, &fetched.html);
                            page.load_time_ms = fetched.load_time_ms;
                            page.ssl_valid = fetched.ssl_valid;
                            page.robots_txt = robots_txt;
                            page.sitemap_url = sitemap_url;
                            Some(Ok(page))
                        }
                        Err(e) => Some(Err(e)),
                    }
                }
            })
            .buffer_unordered(self.options.concurrency.max(1))
            .collect()
            .await;

        let mut other_pages = Vec::new();
        let mut failures = Vec::new();
        for result in results.into_iter().flatten() {
            match result {
                Ok(page) => other_pages.push(page),
                Err(e) => {
                    warn!("Skipping candidate {}: {}", e.url(), e);
                    failures.push(e);
                }
            }
        }

        let crawled = 1 + other_pages.len();
        if crawled < MIN_PAGES {
            let taken = processed.lock().await.clone();
            let padding = synthesize_pages(
                &seed,
                MIN_PAGES - crawled,
                self.options.synthetic_seed,
                &taken,
            );
            info!(
                "Crawl found {} pages; padding with {} synthetic pages",
                crawled,
                padding.len()
            );
            other_pages.extend(padding);
        }

        info!(
            "Crawl complete: {} pages, {} failed candidates",
            1 + other_pages.len(),
            failures.len()
        );

        Ok(CrawlOutcome {
            main_page,
            other_pages,
            failures,
        })
    }
}

impl Default for SiteCrawler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_html(server: &MockServer, route: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(body),
            )
            .mount(server)
            .await;
    }

    fn unique_urls(outcome: &CrawlOutcome) -> HashSet<String> {
        outcome.all_pages().map(|p| p.url.clone()).collect()
    }

    /// Seed plus enough real links: no synthetic padding.
    #[tokio::test]
    async fn crawls_seed_and_internal_links() {
        let server = MockServer::start().await;
        let base = server.uri();

        let root = format!(
            r#"<html><body>
                <h1>Welcome</h1>
                <a href="{base}/a">A</a>
                <a href="{base}/b">B</a>
                <a href="{base}/c">C</a>
                <a href="https://elsewhere.com/">External</a>
            </body></html>"#
        );
        mount_html(&server, "/", root).await;
        for route in ["/a", "/b", "/c"] {
            mount_html(
                &server,
                route,
                format!("<html><body><h1>{route}</h1></body></html>"),
            )
            .await;
        }

        let crawler = SiteCrawler::new();
        let outcome = crawler.crawl(&base).await.unwrap();

        assert_eq!(outcome.page_count(), 4);
        assert!(outcome.other_pages.iter().all(|p| !p.synthetic));
        assert_eq!(unique_urls(&outcome).len(), 4);
        assert!(outcome.failures.is_empty());
    }

    /// Two anchors to the same target must not fetch it twice.
    #[tokio::test]
    async fn deduplicates_candidates_by_canonical_url() {
        let server = MockServer::start().await;
        let base = server.uri();

        let root = format!(
            r#"<html><body>
                <a href="{base}/page">First anchor</a>
                <a href="{base}/page#section">Same page, other text</a>
                <a href="{base}/">Home</a>
            </body></html>"#
        );
        mount_html(&server, "/", root).await;
        mount_html(
            &server,
            "/page",
            "<html><body><h1>Page</h1></body></html>".to_string(),
        )
        .await;

        let crawler = SiteCrawler::new();
        let outcome = crawler.crawl(&base).await.unwrap();

        let real: Vec<_> = outcome
            .other_pages
            .iter()
            .filter(|p| !p.synthetic)
            .collect();
        assert_eq!(real.len(), 1, "the duplicate anchor and the self-link must be skipped");
        assert_eq!(unique_urls(&outcome).len(), outcome.page_count());
    }

    /// A seed page with no links at all still produces MIN_PAGES pages.
    #[tokio::test]
    async fn pads_to_minimum_with_synthetic_pages() {
        let server = MockServer::start().await;
        mount_html(
            &server,
            "/",
            "<html><body><h1>Lonely page</h1></body></html>".to_string(),
        )
        .await;

        let crawler = SiteCrawler::new();
        let outcome = crawler.crawl(&server.uri()).await.unwrap();

        assert_eq!(outcome.page_count(), MIN_PAGES);
        assert_eq!(outcome.other_pages.len(), 3);
        assert!(outcome.other_pages.iter().all(|p| p.synthetic));
        assert_eq!(unique_urls(&outcome).len(), MIN_PAGES);
    }

    /// Candidate failures are collected, not fatal; padding still applies.
    #[tokio::test]
    async fn candidate_failure_is_skipped_not_fatal() {
        let server = MockServer::start().await;
        let base = server.uri();

        let root = format!(
            r#"<html><body>
                <a href="{base}/ok">OK</a>
                <a href="{base}/broken">Broken</a>
            </body></html>"#
        );
        mount_html(&server, "/", root).await;
        mount_html(
            &server,
            "/ok",
            "<html><body><h1>Fine</h1></body></html>".to_string(),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let crawler = SiteCrawler::new();
        let outcome = crawler.crawl(&base).await.unwrap();

        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].url().ends_with("/broken"));
        // seed + 1 real page, padded back up to the floor
        assert_eq!(outcome.page_count(), MIN_PAGES);
        let real = outcome
            .other_pages
            .iter()
            .filter(|p| !p.synthetic)
            .count();
        assert_eq!(real, 1);
    }

    /// Exactly two discoverable internal links: 3 crawled pages plus one
    /// synthetic page reaches the floor of 4.
    #[tokio::test]
    async fn two_real_links_end_up_at_exactly_four_pages() {
        let server = MockServer::start().await;
        let base = server.uri();

        let root = format!(
            r#"<html><body>
                <a href="{base}/services">Services</a>
                <a href="{base}/contact-us">Contact</a>
            </body></html>"#
        );
        mount_html(&server, "/", root).await;
        mount_html(
            &server,
            "/services",
            "<html><body><h1>Services</h1></body></html>".to_string(),
        )
        .await;
        mount_html(
            &server,
            "/contact-us",
            "<html><body><h1>Contact</h1></body></html>".to_string(),
        )
        .await;

        let crawler = SiteCrawler::new();
        let outcome = crawler.crawl(&base).await.unwrap();

        assert_eq!(outcome.page_count(), 4);
        let synthetic = outcome.other_pages.iter().filter(|p| p.synthetic).count();
        assert_eq!(synthetic, 1);
        assert_eq!(unique_urls(&outcome).len(), 4);
    }

    /// The seed page being unreachable is the single fatal crawl error.
    #[tokio::test]
    async fn unreachable_seed_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let crawler = SiteCrawler::new();
        let err = crawler.crawl(&server.uri()).await.unwrap_err();
        assert!(matches!(err, CrawlError::SeedUnreachable(_)));
    }

    #[tokio::test]
    async fn invalid_seed_is_rejected() {
        let crawler = SiteCrawler::new();
        let err = crawler.crawl("not a url").await.unwrap_err();
        assert!(matches!(err, CrawlError::InvalidSeed { .. }));
    }
}
