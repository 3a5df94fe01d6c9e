//! Top-level audit orchestration: crawl, lab analysis, scoring, issue
//! detection, insight synthesis and brief generation in one call. The
//! crawl and the seed-page lab run execute concurrently; only a failed
//! seed crawl (or cancellation) surfaces to the caller.

use crate::brief::generate_brief;
use crate::error::AuditError;
use crate::insight::{CreativeInsightClient, InsightSynthesizer, SiteInsights};
use crate::issues::{page_issues, site_wide_issues, Issue, PageIssueBreakdown};
use crate::performance::{PerformanceAnalyzer, PerformanceProfile, DEFAULT_LAB_ENDPOINT};
use crate::score::site_scores;
use serde::{Deserialize, Serialize};
use sitegauge_crawler::{CrawlOptions, PageSnapshot, SiteCrawler};
use std::collections::BTreeMap;
use tokio::sync::watch;
use tracing::info;

/// Options for one audit run. `cancel` aborts in-flight work; a cancelled
/// audit returns an error rather than partial data.
#[derive(Debug, Clone, Default)]
pub struct AuditOptions {
    pub crawl: CrawlOptions,
    /// Lab performance service endpoint; tests point this at a mock.
    pub performance_endpoint: Option<String>,
    /// Creative-insight service endpoint; `None` disables the collaborator
    /// and the brand category uses its local fallback.
    pub insight_endpoint: Option<String>,
    pub cancel: Option<watch::Receiver<bool>>,
}

/// The aggregate audit artifact. Immutable once constructed; persisted by
/// the caller under an externally assigned audit id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiPageAudit {
    pub main_page: PageSnapshot,
    pub other_pages: Vec<PageSnapshot>,
    pub site_wide_issues: Vec<Issue>,
    pub seo_score: u8,
    pub content_score: u8,
    pub technical_score: u8,
    pub overall_score: u8,
    pub per_page_breakdown: BTreeMap<String, PageIssueBreakdown>,
    pub generation_brief: String,
}

impl MultiPageAudit {
    pub fn page_count(&self) -> usize {
        1 + self.other_pages.len()
    }
}

/// Everything an audit produces: the aggregate plus the supporting lab
/// profile and insight reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    pub audit: MultiPageAudit,
    pub performance: PerformanceProfile,
    pub insights: SiteInsights,
}

/// Audit a website with default options.
pub async fn audit_website(seed_url: &str) -> Result<AuditResult, AuditError> {
    audit_website_with(seed_url, AuditOptions::default()).await
}

/// Audit a website. Fails only on an unreachable seed page or
/// cancellation; every other sub-failure degrades inside its component.
pub async fn audit_website_with(
    seed_url: &str,
    mut options: AuditOptions,
) -> Result<AuditResult, AuditError> {
    match options.cancel.take() {
        Some(mut cancel) => {
            tokio::select! {
                result = run_pipeline(seed_url, &options) => result,
                _ = cancelled(&mut cancel) => {
                    info!("Audit of {} cancelled", seed_url);
                    Err(AuditError::Cancelled)
                }
            }
        }
        None => run_pipeline(seed_url, &options).await,
    }
}

async fn run_pipeline(
    seed_url: &str,
    options: &AuditOptions,
) -> Result<AuditResult, AuditError> {
    info!("Starting audit of {}", seed_url);

    let crawler = SiteCrawler::with_options(options.crawl.clone());
    let analyzer = PerformanceAnalyzer::new(
        options
            .performance_endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_LAB_ENDPOINT.to_string()),
    )
    .with_fallback_seed(options.crawl.synthetic_seed);

    // The lab run only needs the seed URL, so it overlaps with the crawl.
    let (crawl_result, performance) =
        tokio::join!(crawler.crawl(seed_url), analyzer.analyze(seed_url));
    let outcome = crawl_result?;

    let pages: Vec<&PageSnapshot> = outcome.all_pages().collect();
    let scores = site_scores(&pages);
    let site_wide = site_wide_issues(&pages);
    let breakdown: BTreeMap<String, PageIssueBreakdown> = pages
        .iter()
        .map(|p| (p.url.clone(), page_issues(p)))
        .collect();

    let creative = match &options.insight_endpoint {
        Some(endpoint) => CreativeInsightClient::new(endpoint.clone()),
        None => CreativeInsightClient::disabled(),
    };
    let insights = InsightSynthesizer::new(creative)
        .synthesize(&pages, &scores, &site_wide, &performance)
        .await;

    let brief = generate_brief(&pages, &scores, &site_wide, &breakdown);
    drop(pages);

    info!(
        "Audit of {} complete: {} pages, overall score {}",
        seed_url,
        1 + outcome.other_pages.len(),
        scores.overall
    );

    Ok(AuditResult {
        audit: MultiPageAudit {
            main_page: outcome.main_page,
            other_pages: outcome.other_pages,
            site_wide_issues: site_wide,
            seo_score: scores.seo,
            content_score: scores.content,
            technical_score: scores.technical,
            overall_score: scores.overall,
            per_page_breakdown: breakdown,
            generation_brief: brief,
        },
        performance,
        insights,
    })
}

/// Resolves once the cancellation signal flips to true. If the sender is
/// dropped without cancelling, never resolves.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    if *rx.borrow() {
        return;
    }
    while rx.changed().await.is_ok() {
        if *rx.borrow() {
            return;
        }
    }
    std::future::pending::<()>().await
}
