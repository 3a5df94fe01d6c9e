pub mod audit;
pub mod brief;
pub mod error;
pub mod insight;
pub mod issues;
pub mod performance;
pub mod report;
pub mod score;

pub use audit::{audit_website, audit_website_with, AuditOptions, AuditResult, MultiPageAudit};
pub use error::{AnalyzerError, AuditError, InsightError};
pub use insight::{
    CategoryInsight, CreativeInsightClient, InsightSynthesizer, SiteInsights,
    BRAND_FALLBACK_SCORE,
};
pub use issues::{page_issues, site_wide_issues, Issue, PageIssueBreakdown, Severity};
pub use performance::{
    CategoryScores, CoreWebVitals, PerformanceAnalyzer, PerformanceProfile, DEFAULT_LAB_ENDPOINT,
};
pub use score::{content_score, mean_score, seo_score, site_scores, technical_score, SiteScores};
