// Tests for report generation

use sitegauge_core::audit::{AuditResult, MultiPageAudit};
use sitegauge_core::insight::{CategoryInsight, SiteInsights};
use sitegauge_core::issues::{page_issues, site_wide_issues, Severity};
use sitegauge_core::performance::{CategoryScores, CoreWebVitals, PerformanceProfile};
use sitegauge_core::report::{
    generate_json_report, generate_text_report, save_report, ReportFormat,
};
use sitegauge_crawler::PageSnapshot;
use std::collections::BTreeMap;

// ============================================================================
// Report format parsing
// ============================================================================

#[test]
fn report_format_from_str() {
    assert!(matches!(ReportFormat::from_str("text"), Some(ReportFormat::Text)));
    assert!(matches!(ReportFormat::from_str("json"), Some(ReportFormat::Json)));
    assert!(matches!(ReportFormat::from_str("JSON"), Some(ReportFormat::Json)));
    assert!(ReportFormat::from_str("yaml").is_none());
}

// ============================================================================
// Fixtures
// ============================================================================

fn fixture_result() -> AuditResult {
    let mut main_page = PageSnapshot::new("http://fixture.example.com/");
    main_page.title = "Fixture".to_string();
    main_page.word_count = 120;

    let mut about = PageSnapshot::new("http://fixture.example.com/about");
    about.title = "Fixture".to_string();
    about.synthetic = false;

    let pages = vec![main_page.clone(), about.clone()];
    let refs: Vec<&PageSnapshot> = pages.iter().collect();
    let site_issues = site_wide_issues(&refs);

    let mut breakdown = BTreeMap::new();
    for page in &pages {
        breakdown.insert(page.url.clone(), page_issues(page));
    }

    let insight = |category: &str, score: u8| CategoryInsight {
        category: category.to_string(),
        score,
        strengths: vec!["something works".to_string()],
        weaknesses: vec!["something does not".to_string()],
        recommendations: vec!["do the thing".to_string()],
    };

    AuditResult {
        audit: MultiPageAudit {
            main_page,
            other_pages: vec![about],
            site_wide_issues: site_issues,
            seo_score: 41,
            content_score: 50,
            technical_score: 35,
            overall_score: 42,
            per_page_breakdown: breakdown,
            generation_brief: "Business name: Fixture\nLocation: Australia\n".to_string(),
        },
        performance: PerformanceProfile {
            url: "http://fixture.example.com/".to_string(),
            scores: CategoryScores {
                performance: 61,
                accessibility: 72,
                best_practices: 66,
                seo: 70,
            },
            desktop_scores: None,
            web_vitals: CoreWebVitals {
                lcp_ms: 3100.0,
                fid_ms: 140.0,
                cls: 0.12,
            },
            opportunities: vec!["Enable text compression".to_string()],
            diagnostics: Vec::new(),
            simulated: true,
        },
        insights: SiteInsights {
            seo: insight("SEO", 41),
            content: insight("Content", 50),
            technical: insight("Technical", 35),
            brand_marketing: insight("Brand & Marketing", 0),
        },
    }
}

// ============================================================================
// Text report
// ============================================================================

#[test]
fn text_report_contains_scores_and_site() {
    let report = generate_text_report(&fixture_result());

    assert!(report.contains("http://fixture.example.com/"));
    assert!(report.contains("41/100"));
    assert!(report.contains("50/100"));
    assert!(report.contains("35/100"));
    assert!(report.contains("42/100"));
    assert!(report.contains("estimated"));
}

#[test]
fn text_report_lists_site_wide_issues_by_severity() {
    let result = fixture_result();
    let report = generate_text_report(&result);

    assert!(report.contains("SITE-WIDE ISSUES"));
    // Both fixture pages lack SSL and share a title, among other defects.
    let duplicate = result
        .audit
        .site_wide_issues
        .iter()
        .find(|i| i.key == "duplicate_page_titles")
        .expect("fixture pages share a title");
    assert_eq!(duplicate.severity, Severity::High);
    assert!(report.contains(&duplicate.description));

    // Severity ordering in the source data is preserved in the report.
    let first = &result.audit.site_wide_issues[0];
    assert_eq!(first.severity, Severity::Critical);
}

#[test]
fn text_report_includes_brief_and_insights() {
    let report = generate_text_report(&fixture_result());
    assert!(report.contains("GENERATION BRIEF"));
    assert!(report.contains("Business name: Fixture"));
    assert!(report.contains("Brand & Marketing: 0/100"));
    assert!(report.contains("> do the thing"));
}

// ============================================================================
// JSON report
// ============================================================================

#[test]
fn json_report_is_valid_and_carries_summary() {
    let json = generate_json_report(&fixture_result()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let summary = &value["report"]["summary"];
    assert_eq!(summary["pages_audited"], 2);
    assert_eq!(summary["overall_score"], 42);
    assert_eq!(value["report"]["metadata"]["generator"], "Sitegauge");
    assert_eq!(
        value["report"]["audit"]["main_page"]["url"],
        "http://fixture.example.com/"
    );
    assert_eq!(value["report"]["performance"]["simulated"], true);
}

// ============================================================================
// Saving
// ============================================================================

#[test]
fn save_report_writes_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.txt");

    let report = generate_text_report(&fixture_result());
    save_report(&report, &path).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, report);
}
