// Report rendering for completed audits

use crate::audit::AuditResult;
use crate::insight::CategoryInsight;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

pub fn generate_text_report(result: &AuditResult) -> String {
    let audit = &result.audit;
    let mut report = String::new();

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("                          SITEGAUGE WEBSITE AUDIT\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    report.push_str(&format!("Site:           {}\n", audit.main_page.url));
    report.push_str(&format!("Pages audited:  {}\n", audit.page_count()));
    let synthetic = audit.other_pages.iter().filter(|p| p.synthetic).count();
    if synthetic > 0 {
        report.push_str(&format!(
            "                ({} placeholder pages padded in)\n",
            synthetic
        ));
    }
    report.push('\n');

    report.push_str("Scores\n");
    report.push_str(&format!("  SEO:        {:>3}/100\n", audit.seo_score));
    report.push_str(&format!("  Content:    {:>3}/100\n", audit.content_score));
    report.push_str(&format!("  Technical:  {:>3}/100\n", audit.technical_score));
    report.push_str(&format!("  Overall:    {:>3}/100\n\n", audit.overall_score));

    let perf = &result.performance;
    report.push_str(&format!(
        "Lab performance ({}): perf {} / a11y {} / best practices {} / seo {}\n",
        if perf.simulated { "estimated" } else { "measured" },
        perf.scores.performance,
        perf.scores.accessibility,
        perf.scores.best_practices,
        perf.scores.seo,
    ));
    report.push_str(&format!(
        "Core Web Vitals: LCP {:.0} ms, FID {:.0} ms, CLS {:.2}\n\n",
        perf.web_vitals.lcp_ms, perf.web_vitals.fid_ms, perf.web_vitals.cls
    ));

    if !audit.site_wide_issues.is_empty() {
        report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
        report.push_str("SITE-WIDE ISSUES\n");
        report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

        for (idx, issue) in audit.site_wide_issues.iter().enumerate() {
            report.push_str(&format!(
                "[{}] {} ({})\n",
                idx + 1,
                issue.description,
                issue.severity.as_str().to_uppercase()
            ));
            report.push_str(&format!("    Fix: {}\n", issue.fix));
            report.push_str(&format!(
                "    Affected: {} page(s)\n\n",
                issue.affected_urls.len()
            ));
        }
    }

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("PER-PAGE FINDINGS\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    for (url, breakdown) in &audit.per_page_breakdown {
        report.push_str(&format!("## {}\n", url));
        if breakdown.total() == 0 {
            report.push_str("  No issues found\n\n");
            continue;
        }
        for issue in breakdown.all() {
            report.push_str(&format!(
                "  [{}] {}\n",
                issue.severity.as_str(),
                issue.description
            ));
        }
        report.push('\n');
    }

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("INSIGHTS\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    for insight in [
        &result.insights.seo,
        &result.insights.content,
        &result.insights.technical,
        &result.insights.brand_marketing,
    ] {
        append_insight(&mut report, insight);
    }

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("GENERATION BRIEF\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str(&audit.generation_brief);
    report.push('\n');

    report
}

fn append_insight(report: &mut String, insight: &CategoryInsight) {
    report.push_str(&format!("{}: {}/100\n", insight.category, insight.score));
    for strength in &insight.strengths {
        report.push_str(&format!("  + {}\n", strength));
    }
    for weakness in &insight.weaknesses {
        report.push_str(&format!("  - {}\n", weakness));
    }
    for recommendation in &insight.recommendations {
        report.push_str(&format!("  > {}\n", recommendation));
    }
    report.push('\n');
}

pub fn generate_json_report(result: &AuditResult) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Sitegauge",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": {
                "site": result.audit.main_page.url,
                "pages_audited": result.audit.page_count(),
                "seo_score": result.audit.seo_score,
                "content_score": result.audit.content_score,
                "technical_score": result.audit.technical_score,
                "overall_score": result.audit.overall_score,
                "site_wide_issue_count": result.audit.site_wide_issues.len()
            },
            "audit": result.audit,
            "performance": result.performance,
            "insights": result.insights
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
