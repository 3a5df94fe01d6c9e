// End-to-end audit pipeline tests against mock collaborators

use sitegauge_core::audit::{audit_website_with, AuditOptions};
use sitegauge_core::error::AuditError;
use sitegauge_core::BRAND_FALLBACK_SCORE;
use std::collections::HashSet;
use tokio::sync::watch;
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

/// Mock site: seed page with exactly two discoverable internal links.
async fn two_link_site() -> MockServer {
    let server = MockServer::start().await;
    let base = server.uri();

    let root = format!(
        r#"<html>
        <head>
            <title>Harbour City Plumbing - Emergency Plumbers Sydney</title>
            <meta name="description" content="Licensed Sydney plumbers available around the clock for repairs, installations and emergency call-outs.">
        </head>
        <body>
            <h1>Harbour City Plumbing</h1>
            <a href="{base}/services">Services</a>
            <a href="{base}/contact">Contact</a>
            <a href="https://elsewhere.example/">partner site</a>
            <p>{}</p>
        </body></html>"#,
        "emergency plumbing repairs across Sydney suburbs delivered daily. ".repeat(60)
    );
    mount_html(&server, "/", root).await;
    mount_html(
        &server,
        "/services",
        "<html><head><title>Services</title></head><body><h1>Our Services</h1><p>repair install</p></body></html>"
            .to_string(),
    )
    .await;
    mount_html(
        &server,
        "/contact",
        "<html><head><title>Contact</title></head><body><h1>Contact</h1><p>call us</p></body></html>"
            .to_string(),
    )
    .await;

    server
}

fn options_with(lab: &MockServer) -> AuditOptions {
    AuditOptions {
        performance_endpoint: Some(lab.uri()),
        insight_endpoint: None,
        ..AuditOptions::default()
    }
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn two_link_seed_audits_exactly_four_pages() {
    let site = two_link_site().await;
    let lab = MockServer::start().await;
    // Lab service down: the performance analyzer must degrade, not fail.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&lab)
        .await;

    let result = audit_website_with(&site.uri(), options_with(&lab))
        .await
        .unwrap();
    let audit = &result.audit;

    assert_eq!(audit.page_count(), 4);
    let synthetic = audit.other_pages.iter().filter(|p| p.synthetic).count();
    assert_eq!(synthetic, 1);
    assert!(audit.overall_score <= 100);
}

#[tokio::test]
async fn page_urls_are_unique_across_the_audit() {
    let site = two_link_site().await;
    let lab = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&lab)
        .await;

    let result = audit_website_with(&site.uri(), options_with(&lab))
        .await
        .unwrap();
    let audit = &result.audit;

    let mut urls = HashSet::new();
    urls.insert(audit.main_page.url.clone());
    for page in &audit.other_pages {
        assert!(
            urls.insert(page.url.clone()),
            "duplicate page URL {}",
            page.url
        );
    }
}

#[tokio::test]
async fn overall_score_is_rounded_mean_of_categories() {
    let site = two_link_site().await;
    let lab = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&lab)
        .await;

    let result = audit_website_with(&site.uri(), options_with(&lab))
        .await
        .unwrap();
    let audit = &result.audit;

    let expected = (f64::from(
        u32::from(audit.seo_score)
            + u32::from(audit.content_score)
            + u32::from(audit.technical_score),
    ) / 3.0)
        .round() as u8;
    assert_eq!(audit.overall_score, expected);
}

#[tokio::test]
async fn word_counts_match_body_text_for_every_page() {
    let site = two_link_site().await;
    let lab = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&lab)
        .await;

    let result = audit_website_with(&site.uri(), options_with(&lab))
        .await
        .unwrap();
    let audit = &result.audit;

    for page in std::iter::once(&audit.main_page).chain(audit.other_pages.iter()) {
        assert_eq!(
            page.word_count,
            page.body_text.split_whitespace().count(),
            "word count drifted for {}",
            page.url
        );
    }
}

// ============================================================================
// Degradation and failure policy
// ============================================================================

#[tokio::test]
async fn lab_failure_yields_simulated_profile_in_range() {
    let site = two_link_site().await;
    let lab = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&lab)
        .await;

    let result = audit_website_with(&site.uri(), options_with(&lab))
        .await
        .unwrap();

    let perf = &result.performance;
    assert!(perf.simulated);
    assert!((55..=95).contains(&perf.scores.performance));
    assert!((65..=95).contains(&perf.scores.accessibility));
    assert!((60..=95).contains(&perf.scores.best_practices));
    assert!((55..=95).contains(&perf.scores.seo));
}

#[tokio::test]
async fn disabled_creative_service_uses_brand_fallback() {
    let site = two_link_site().await;
    let lab = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&lab)
        .await;

    let result = audit_website_with(&site.uri(), options_with(&lab))
        .await
        .unwrap();

    let brand = &result.insights.brand_marketing;
    assert_eq!(brand.score, BRAND_FALLBACK_SCORE);
    assert!(brand.recommendations.is_empty());
}

#[tokio::test]
async fn unreachable_seed_fails_the_whole_audit() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&site)
        .await;
    let lab = MockServer::start().await;

    let err = audit_website_with(&site.uri(), options_with(&lab))
        .await
        .unwrap_err();
    assert!(matches!(err, AuditError::Crawl(_)));
}

#[tokio::test]
async fn cancellation_aborts_promptly_with_no_partial_result() {
    let site = two_link_site().await;
    let lab = MockServer::start().await;

    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    let options = AuditOptions {
        cancel: Some(rx),
        ..options_with(&lab)
    };
    let err = audit_website_with(&site.uri(), options).await.unwrap_err();
    assert!(matches!(err, AuditError::Cancelled));
}

// ============================================================================
// Brief content
// ============================================================================

#[tokio::test]
async fn brief_carries_inferred_facts_and_scores() {
    let site = two_link_site().await;
    let lab = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&lab)
        .await;

    let result = audit_website_with(&site.uri(), options_with(&lab))
        .await
        .unwrap();
    let brief = &result.audit.generation_brief;

    // Content mentions plumbing and Sydney, so inference should land on
    // the plumbing category and the Sydney gazetteer entry.
    assert!(brief.contains("Plumbing & Gas Services"));
    assert!(brief.contains("Sydney"));
    assert!(brief.contains(&format!("{}/100", result.audit.seo_score)));
    assert!(brief.contains(&format!("{}/100", result.audit.overall_score)));
    assert!(brief.contains("Emergency Call-Outs"));
}
