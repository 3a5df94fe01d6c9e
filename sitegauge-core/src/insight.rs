//! Category insight synthesis. SEO, content and technical insights are
//! derived deterministically from scores, issues and lab data. The brand
//! and marketing category is delegated to an external language-model
//! collaborator; when it is unavailable or returns something unusable,
//! a fixed local fallback takes its place so the pipeline never stalls
//! on the creative service.

use crate::error::InsightError;
use crate::issues::{Issue, Severity};
use crate::performance::PerformanceProfile;
use crate::score::SiteScores;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sitegauge_crawler::PageSnapshot;
use tracing::{debug, warn};

/// Documented fallback score for the brand category when the creative
/// collaborator is down.
pub const BRAND_FALLBACK_SCORE: u8 = 0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInsight {
    pub category: String,
    pub score: u8,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteInsights {
    pub seo: CategoryInsight,
    pub content: CategoryInsight,
    pub technical: CategoryInsight,
    pub brand_marketing: CategoryInsight,
}

/// Payload the creative collaborator is expected to embed somewhere in
/// its freeform response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrandInsightPayload {
    #[serde(default)]
    pub score: u8,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// HTTP client for the creative-insight collaborator. A disabled client
/// (no endpoint) fails fast with `InsightError::Disabled`, which the
/// synthesizer converts into the local fallback.
pub struct CreativeInsightClient {
    client: Client,
    endpoint: Option<String>,
}

impl CreativeInsightClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(20))
                .build()
                .expect("Failed to create HTTP client"),
            endpoint: Some(endpoint.into()),
        }
    }

    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            endpoint: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Ask the collaborator for a brand analysis of the given page facts.
    /// The response is freeform text; the first well-formed embedded JSON
    /// object is extracted and deserialized.
    pub async fn brand_insight(
        &self,
        prompt: &serde_json::Value,
    ) -> Result<BrandInsightPayload, InsightError> {
        let endpoint = self.endpoint.as_ref().ok_or(InsightError::Disabled)?;

        let response = self
            .client
            .post(endpoint)
            .json(&json!({ "prompt": prompt.to_string() }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InsightError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        let payload = extract_embedded_json(&text).ok_or(InsightError::Unparsable)?;
        serde_json::from_str(payload).map_err(|_| InsightError::Unparsable)
    }
}

/// Find the first balanced JSON object or array embedded in freeform
/// text. Bracket depth is tracked outside string literals, with escape
/// handling inside them.
pub fn extract_embedded_json(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let bytes = text.as_bytes();
    let open = bytes[start];
    let close = if open == b'{' { b'}' } else { b']' };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b if b == open => depth += 1,
            b if b == close => {
                depth -= 1;
                if depth == 0 {
                    let candidate = &text[start..=start + offset];
                    // Balanced is necessary but not sufficient.
                    return serde_json::from_str::<serde_json::Value>(candidate)
                        .ok()
                        .map(|_| candidate);
                }
            }
            _ => {}
        }
    }
    None
}

/// Builds the four category insight reports.
pub struct InsightSynthesizer {
    creative: CreativeInsightClient,
}

impl InsightSynthesizer {
    pub fn new(creative: CreativeInsightClient) -> Self {
        Self { creative }
    }

    pub async fn synthesize(
        &self,
        pages: &[&PageSnapshot],
        scores: &SiteScores,
        site_issues: &[Issue],
        performance: &PerformanceProfile,
    ) -> SiteInsights {
        SiteInsights {
            seo: seo_insight(scores, site_issues, performance),
            content: content_insight(pages, scores, site_issues),
            technical: technical_insight(pages, scores, site_issues, performance),
            brand_marketing: self.brand_insight(pages).await,
        }
    }

    async fn brand_insight(&self, pages: &[&PageSnapshot]) -> CategoryInsight {
        let Some(main) = pages.first() else {
            return brand_fallback();
        };

        let prompt = brand_prompt(main);
        match self.creative.brand_insight(&prompt).await {
            Ok(payload) => {
                debug!("Creative brand insight received for {}", main.url);
                CategoryInsight {
                    category: "Brand & Marketing".to_string(),
                    score: payload.score.min(100),
                    strengths: payload.strengths,
                    weaknesses: payload.weaknesses,
                    recommendations: payload.recommendations,
                }
            }
            Err(e) => {
                warn!("Creative insight unavailable ({}); using local fallback", e);
                brand_fallback()
            }
        }
    }
}

fn brand_prompt(main: &PageSnapshot) -> serde_json::Value {
    let signals = &main.brand_signals;
    json!({
        "url": main.url,
        "title": main.title,
        "description": main.description,
        "logo_url": signals.logo_url,
        "brand_colors": signals.brand_colors,
        "brand_mentions": signals.brand_mentions,
        "social_proof": signals.social_proof_snippets,
        "call_to_actions": signals.call_to_action_texts,
    })
}

fn brand_fallback() -> CategoryInsight {
    CategoryInsight {
        category: "Brand & Marketing".to_string(),
        score: BRAND_FALLBACK_SCORE,
        strengths: Vec::new(),
        weaknesses: Vec::new(),
        recommendations: Vec::new(),
    }
}

fn seo_insight(
    scores: &SiteScores,
    site_issues: &[Issue],
    performance: &PerformanceProfile,
) -> CategoryInsight {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    if scores.seo >= 80 {
        strengths.push("On-page SEO fundamentals are largely in place".to_string());
    }
    if performance.scores.seo >= 85 {
        strengths.push("Lab SEO checks score well".to_string());
    }

    for issue in issues_of_severity(site_issues, &[Severity::Critical, Severity::High]) {
        weaknesses.push(issue.description.clone());
    }

    CategoryInsight {
        category: "SEO".to_string(),
        score: scores.seo,
        recommendations: recommendations_from(site_issues, 5),
        strengths,
        weaknesses,
    }
}

fn content_insight(
    pages: &[&PageSnapshot],
    scores: &SiteScores,
    site_issues: &[Issue],
) -> CategoryInsight {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    let substantial = pages.iter().filter(|p| p.word_count >= 500).count();
    if substantial * 2 >= pages.len() {
        strengths.push("Most pages carry substantial copy".to_string());
    }
    if pages.iter().all(|p| !p.images.is_empty()) {
        strengths.push("Every page uses supporting imagery".to_string());
    }

    for issue in site_issues
        .iter()
        .filter(|i| matches!(i.key.as_str(), "site_thin_content" | "site_missing_h1"))
    {
        weaknesses.push(issue.description.clone());
    }

    CategoryInsight {
        category: "Content".to_string(),
        score: scores.content,
        recommendations: recommendations_from(site_issues, 3),
        strengths,
        weaknesses,
    }
}

fn technical_insight(
    pages: &[&PageSnapshot],
    scores: &SiteScores,
    site_issues: &[Issue],
    performance: &PerformanceProfile,
) -> CategoryInsight {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    if pages.iter().all(|p| p.ssl_valid) {
        strengths.push("All audited pages are served over HTTPS".to_string());
    }
    if performance.scores.performance >= 80 {
        strengths.push("Lab performance score is healthy".to_string());
    } else {
        weaknesses.push(format!(
            "Lab performance score is {} on mobile",
            performance.scores.performance
        ));
    }
    if performance.web_vitals.lcp_ms > 2500.0 {
        weaknesses.push(format!(
            "Largest Contentful Paint of {:.0} ms exceeds the 2.5 s target",
            performance.web_vitals.lcp_ms
        ));
    }

    for opportunity in performance.opportunities.iter().take(3) {
        weaknesses.push(opportunity.clone());
    }

    CategoryInsight {
        category: "Technical".to_string(),
        score: scores.technical,
        recommendations: recommendations_from(site_issues, 3),
        strengths,
        weaknesses,
    }
}

fn issues_of_severity<'a>(
    issues: &'a [Issue],
    severities: &'a [Severity],
) -> impl Iterator<Item = &'a Issue> {
    issues
        .iter()
        .filter(move |i| severities.contains(&i.severity))
}

fn recommendations_from(issues: &[Issue], cap: usize) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    let mut out = Vec::new();
    for issue in issues {
        if out.len() >= cap {
            break;
        }
        if seen.insert(issue.fix.clone()) {
            out.push(issue.fix.clone());
        }
    }
    out
}
