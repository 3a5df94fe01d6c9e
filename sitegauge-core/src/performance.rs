//! Lab performance analysis. Queries the external lab service for mobile
//! and desktop strategies; the mobile run is authoritative for category
//! scores. Any transport or parse failure swaps in a simulated profile,
//! so `analyze` never fails.

use crate::error::AnalyzerError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use tracing::{debug, warn};

pub const DEFAULT_LAB_ENDPOINT: &str =
    "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

const LAB_CATEGORIES: &[&str] = &["performance", "accessibility", "best-practices", "seo"];

/// Lighthouse-style category scores, 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub performance: u8,
    pub accessibility: u8,
    pub best_practices: u8,
    pub seo: u8,
}

/// Core Web Vitals from the lab run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoreWebVitals {
    pub lcp_ms: f64,
    pub fid_ms: f64,
    pub cls: f64,
}

/// Lab metrics for one audited URL. `simulated` records provenance when
/// the profile came from the fallback generator rather than a real run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceProfile {
    pub url: String,
    pub scores: CategoryScores,
    /// Desktop run, kept as supplementary data; mobile is authoritative.
    pub desktop_scores: Option<CategoryScores>,
    pub web_vitals: CoreWebVitals,
    pub opportunities: Vec<String>,
    pub diagnostics: Vec<String>,
    pub simulated: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabResponse {
    lighthouse_result: Option<LighthouseResult>,
}

#[derive(Debug, Deserialize)]
struct LighthouseResult {
    categories: HashMap<String, LabCategory>,
    #[serde(default)]
    audits: HashMap<String, LabAudit>,
}

#[derive(Debug, Deserialize)]
struct LabCategory {
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabAudit {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    numeric_value: Option<f64>,
}

/// Client for the lab performance collaborator.
pub struct PerformanceAnalyzer {
    client: Client,
    endpoint: String,
    fallback_seed: u64,
}

impl PerformanceAnalyzer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            endpoint: endpoint.into(),
            fallback_seed: 0,
        }
    }

    /// Seed used by the simulated fallback; injectable for tests.
    pub fn with_fallback_seed(mut self, seed: u64) -> Self {
        self.fallback_seed = seed;
        self
    }

    /// Analyze one URL. Mobile and desktop strategies are queried
    /// concurrently; mobile wins for the headline scores. Never fails:
    /// any lab error degrades to a simulated profile.
    pub async fn analyze(&self, url: &str) -> PerformanceProfile {
        let (mobile, desktop) = tokio::join!(
            self.query_strategy(url, "mobile"),
            self.query_strategy(url, "desktop")
        );

        let desktop_scores = match desktop {
            Ok(report) => Some(report.category_scores()),
            Err(e) => {
                debug!("Desktop lab run for {} unavailable: {}", url, e);
                None
            }
        };

        match mobile {
            Ok(report) => {
                let mut opportunities = report.opportunity_titles();
                let mut diagnostics = report.diagnostic_titles();
                opportunities.sort();
                diagnostics.sort();
                PerformanceProfile {
                    url: url.to_string(),
                    scores: report.category_scores(),
                    desktop_scores,
                    web_vitals: report.web_vitals(),
                    opportunities,
                    diagnostics,
                    simulated: false,
                }
            }
            Err(e) => {
                warn!("Lab analysis for {} failed ({}); using simulated profile", url, e);
                self.simulated_profile(url)
            }
        }
    }

    async fn query_strategy(
        &self,
        url: &str,
        strategy: &str,
    ) -> Result<LighthouseResult, AnalyzerError> {
        let mut params: Vec<(&str, &str)> = vec![("url", url), ("strategy", strategy)];
        for category in LAB_CATEGORIES {
            params.push(("category", category));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalyzerError::Status(status.as_u16()));
        }

        let body: LabResponse = response
            .json()
            .await
            .map_err(|e| AnalyzerError::Malformed(e.to_string()))?;

        body.lighthouse_result
            .ok_or_else(|| AnalyzerError::Malformed("no lighthouse result".to_string()))
    }

    /// Deterministic-for-a-given-seed stand-in used when the lab service
    /// is unreachable. The exact distribution is not contractual, only
    /// that every score lands in its documented range.
    fn simulated_profile(&self, url: &str) -> PerformanceProfile {
        let mut hasher = DefaultHasher::new();
        url.hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(self.fallback_seed ^ hasher.finish());

        PerformanceProfile {
            url: url.to_string(),
            scores: CategoryScores {
                performance: rng.gen_range(55..=95),
                accessibility: rng.gen_range(65..=95),
                best_practices: rng.gen_range(60..=95),
                seo: rng.gen_range(55..=95),
            },
            desktop_scores: None,
            web_vitals: CoreWebVitals {
                lcp_ms: rng.gen_range(1500.0..=4000.0),
                fid_ms: rng.gen_range(50.0..=250.0),
                cls: rng.gen_range(0.02..=0.25),
            },
            opportunities: Vec::new(),
            diagnostics: Vec::new(),
            simulated: true,
        }
    }
}

impl LighthouseResult {
    fn category_scores(&self) -> CategoryScores {
        CategoryScores {
            performance: self.category("performance"),
            accessibility: self.category("accessibility"),
            best_practices: self.category("best-practices"),
            seo: self.category("seo"),
        }
    }

    fn category(&self, name: &str) -> u8 {
        self.categories
            .get(name)
            .and_then(|c| c.score)
            .map(score_to_percent)
            .unwrap_or(0)
    }

    fn web_vitals(&self) -> CoreWebVitals {
        CoreWebVitals {
            lcp_ms: self.audit_value("largest-contentful-paint"),
            fid_ms: self.audit_value("max-potential-fid"),
            cls: self.audit_value("cumulative-layout-shift"),
        }
    }

    fn audit_value(&self, key: &str) -> f64 {
        self.audits
            .get(key)
            .and_then(|a| a.numeric_value)
            .unwrap_or(0.0)
    }

    fn opportunity_titles(&self) -> Vec<String> {
        self.audits
            .values()
            .filter(|a| a.score.map(|s| s < 0.9).unwrap_or(false))
            .filter_map(|a| a.title.clone())
            .collect()
    }

    fn diagnostic_titles(&self) -> Vec<String> {
        self.audits
            .values()
            .filter(|a| a.score.is_none())
            .filter_map(|a| a.title.clone())
            .collect()
    }
}

fn score_to_percent(score: f64) -> u8 {
    (score * 100.0).round().clamp(0.0, 100.0) as u8
}
