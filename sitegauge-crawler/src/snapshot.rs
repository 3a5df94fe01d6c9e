use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// One image reference found on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
    /// Empty string means no usable alt text; scoring counts these.
    pub alt: String,
    pub size_bytes: Option<u64>,
}

/// One anchor found on a page. `is_internal` is always recomputed against
/// the seed host by the parser, never taken from input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRef {
    pub href: String,
    pub text: String,
    pub is_internal: bool,
}

/// Brand and marketing signals scraped from page markup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrandSignals {
    pub logo_url: Option<String>,
    pub brand_colors: BTreeSet<String>,
    /// Occurrences of the site name in body text.
    pub brand_mentions: usize,
    pub social_proof_snippets: Vec<String>,
    pub call_to_action_texts: Vec<String>,
}

/// Structured view of one crawled page. Immutable once produced: a re-fetch
/// creates a new snapshot.
///
/// `title` and `description` use the empty string for "missing" because the
/// scoring formulas key off length; the other optional fields are real
/// `Option`s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    pub title: String,
    pub description: String,
    pub keywords: BTreeSet<String>,
    /// Heading texts keyed by level 1..=6, in document order per level.
    pub headings: BTreeMap<u8, Vec<String>>,
    pub images: Vec<ImageRef>,
    pub links: Vec<LinkRef>,
    pub body_text: String,
    pub word_count: usize,
    /// Percentage of total tokens, for word tokens longer than 3 chars.
    pub keyword_density: HashMap<String, f64>,
    pub meta_tags: HashMap<String, String>,
    /// Scheme heuristic only (`https` => true); no certificate validation.
    pub ssl_valid: bool,
    pub robots_txt: Option<String>,
    pub sitemap_url: Option<String>,
    pub load_time_ms: f64,
    pub brand_signals: BrandSignals,
    /// Set for placeholder pages generated to satisfy the minimum-page
    /// floor. Provenance only; nothing in scoring branches on it.
    pub synthetic: bool,
}

impl PageSnapshot {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            description: String::new(),
            keywords: BTreeSet::new(),
            headings: BTreeMap::new(),
            images: Vec::new(),
            links: Vec::new(),
            body_text: String::new(),
            word_count: 0,
            keyword_density: HashMap::new(),
            meta_tags: HashMap::new(),
            ssl_valid: false,
            robots_txt: None,
            sitemap_url: None,
            load_time_ms: 0.0,
            brand_signals: BrandSignals::default(),
            synthetic: false,
        }
    }

    pub fn heading_count(&self, level: u8) -> usize {
        self.headings.get(&level).map(Vec::len).unwrap_or(0)
    }

    pub fn internal_link_count(&self) -> usize {
        self.links.iter().filter(|l| l.is_internal).count()
    }

    pub fn external_link_count(&self) -> usize {
        self.links.iter().filter(|l| !l.is_internal).count()
    }

    pub fn images_without_alt(&self) -> usize {
        self.images.iter().filter(|i| i.alt.trim().is_empty()).count()
    }

    /// True when any meta tag name starts with the given prefix
    /// (e.g. "og:" or "twitter:").
    pub fn has_meta_prefix(&self, prefix: &str) -> bool {
        self.meta_tags.keys().any(|k| k.starts_with(prefix))
    }
}

/// Whitespace token count. `PageSnapshot.word_count` is always derived from
/// `body_text` through this.
pub fn word_count_of(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Keyword density over word tokens longer than 3 characters, as a
/// percentage of the total token count. Intentionally coarse: no stemming,
/// no stopword removal.
pub fn keyword_density_of(text: &str) -> HashMap<String, f64> {
    let tokens: Vec<String> = text
        .split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|t| !t.is_empty())
        .collect();

    let total = tokens.len();
    if total == 0 {
        return HashMap::new();
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    for token in tokens.into_iter().filter(|t| t.chars().count() > 3) {
        *counts.entry(token).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(word, count)| (word, count as f64 / total as f64 * 100.0))
        .collect()
}
