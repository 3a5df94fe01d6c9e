//! Issue detection over page snapshots: the structured counterpart of the
//! scoring deductions. Per-page rules emit issues with a single affected
//! URL; site-wide rules aggregate the URLs of every page exhibiting the
//! defect.

use serde::{Deserialize, Serialize};
use sitegauge_crawler::PageSnapshot;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Total ordering: Critical > High > Medium > Low. Declaration order makes
/// the derived `Ord` sort critical issues first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 1,
            Severity::High => 2,
            Severity::Medium => 3,
            Severity::Low => 4,
        }
    }
}

/// One detected defect, with remediation guidance and the set of pages it
/// affects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    pub severity: Severity,
    pub description: String,
    pub fix: String,
    pub affected_urls: BTreeSet<String>,
}

impl Issue {
    fn for_page(
        key: &str,
        severity: Severity,
        description: impl Into<String>,
        fix: impl Into<String>,
        url: &str,
    ) -> Self {
        Self {
            key: key.to_string(),
            severity,
            description: description.into(),
            fix: fix.into(),
            affected_urls: BTreeSet::from([url.to_string()]),
        }
    }

    fn site_wide(
        key: &str,
        severity: Severity,
        description: impl Into<String>,
        fix: impl Into<String>,
        urls: BTreeSet<String>,
    ) -> Self {
        Self {
            key: key.to_string(),
            severity,
            description: description.into(),
            fix: fix.into(),
            affected_urls: urls,
        }
    }
}

/// Per-page issues grouped by the score category they mirror.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageIssueBreakdown {
    pub seo_issues: Vec<Issue>,
    pub content_issues: Vec<Issue>,
    pub technical_issues: Vec<Issue>,
}

impl PageIssueBreakdown {
    pub fn total(&self) -> usize {
        self.seo_issues.len() + self.content_issues.len() + self.technical_issues.len()
    }

    pub fn all(&self) -> impl Iterator<Item = &Issue> {
        self.seo_issues
            .iter()
            .chain(self.content_issues.iter())
            .chain(self.technical_issues.iter())
    }
}

/// Analyze one page. Rules mirror the scoring deductions one for one.
pub fn page_issues(page: &PageSnapshot) -> PageIssueBreakdown {
    PageIssueBreakdown {
        seo_issues: seo_issues(page),
        content_issues: content_issues(page),
        technical_issues: technical_issues(page),
    }
}

fn seo_issues(page: &PageSnapshot) -> Vec<Issue> {
    let mut issues = Vec::new();
    let url = page.url.as_str();

    let title_len = page.title.chars().count();
    if title_len < 30 {
        issues.push(Issue::for_page(
            "missing_short_title",
            Severity::Critical,
            "Missing or Short Page Title",
            "Write a unique, descriptive title of 30-60 characters containing the primary keyword.",
            url,
        ));
    } else if title_len > 60 {
        issues.push(Issue::for_page(
            "long_title",
            Severity::Low,
            format!("Page Title Too Long ({title_len} characters)"),
            "Shorten the title to 60 characters or fewer so it displays fully in search results.",
            url,
        ));
    }

    let desc_len = page.description.chars().count();
    if desc_len < 50 {
        issues.push(Issue::for_page(
            "missing_short_description",
            Severity::High,
            "Missing or Short Meta Description",
            "Add a compelling meta description of 50-160 characters summarising the page.",
            url,
        ));
    } else if desc_len > 160 {
        issues.push(Issue::for_page(
            "long_description",
            Severity::Low,
            format!("Meta Description Too Long ({desc_len} characters)"),
            "Trim the meta description to 160 characters to avoid truncation in search results.",
            url,
        ));
    }

    let h1_count = page.heading_count(1);
    if h1_count == 0 {
        issues.push(Issue::for_page(
            "missing_h1",
            Severity::High,
            "Missing H1 Heading",
            "Add exactly one H1 heading that states the main topic of the page.",
            url,
        ));
    } else if h1_count > 1 {
        issues.push(Issue::for_page(
            "multiple_h1",
            Severity::Medium,
            format!("Multiple H1 Headings ({h1_count} found)"),
            "Keep a single H1 per page and demote the others to H2.",
            url,
        ));
    }

    let missing_alt = page.images_without_alt();
    if missing_alt > 0 {
        issues.push(Issue::for_page(
            "images_missing_alt",
            Severity::Medium,
            format!(
                "{missing_alt} of {} Images Missing Alt Text",
                page.images.len()
            ),
            "Add descriptive alt text to every meaningful image for accessibility and SEO.",
            url,
        ));
    }

    if page.word_count < 300 {
        issues.push(Issue::for_page(
            "thin_content",
            Severity::Medium,
            format!("Thin Content ({} words)", page.word_count),
            "Expand the page to at least 300 words of genuinely useful copy.",
            url,
        ));
    }

    if !page.ssl_valid {
        issues.push(Issue::for_page(
            "no_ssl",
            Severity::Critical,
            "Page Served Without SSL",
            "Serve the site over HTTPS and redirect all HTTP traffic.",
            url,
        ));
    }

    issues
}

fn content_issues(page: &PageSnapshot) -> Vec<Issue> {
    let mut issues = Vec::new();
    let url = page.url.as_str();

    if page.heading_count(2) == 0 {
        issues.push(Issue::for_page(
            "no_h2",
            Severity::Low,
            "No H2 Subheadings",
            "Break the copy into sections with H2 subheadings to aid scanning.",
            url,
        ));
    }
    if page.heading_count(3) == 0 {
        issues.push(Issue::for_page(
            "no_h3",
            Severity::Low,
            "No H3 Subheadings",
            "Use H3 headings under each section for deeper structure on longer pages.",
            url,
        ));
    }

    if page.internal_link_count() < 3 {
        issues.push(Issue::for_page(
            "weak_internal_linking",
            Severity::Medium,
            format!("Only {} Internal Links", page.internal_link_count()),
            "Link to at least three related pages on the same site.",
            url,
        ));
    }
    if page.external_link_count() == 0 {
        issues.push(Issue::for_page(
            "no_external_links",
            Severity::Low,
            "No External Links",
            "Reference at least one authoritative external source where relevant.",
            url,
        ));
    }

    if page.images.is_empty() {
        issues.push(Issue::for_page(
            "no_images",
            Severity::Medium,
            "No Images on Page",
            "Add relevant imagery to support the copy and improve engagement.",
            url,
        ));
    }

    issues
}

fn technical_issues(page: &PageSnapshot) -> Vec<Issue> {
    let mut issues = Vec::new();
    let url = page.url.as_str();

    if !page.ssl_valid {
        issues.push(Issue::for_page(
            "no_ssl",
            Severity::Critical,
            "Page Served Without SSL",
            "Install a TLS certificate and force HTTPS site-wide.",
            url,
        ));
    }
    if page.robots_txt.is_none() {
        issues.push(Issue::for_page(
            "missing_robots_txt",
            Severity::Medium,
            "No robots.txt Found",
            "Publish a robots.txt at the site root to guide crawler behaviour.",
            url,
        ));
    }
    if page.sitemap_url.is_none() {
        issues.push(Issue::for_page(
            "missing_sitemap",
            Severity::Medium,
            "No XML Sitemap Found",
            "Publish a sitemap.xml and reference it from robots.txt.",
            url,
        ));
    }

    let has_meta_description = page
        .meta_tags
        .get("description")
        .map(|d| !d.trim().is_empty())
        .unwrap_or(false);
    if !has_meta_description {
        issues.push(Issue::for_page(
            "missing_meta_description",
            Severity::High,
            "No Meta Description Tag",
            "Add a meta description tag to the page head.",
            url,
        ));
    }
    if !page.meta_tags.contains_key("keywords") {
        issues.push(Issue::for_page(
            "missing_keywords_meta",
            Severity::Low,
            "No Keywords Meta Tag",
            "Add a keywords meta tag listing the page's focus terms.",
            url,
        ));
    }
    if !page.has_meta_prefix("og:") {
        issues.push(Issue::for_page(
            "missing_open_graph",
            Severity::Medium,
            "No Open Graph Tags",
            "Add og:title, og:description and og:image so shares render rich previews.",
            url,
        ));
    }
    if !page.has_meta_prefix("twitter:") {
        issues.push(Issue::for_page(
            "missing_twitter_cards",
            Severity::Low,
            "No Twitter Card Tags",
            "Add twitter:card and twitter:title meta tags for link previews.",
            url,
        ));
    }

    if page.load_time_ms > 3000.0 {
        issues.push(Issue::for_page(
            "slow_page_load",
            Severity::High,
            format!("Slow Page Load ({:.0} ms)", page.load_time_ms),
            "Compress images, enable caching and reduce server response time.",
            url,
        ));
    } else if page.load_time_ms > 2000.0 {
        issues.push(Issue::for_page(
            "slow_page_load",
            Severity::Medium,
            format!("Sluggish Page Load ({:.0} ms)", page.load_time_ms),
            "Review image weights and third-party scripts to bring load under two seconds.",
            url,
        ));
    }

    issues
}

/// Cross-page analysis. Each rule collects every affected URL into one
/// aggregated issue; duplicate-title detection emits one issue per group
/// of pages sharing an identical title.
pub fn site_wide_issues(pages: &[&PageSnapshot]) -> Vec<Issue> {
    let mut issues = Vec::new();

    let urls_where = |predicate: &dyn Fn(&PageSnapshot) -> bool| -> BTreeSet<String> {
        pages
            .iter()
            .filter(|p| predicate(p))
            .map(|p| p.url.clone())
            .collect()
    };

    let short_titles = urls_where(&|p| p.title.chars().count() < 30);
    if !short_titles.is_empty() {
        issues.push(Issue::site_wide(
            "site_missing_short_titles",
            Severity::Critical,
            format!("{} Pages With Missing or Short Titles", short_titles.len()),
            "Give every page a unique title of 30-60 characters.",
            short_titles,
        ));
    }

    let short_descriptions = urls_where(&|p| p.description.chars().count() < 50);
    if !short_descriptions.is_empty() {
        issues.push(Issue::site_wide(
            "site_missing_short_descriptions",
            Severity::High,
            format!(
                "{} Pages With Missing or Short Meta Descriptions",
                short_descriptions.len()
            ),
            "Write a distinct 50-160 character meta description for each page.",
            short_descriptions,
        ));
    }

    let missing_h1 = urls_where(&|p| p.heading_count(1) == 0);
    if !missing_h1.is_empty() {
        issues.push(Issue::site_wide(
            "site_missing_h1",
            Severity::High,
            format!("{} Pages Without an H1 Heading", missing_h1.len()),
            "Add a single descriptive H1 to every page.",
            missing_h1,
        ));
    }

    let missing_alt = urls_where(&|p| p.images_without_alt() > 0);
    if !missing_alt.is_empty() {
        issues.push(Issue::site_wide(
            "site_images_missing_alt",
            Severity::Medium,
            format!("{} Pages With Images Missing Alt Text", missing_alt.len()),
            "Audit imagery site-wide and add alt text everywhere it is missing.",
            missing_alt,
        ));
    }

    let thin_pages = urls_where(&|p| p.word_count < 300);
    if !thin_pages.is_empty() {
        issues.push(Issue::site_wide(
            "site_thin_content",
            Severity::Medium,
            format!("{} Pages With Thin Content", thin_pages.len()),
            "Expand thin pages to at least 300 words or consolidate them.",
            thin_pages,
        ));
    }

    // Duplicate titles: exact string equality, one issue per group of two
    // or more pages. Empty titles are covered by the missing-title rule.
    let mut by_title: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
    for page in pages {
        if !page.title.is_empty() {
            by_title
                .entry(page.title.as_str())
                .or_default()
                .insert(page.url.clone());
        }
    }
    for (title, urls) in by_title {
        if urls.len() > 1 {
            issues.push(Issue::site_wide(
                "duplicate_page_titles",
                Severity::High,
                format!("Duplicate Page Titles: \"{title}\" on {} pages", urls.len()),
                "Rewrite each page title so it is unique across the site.",
                urls,
            ));
        }
    }

    issues.sort_by_key(|i| (i.severity.rank(), i.key.clone()));
    issues
}
