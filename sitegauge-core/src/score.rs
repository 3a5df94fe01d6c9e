//! Weighted-deduction scoring over page snapshots.
//!
//! Every function here is pure: same pages in, same scores out. Each page
//! starts at 100, fixed deductions apply, and the per-page result floors
//! at 0. Site scores are the arithmetic mean of per-page scores, rounded
//! half away from zero.

use sitegauge_crawler::PageSnapshot;

/// Aggregate scores for a page set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteScores {
    pub seo: u8,
    pub content: u8,
    pub technical: u8,
    pub overall: u8,
}

/// SEO score for a single page.
pub fn seo_score(page: &PageSnapshot) -> u8 {
    let mut score = 100.0_f64;

    let title_len = page.title.chars().count();
    if title_len < 30 {
        score -= 20.0;
    }
    if title_len > 60 {
        score -= 10.0;
    }

    let desc_len = page.description.chars().count();
    if desc_len < 50 {
        score -= 15.0;
    }
    if desc_len > 160 {
        score -= 5.0;
    }

    let h1_count = page.heading_count(1);
    if h1_count == 0 {
        score -= 15.0;
    }
    if h1_count > 1 {
        score -= 10.0;
    }

    score -= alt_text_deduction(page);

    if page.word_count < 300 {
        score -= 10.0;
    }
    if page.word_count < 500 {
        score -= 5.0;
    }

    if !page.ssl_valid {
        score -= 20.0;
    }

    clamp_score(score)
}

/// Content score for a single page.
pub fn content_score(page: &PageSnapshot) -> u8 {
    let mut score = 100.0_f64;

    if page.word_count < 300 {
        score -= 20.0;
    } else if page.word_count < 500 {
        score -= 10.0;
    } else if page.word_count > 2000 {
        score += 5.0;
    }

    if page.heading_count(1) == 0 {
        score -= 15.0;
    }
    if page.heading_count(2) == 0 {
        score -= 10.0;
    }
    if page.heading_count(3) == 0 {
        score -= 5.0;
    }

    if page.internal_link_count() < 3 {
        score -= 10.0;
    }
    if page.external_link_count() == 0 {
        score -= 5.0;
    }

    if page.images.is_empty() {
        score -= 10.0;
    } else if page.images.len() > 5 {
        score += 5.0;
    }

    clamp_score(score)
}

/// Technical score for a single page.
pub fn technical_score(page: &PageSnapshot) -> u8 {
    let mut score = 100.0_f64;

    if !page.ssl_valid {
        score -= 30.0;
    }
    if page.robots_txt.is_none() {
        score -= 10.0;
    }
    if page.sitemap_url.is_none() {
        score -= 10.0;
    }

    let has_meta_description = page
        .meta_tags
        .get("description")
        .map(|d| !d.trim().is_empty())
        .unwrap_or(false);
    if !has_meta_description {
        score -= 15.0;
    }
    if !page.meta_tags.contains_key("keywords") {
        score -= 5.0;
    }
    if !page.has_meta_prefix("og:") {
        score -= 10.0;
    }
    if !page.has_meta_prefix("twitter:") {
        score -= 5.0;
    }

    if page.load_time_ms > 3000.0 {
        score -= 15.0;
    } else if page.load_time_ms > 2000.0 {
        score -= 10.0;
    }

    clamp_score(score)
}

/// All three aggregates plus the overall score for a page set.
pub fn site_scores(pages: &[&PageSnapshot]) -> SiteScores {
    let seo = mean_score(pages.iter().map(|p| seo_score(p)));
    let content = mean_score(pages.iter().map(|p| content_score(p)));
    let technical = mean_score(pages.iter().map(|p| technical_score(p)));
    let overall = mean_score([seo, content, technical].into_iter());

    SiteScores {
        seo,
        content,
        technical,
        overall,
    }
}

/// Arithmetic mean rounded half away from zero. Empty input scores 0.
pub fn mean_score(scores: impl Iterator<Item = u8>) -> u8 {
    let mut sum: u32 = 0;
    let mut count: u32 = 0;
    for score in scores {
        sum += u32::from(score);
        count += 1;
    }
    if count == 0 {
        return 0;
    }
    // f64::round ties away from zero, which is the rounding the score
    // contract specifies.
    (f64::from(sum) / f64::from(count)).round() as u8
}

// A page where every image lacks alt text loses the full 20; partial
// coverage loses proportionally, capped at 10.
fn alt_text_deduction(page: &PageSnapshot) -> f64 {
    let total = page.images.len();
    if total == 0 {
        return 0.0;
    }
    let missing = page.images_without_alt();
    if missing == 0 {
        0.0
    } else if missing == total {
        20.0
    } else {
        ((missing as f64 / total as f64) * 20.0).min(10.0)
    }
}

fn clamp_score(score: f64) -> u8 {
    score.clamp(0.0, 100.0).round() as u8
}
