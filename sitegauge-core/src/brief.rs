//! Generation brief: the plain-text artifact handed to the site-generation
//! collaborator. Business name, category, location and services are
//! inferred from domain tokens and page content with fixed lexicons. The
//! lexicons are deliberately English- and Australia-centric, matching the
//! markets the product ships in; no wording in the brief is contractual,
//! only that the facts appear.

use crate::issues::{Issue, PageIssueBreakdown};
use crate::score::SiteScores;
use sitegauge_crawler::PageSnapshot;
use std::collections::BTreeMap;
use url::Url;

pub const DEFAULT_CATEGORY: &str = "Professional Services";
pub const DEFAULT_LOCATION: &str = "Australia";

// First match wins.
const CATEGORY_LEXICON: &[(&str, &str)] = &[
    ("plumb", "Plumbing & Gas Services"),
    ("electric", "Electrical Services"),
    ("builder", "Building & Construction"),
    ("construction", "Building & Construction"),
    ("landscap", "Landscaping & Gardens"),
    ("garden", "Landscaping & Gardens"),
    ("clean", "Cleaning Services"),
    ("cafe", "Hospitality & Dining"),
    ("coffee", "Hospitality & Dining"),
    ("restaurant", "Hospitality & Dining"),
    ("dental", "Dental & Oral Health"),
    ("dentist", "Dental & Oral Health"),
    ("physio", "Allied Health"),
    ("chiro", "Allied Health"),
    ("legal", "Legal Services"),
    ("lawyer", "Legal Services"),
    ("solicitor", "Legal Services"),
    ("account", "Accounting & Finance"),
    ("bookkeep", "Accounting & Finance"),
    ("real estate", "Real Estate"),
    ("property", "Real Estate"),
    ("fitness", "Health & Fitness"),
    ("gym", "Health & Fitness"),
    ("yoga", "Health & Fitness"),
    ("salon", "Hair & Beauty"),
    ("beauty", "Hair & Beauty"),
    ("barber", "Hair & Beauty"),
    ("mechanic", "Automotive Services"),
    ("automotive", "Automotive Services"),
    ("photograph", "Photography"),
    ("roofing", "Roofing Services"),
    ("painting", "Painting & Decorating"),
];

const LOCATION_GAZETTEER: &[&str] = &[
    "Sydney",
    "Melbourne",
    "Brisbane",
    "Perth",
    "Adelaide",
    "Gold Coast",
    "Sunshine Coast",
    "Canberra",
    "Newcastle",
    "Wollongong",
    "Geelong",
    "Hobart",
    "Townsville",
    "Cairns",
    "Darwin",
];

// First match wins per entry; capped at five services.
const SERVICE_LEXICON: &[(&str, &str)] = &[
    ("emergency", "Emergency Call-Outs"),
    ("repair", "Repairs & Maintenance"),
    ("install", "Installations"),
    ("renovat", "Renovations"),
    ("maintenance", "Scheduled Maintenance"),
    ("inspect", "Inspections"),
    ("clean", "Cleaning"),
    ("design", "Design Consultations"),
    ("quote", "Free Quotes"),
    ("consult", "Consultations"),
    ("delivery", "Delivery"),
    ("training", "Training Sessions"),
];

const MAX_SERVICES: usize = 5;

const DEFAULT_SERVICES: [&str; 3] = [
    "General Consultations",
    "Project Delivery",
    "Ongoing Support",
];

/// Business name from domain tokenization: "bobs-plumbing.com.au" becomes
/// "Bobs Plumbing".
pub fn infer_business_name(site_url: &str) -> String {
    let host = Url::parse(site_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| site_url.to_string());

    let label = host
        .trim_start_matches("www.")
        .split('.')
        .next()
        .unwrap_or("")
        .to_string();

    let words: Vec<String> = label
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect();

    if words.is_empty() {
        "The Business".to_string()
    } else {
        words.join(" ")
    }
}

/// First lexicon keyword found in the combined site text wins.
pub fn infer_business_category(site_text: &str) -> &'static str {
    let lowered = site_text.to_lowercase();
    CATEGORY_LEXICON
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, category)| *category)
        .unwrap_or(DEFAULT_CATEGORY)
}

/// Gazetteer match over content first, then over the domain, then the
/// country-level default.
pub fn infer_location(site_text: &str, site_url: &str) -> String {
    let lowered = site_text.to_lowercase();
    if let Some(city) = LOCATION_GAZETTEER
        .iter()
        .find(|city| lowered.contains(&city.to_lowercase()))
    {
        return city.to_string();
    }

    let host = Url::parse(site_url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        .unwrap_or_default();
    if let Some(city) = LOCATION_GAZETTEER
        .iter()
        .find(|city| host.contains(&city.to_lowercase().replace(' ', "")))
    {
        return city.to_string();
    }

    DEFAULT_LOCATION.to_string()
}

/// Up to five services matched from content; a fixed default triple when
/// nothing matches.
pub fn infer_services(site_text: &str) -> Vec<String> {
    let lowered = site_text.to_lowercase();
    let mut services: Vec<String> = Vec::new();

    for (keyword, service) in SERVICE_LEXICON {
        if services.len() >= MAX_SERVICES {
            break;
        }
        if lowered.contains(keyword) && !services.iter().any(|s| s == service) {
            services.push((*service).to_string());
        }
    }

    if services.is_empty() {
        services = DEFAULT_SERVICES.iter().map(|s| s.to_string()).collect();
    }
    services
}

/// Assemble the brief. All scores, inferred business facts and the full
/// issue breakdown must appear; ordering and phrasing are free.
pub fn generate_brief(
    pages: &[&PageSnapshot],
    scores: &SiteScores,
    site_issues: &[Issue],
    breakdown: &BTreeMap<String, PageIssueBreakdown>,
) -> String {
    let site_url = pages.first().map(|p| p.url.as_str()).unwrap_or("");
    let site_text = combined_text(pages);

    let name = infer_business_name(site_url);
    let category = infer_business_category(&site_text);
    let location = infer_location(&site_text, site_url);
    let services = infer_services(&site_text);

    let mut brief = String::new();

    brief.push_str("WEBSITE GENERATION BRIEF\n");
    brief.push_str("========================\n\n");

    brief.push_str(&format!("Business name: {}\n", name));
    brief.push_str(&format!("Business category: {}\n", category));
    brief.push_str(&format!("Location: {}\n", location));
    brief.push_str(&format!("Current website: {}\n\n", site_url));

    brief.push_str("Services to feature:\n");
    for service in &services {
        brief.push_str(&format!("  - {}\n", service));
    }
    brief.push('\n');

    brief.push_str("Audit scores for the current site:\n");
    brief.push_str(&format!("  SEO:       {}/100\n", scores.seo));
    brief.push_str(&format!("  Content:   {}/100\n", scores.content));
    brief.push_str(&format!("  Technical: {}/100\n", scores.technical));
    brief.push_str(&format!("  Overall:   {}/100\n\n", scores.overall));

    if !site_issues.is_empty() {
        brief.push_str("Site-wide problems the new site must fix:\n");
        for issue in site_issues {
            brief.push_str(&format!(
                "  [{}] {} ({} pages affected)\n",
                issue.severity.as_str().to_uppercase(),
                issue.description,
                issue.affected_urls.len()
            ));
        }
        brief.push('\n');
    }

    brief.push_str("Per-page findings:\n");
    for (url, issues) in breakdown {
        brief.push_str(&format!(
            "  {}: {} seo, {} content, {} technical\n",
            url,
            issues.seo_issues.len(),
            issues.content_issues.len(),
            issues.technical_issues.len()
        ));
        for issue in issues.all() {
            brief.push_str(&format!(
                "    [{}] {}\n",
                issue.severity.as_str(),
                issue.description
            ));
        }
    }
    brief.push('\n');

    brief.push_str(&format!(
        "Build a modern, fast, mobile-first website for {} ({}) serving {}. \
         Feature the services listed above, resolve every issue noted, and \
         target strong scores in all three audit categories.\n",
        name, category, location
    ));

    brief
}

fn combined_text(pages: &[&PageSnapshot]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(&page.title);
        text.push(' ');
        for headings in page.headings.values() {
            for heading in headings {
                text.push_str(heading);
                text.push(' ');
            }
        }
        text.push_str(&page.body_text);
        text.push(' ');
    }
    text
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
