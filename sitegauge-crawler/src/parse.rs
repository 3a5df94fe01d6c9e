use crate::snapshot::{keyword_density_of, word_count_of, BrandSignals, ImageRef, LinkRef, PageSnapshot};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;
use url::Url;

const CTA_PHRASES: &[&str] = &[
    "contact us",
    "get a quote",
    "book now",
    "get started",
    "learn more",
    "call now",
    "enquire now",
    "request a callback",
    "buy now",
    "sign up",
];

fn hex_color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"#(?:[0-9a-fA-F]{6}|[0-9a-fA-F]{3})\b").unwrap())
}

/// Deterministic HTML-to-snapshot parser. No network access: fetch
/// metadata (load time, robots, sitemap) is attached by the crawler.
pub struct PageParser {
    seed_host: String,
    brand_token: String,
}

impl PageParser {
    pub fn new(seed: &Url) -> Self {
        let seed_host = seed.host_str().unwrap_or("").to_string();
        Self {
            brand_token: brand_token_of(&seed_host),
            seed_host,
        }
    }

    pub fn parse(&self, url: &str, html: &str) -> PageSnapshot {
        let document = Html::parse_document(html);
        let page_url = Url::parse(url).ok();

        let mut snapshot = PageSnapshot::new(url);
        snapshot.ssl_valid = page_url
            .as_ref()
            .map(|u| u.scheme() == "https")
            .unwrap_or(false);

        snapshot.title = select_text(&document, "title");
        snapshot.meta_tags = extract_meta_tags(&document);
        snapshot.description = snapshot
            .meta_tags
            .get("description")
            .cloned()
            .unwrap_or_default();
        snapshot.keywords = snapshot
            .meta_tags
            .get("keywords")
            .map(|raw| {
                raw.split(',')
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        snapshot.headings = extract_headings(&document);
        snapshot.images = extract_images(&document, page_url.as_ref());
        snapshot.links = self.extract_links(&document, page_url.as_ref());

        snapshot.body_text = extract_body_text(&document);
        snapshot.word_count = word_count_of(&snapshot.body_text);
        snapshot.keyword_density = keyword_density_of(&snapshot.body_text);

        snapshot.brand_signals = self.extract_brand_signals(
            &document,
            page_url.as_ref(),
            &snapshot.body_text,
        );

        snapshot
    }

    fn extract_links(&self, document: &Html, page_url: Option<&Url>) -> Vec<LinkRef> {
        let selector = Selector::parse("a[href]").unwrap();
        let mut links = Vec::new();

        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if skip_href(href) {
                continue;
            }

            let text = element.text().collect::<String>().trim().to_string();
            match page_url.and_then(|base| resolve_href(base, href)) {
                Some(resolved) => {
                    // Hostname equality against the seed domain; anything
                    // else, including other subdomains, is external.
                    let is_internal = resolved
                        .host_str()
                        .map(|h| h == self.seed_host)
                        .unwrap_or(false);
                    links.push(LinkRef {
                        href: resolved.to_string(),
                        text,
                        is_internal,
                    });
                }
                // Fail-safe: an href we cannot resolve is external.
                None => links.push(LinkRef {
                    href: href.to_string(),
                    text,
                    is_internal: false,
                }),
            }
        }

        links
    }

    fn extract_brand_signals(
        &self,
        document: &Html,
        page_url: Option<&Url>,
        body_text: &str,
    ) -> BrandSignals {
        let mut signals = BrandSignals {
            logo_url: extract_logo(document, page_url),
            brand_colors: extract_brand_colors(document),
            ..BrandSignals::default()
        };

        if !self.brand_token.is_empty() {
            signals.brand_mentions = body_text
                .to_lowercase()
                .matches(&self.brand_token)
                .count();
        }

        let proof_selector =
            Selector::parse(r#"[class*="testimonial"], [class*="review"], [class*="rating"]"#)
                .unwrap();
        for element in document.select(&proof_selector).take(5) {
            let text = collapse_whitespace(&element.text().collect::<String>());
            if !text.is_empty() {
                signals.social_proof_snippets.push(truncate(&text, 160));
            }
        }

        let cta_selector = Selector::parse("a, button").unwrap();
        for element in document.select(&cta_selector) {
            if signals.call_to_action_texts.len() >= 10 {
                break;
            }
            let text = collapse_whitespace(&element.text().collect::<String>());
            if text.is_empty() || text.len() > 60 {
                continue;
            }
            let class = element.value().attr("class").unwrap_or("").to_lowercase();
            let lowered = text.to_lowercase();
            let looks_like_cta = class.contains("btn")
                || class.contains("button")
                || class.contains("cta")
                || CTA_PHRASES.iter().any(|p| lowered.contains(p));
            if looks_like_cta && !signals.call_to_action_texts.contains(&text) {
                signals.call_to_action_texts.push(text);
            }
        }

        signals
    }
}

/// Resolve an href against its page URL, dropping fragments. Returns None
/// for hrefs that do not produce a usable absolute URL.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);
    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}

/// Canonical form used for the processed-URL dedup set.
pub fn canonicalize(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

fn skip_href(href: &str) -> bool {
    href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
}

fn select_text(document: &Html, css: &str) -> String {
    let selector = Selector::parse(css).unwrap();
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn extract_meta_tags(document: &Html) -> std::collections::HashMap<String, String> {
    let selector = Selector::parse("meta").unwrap();
    let mut tags = std::collections::HashMap::new();

    for element in document.select(&selector) {
        let value = element.value();
        let name = value.attr("name").or_else(|| value.attr("property"));
        if let Some(name) = name
            && let Some(content) = value.attr("content")
        {
            tags.insert(name.to_string(), content.trim().to_string());
        }
    }

    tags
}

fn extract_headings(document: &Html) -> BTreeMap<u8, Vec<String>> {
    let mut headings = BTreeMap::new();

    for level in 1..=6u8 {
        let selector = Selector::parse(&format!("h{}", level)).unwrap();
        let texts: Vec<String> = document
            .select(&selector)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .collect();
        if !texts.is_empty() {
            headings.insert(level, texts);
        }
    }

    headings
}

fn extract_images(document: &Html, page_url: Option<&Url>) -> Vec<ImageRef> {
    let selector = Selector::parse("img[src]").unwrap();
    let mut images = Vec::new();

    for element in document.select(&selector) {
        let Some(src) = element.value().attr("src") else {
            continue;
        };
        let src = page_url
            .and_then(|base| base.join(src).ok())
            .map(|u| u.to_string())
            .unwrap_or_else(|| src.to_string());
        images.push(ImageRef {
            src,
            alt: element.value().attr("alt").unwrap_or("").trim().to_string(),
            size_bytes: None,
        });
    }

    images
}

fn extract_body_text(document: &Html) -> String {
    let selector = Selector::parse("body").unwrap();
    document
        .select(&selector)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

fn element_text(element: ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn extract_logo(document: &Html, page_url: Option<&Url>) -> Option<String> {
    let selector = Selector::parse("img[src]").unwrap();
    for element in document.select(&selector) {
        let value = element.value();
        let haystack = format!(
            "{} {} {}",
            value.attr("src").unwrap_or(""),
            value.attr("alt").unwrap_or(""),
            value.attr("class").unwrap_or("")
        )
        .to_lowercase();
        if haystack.contains("logo") {
            let src = value.attr("src")?;
            return Some(
                page_url
                    .and_then(|base| base.join(src).ok())
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| src.to_string()),
            );
        }
    }
    None
}

fn extract_brand_colors(document: &Html) -> BTreeSet<String> {
    let mut colors = BTreeSet::new();
    let pattern = hex_color_pattern();

    let style_selector = Selector::parse("style").unwrap();
    for element in document.select(&style_selector) {
        let css = element.text().collect::<String>();
        for m in pattern.find_iter(&css) {
            colors.insert(m.as_str().to_lowercase());
        }
    }

    let styled_selector = Selector::parse("[style]").unwrap();
    for element in document.select(&styled_selector) {
        if let Some(style) = element.value().attr("style") {
            for m in pattern.find_iter(style) {
                colors.insert(m.as_str().to_lowercase());
            }
        }
    }

    colors
}

fn brand_token_of(host: &str) -> String {
    host.trim_start_matches("www.")
        .split('.')
        .next()
        .unwrap_or("")
        .to_lowercase()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser_for(seed: &str) -> PageParser {
        PageParser::new(&Url::parse(seed).unwrap())
    }

    #[test]
    fn headings_keep_document_order_within_level() {
        let html = r#"<html><body>
            <h2>Second A</h2>
            <h1>Main</h1>
            <h2>Second B</h2>
            <h3>  Third   heading </h3>
        </body></html>"#;
        let page = parser_for("https://example.com/").parse("https://example.com/", html);

        assert_eq!(page.headings[&1], vec!["Main"]);
        assert_eq!(page.headings[&2], vec!["Second A", "Second B"]);
        assert_eq!(page.headings[&3], vec!["Third heading"]);
        assert_eq!(page.heading_count(4), 0);
    }

    #[test]
    fn links_classify_by_seed_hostname() {
        let html = r#"<html><body>
            <a href="/about">About</a>
            <a href="https://example.com/contact">Contact</a>
            <a href="https://other.com/">Elsewhere</a>
            <a href="https://sub.example.com/">Subdomain</a>
            <a href="mailto:hi@example.com">Mail</a>
        </body></html>"#;
        let page = parser_for("https://example.com/").parse("https://example.com/", html);

        assert_eq!(page.links.len(), 4);
        assert_eq!(page.internal_link_count(), 2);
        assert_eq!(page.external_link_count(), 2);
        assert!(page.links[0].is_internal);
        assert_eq!(page.links[0].href, "https://example.com/about");
        // Subdomains do not count as the seed domain.
        assert!(!page.links[3].is_internal);
    }

    #[test]
    fn unparsable_href_is_external() {
        let html = r#"<html><body><a href="http://exa mple.com/x">Broken</a></body></html>"#;
        let page = parser_for("https://example.com/").parse("https://example.com/", html);

        assert_eq!(page.links.len(), 1);
        assert!(!page.links[0].is_internal);
        assert_eq!(page.links[0].href, "http://exa mple.com/x");
    }

    #[test]
    fn word_count_is_derived_from_body_text() {
        let html = "<html><body><p>one two three</p><div>four   five</div></body></html>";
        let page = parser_for("https://example.com/").parse("https://example.com/", html);

        assert_eq!(page.word_count, 5);
        assert_eq!(page.word_count, word_count_of(&page.body_text));
    }

    #[test]
    fn meta_tags_cover_name_and_property_attributes() {
        let html = r#"<html><head>
            <title>Example Plumbing | Sydney</title>
            <meta name="description" content="We fix pipes.">
            <meta name="keywords" content="Plumbing, Repairs , ">
            <meta property="og:title" content="Example Plumbing">
            <meta name="twitter:card" content="summary">
        </head><body></body></html>"#;
        let page = parser_for("https://example.com/").parse("https://example.com/", html);

        assert_eq!(page.title, "Example Plumbing | Sydney");
        assert_eq!(page.description, "We fix pipes.");
        assert!(page.keywords.contains("plumbing"));
        assert!(page.keywords.contains("repairs"));
        assert_eq!(page.keywords.len(), 2);
        assert!(page.has_meta_prefix("og:"));
        assert!(page.has_meta_prefix("twitter:"));
    }

    #[test]
    fn brand_signals_pick_up_logo_colors_and_ctas() {
        let html = r#"<html><head>
            <style>.hero { background: #FF8800; color: #fff; }</style>
        </head><body>
            <img src="/img/logo.png" alt="Acme logo">
            <div style="border-color: #00ff00">x</div>
            <div class="testimonial">Best plumbers in town, five stars</div>
            <a class="btn" href="/quote">Get a Quote</a>
            <a href="/services">Our acme services by acme</a>
        </body></html>"#;
        let page = parser_for("https://acme.com/").parse("https://acme.com/", html);
        let signals = &page.brand_signals;

        assert_eq!(
            signals.logo_url.as_deref(),
            Some("https://acme.com/img/logo.png")
        );
        assert!(signals.brand_colors.contains("#ff8800"));
        assert!(signals.brand_colors.contains("#00ff00"));
        assert_eq!(signals.social_proof_snippets.len(), 1);
        assert_eq!(signals.call_to_action_texts, vec!["Get a Quote"]);
        assert_eq!(signals.brand_mentions, 2);
    }

    #[test]
    fn ssl_flag_follows_scheme() {
        let html = "<html><body></body></html>";
        let parser = parser_for("https://example.com/");
        assert!(parser.parse("https://example.com/", html).ssl_valid);
        assert!(!parser.parse("http://example.com/", html).ssl_valid);
    }
}
