use crate::snapshot::{keyword_density_of, word_count_of, ImageRef, LinkRef, PageSnapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use url::Url;

/// Bounds for the filler body of a synthetic page.
pub const SYNTHETIC_WORDS_MIN: usize = 300;
pub const SYNTHETIC_WORDS_MAX: usize = 700;

struct Archetype {
    slug: &'static str,
    title: &'static str,
    description: &'static str,
    h1: &'static str,
    h2s: [&'static str; 2],
    keywords: [&'static str; 3],
    blurb: &'static str,
}

// Fixed catalogue of archetypal pages used to pad thin crawls. Titles and
// descriptions sit inside the recommended SEO length bands so placeholder
// pages never drag the aggregate scores down on their own.
const ARCHETYPES: &[Archetype] = &[
    Archetype {
        slug: "/about",
        title: "About Us - Our Story, Team and Local Experience",
        description: "Learn about our history, the people behind the business and the values that guide the work we deliver for our customers every day.",
        h1: "About Our Business",
        h2s: ["Our Story", "Meet the Team"],
        keywords: ["about", "team", "experience"],
        blurb: "Our business has served the local community for many years with a focus on quality workmanship and honest customer service. The team brings together experienced professionals who care about every project and stand behind the results.",
    },
    Archetype {
        slug: "/services",
        title: "Our Services - What We Offer and How We Help",
        description: "Explore the full range of services we provide, from initial consultation through to delivery, backed by experienced staff and fair pricing.",
        h1: "Services We Provide",
        h2s: ["Popular Services", "Why Choose Us"],
        keywords: ["services", "pricing", "consultation"],
        blurb: "We offer a complete range of professional services tailored to each customer. Every engagement starts with a consultation so we understand the requirements before recommending an approach and providing a clear quote.",
    },
    Archetype {
        slug: "/contact",
        title: "Contact Us - Phone, Email and Opening Hours",
        description: "Get in touch with our friendly team by phone or email. Find our opening hours, service area and everything you need to reach us quickly.",
        h1: "Get In Touch",
        h2s: ["Opening Hours", "Service Area"],
        keywords: ["contact", "phone", "hours"],
        blurb: "Reaching our team is easy whether you prefer phone or email. We respond to every enquiry promptly and are happy to answer questions about availability, pricing and the areas we service.",
    },
    Archetype {
        slug: "/blog",
        title: "Blog - News, Guides and Industry Updates",
        description: "Read our latest articles covering practical guides, company news and industry updates written by our team to help you make informed decisions.",
        h1: "Latest Articles",
        h2s: ["Recent Posts", "Popular Guides"],
        keywords: ["blog", "news", "guides"],
        blurb: "Our blog shares practical advice and industry updates written in plain language. Articles cover common questions from customers along with seasonal tips and behind the scenes news from our team.",
    },
    Archetype {
        slug: "/faq",
        title: "Frequently Asked Questions - Quick Answers",
        description: "Answers to the questions we hear most often about bookings, pricing, turnaround times and what to expect when working with our team.",
        h1: "Frequently Asked Questions",
        h2s: ["Bookings and Pricing", "What to Expect"],
        keywords: ["faq", "questions", "answers"],
        blurb: "This page collects the questions customers ask most often. If the answer you need is not listed here our team is always happy to help over phone or email with anything specific to your situation.",
    },
];

/// Generate `count` placeholder snapshots for a site, skipping any URL
/// already claimed by a real page. The RNG seed is injectable so tests can
/// pin the word counts.
pub fn synthesize_pages(
    seed_url: &Url,
    count: usize,
    rng_seed: u64,
    taken: &HashSet<String>,
) -> Vec<PageSnapshot> {
    let mut rng = StdRng::seed_from_u64(rng_seed);
    let mut pages = Vec::with_capacity(count);

    for (index, archetype) in ARCHETYPES.iter().enumerate() {
        if pages.len() >= count {
            break;
        }
        let Ok(url) = seed_url.join(archetype.slug) else {
            continue;
        };
        let url = crate::parse::canonicalize(&url);
        if taken.contains(&url) {
            continue;
        }

        let words = rng.gen_range(SYNTHETIC_WORDS_MIN..=SYNTHETIC_WORDS_MAX);
        pages.push(build_page(seed_url, archetype, &url, index, words));
    }

    pages
}

fn build_page(
    seed_url: &Url,
    archetype: &Archetype,
    url: &str,
    index: usize,
    words: usize,
) -> PageSnapshot {
    let mut page = PageSnapshot::new(url);
    page.synthetic = true;
    page.ssl_valid = true;
    page.load_time_ms = 0.0;

    page.title = archetype.title.to_string();
    page.description = archetype.description.to_string();
    page.keywords = archetype.keywords.iter().map(|k| k.to_string()).collect();

    page.headings.insert(1, vec![archetype.h1.to_string()]);
    page.headings
        .insert(2, archetype.h2s.iter().map(|h| h.to_string()).collect());

    page.meta_tags
        .insert("description".to_string(), archetype.description.to_string());
    page.meta_tags
        .insert("keywords".to_string(), archetype.keywords.join(", "));
    page.meta_tags
        .insert("og:title".to_string(), archetype.title.to_string());
    page.meta_tags.insert(
        "og:description".to_string(),
        archetype.description.to_string(),
    );
    page.meta_tags
        .insert("twitter:card".to_string(), "summary".to_string());

    page.images.push(ImageRef {
        src: format!("{}images/placeholder-{}.jpg", ensure_trailing_slash(seed_url), index),
        alt: archetype.h1.to_string(),
        size_bytes: Some(48_000),
    });

    for other in ARCHETYPES.iter().filter(|a| a.slug != archetype.slug).take(3) {
        if let Ok(href) = seed_url.join(other.slug) {
            page.links.push(LinkRef {
                href: href.to_string(),
                text: other.h1.to_string(),
                is_internal: true,
            });
        }
    }
    page.links.push(LinkRef {
        href: "https://maps.google.com/".to_string(),
        text: "Find us on the map".to_string(),
        is_internal: false,
    });

    page.body_text = filler_text(archetype.blurb, words);
    page.word_count = word_count_of(&page.body_text);
    page.keyword_density = keyword_density_of(&page.body_text);

    page
}

fn ensure_trailing_slash(url: &Url) -> String {
    let s = url.origin().ascii_serialization();
    format!("{}/", s.trim_end_matches('/'))
}

/// Repeat the archetype blurb to exactly `words` whitespace tokens so the
/// word-count invariant holds for synthetic pages too.
fn filler_text(blurb: &str, words: usize) -> String {
    blurb
        .split_whitespace()
        .cycle()
        .take(words)
        .collect::<Vec<_>>()
        .join(" ")
}
