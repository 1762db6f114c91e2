//! HTML → Snapshot extraction.
//!
//! Pulls the three text surfaces the analyzer compares: the hero headline,
//! section subheads, and pricing copy. Everything else on the page is
//! ignored (the raw HTML is retained on the snapshot for audit only).

use std::sync::LazyLock;

use chrono::Utc;
use scraper::{ElementRef, Html, Selector};

use pulse_common::{Snapshot, SNAPSHOT_MAX_PRICING_BLOCKS, SNAPSHOT_MAX_SUBHEADS};

static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").expect("valid selector"));
static HERO_HEADING: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("[class*=\"hero\"] h1, [class*=\"hero\"] h2").expect("valid selector")
});
static ANY_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2").expect("valid selector"));
static SUBHEADS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2, h3").expect("valid selector"));
static PRICING_CONTAINERS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "[class*=\"pricing\"], [class*=\"price\"], [id*=\"pricing\"], [id*=\"price\"]",
    )
    .expect("valid selector")
});
static ALL_ELEMENTS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body *").expect("valid selector"));

/// Subhead texts shorter than this are noise (nav labels, icons).
const SUBHEAD_MIN_CHARS: usize = 5;
const SUBHEAD_MAX_CHARS: usize = 200;
/// Pricing container text bounds. Wide upper bound: pricing sections carry
/// full plan tables.
const PRICING_MIN_CHARS: usize = 10;
const PRICING_MAX_CHARS: usize = 500;
/// Upper bound for the looser dollar-sign sweep, which would otherwise
/// match whole-page wrappers.
const DOLLAR_MAX_CHARS: usize = 200;

/// Build a snapshot from raw page HTML. Pure; timestamps at call time.
pub fn extract_snapshot(html: &str, url: &str, name: &str) -> Snapshot {
    let document = Html::parse_document(html);

    Snapshot {
        id: Snapshot::new_id(),
        competitor_url: url.to_string(),
        competitor_name: name.to_string(),
        captured_at: Utc::now(),
        hero_text: extract_hero(&document),
        subheads: extract_subheads(&document),
        pricing_blocks: extract_pricing(&document),
        raw_html: html.to_string(),
    }
}

/// First h1 on the page; failing that, a heading inside a hero-classed
/// container; failing that, any h1/h2.
fn extract_hero(document: &Html) -> String {
    for selector in [&*H1, &*HERO_HEADING, &*ANY_HEADING] {
        if let Some(text) = document.select(selector).map(element_text).find(|t| !t.is_empty()) {
            return text;
        }
    }
    String::new()
}

fn extract_subheads(document: &Html) -> Vec<String> {
    let mut subheads: Vec<String> = document
        .select(&SUBHEADS)
        .map(element_text)
        .filter(|t| t.len() > SUBHEAD_MIN_CHARS && t.len() < SUBHEAD_MAX_CHARS)
        .collect();
    subheads.truncate(SNAPSHOT_MAX_SUBHEADS);
    subheads
}

/// Pricing/price-classed containers first, then a looser sweep for any
/// element whose text pairs a dollar sign with a billing-period word.
fn extract_pricing(document: &Html) -> Vec<String> {
    let mut blocks: Vec<String> = Vec::new();

    for text in document.select(&PRICING_CONTAINERS).map(element_text) {
        if text.len() > PRICING_MIN_CHARS
            && text.len() < PRICING_MAX_CHARS
            && !blocks.contains(&text)
        {
            blocks.push(text);
        }
    }

    for element in document.select(&ALL_ELEMENTS) {
        if matches!(element.value().name(), "script" | "style" | "noscript") {
            continue;
        }
        let text = element_text(element);
        if text.len() <= PRICING_MIN_CHARS || text.len() >= DOLLAR_MAX_CHARS {
            continue;
        }
        if !text.contains('$') {
            continue;
        }
        let lower = text.to_lowercase();
        if (lower.contains("month") || lower.contains("year") || lower.contains("/mo"))
            && !blocks.contains(&text)
        {
            blocks.push(text);
        }
    }

    blocks.truncate(SNAPSHOT_MAX_PRICING_BLOCKS);
    blocks
}

/// Concatenated descendant text with whitespace collapsed to single spaces.
/// Embedded script/style/noscript subtrees are not page copy and are
/// excluded.
fn element_text(element: ElementRef) -> String {
    let mut raw = String::new();
    push_text(element, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(el) = ElementRef::wrap(child) {
            if !matches!(el.value().name(), "script" | "style" | "noscript") {
                push_text(el, out);
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}
