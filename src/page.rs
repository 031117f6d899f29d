//! Product page extraction.
//!
//! A page is reduced to the text of three elements inside the `centerCol`
//! column, then each fragment is cleaned with a fixed rule.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

use crate::models::ParsedRecord;

static CENTER_COL: LazyLock<Selector> = LazyLock::new(|| selector("div#centerCol"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("span#productTitle"));
static ARTIST_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a.a-link-normal"));
static PRICE: LazyLock<Selector> = LazyLock::new(|| selector("span.a-offscreen"));

/// `" 678 ratings"`, `" 6,866 ratings"`, ...
static RATINGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" \d+(?:,\d+)* ratings").expect("ratings pattern is valid"));
/// `"21.72"`, `"25"`, `".99"`, ...
static PRICE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d*\.?\d+").expect("price pattern is valid"));

const VINYL_SUFFIX: &str = " [VINYL]";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Extract a record from a product page.
///
/// Missing fields are logged and left empty (or zero for the price). A page
/// without the product column yields a blank record; deciding what a blank
/// record means is up to the caller.
pub fn parse_page(html: &str, url: &str) -> ParsedRecord {
    let document = Html::parse_document(html);

    let Some(column) = document.select(&CENTER_COL).next() else {
        tracing::warn!(url, "no product column found");
        return ParsedRecord::new("", "", Some(url.to_string()), Decimal::ZERO);
    };

    let album = child_text(&column, &TITLE);
    if album.is_empty() {
        tracing::warn!(url, "no title found");
    }

    let artist = child_text(&column, &ARTIST_LINK);
    if artist.is_empty() {
        tracing::warn!(url, "no artist found");
    }

    let price = child_text(&column, &PRICE);
    if price.is_empty() {
        tracing::warn!(url, "no price found");
    }

    ParsedRecord::new(
        parse_artist(&artist),
        parse_album(&album),
        Some(url.to_string()),
        parse_price(&price),
    )
}

/// Concatenated text of every element under `parent` matching `sel`, trimmed.
fn child_text(parent: &ElementRef<'_>, sel: &Selector) -> String {
    let text: String = parent.select(sel).flat_map(|el| el.text()).collect();
    text.trim().to_string()
}

/// Drop the `"N ratings"` annotation and everything after it.
///
/// Text without the annotation is returned unchanged.
pub fn parse_artist(s: &str) -> String {
    match RATINGS.find(s) {
        Some(m) => s[..m.start()].to_string(),
        None => s.to_string(),
    }
}

/// Remove the first `" [VINYL]"` from a product title.
pub fn parse_album(s: &str) -> String {
    s.replacen(VINYL_SUFFIX, "", 1)
}

/// First decimal number in the text; currency symbols and trailing noise
/// are ignored. A bare fraction like `".99"` reads as `0.99`. Text without
/// digits parses as zero.
pub fn parse_price(s: &str) -> Decimal {
    let Some(m) = PRICE_NUMBER.find(s) else {
        return Decimal::ZERO;
    };
    let number = match m.as_str() {
        n if n.starts_with('.') => format!("0{n}"),
        n => n.to_string(),
    };
    match number.parse::<Decimal>() {
        Ok(price) => price,
        Err(e) => {
            tracing::warn!(text = s, error = %e, "unparseable price");
            Decimal::ZERO
        }
    }
}

/// Parse a newline-delimited URL list. Lines are trimmed and blank lines skipped.
pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a newline-delimited URL list from disk.
pub fn read_url_list<P: AsRef<std::path::Path>>(path: P) -> crate::Result<Vec<String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))?;
    let urls = parse_url_list(&content);
    tracing::debug!(path = %path.display(), count = urls.len(), "read url list");
    Ok(urls)
}
