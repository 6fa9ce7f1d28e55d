//! HTML extraction helpers shared by the page scrapers.
//!
//! Text is whitespace-normalized, attributes fall back to `None` when absent
//! or blank, and relative links are resolved against the page they came from.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};
use url::Url;

use super::selector::parse_selector_with_fallback;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").unwrap_or_else(|e| panic!("whitespace pattern failed to compile: {e}"))
});

/// Collapses runs of whitespace to a single space and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Text content of an element, whitespace-normalized.
pub fn element_text(element: &ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// A non-blank attribute value, trimmed.
pub fn attr(element: &ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// An attribute value, trimmed, kept even when blank.
pub fn attr_or_blank(element: &ElementRef<'_>, name: &str) -> Option<String> {
    element.value().attr(name).map(|v| v.trim().to_string())
}

/// Resolves `href` against `base`. Absolute links pass through unchanged.
pub fn resolve_href(base: &Url, href: &str) -> Option<String> {
    match base.join(href) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            log::debug!("Could not resolve href '{href}' against {base}: {e}");
            None
        }
    }
}

/// Resolved `href` of every element matching `selector`, in document order.
pub fn select_links(document: &Html, selector: &str, base: &Url) -> Vec<String> {
    let selector = parse_selector_with_fallback(selector, "link extraction");
    document
        .select(&selector)
        .filter_map(|a| attr(&a, "href"))
        .filter_map(|href| resolve_href(base, &href))
        .collect()
}

/// Value of the `<input>` with the given `name`, if present.
pub fn input_value(document: &Html, name: &str) -> Option<String> {
    let selector =
        parse_selector_with_fallback(&format!("input[name=\"{name}\"]"), "form field lookup");
    document
        .select(&selector)
        .next()
        .and_then(|input| input.value().attr("value").map(str::to_string))
}
