//! Parsing helpers for HTML pages and JSON endpoints.
//!
//! Site modules pick fields with CSS selectors (via `scraper`) or key
//! lookups (via `serde_json`). Anything missing degrades to a sentinel value
//! through [`or_sentinel`] and is counted as a warning.

mod html;
mod json;
mod selector;

// Re-export public API
pub use html::{
    attr, attr_or_blank, element_text, input_value, normalize_whitespace, resolve_href,
    select_links,
};
pub use json::{decode_json, json_field, json_key_text};
pub use selector::{parse_selector_unsafe, parse_selector_with_fallback};

use crate::error_handling::{ProcessingStats, WarningType};
use crate::record::FieldValue;

/// The extracted value, or `sentinel` (counted as a substitution).
pub fn or_sentinel<T>(value: Option<T>, sentinel: &str, stats: &ProcessingStats) -> FieldValue
where
    T: Into<FieldValue>,
{
    match value {
        Some(v) => v.into(),
        None => {
            stats.increment_warning(WarningType::SentinelSubstituted);
            FieldValue::Text(sentinel.to_string())
        }
    }
}
