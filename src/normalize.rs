//! Artist-name normalization.
//!
//! Aggregated credits come back from the report queries as
//! `[anv]:[artist_name]` pairs. The artist name variation (ANV) is what
//! the release sleeve prints, so it wins when present; otherwise the
//! canonical Discogs name is used.

use crate::models::Field;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

/// Matches `[alt]:[canonical]`, each side being any run of non-`]` characters.
pub static ALT_CANONICAL_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(?P<alt_name>[^\]]*?)\]:\[(?P<canonical_name>[^\]]*?)\]").unwrap()
});

fn extract_artist<'h>(caps: &Captures<'h>) -> &'h str {
    match caps.name("alt_name") {
        Some(alt) if !alt.as_str().is_empty() => alt.as_str(),
        _ => caps.name("canonical_name").map_or("", |m| m.as_str()),
    }
}

/// Replace every `[alt]:[canonical]` pair with the alternate name, or with
/// the canonical name when the alternate is empty.
pub fn convert_name(s: &str) -> Cow<'_, str> {
    ALT_CANONICAL_NAME.replace_all(s, |caps: &Captures| extract_artist(caps).to_string())
}

/// Text fields are rewritten; everything else passes through untouched.
pub fn convert_field(field: Field) -> Field {
    match field {
        Field::Text(s) => match convert_name(&s) {
            Cow::Borrowed(_) => Field::Text(s),
            Cow::Owned(converted) => Field::Text(converted),
        },
        other => other,
    }
}

pub fn convert_names(row: Vec<Field>) -> Vec<Field> {
    row.into_iter().map(convert_field).collect()
}
