//! Date parsing over an ordered list of candidate formats.
//!
//! Accepted shapes include:
//!   Pedido efectuado el: 26 dic, 2025
//!   Create Time: 09-12-2025 14:31
//!   2025-12-09
//!   12/26/2025
//!
//! Day/month order is not inferred: "03/04/2025" is 3 April because day-first
//! formats are tried before month-first ones.

use std::sync::LazyLock;

use chrono::NaiveDate;
use expense_core::NormalizerConfig;
use regex::Regex;

use crate::error::NormalizeError;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{L}+\.?").expect("valid word regex"));

/// Remove known prefix labels and collapse whitespace runs to single spaces.
pub fn clean_date_text(text: &str, prefix_labels: &[String]) -> String {
    let mut s = text.to_string();
    for label in prefix_labels {
        if !label.is_empty() {
            s = s.replace(label.as_str(), " ");
        }
    }
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace the first word that names a month in `abbreviations` with its
/// two-digit number. Full month names match through their abbreviation.
fn localize_month(cleaned: &str, abbreviations: &[String]) -> Option<String> {
    for m in WORD_RE.find_iter(cleaned) {
        let word = m.as_str().trim_end_matches('.').to_lowercase();
        let month = abbreviations.iter().position(|abbr| {
            !abbr.is_empty()
                && (word == *abbr || (word.starts_with(abbr.as_str()) && word.chars().count() <= 10))
        });
        if let Some(idx) = month {
            let mut out = String::with_capacity(cleaned.len());
            out.push_str(&cleaned[..m.start()]);
            out.push_str(&format!("{:02}", idx + 1));
            out.push_str(&cleaned[m.end()..]);
            return Some(out);
        }
    }
    None
}

fn try_format(cleaned: &str, format: &str, abbreviations: &[String]) -> Option<NaiveDate> {
    if format.contains("%b") {
        if let Some(localized) = localize_month(cleaned, abbreviations) {
            let numeric = format.replace("%b", "%m");
            if let Ok(d) = NaiveDate::parse_from_str(&localized, &numeric) {
                return Some(d);
            }
        }
    }
    // chrono ignores time fields when building a date, which drops "%H:%M" parts.
    NaiveDate::parse_from_str(cleaned, format).ok()
}

/// Parse free date text with the first candidate format that matches it completely.
pub fn parse_date(text: &str, config: &NormalizerConfig) -> Result<NaiveDate, NormalizeError> {
    let cleaned = clean_date_text(text, &config.prefix_labels);
    if !cleaned.is_empty() {
        for format in &config.date_formats {
            if let Some(date) = try_format(&cleaned, format, &config.month_abbreviations) {
                return Ok(date);
            }
        }
    }
    Err(NormalizeError::DateUnparseable {
        raw: text.to_string(),
    })
}
