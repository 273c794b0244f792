//! Monetary amount parsing with unknown separator conventions.
//!
//! Examples:
//!   "Total: US $ 15,92"  -> 15.92   (single separator, 2-digit tail: decimal)
//!   "1.234"              -> 1234    (single separator, 3-digit tail: thousands)
//!   "1.234,56 €"         -> 1234.56 (both present: rightmost is decimal)
//!   "€1,234.56"          -> 1234.56
//!   "- $14.05"           -> -14.05

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::error::NormalizeError;

// Digits and separators; a space (or NBSP) may split thousand groups ("1 234,56").
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d[\d.,]*(?:[ \u{a0}\u{202f}]\d{3}\b(?:[.,]\d+)?)*").expect("valid number regex")
});

const CURRENCY_SYMBOLS: &[char] = &['€', '$', '£', '¥', '₩', '₹', '¢'];
const CURRENCY_CODES: &[&str] = &[
    "US", "USD", "EUR", "GBP", "CNY", "RMB", "JPY", "CHF", "CAD", "AUD", "MXN",
];

/// True when a minus sign precedes the number, with only whitespace,
/// currency symbols or whole currency codes ("US", "EUR") in between.
/// A hyphen glued to a word on its left ("SKU-A", "USD-EUR") is not a sign.
fn has_leading_minus(prefix: &str) -> bool {
    let mut rest = prefix;
    loop {
        rest = rest.trim_end_matches(|c: char| c.is_whitespace() || CURRENCY_SYMBOLS.contains(&c));
        let word_start = rest.trim_end_matches(|c: char| c.is_ascii_alphabetic()).len();
        let word = &rest[word_start..];
        if word.is_empty() {
            break;
        }
        if !CURRENCY_CODES.contains(&word) {
            return false;
        }
        rest = &rest[..word_start];
    }

    match rest.strip_suffix(['-', '\u{2212}']) {
        Some(before) => !before.chars().next_back().is_some_and(char::is_alphanumeric),
        None => false,
    }
}

/// Rewrite a digits-and-separators string into `Decimal` syntax.
fn canonical_number(num: &str) -> String {
    let has_comma = num.contains(',');
    let has_dot = num.contains('.');

    let decimal_sep = match (has_comma, has_dot) {
        (true, true) => {
            if num.rfind(',') > num.rfind('.') {
                Some(',')
            } else {
                Some('.')
            }
        }
        (true, false) | (false, true) => {
            let sep = if has_comma { ',' } else { '.' };
            let tail = num.rsplit(sep).next().unwrap_or("");
            if tail.len() == 2 { Some(sep) } else { None }
        }
        (false, false) => None,
    };

    let last_decimal = decimal_sep.and_then(|sep| num.rfind(sep));
    num.char_indices()
        .filter_map(|(i, ch)| match ch {
            '0'..='9' => Some(ch),
            _ if Some(i) == last_decimal => Some('.'),
            _ => None,
        })
        .collect()
}

/// Parse the first amount found in `text`.
pub fn parse_amount(text: &str) -> Result<Decimal, NormalizeError> {
    let unparseable = || NormalizeError::AmountUnparseable {
        raw: text.to_string(),
    };

    let m = NUMBER_RE.find(text).ok_or_else(unparseable)?;
    let digits: String = m
        .as_str()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let digits = digits.trim_end_matches(['.', ',']);

    let mut value = Decimal::from_str(&canonical_number(digits)).map_err(|_| unparseable())?;
    if has_leading_minus(&text[..m.start()]) {
        value.set_sign_negative(true);
    }
    Ok(value)
}

/// Degraded variant: zero when no amount is found.
pub fn parse_amount_or_zero(text: &str) -> Decimal {
    parse_amount(text).unwrap_or(Decimal::ZERO)
}
