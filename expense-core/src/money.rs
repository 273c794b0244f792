//! Locale display of monetary amounts (decimal comma).

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// How the amount column is rendered in the ledger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmountStyle {
    /// Insert `.` every three integer digits ("1.234,56")
    pub group_thousands: bool,
    /// Appended verbatim, e.g. " €"
    pub suffix: String,
}

impl AmountStyle {
    pub fn euro() -> Self {
        Self {
            group_thousands: true,
            suffix: " €".to_string(),
        }
    }
}

/// Round half away from zero to cents. Only display code calls this.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format with a decimal comma and exactly two fraction digits.
pub fn format_amount(amount: Decimal, style: &AmountStyle) -> String {
    let mut rounded = round_cents(amount);
    rounded.rescale(2);
    let cents = rounded.mantissa();
    let negative = cents < 0;
    let cents = cents.unsigned_abs();

    let int_digits = (cents / 100).to_string();
    let frac = cents % 100;

    let int_part = if style.group_thousands {
        group_digits(&int_digits)
    } else {
        int_digits
    };

    let sign = if negative { "-" } else { "" };
    format!("{sign}{int_part},{frac:02}{}", style.suffix)
}

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
