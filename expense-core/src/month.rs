//! Month grouping keys.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// (year, month) bucket used for monthly totals. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Render a template with `{year}` and `{month}` (zero-padded) placeholders.
    pub fn render(&self, template: &str) -> String {
        template
            .replace("{year}", &self.year.to_string())
            .replace("{month}", &format!("{:02}", self.month))
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Bucket a record is totalled under. Records without a real date get their
/// own group, which sorts after every month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupKey {
    #[serde(rename = "month")]
    Month(MonthKey),
    #[serde(rename = "unknown")]
    Unknown,
}

impl GroupKey {
    pub fn month(&self) -> Option<MonthKey> {
        match self {
            GroupKey::Month(key) => Some(*key),
            GroupKey::Unknown => None,
        }
    }
}

impl From<MonthKey> for GroupKey {
    fn from(key: MonthKey) -> Self {
        GroupKey::Month(key)
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Month(key) => key.fmt(f),
            GroupKey::Unknown => f.write_str("Desconocido"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_date_and_display() {
        let key = MonthKey::from_date(NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
        assert_eq!(key, MonthKey::new(2025, 3));
        assert_eq!(key.to_string(), "2025-03");
    }

    #[test]
    fn test_ordering_crosses_years() {
        assert!(MonthKey::new(2025, 12) < MonthKey::new(2026, 1));
        assert!(MonthKey::new(2025, 2) < MonthKey::new(2025, 11));
    }

    #[test]
    fn test_render_template() {
        let key = MonthKey::new(2025, 12);
        assert_eq!(key.render("TOTAL MES {year}-{month}"), "TOTAL MES 2025-12");
        assert_eq!(key.render("Total {month}-{year}"), "Total 12-2025");
    }

    #[test]
    fn test_unknown_group_sorts_last() {
        let mut keys = vec![
            GroupKey::Unknown,
            GroupKey::from(MonthKey::new(2026, 1)),
            GroupKey::from(MonthKey::new(1970, 1)),
        ];
        keys.sort();
        assert_eq!(keys[0].month(), Some(MonthKey::new(1970, 1)));
        assert_eq!(keys[2], GroupKey::Unknown);
        assert_eq!(GroupKey::Unknown.to_string(), "Desconocido");
        assert_eq!(keys[1].to_string(), "2026-01");
    }
}
