//! Canonical expense records and the ledger rows built from them

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::month::{GroupKey, MonthKey};

/// One normalized purchase, created once per source order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseRecord {
    /// Calendar date of the purchase (a sentinel when the source date was unparseable)
    pub date: NaiveDate,
    /// Signed amount, unrounded
    pub amount: Decimal,
    /// Display label, already truncated
    pub label: String,
    /// Order/transaction identifier, may be empty
    pub reference: String,
    /// Fixed per source
    pub supplier: String,
    pub payment_method: String,
    /// Degradations applied while normalizing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<RecordIssue>,
}

/// A degradation applied to a record instead of rejecting it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum RecordIssue {
    /// The raw date matched no candidate format; `date` holds a sentinel.
    #[serde(rename = "date-unparseable")]
    DateUnparseable { raw: String },
    /// The raw amount had no digits; `amount` is zero.
    #[serde(rename = "amount-unparseable")]
    AmountUnparseable { raw: String },
}

impl ExpenseRecord {
    /// Create a clean record (no issues)
    pub fn new(
        date: NaiveDate,
        amount: Decimal,
        label: impl Into<String>,
        reference: impl Into<String>,
        supplier: impl Into<String>,
        payment_method: impl Into<String>,
    ) -> Self {
        Self {
            date,
            amount,
            label: label.into(),
            reference: reference.into(),
            supplier: supplier.into(),
            payment_method: payment_method.into(),
            issues: Vec::new(),
        }
    }

    pub fn with_issue(mut self, issue: RecordIssue) -> Self {
        self.issues.push(issue);
        self
    }

    /// Month the record is totalled under; `Unknown` for a sentinel date
    pub fn group_key(&self) -> GroupKey {
        if self.has_sentinel_date() {
            GroupKey::Unknown
        } else {
            GroupKey::Month(MonthKey::from_date(self.date))
        }
    }

    /// True when `date` is a sentinel rather than a parsed date
    pub fn has_sentinel_date(&self) -> bool {
        self.issues
            .iter()
            .any(|i| matches!(i, RecordIssue::DateUnparseable { .. }))
    }

    /// True when `amount` is a degraded zero
    pub fn has_unparsed_amount(&self) -> bool {
        self.issues
            .iter()
            .any(|i| matches!(i, RecordIssue::AmountUnparseable { .. }))
    }
}

/// Sum of all record amounts in one calendar month, or of the undated records
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthlyTotal {
    pub key: GroupKey,
    pub total: Decimal,
    /// Number of detail rows folded into `total`
    pub count: usize,
}

/// An entry of the output stream: a detail row or the total closing its month
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerRow {
    Detail(ExpenseRecord),
    MonthTotal(MonthlyTotal),
}

impl LedgerRow {
    pub fn is_summary(&self) -> bool {
        matches!(self, LedgerRow::MonthTotal(_))
    }
}
