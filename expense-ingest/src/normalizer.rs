//! Raw field bundles -> canonical `ExpenseRecord`s.

use std::collections::HashSet;

use chrono::NaiveDate;
use expense_core::{
    ExpenseRecord, NormalizerConfig, RecordIssue, SourceProfile, UnparsedDatePolicy,
};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::amount;
use crate::date;
use crate::error::NormalizeError;
use crate::label;
use crate::types::RawExpenseFields;

/// Stateless parser configured once per run
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

/// Inclusive date range; either end may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.since.is_none_or(|s| date >= s) && self.until.is_none_or(|u| date <= u)
    }
}

/// Outcome of normalizing a whole source
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    /// Records in encounter order (not yet sorted)
    pub records: Vec<ExpenseRecord>,
    /// Bundles dropped because of an unparseable date, with their reference
    pub skipped: Vec<(String, NormalizeError)>,
    /// References seen more than once; only the first is kept
    pub duplicates: Vec<String>,
    /// Records dated outside the window
    pub out_of_window: usize,
}

impl NormalizedBatch {
    /// Records whose amount degraded to zero
    pub fn unparsed_amounts(&self) -> usize {
        self.records.iter().filter(|r| r.has_unparsed_amount()).count()
    }

    /// Records kept under a sentinel date
    pub fn sentinel_dates(&self) -> usize {
        self.records.iter().filter(|r| r.has_sentinel_date()).count()
    }
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    pub fn parse_date(&self, text: &str) -> Result<NaiveDate, NormalizeError> {
        date::parse_date(text, &self.config)
    }

    pub fn parse_amount(&self, text: &str) -> Result<Decimal, NormalizeError> {
        amount::parse_amount(text)
    }

    pub fn parse_amount_or_zero(&self, text: &str) -> Decimal {
        amount::parse_amount_or_zero(text)
    }

    /// Prefixed, truncated label for a bundle, or the profile placeholder.
    pub fn label_for(&self, candidates: &[String], profile: &SourceProfile) -> String {
        let label = match label::derive_label(candidates, &profile.keywords) {
            Some(name) => format!("{}{}", profile.label_prefix, name),
            None => profile.placeholder.clone(),
        };
        label::truncate_label(&label, self.config.label_max_chars)
    }

    /// `amount_text` plus every extra amount; None when nothing parses.
    fn total_amount(&self, raw: &RawExpenseFields) -> Option<Decimal> {
        let texts = std::iter::once(&raw.amount_text).chain(
            raw.extra_amount_texts
                .iter()
                .filter(|t| !t.trim().is_empty()),
        );
        texts
            .filter_map(|t| self.parse_amount(t).ok())
            .fold(None, |acc, a| Some(acc.unwrap_or(Decimal::ZERO) + a))
    }

    /// Normalize one bundle.
    ///
    /// Fails only with `DateUnparseable` under `UnparsedDatePolicy::Skip`;
    /// every other problem is recorded as a `RecordIssue`.
    pub fn normalize(
        &self,
        raw: &RawExpenseFields,
        profile: &SourceProfile,
    ) -> Result<ExpenseRecord, NormalizeError> {
        let mut issues = Vec::new();

        let date = match self.parse_date(&raw.date_text) {
            Ok(d) => d,
            Err(err) => match profile.date_policy {
                UnparsedDatePolicy::Skip => return Err(err),
                UnparsedDatePolicy::Sentinel => {
                    issues.push(RecordIssue::DateUnparseable {
                        raw: raw.date_text.clone(),
                    });
                    profile.sentinel_date
                }
            },
        };

        let amount = match self.total_amount(raw) {
            Some(a) => a,
            None => {
                issues.push(RecordIssue::AmountUnparseable {
                    raw: raw.amount_text.clone(),
                });
                Decimal::ZERO
            }
        };

        let mut record = ExpenseRecord::new(
            date,
            amount,
            self.label_for(&raw.label_candidates, profile),
            raw.reference.trim(),
            profile.supplier.as_str(),
            profile.payment_method.as_str(),
        );
        record.issues = issues;
        Ok(record)
    }

    /// Normalize every bundle of a source: de-duplicate by reference, apply
    /// the date window and collect what was skipped.
    pub fn normalize_all(
        &self,
        raws: &[RawExpenseFields],
        profile: &SourceProfile,
        window: DateWindow,
    ) -> NormalizedBatch {
        let mut batch = NormalizedBatch::default();
        let mut seen: HashSet<String> = HashSet::new();

        for raw in raws {
            let reference = raw.reference.trim().to_string();
            if !reference.is_empty() && !seen.insert(reference.clone()) {
                debug!(reference = %reference, "duplicate order skipped");
                batch.duplicates.push(reference);
                continue;
            }

            let record = match self.normalize(raw, profile) {
                Ok(r) => r,
                Err(err) => {
                    warn!(reference = %reference, error = %err, "record skipped");
                    batch.skipped.push((reference, err));
                    continue;
                }
            };

            // Sentinel dates carry no real date to compare against the window.
            if !record.has_sentinel_date() && !window.contains(record.date) {
                debug!(reference = %reference, date = %record.date, "outside date window");
                batch.out_of_window += 1;
                continue;
            }

            for issue in &record.issues {
                warn!(reference = %reference, ?issue, "record degraded");
            }
            batch.records.push(record);
        }

        batch
    }
}
