//! Monthly totals interleaved into a date-ordered record stream.
//!
//! Each month's total row comes right after that month's last detail row:
//!   rec(Nov 15) rec(Nov 20) TOTAL(Nov) rec(Dec 1) TOTAL(Dec) rec(?) TOTAL(?)
//!
//! Records kept under a sentinel date form their own group after every month.

use chrono::NaiveDate;
use expense_core::{ExpenseRecord, GroupKey, LedgerRow, MonthlyTotal};
use rust_decimal::Decimal;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    NoMonthOpen,
    MonthOpen {
        key: GroupKey,
        sum: Decimal,
        count: usize,
    },
}

/// Position of a record in the expected input order: dated records by date,
/// then the undated ones.
fn order_key(record: &ExpenseRecord) -> (bool, NaiveDate) {
    (record.has_sentinel_date(), record.date)
}

/// Streaming aggregator. Expects records in `sort_by_date` order; it never sorts.
#[derive(Debug, Clone)]
pub struct MonthlyAggregator {
    state: State,
    last_seen: Option<(bool, NaiveDate)>,
}

impl Default for MonthlyAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl MonthlyAggregator {
    pub fn new() -> Self {
        Self {
            state: State::NoMonthOpen,
            last_seen: None,
        }
    }

    /// Feed one record, appending the closed month's total (if any) and the record.
    pub fn push(&mut self, record: ExpenseRecord, out: &mut Vec<LedgerRow>) {
        let seen = order_key(&record);
        if self.last_seen.is_some_and(|prev| seen < prev) {
            warn!(date = %record.date, "records not sorted by date; totals will repeat months");
        }
        self.last_seen = Some(seen);

        let key = record.group_key();
        self.state = match self.state {
            State::MonthOpen {
                key: open,
                sum,
                count,
            } if open == key => State::MonthOpen {
                key,
                sum: sum + record.amount,
                count: count + 1,
            },
            State::MonthOpen {
                key: open,
                sum,
                count,
            } => {
                out.push(LedgerRow::MonthTotal(MonthlyTotal {
                    key: open,
                    total: sum,
                    count,
                }));
                State::MonthOpen {
                    key,
                    sum: record.amount,
                    count: 1,
                }
            }
            State::NoMonthOpen => State::MonthOpen {
                key,
                sum: record.amount,
                count: 1,
            },
        };
        out.push(LedgerRow::Detail(record));
    }

    /// Close the open month, if any.
    pub fn finish(self, out: &mut Vec<LedgerRow>) {
        if let State::MonthOpen { key, sum, count } = self.state {
            out.push(LedgerRow::MonthTotal(MonthlyTotal {
                key,
                total: sum,
                count,
            }));
        }
    }
}

/// Stable sort by date, undated records last; ties keep encounter order.
pub fn sort_by_date(records: &mut [ExpenseRecord]) {
    records.sort_by_key(order_key);
}

/// Run the aggregator over already-sorted records.
pub fn aggregate_monthly(records: impl IntoIterator<Item = ExpenseRecord>) -> Vec<LedgerRow> {
    let mut out = Vec::new();
    let mut agg = MonthlyAggregator::new();
    for record in records {
        agg.push(record, &mut out);
    }
    agg.finish(&mut out);
    out
}

/// Just the totals of an aggregated stream
pub fn monthly_totals(rows: &[LedgerRow]) -> Vec<MonthlyTotal> {
    rows.iter()
        .filter_map(|r| match r {
            LedgerRow::MonthTotal(t) => Some(*t),
            LedgerRow::Detail(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use expense_core::{MonthKey, RecordIssue};
    use std::str::FromStr;

    fn rec(y: i32, m: u32, d: u32, amount: &str, label: &str) -> ExpenseRecord {
        ExpenseRecord::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            Decimal::from_str(amount).unwrap(),
            label,
            "",
            "Cnfans",
            "tarjeta",
        )
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_two_month_scenario() {
        let rows = aggregate_monthly(vec![
            rec(2025, 11, 15, "10", "rec1"),
            rec(2025, 11, 20, "5", "rec2"),
            rec(2025, 12, 1, "7", "rec3"),
        ]);

        assert_eq!(rows.len(), 5);
        assert!(matches!(&rows[0], LedgerRow::Detail(r) if r.label == "rec1"));
        assert!(matches!(&rows[1], LedgerRow::Detail(r) if r.label == "rec2"));
        assert_eq!(
            rows[2],
            LedgerRow::MonthTotal(MonthlyTotal {
                key: MonthKey::new(2025, 11).into(),
                total: dec("15"),
                count: 2
            })
        );
        assert!(matches!(&rows[3], LedgerRow::Detail(r) if r.label == "rec3"));
        assert_eq!(
            rows[4],
            LedgerRow::MonthTotal(MonthlyTotal {
                key: MonthKey::new(2025, 12).into(),
                total: dec("7"),
                count: 1
            })
        );
    }

    #[test]
    fn test_three_months_one_total_each_after_last_detail() {
        let records = vec![
            rec(2025, 10, 2, "1.10", "a"),
            rec(2025, 10, 30, "2.20", "b"),
            rec(2025, 11, 1, "3.30", "c"),
            rec(2025, 12, 5, "4.40", "d"),
            rec(2025, 12, 6, "0.01", "e"),
            rec(2025, 12, 31, "0.02", "f"),
        ];
        let rows = aggregate_monthly(records.clone());

        let totals = monthly_totals(&rows);
        assert_eq!(totals.len(), 3);

        for total in &totals {
            let expected: Decimal = records
                .iter()
                .filter(|r| r.group_key() == total.key)
                .map(|r| r.amount)
                .sum();
            assert_eq!(total.total, expected);

            // The row before each total is the month's last detail row.
            let pos = rows
                .iter()
                .position(|r| matches!(r, LedgerRow::MonthTotal(t) if t.key == total.key))
                .unwrap();
            let LedgerRow::Detail(prev) = &rows[pos - 1] else {
                panic!("total not preceded by a detail row");
            };
            assert_eq!(prev.group_key(), total.key);
            if let Some(LedgerRow::Detail(next)) = rows.get(pos + 1) {
                assert_ne!(next.group_key(), total.key);
            }
        }
        assert_eq!(totals[2].total, dec("4.43"));
    }

    #[test]
    fn test_empty_input_emits_nothing() {
        assert!(aggregate_monthly(Vec::new()).is_empty());
    }

    #[test]
    fn test_same_month_different_year_is_new_group() {
        let rows = aggregate_monthly(vec![
            rec(2024, 12, 1, "1", "a"),
            rec(2025, 12, 1, "2", "b"),
        ]);
        assert_eq!(monthly_totals(&rows).len(), 2);
    }

    #[test]
    fn test_exact_decimal_sums() {
        let records: Vec<_> = (0..1000).map(|_| rec(2025, 1, 1, "0.10", "x")).collect();
        let rows = aggregate_monthly(records);
        assert_eq!(monthly_totals(&rows)[0].total, dec("100"));
    }

    #[test]
    fn test_sort_is_stable() {
        let mut records = vec![
            rec(2025, 12, 1, "1", "late"),
            rec(2025, 11, 3, "1", "first-tie"),
            rec(2025, 11, 3, "1", "second-tie"),
        ];
        sort_by_date(&mut records);
        let labels: Vec<_> = records.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["first-tie", "second-tie", "late"]);
    }

    fn undated(sentinel: NaiveDate, amount: &str, label: &str) -> ExpenseRecord {
        ExpenseRecord::new(sentinel, dec(amount), label, "", "AliExpress", "Tarjeta")
            .with_issue(RecordIssue::DateUnparseable { raw: "ayer".into() })
    }

    #[test]
    fn test_undated_records_get_their_own_group() {
        // A sentinel inside a real month must not leak into that month's total.
        let sentinel = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let mut records = vec![
            undated(sentinel, "4", "no date"),
            rec(2025, 12, 1, "7", "dated"),
            rec(2025, 11, 30, "3", "nov"),
        ];
        sort_by_date(&mut records);
        let rows = aggregate_monthly(records);

        let totals = monthly_totals(&rows);
        assert_eq!(totals.len(), 3);
        assert_eq!(totals[1].key, GroupKey::Month(MonthKey::new(2025, 12)));
        assert_eq!(totals[1].total, dec("7"));
        assert_eq!(totals[2].key, GroupKey::Unknown);
        assert_eq!(totals[2].total, dec("4"));
        assert!(matches!(rows.last(), Some(LedgerRow::MonthTotal(t)) if t.key == GroupKey::Unknown));
    }

    #[test]
    fn test_default_sentinel_is_not_a_1970_month() {
        let mut records = vec![rec(2025, 11, 3, "1", "a"), undated(NaiveDate::default(), "2", "b")];
        sort_by_date(&mut records);
        assert_eq!(records[1].label, "b");

        let totals = monthly_totals(&aggregate_monthly(records));
        assert!(totals.iter().all(|t| t.key != GroupKey::Month(MonthKey::new(1970, 1))));
        assert_eq!(totals.last().map(|t| t.key), Some(GroupKey::Unknown));
    }
}
