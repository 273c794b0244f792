//! expense-finance: monthly totals, ledger CSV output, and reports over finished ledgers

pub mod error;
pub mod ledger_csv;
pub mod monthly_totals;
pub mod report;

pub use error::LedgerError;
pub use ledger_csv::{write_ledger, write_rows};
pub use monthly_totals::{MonthlyAggregator, aggregate_monthly, monthly_totals, sort_by_date};
pub use report::{LedgerTable, combine_ledgers, group_by_month, read_ledger, split_balanced};
