//! expense-core: shared types for the expense ledger (records, month keys, money display, config)

pub mod config;
pub mod money;
pub mod month;
pub mod record;

pub use config::{DisplayStyle, LedgerLayout, NormalizerConfig, SourceProfile, UnparsedDatePolicy};
pub use money::{AmountStyle, format_amount, round_cents};
pub use month::{GroupKey, MonthKey};
pub use record::{ExpenseRecord, LedgerRow, MonthlyTotal, RecordIssue};
