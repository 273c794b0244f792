//! expense-ingest: raw order text -> normalized expense records, plus source-specific HTML parsers.

pub mod amount;
pub mod date;
pub mod error;
pub mod label;
pub mod normalizer;
pub mod parsers;
pub mod types;

pub use error::NormalizeError;
pub use normalizer::{DateWindow, NormalizedBatch, Normalizer};
pub use types::RawExpenseFields;
