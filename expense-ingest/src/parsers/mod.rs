//! Source-specific extractors producing `RawExpenseFields`.

pub mod aliexpress;
pub mod cnfans;

pub use aliexpress::parse_aliexpress_html;
pub use cnfans::{CnfansOrder, CnfansProduct, parse_cnfans_html};
