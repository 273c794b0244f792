use thiserror::Error;

/// Why a raw field could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("date {raw:?} matches none of the candidate formats")]
    DateUnparseable { raw: String },

    #[error("no numeric amount in {raw:?}")]
    AmountUnparseable { raw: String },
}
