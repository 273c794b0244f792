use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("input file not found: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("ledger {} has no header row", path.display())]
    EmptyLedger { path: PathBuf },

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
