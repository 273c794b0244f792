//! Reports over finished ledger CSVs: combine several files, regroup them by
//! month, or split one into parts of similar total amount.

use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use expense_core::{DisplayStyle, ExpenseRecord, LedgerLayout, LedgerRow};
use expense_ingest::Normalizer;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::error::{LedgerError, Result};
use crate::ledger_csv::write_cells;
use crate::monthly_totals::{aggregate_monthly, sort_by_date};

const DATE_COL: usize = 0;
const SUPPLIER_COL: usize = 1;
const AMOUNT_COL: usize = 2;
const LABEL_COL: usize = 3;
const REFERENCE_COL: usize = 4;
const METHOD_COL: usize = 5;

/// A ledger read back as text cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl LedgerTable {
    /// Rows that are neither blank nor summaries
    pub fn detail_rows(&self) -> impl Iterator<Item = &Vec<String>> {
        self.rows
            .iter()
            .filter(|r| !is_blank_row(r) && !is_summary_row(r))
    }
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

pub fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

/// Monthly total or summary banner rows ("TOTAL MES 2025-12", "RESUMEN MENSUAL").
pub fn is_summary_row(row: &[String]) -> bool {
    row.iter().any(|c| {
        let upper = c.trim().to_uppercase();
        upper.starts_with("TOTAL") || upper.contains("RESUMEN")
    })
}

/// Read a ledger CSV; the first record is the header. A leading BOM is ignored.
pub fn read_ledger(path: impl AsRef<Path>, delimiter: u8) -> Result<LedgerTable> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LedgerError::MissingInput {
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut records = rdr.records();
    let header: Vec<String> = match records.next() {
        Some(r) => r?.iter().map(str::to_string).collect(),
        None => {
            return Err(LedgerError::EmptyLedger {
                path: path.to_path_buf(),
            });
        }
    };

    let mut rows = Vec::new();
    for record in records {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(LedgerTable { header, rows })
}

/// Merge ledgers into one table sorted newest first.
///
/// Missing files are skipped with a warning. The header comes from the first
/// readable file; blank and summary rows are dropped. Rows whose date does not
/// parse sort last; equal dates keep their input order.
pub fn combine_ledgers(
    paths: &[PathBuf],
    delimiter: u8,
    normalizer: &Normalizer,
) -> Result<LedgerTable> {
    let mut combined: Option<LedgerTable> = None;

    for path in paths {
        let table = match read_ledger(path, delimiter) {
            Ok(t) => t,
            Err(LedgerError::MissingInput { path }) => {
                warn!(path = %path.display(), "ledger not found, skipping");
                continue;
            }
            Err(err) => return Err(err),
        };
        info!(path = %path.display(), rows = table.rows.len(), "read ledger");

        let target = combined.get_or_insert_with(|| LedgerTable {
            header: table.header.clone(),
            rows: Vec::new(),
        });
        target.rows.extend(table.detail_rows().cloned());
    }

    let mut table = combined.unwrap_or_default();
    table
        .rows
        .sort_by_key(|row| Reverse(normalizer.parse_date(cell(row, DATE_COL)).ok()));
    Ok(table)
}

/// Parse a detail row back into a record. Rows without a parseable date are None.
pub fn record_from_row(row: &[String], normalizer: &Normalizer) -> Option<ExpenseRecord> {
    let date: NaiveDate = normalizer.parse_date(cell(row, DATE_COL)).ok()?;
    Some(ExpenseRecord::new(
        date,
        normalizer.parse_amount_or_zero(cell(row, AMOUNT_COL)),
        cell(row, LABEL_COL),
        cell(row, REFERENCE_COL),
        cell(row, SUPPLIER_COL),
        cell(row, METHOD_COL),
    ))
}

/// Regroup the detail rows of a table into a monthly-totalled row stream.
pub fn group_by_month(table: &LedgerTable, normalizer: &Normalizer) -> Vec<LedgerRow> {
    let mut records = Vec::new();
    for row in table.detail_rows() {
        match record_from_row(row, normalizer) {
            Some(r) => records.push(r),
            None => warn!(row = ?row, "row without a readable date left out of grouping"),
        }
    }
    sort_by_date(&mut records);
    aggregate_monthly(records)
}

/// Divide the detail rows into at most `parts` contiguous tables of similar
/// cumulative amount.
///
/// Part k closes once the running total reaches k * total / parts, or when the
/// rows left are just enough to give each remaining part one row. When the
/// total is not positive the rows are split into equal counts instead.
pub fn split_balanced(table: &LedgerTable, parts: usize, normalizer: &Normalizer) -> Vec<LedgerTable> {
    let rows: Vec<&Vec<String>> = table.detail_rows().collect();
    let n = rows.len();
    let parts = parts.clamp(1, n.max(1));

    let amounts: Vec<Decimal> = rows
        .iter()
        .map(|r| normalizer.parse_amount_or_zero(cell(r, AMOUNT_COL)))
        .collect();
    let total: Decimal = amounts.iter().copied().sum();

    let part = |rows: Vec<Vec<String>>| LedgerTable {
        header: table.header.clone(),
        rows,
    };

    if n == 0 {
        return vec![part(Vec::new())];
    }

    if total <= Decimal::ZERO {
        let size = n.div_ceil(parts);
        return rows
            .chunks(size)
            .map(|chunk| part(chunk.iter().map(|r| (*r).clone()).collect()))
            .collect();
    }

    let mut out = Vec::with_capacity(parts);
    let mut current = Vec::new();
    let mut running = Decimal::ZERO;

    for (i, (row, amount)) in rows.iter().zip(&amounts).enumerate() {
        current.push((*row).clone());
        running += *amount;

        let k = out.len() + 1;
        if k == parts {
            continue;
        }
        let threshold = total * Decimal::from(k) / Decimal::from(parts);
        let rows_left = n - i - 1;
        let parts_left = parts - k;
        if running >= threshold || rows_left == parts_left {
            out.push(part(std::mem::take(&mut current)));
        }
    }
    out.push(part(current));
    out
}

/// Write a text table with the layout's delimiter and the style's BOM setting.
pub fn write_table(
    path: impl AsRef<Path>,
    table: &LedgerTable,
    layout: &LedgerLayout,
    style: &DisplayStyle,
) -> Result<()> {
    let file = fs::File::create(path.as_ref())?;
    write_cells(
        std::io::BufWriter::new(file),
        &table.header,
        table.rows.iter().cloned(),
        layout,
        style.write_bom,
    )
}

/// Sum of the amount column over detail rows
pub fn detail_total(table: &LedgerTable, normalizer: &Normalizer) -> Decimal {
    table
        .detail_rows()
        .map(|r| normalizer.parse_amount_or_zero(cell(r, AMOUNT_COL)))
        .sum()
}
