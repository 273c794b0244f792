use anyhow::{Context, Result, bail};
use expense_core::format_amount;
use expense_finance::report::{detail_total, write_table};
use expense_finance::{
    LedgerTable, combine_ledgers, group_by_month, monthly_totals, read_ledger, split_balanced,
    write_ledger,
};
use expense_ingest::Normalizer;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::LedgerConfig;

fn combined_table(paths: &[PathBuf], cfg: &LedgerConfig, normalizer: &Normalizer) -> Result<LedgerTable> {
    if paths.is_empty() {
        bail!("No ledgers given");
    }
    let table = combine_ledgers(paths, cfg.layout.delimiter, normalizer)
        .context("combining ledgers")?;
    if table.header.is_empty() {
        bail!("None of the ledgers could be found");
    }
    Ok(table)
}

/// Merge several ledgers into one, newest first, without summary rows.
pub fn run_combine(paths: &[PathBuf], output: &Path, cfg: &LedgerConfig) -> Result<()> {
    let normalizer = Normalizer::new(cfg.normalizer.clone());
    let table = combined_table(paths, cfg, &normalizer)?;

    write_table(output, &table, &cfg.layout, &cfg.report)
        .with_context(|| format!("write {}", output.display()))?;

    println!("Combined {} expenses into {}", table.rows.len(), output.display());
    println!(
        "Total: {}",
        format_amount(detail_total(&table, &normalizer), &cfg.report.amount_style)
    );
    Ok(())
}

/// Merge ledgers and regroup them with one total row per month.
pub fn run_group(paths: &[PathBuf], output: &Path, cfg: &LedgerConfig) -> Result<()> {
    let normalizer = Normalizer::new(cfg.normalizer.clone());
    let table = combined_table(paths, cfg, &normalizer)?;
    let rows = group_by_month(&table, &normalizer);

    write_ledger(output, &rows, &cfg.layout, &cfg.report)
        .with_context(|| format!("write {}", output.display()))?;

    println!("Grouped {} expenses into {}\n", table.rows.len(), output.display());
    for t in monthly_totals(&rows) {
        println!(
            "  {} | count={} | total={}",
            t.key,
            t.count,
            format_amount(t.total, &cfg.report.amount_style)
        );
    }
    Ok(())
}

/// `<dir>/<stem>_parte_<k>.csv`, numbered from 1
pub fn part_path(input: &Path, output_dir: &Path, k: usize) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "gastos".to_string());
    output_dir.join(format!("{}_parte_{}.csv", stem, k))
}

/// Split one ledger into `parts` files of similar total amount.
pub fn run_split(input: &Path, parts: usize, output_dir: &Path, cfg: &LedgerConfig) -> Result<Vec<PathBuf>> {
    if parts == 0 {
        bail!("--parts must be at least 1");
    }
    let table = read_ledger(input, cfg.layout.delimiter)
        .with_context(|| format!("reading {}", input.display()))?;
    let normalizer = Normalizer::new(cfg.normalizer.clone());
    let pieces = split_balanced(&table, parts, &normalizer);

    fs::create_dir_all(output_dir).with_context(|| format!("create {}", output_dir.display()))?;

    let mut written = Vec::with_capacity(pieces.len());
    for (i, piece) in pieces.iter().enumerate() {
        let path = part_path(input, output_dir, i + 1);
        write_table(&path, piece, &cfg.layout, &cfg.report)
            .with_context(|| format!("write {}", path.display()))?;
        println!(
            "{} | rows={} | total={}",
            path.display(),
            piece.rows.len(),
            format_amount(detail_total(piece, &normalizer), &cfg.report.amount_style)
        );
        written.push(path);
    }
    Ok(written)
}
