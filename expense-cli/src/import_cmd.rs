use anyhow::{Context, Result, bail};
use expense_core::{LedgerRow, SourceProfile, format_amount};
use expense_finance::{aggregate_monthly, monthly_totals, sort_by_date, write_ledger};
use expense_ingest::parsers::{parse_aliexpress_html, parse_cnfans_html};
use expense_ingest::{DateWindow, NormalizedBatch, Normalizer, RawExpenseFields};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::LedgerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Aliexpress,
    Cnfans,
}

impl Source {
    pub fn profile(self, cfg: &LedgerConfig) -> &SourceProfile {
        match self {
            Source::Aliexpress => &cfg.sources.aliexpress,
            Source::Cnfans => &cfg.sources.cnfans,
        }
    }

    pub fn extract(self, html: &str) -> Vec<RawExpenseFields> {
        match self {
            Source::Aliexpress => parse_aliexpress_html(html),
            Source::Cnfans => parse_cnfans_html(html).iter().map(|o| o.to_raw()).collect(),
        }
    }
}

/// Normalize, sort and total one page worth of orders.
pub fn build_ledger(
    raws: &[RawExpenseFields],
    profile: &SourceProfile,
    normalizer: &Normalizer,
    window: DateWindow,
) -> (Vec<LedgerRow>, NormalizedBatch) {
    let mut batch = normalizer.normalize_all(raws, profile, window);
    let mut records = std::mem::take(&mut batch.records);
    sort_by_date(&mut records);
    (aggregate_monthly(records), batch)
}

pub fn run_import(
    source: Source,
    input: &Path,
    output: &Path,
    cfg: &LedgerConfig,
    window: DateWindow,
) -> Result<()> {
    if !input.exists() {
        bail!("Input file not found: {} (pass --input <path>)", input.display());
    }
    let html = fs::read_to_string(input).with_context(|| format!("read {}", input.display()))?;

    let raws = source.extract(&html);
    info!(orders = raws.len(), path = %input.display(), "extracted orders");

    let profile = source.profile(cfg);
    let normalizer = Normalizer::new(cfg.normalizer.clone());
    let (rows, batch) = build_ledger(&raws, profile, &normalizer, window);

    write_ledger(output, &rows, &cfg.layout, &profile.display)
        .with_context(|| format!("write {}", output.display()))?;

    let detail_count = rows.iter().filter(|r| !r.is_summary()).count();
    println!("Parsed {} orders from {}", raws.len(), input.display());
    println!("Wrote {} expenses to {}", detail_count, output.display());
    if !batch.skipped.is_empty() {
        println!("Skipped (unreadable date): {}", batch.skipped.len());
    }
    if !batch.duplicates.is_empty() {
        println!("Duplicate orders dropped: {}", batch.duplicates.len());
    }
    if batch.out_of_window > 0 {
        println!("Outside date range: {}", batch.out_of_window);
    }
    let zero_amounts = rows
        .iter()
        .filter(|r| matches!(r, LedgerRow::Detail(rec) if rec.has_unparsed_amount()))
        .count();
    if zero_amounts > 0 {
        println!("Unreadable amounts recorded as 0: {}", zero_amounts);
    }
    let unknown_dates = rows
        .iter()
        .filter(|r| matches!(r, LedgerRow::Detail(rec) if rec.has_sentinel_date()))
        .count();
    if unknown_dates > 0 {
        println!("Unknown dates: {}", unknown_dates);
    }

    print_monthly_totals(&rows, profile);
    Ok(())
}

pub fn print_monthly_totals(rows: &[LedgerRow], profile: &SourceProfile) {
    let totals = monthly_totals(rows);
    if totals.is_empty() {
        return;
    }
    println!("\nMonthly totals:");
    for t in &totals {
        println!(
            "  {} | count={} | total={}",
            t.key,
            t.count,
            format_amount(t.total, &profile.display.amount_style)
        );
    }
}
