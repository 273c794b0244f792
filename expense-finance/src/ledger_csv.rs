//! Ledger CSV output.
//!
//! Default layout (`;`-delimited, Spanish spreadsheet conventions):
//!   Fecha del gasto;Proveedor;Importe pagado;Concepto;Nº de pedido;Método de pago
//!   09-12-2025;Cnfans;26,50 €;pedido Heavy Zip Hoodie;CN2025120901;tarjeta
//!   ;;26,50 €;TOTAL MES 2025-12;;
//!   Fecha desconocida;Cnfans;3,00 €;pedido Cap;CN2025120902;tarjeta
//!   ;;3,00 €;TOTAL Desconocido;;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use expense_core::{
    DisplayStyle, ExpenseRecord, GroupKey, LedgerLayout, LedgerRow, MonthlyTotal, format_amount,
};

use crate::error::Result;

const BOM: &[u8] = "\u{feff}".as_bytes();

/// Six cells of a detail row
pub fn detail_cells(record: &ExpenseRecord, layout: &LedgerLayout, style: &DisplayStyle) -> Vec<String> {
    let date = if record.has_sentinel_date() {
        layout.unknown_date_label.clone()
    } else {
        record.date.format(&style.date_format).to_string()
    };
    vec![
        date,
        record.supplier.clone(),
        format_amount(record.amount, &style.amount_style),
        record.label.clone(),
        record.reference.clone(),
        record.payment_method.clone(),
    ]
}

/// Six cells of a monthly total row: only amount and description are filled
pub fn summary_cells(total: &MonthlyTotal, layout: &LedgerLayout, style: &DisplayStyle) -> Vec<String> {
    let description = match total.key {
        GroupKey::Month(key) => key.render(&layout.summary_label),
        GroupKey::Unknown => layout.unknown_summary_label.clone(),
    };
    vec![
        String::new(),
        String::new(),
        format_amount(total.total, &style.amount_style),
        description,
        String::new(),
        String::new(),
    ]
}

pub fn row_cells(row: &LedgerRow, layout: &LedgerLayout, style: &DisplayStyle) -> Vec<String> {
    match row {
        LedgerRow::Detail(r) => detail_cells(r, layout, style),
        LedgerRow::MonthTotal(t) => summary_cells(t, layout, style),
    }
}

/// Write header + string rows with the layout's delimiter, after a BOM when `bom` is set.
pub fn write_cells<W: Write>(
    mut out: W,
    header: &[String],
    rows: impl IntoIterator<Item = Vec<String>>,
    layout: &LedgerLayout,
    bom: bool,
) -> Result<()> {
    if bom {
        out.write_all(BOM)?;
    }
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(layout.delimiter)
        .flexible(true)
        .from_writer(out);

    wtr.write_record(header)?;
    for row in rows {
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Serialize an aggregated row stream.
pub fn write_rows<W: Write>(
    out: W,
    rows: &[LedgerRow],
    layout: &LedgerLayout,
    style: &DisplayStyle,
) -> Result<()> {
    write_cells(
        out,
        &layout.headers,
        rows.iter().map(|r| row_cells(r, layout, style)),
        layout,
        style.write_bom,
    )
}

pub fn write_ledger(
    path: impl AsRef<Path>,
    rows: &[LedgerRow],
    layout: &LedgerLayout,
    style: &DisplayStyle,
) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_rows(BufWriter::new(file), rows, layout, style)
}
