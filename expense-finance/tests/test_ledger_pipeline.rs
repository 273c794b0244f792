use expense_core::{GroupKey, LedgerLayout, LedgerRow, MonthKey, SourceProfile};
use expense_finance::report::{detail_total, is_summary_row};
use expense_finance::{
    LedgerError, aggregate_monthly, combine_ledgers, group_by_month, monthly_totals, read_ledger,
    sort_by_date, split_balanced, write_ledger,
};
use expense_ingest::parsers::{parse_aliexpress_html, parse_cnfans_html};
use expense_ingest::{DateWindow, Normalizer, RawExpenseFields};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

const ALIEXPRESS_PAGE: &str = r#"
<div class="order-item">
  <div class="order-item-header-right-info"><div>Pedido efectuado el: 26 dic, 2025</div><div>Nº de pedido: 3001 Copiar</div></div>
  <div class="order-item-content-info-name"><span>Cable USB-C</span></div>
  <span class="order-item-content-opt-price-total">Total: US $ 15,92</span>
</div>
<div class="order-item">
  <div class="order-item-header-right-info"><div>Pedido efectuado el: 20 nov, 2025</div><div>Nº de pedido: 3002 Copiar</div></div>
  <div class="order-item-content-info-name"><span>Funda</span></div>
  <span class="order-item-content-opt-price-total">Total: € 5,08</span>
</div>
<div class="order-item">
  <div class="order-item-header-right-info"><div>Pedido efectuado el: 15 nov, 2025</div><div>Nº de pedido: 3003 Copiar</div></div>
  <span class="order-item-content-opt-price-total">Total: 1.234,56 €</span>
</div>
"#;

const CNFANS_PAGE: &str = r#"
<div class="order-item">
  <div class="order-date-no"><span class="order-date">Create Time: 01-12-2025 10:00</span><span class="order-no">Order No: CN9</span></div>
  <div class="order-product-info"><div class="order-product-info-meta product-detail"><div class="product-name"><span>Sudadera gris</span></div></div></div>
  <div class="order-price-info"><div class="price-meta"><span class="meta-label">Actual Payment</span><span class="meta-value">€42.00</span></div></div>
</div>
<div class="order-item">
  <div class="order-date-no"><span class="order-date">Create Time: 01-10-2025 10:00</span><span class="order-no">Order No: CN1</span></div>
  <div class="order-price-info"><div class="price-meta"><span class="meta-label">Total Amount</span><span class="meta-value">€8.00</span></div></div>
</div>
"#;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn build(
    raws: &[RawExpenseFields],
    profile: &SourceProfile,
    window: DateWindow,
) -> Vec<LedgerRow> {
    let batch = Normalizer::default().normalize_all(raws, profile, window);
    let mut records = batch.records;
    sort_by_date(&mut records);
    aggregate_monthly(records)
}

fn write(path: &Path, rows: &[LedgerRow], profile: &SourceProfile) {
    write_ledger(path, rows, &LedgerLayout::default(), &profile.display).unwrap();
}

#[test]
fn test_aliexpress_page_to_ledger() {
    let profile = SourceProfile::aliexpress();
    let rows = build(&parse_aliexpress_html(ALIEXPRESS_PAGE), &profile, DateWindow::default());

    let totals = monthly_totals(&rows);
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].key, GroupKey::Month(MonthKey::new(2025, 11)));
    assert_eq!(totals[0].total, dec("1239.64"));
    assert_eq!(totals[1].total, dec("15.92"));

    let LedgerRow::Detail(first) = &rows[0] else {
        panic!("expected detail row first");
    };
    assert_eq!(first.reference, "3003");
    assert_eq!(first.label, "Pedido AliExpress (Sin nombre detectado)");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gastos_aliexpress.csv");
    write(&path, &rows, &profile);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("\u{feff}Fecha del gasto;"));
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(
        lines[1],
        "15/11/2025;AliExpress Europa S.L.;1234,56;Pedido AliExpress (Sin nombre detectado);3003;Tarjeta"
    );
    assert_eq!(lines[3], ";;1239,64;TOTAL MES 2025-11;;");
    assert_eq!(lines[4], "26/12/2025;AliExpress Europa S.L.;15,92;Pedido: Cable USB-C;3001;Tarjeta");
}

#[test]
fn test_cnfans_window_and_keyword_label() {
    let profile = SourceProfile::cnfans();
    let raws: Vec<_> = parse_cnfans_html(CNFANS_PAGE).iter().map(|o| o.to_raw()).collect();
    let window = DateWindow {
        since: chrono::NaiveDate::from_ymd_opt(2025, 12, 9),
        until: None,
    };
    assert!(build(&raws, &profile, window).is_empty());

    let rows = build(&raws, &profile, DateWindow::default());
    assert_eq!(rows.len(), 4);
    let LedgerRow::Detail(last) = &rows[2] else {
        panic!("expected detail row");
    };
    assert_eq!(last.label, "pedido Sudadera gris");
    assert_eq!(last.amount, dec("42"));
}

#[test]
fn test_combine_group_split() {
    let dir = tempfile::tempdir().unwrap();
    let ali = dir.path().join("gastos_aliexpress.csv");
    let cn = dir.path().join("cnfans_pedidos_gastos.csv");
    let missing = dir.path().join("nope.csv");

    let ali_profile = SourceProfile::aliexpress();
    let cn_profile = SourceProfile::cnfans();
    write(
        &ali,
        &build(&parse_aliexpress_html(ALIEXPRESS_PAGE), &ali_profile, DateWindow::default()),
        &ali_profile,
    );
    let cn_raws: Vec<_> = parse_cnfans_html(CNFANS_PAGE).iter().map(|o| o.to_raw()).collect();
    write(&cn, &build(&cn_raws, &cn_profile, DateWindow::default()), &cn_profile);

    let normalizer = Normalizer::default();
    let combined = combine_ledgers(&[ali, cn, missing], b';', &normalizer).unwrap();

    assert_eq!(combined.rows.len(), 5);
    assert!(combined.rows.iter().all(|r| !is_summary_row(r)));
    // Newest first.
    assert_eq!(combined.rows[0][0], "26/12/2025");
    assert_eq!(combined.rows[4][0], "01-10-2025");
    assert_eq!(detail_total(&combined, &normalizer), dec("1305.56"));

    let grouped = group_by_month(&combined, &normalizer);
    let totals = monthly_totals(&grouped);
    assert_eq!(
        totals.iter().filter_map(|t| t.key.month()).map(|k| k.month).collect::<Vec<_>>(),
        vec![10, 11, 12]
    );
    assert_eq!(totals[2].total, dec("57.92"));

    let parts = split_balanced(&combined, 2, &normalizer);
    assert_eq!(parts.len(), 2);
    let sum: Decimal = parts.iter().map(|p| detail_total(p, &normalizer)).sum();
    assert_eq!(sum, dec("1305.56"));
}

#[test]
fn test_missing_ledger_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_ledger(dir.path().join("absent.csv"), b';').unwrap_err();
    assert!(matches!(err, LedgerError::MissingInput { .. }));
}

#[test]
fn test_bom_written_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let ali = dir.path().join("bom.csv");
    let cn = dir.path().join("plain.csv");

    let ali_profile = SourceProfile::aliexpress();
    let rows = build(&parse_aliexpress_html(ALIEXPRESS_PAGE), &ali_profile, DateWindow::default());
    write(&ali, &rows, &ali_profile);

    let cn_profile = SourceProfile::cnfans();
    let cn_raws: Vec<_> = parse_cnfans_html(CNFANS_PAGE).iter().map(|o| o.to_raw()).collect();
    write(&cn, &build(&cn_raws, &cn_profile, DateWindow::default()), &cn_profile);

    assert!(std::fs::read(&ali).unwrap().starts_with("\u{feff}".as_bytes()));
    assert!(std::fs::read(&cn).unwrap().starts_with(b"Fecha del gasto;"));

    let table = read_ledger(&ali, b';').unwrap();
    assert_eq!(table.header[0], "Fecha del gasto");
    assert_eq!(table.rows.len(), 5);
}

#[test]
fn test_undated_order_totalled_apart() {
    let page = format!(
        "{ALIEXPRESS_PAGE}{}",
        r#"
<div class="order-item">
  <div class="order-item-header-right-info"><div>Pedido efectuado el: ayer</div><div>Nº de pedido: 3004 Copiar</div></div>
  <div class="order-item-content-info-name"><span>Llavero</span></div>
  <span class="order-item-content-opt-price-total">Total: € 2,00</span>
</div>
"#
    );
    let profile = SourceProfile {
        sentinel_date: chrono::NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
        ..SourceProfile::aliexpress()
    };
    let rows = build(&parse_aliexpress_html(&page), &profile, DateWindow::default());

    let totals = monthly_totals(&rows);
    assert_eq!(totals.len(), 3);
    assert_eq!(totals[1].key, GroupKey::Month(MonthKey::new(2025, 12)));
    assert_eq!(totals[1].total, dec("15.92"));
    assert_eq!(totals[2].key, GroupKey::Unknown);
    assert_eq!(totals[2].total, dec("2"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gastos_aliexpress.csv");
    write(&path, &rows, &profile);
    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[6], "Fecha desconocida;AliExpress Europa S.L.;2,00;Pedido: Llavero;3004;Tarjeta");
    assert_eq!(lines[7], ";;2,00;TOTAL Desconocido;;");
    assert!(!text.contains("TOTAL MES 1970-01"));
}
