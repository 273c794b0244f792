//! AliExpress order list parser (saved HTML export)
//!
//! Each order is a `div.order-item` whose header reads roughly:
//!   Pedido efectuado el: 26 dic, 2025 | Nº de pedido: 3066123412341234 | Copiar
//! followed by the first item name and a total such as "Total: US $ 15,92".

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::types::RawExpenseFields;

static ORDER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.order-item").expect("valid order selector"));
static HEADER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.order-item-header-right-info").expect("valid header selector")
});
static NAME_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.order-item-content-info-name span").expect("valid name selector")
});
static PRICE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("span.order-item-content-opt-price-total").expect("valid price selector")
});

const ORDER_NO_LABEL: &str = "Nº de pedido:";
const COPY_BUTTON: &str = "Copiar";

/// Non-empty trimmed text nodes under `el`, in document order
fn text_segments(el: ElementRef<'_>) -> Vec<String> {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split header segments into (date text, order number).
fn split_header(segments: &[String]) -> (String, String) {
    match segments.iter().position(|s| s.contains(ORDER_NO_LABEL)) {
        Some(idx) => {
            let date = segments[..idx].join(" ");
            let order = segments[idx..]
                .join(" ")
                .replace(ORDER_NO_LABEL, "")
                .replace(COPY_BUTTON, "");
            (date, order.trim().to_string())
        }
        None => {
            let date = segments.first().cloned().unwrap_or_default();
            let order = segments
                .get(1)
                .map(|s| s.replace(COPY_BUTTON, "").trim().to_string())
                .unwrap_or_default();
            (date, order)
        }
    }
}

/// Extract one raw bundle per order block, in page order.
pub fn parse_aliexpress_html(html: &str) -> Vec<RawExpenseFields> {
    let doc = Html::parse_document(html);

    doc.select(&ORDER_SELECTOR)
        .map(|item| {
            let header = item
                .select(&HEADER_SELECTOR)
                .next()
                .map(text_segments)
                .unwrap_or_default();
            let (date_text, reference) = split_header(&header);

            // Price digits are split across several spans.
            let amount_text: String = item
                .select(&PRICE_SELECTOR)
                .next()
                .map(|p| text_segments(p).concat())
                .unwrap_or_default();

            let mut raw = RawExpenseFields::new(date_text, amount_text, reference);
            if let Some(name) = item.select(&NAME_SELECTOR).next() {
                raw = raw.with_label(text_segments(name).join(" "));
            }
            raw
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
<div class="order-item">
  <div class="order-item-header-right-info">
    <div>Pedido efectuado el: 26 dic, 2025</div>
    <div>Nº de pedido: 3066123412341234<span>Copiar</span></div>
  </div>
  <div class="order-item-content-info-name"><a><span>Funda de silicona para móvil</span></a></div>
  <span class="order-item-content-opt-price-total">Total: US $ <span>15</span><span>,</span><span>92</span></span>
</div>
<div class="order-item">
  <div class="order-item-header-right-info">
    <div>Pedido efectuado el: 2 ene, 2026</div>
    <div>Nº de pedido:</div><div>3066999988887777</div><div>Copiar</div>
  </div>
</div>
</body></html>
"#;

    #[test]
    fn test_parses_orders() {
        let raws = parse_aliexpress_html(PAGE);
        assert_eq!(raws.len(), 2);

        assert_eq!(raws[0].date_text, "Pedido efectuado el: 26 dic, 2025");
        assert_eq!(raws[0].reference, "3066123412341234");
        assert_eq!(raws[0].amount_text, "Total: US $15,92");
        assert_eq!(raws[0].label_candidates, vec!["Funda de silicona para móvil"]);
    }

    #[test]
    fn test_missing_name_and_price() {
        let raws = parse_aliexpress_html(PAGE);
        assert_eq!(raws[1].date_text, "Pedido efectuado el: 2 ene, 2026");
        assert_eq!(raws[1].reference, "3066999988887777");
        assert!(raws[1].amount_text.is_empty());
        assert!(raws[1].label_candidates.is_empty());
    }

    #[test]
    fn test_header_without_order_label() {
        let segments = vec!["26 dic, 2025".to_string(), "3066 Copiar".to_string()];
        assert_eq!(
            split_header(&segments),
            ("26 dic, 2025".to_string(), "3066".to_string())
        );
        assert_eq!(split_header(&[]), (String::new(), String::new()));
    }

    #[test]
    fn test_empty_page() {
        assert!(parse_aliexpress_html("<html></html>").is_empty());
    }
}
