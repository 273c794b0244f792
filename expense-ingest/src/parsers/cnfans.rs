//! CNFans order list parser (saved HTML of the "My orders" pages)
//!
//! Expected structure per order (`div.order-item`):
//!   .order-date-no  .order-date  "Create Time: 09-12-2025 14:31"
//!                   .order-no    "Order No: CN123"
//!   .order-price-info .price-meta  (.meta-label / .meta-value pairs)
//!   .order-product-info .order-product-info-meta.product-detail  (one per product)

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::types::RawExpenseFields;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid cnfans selector")
}

static ORDER: LazyLock<Selector> = LazyLock::new(|| selector("div.order-item"));
static ORDER_DATE: LazyLock<Selector> = LazyLock::new(|| selector(".order-date-no .order-date"));
static ORDER_NO: LazyLock<Selector> = LazyLock::new(|| selector(".order-date-no .order-no"));
static STATUS: LazyLock<Selector> =
    LazyLock::new(|| selector(".status-manage-wrapper .status-node-status"));
static PRICE_META: LazyLock<Selector> = LazyLock::new(|| selector(".order-price-info .price-meta"));
static META_LABEL: LazyLock<Selector> = LazyLock::new(|| selector(".meta-label"));
static META_VALUE: LazyLock<Selector> = LazyLock::new(|| selector(".meta-value"));
static PRODUCT: LazyLock<Selector> =
    LazyLock::new(|| selector(".order-product-info .order-product-info-meta.product-detail"));
static PRODUCT_IMG: LazyLock<Selector> = LazyLock::new(|| selector(".product-main-img img"));
static PRODUCT_NAME: LazyLock<Selector> = LazyLock::new(|| selector(".product-name span"));
static PRODUCT_SKU: LazyLock<Selector> = LazyLock::new(|| selector(".product-sku span"));
static PRODUCT_PRICE_SPANS: LazyLock<Selector> = LazyLock::new(|| selector(".product-price span"));
static SHIPPING: LazyLock<Selector> =
    LazyLock::new(|| selector(".logistics-price-total .price-value"));
static DETAILS_LINK: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"a[href*="/my-account/order-detail"]"#));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CnfansProduct {
    pub name: String,
    pub sku: String,
    pub price: String,
    pub quantity: String,
    pub image_url: String,
}

/// Raw text of one CNFans order, as shown on the page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CnfansOrder {
    pub order_no: String,
    pub create_time: String,
    pub status: String,
    pub total_product_amount: String,
    pub domestic_shipping: String,
    pub value_added_services: String,
    pub payment_method: String,
    pub total_amount: String,
    pub actual_payment: String,
    /// International shipping, only present when the parcel block is on the page
    pub shipping_cost: String,
    pub details_url: String,
    pub products: Vec<CnfansProduct>,
}

impl CnfansOrder {
    fn amount_parts(&self) -> [&String; 4] {
        [
            &self.total_product_amount,
            &self.domestic_shipping,
            &self.value_added_services,
            &self.shipping_cost,
        ]
    }

    /// Raw bundle for the normalizer. The amount is what was paid: actual
    /// payment, else total amount, else the parts summed by the normalizer.
    pub fn to_raw(&self) -> RawExpenseFields {
        let mut raw = if !self.actual_payment.is_empty() {
            RawExpenseFields::new(&self.create_time, &self.actual_payment, &self.order_no)
        } else if !self.total_amount.is_empty() {
            RawExpenseFields::new(&self.create_time, &self.total_amount, &self.order_no)
        } else {
            let [product, rest @ ..] = self.amount_parts();
            rest.into_iter().fold(
                RawExpenseFields::new(&self.create_time, product, &self.order_no),
                |raw, part| raw.with_extra_amount(part),
            )
        };
        raw.label_candidates = self.products.iter().map(|p| p.name.clone()).collect();
        raw
    }
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).collect::<String>()
}

fn first_text(scope: ElementRef<'_>, sel: &Selector) -> String {
    scope.select(sel).next().map(text_of).unwrap_or_default()
}

fn parse_product(block: ElementRef<'_>) -> CnfansProduct {
    let spans: Vec<String> = block.select(&PRODUCT_PRICE_SPANS).map(text_of).collect();
    CnfansProduct {
        name: first_text(block, &PRODUCT_NAME),
        sku: first_text(block, &PRODUCT_SKU),
        price: spans.first().cloned().unwrap_or_default(),
        quantity: spans.get(1).cloned().unwrap_or_default(),
        image_url: block
            .select(&PRODUCT_IMG)
            .next()
            .and_then(|img| img.value().attr("src"))
            .unwrap_or_default()
            .to_string(),
    }
}

fn parse_order(item: ElementRef<'_>) -> CnfansOrder {
    let mut order = CnfansOrder {
        order_no: first_text(item, &ORDER_NO).replace("Order No:", "").trim().to_string(),
        create_time: first_text(item, &ORDER_DATE)
            .replace("Create Time:", "")
            .trim()
            .to_string(),
        status: first_text(item, &STATUS),
        shipping_cost: first_text(item, &SHIPPING),
        details_url: item
            .select(&DETAILS_LINK)
            .next()
            .and_then(|a| a.value().attr("href"))
            .unwrap_or_default()
            .to_string(),
        products: item.select(&PRODUCT).map(parse_product).collect(),
        ..CnfansOrder::default()
    };

    for meta in item.select(&PRICE_META) {
        let (Some(label), Some(value)) = (
            meta.select(&META_LABEL).next().map(text_of),
            meta.select(&META_VALUE).next().map(text_of),
        ) else {
            continue;
        };

        // "Total Product Amount" must be checked before the bare "Total Amount".
        if label.contains("Total Product Amount") {
            order.total_product_amount = value;
        } else if label.contains("Domestic Shipping") {
            order.domestic_shipping = value;
        } else if label.contains("Value-added Services") {
            order.value_added_services = value;
        } else if label.contains("Payment Method") {
            order.payment_method = value;
        } else if label.contains("Actual Payment") || label.contains("Paid Amount") {
            order.actual_payment = value;
        } else if label.contains("Total Amount") {
            order.total_amount = value;
        }
    }

    order
}

/// Parse every order block on a saved orders page, in page order.
pub fn parse_cnfans_html(html: &str) -> Vec<CnfansOrder> {
    let doc = Html::parse_document(html);
    doc.select(&ORDER).map(parse_order).collect()
}
