//! Configuration records passed into the normalizer and the ledger writer.
//!
//! Everything here has a built-in default so a partial TOML file still loads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::AmountStyle;

/// Parsing rules shared by every source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Candidate date formats, tried in order. `%b` is a month abbreviation
    /// in `month_abbreviations`; day-first formats come before month-first.
    pub date_formats: Vec<String>,
    /// Twelve lowercase month abbreviations, January first
    pub month_abbreviations: Vec<String>,
    /// Labels removed from raw date text before matching
    pub prefix_labels: Vec<String>,
    pub label_max_chars: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        let date_formats = [
            "%d %b, %Y",
            "%d %b %Y",
            "%d-%m-%Y",
            "%d-%m-%Y %H:%M",
            "%d-%m-%Y %H:%M:%S",
            "%Y-%m-%d",
            "%Y-%m-%d %H:%M",
            "%Y-%m-%d %H:%M:%S",
            "%d/%m/%Y",
            "%d/%m/%Y %H:%M",
            "%d/%m/%Y %H:%M:%S",
            // Month-first last: "03/04/2025" always reads as 3 April.
            "%m/%d/%Y",
            "%m/%d/%Y %H:%M",
            "%m/%d/%Y %H:%M:%S",
        ];
        let months = [
            "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
        ];

        Self {
            date_formats: date_formats.iter().map(|s| s.to_string()).collect(),
            month_abbreviations: months.iter().map(|s| s.to_string()).collect(),
            prefix_labels: vec![
                "Create Time:".to_string(),
                "Pedido efectuado el:".to_string(),
            ],
            label_max_chars: 80,
        }
    }
}

/// What to do with a record whose date matches no candidate format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnparsedDatePolicy {
    /// Drop the record and keep going
    #[serde(rename = "skip")]
    Skip,
    /// Keep the record under `sentinel_date`, flagged
    #[serde(rename = "sentinel")]
    Sentinel,
}

/// How a ledger file is rendered: date and amount cells, and the encoding marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayStyle {
    /// chrono format for the date column
    pub date_format: String,
    pub amount_style: AmountStyle,
    /// Prefix the file with a UTF-8 BOM so spreadsheet tools detect the encoding
    pub write_bom: bool,
}

impl Default for DisplayStyle {
    fn default() -> Self {
        Self {
            date_format: "%d-%m-%Y".to_string(),
            amount_style: AmountStyle::default(),
            write_bom: false,
        }
    }
}

impl DisplayStyle {
    /// "09-12-2025" and "1.234,56 €"
    pub fn euro() -> Self {
        Self {
            amount_style: AmountStyle::euro(),
            ..Self::default()
        }
    }
}

/// Fixed metadata and policies for one order source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceProfile {
    pub supplier: String,
    pub payment_method: String,
    /// Prepended to the derived item name
    pub label_prefix: String,
    /// Used verbatim when no item name exists
    pub placeholder: String,
    /// Lowercase keywords preferred when picking a label among several items
    pub keywords: Vec<String>,
    pub date_policy: UnparsedDatePolicy,
    pub sentinel_date: NaiveDate,
    pub display: DisplayStyle,
}

impl Default for SourceProfile {
    fn default() -> Self {
        Self {
            supplier: String::new(),
            payment_method: String::new(),
            label_prefix: String::new(),
            placeholder: "sin nombre".to_string(),
            keywords: Vec::new(),
            date_policy: UnparsedDatePolicy::Skip,
            sentinel_date: NaiveDate::default(),
            display: DisplayStyle::default(),
        }
    }
}

impl SourceProfile {
    pub fn aliexpress() -> Self {
        Self {
            supplier: "AliExpress Europa S.L.".to_string(),
            payment_method: "Tarjeta".to_string(),
            label_prefix: "Pedido: ".to_string(),
            placeholder: "Pedido AliExpress (Sin nombre detectado)".to_string(),
            date_policy: UnparsedDatePolicy::Sentinel,
            display: DisplayStyle {
                date_format: "%d/%m/%Y".to_string(),
                amount_style: AmountStyle::default(),
                write_bom: true,
            },
            ..Self::default()
        }
    }

    pub fn cnfans() -> Self {
        Self {
            supplier: "Cnfans".to_string(),
            payment_method: "tarjeta".to_string(),
            label_prefix: "pedido ".to_string(),
            placeholder: "pedido sin producto".to_string(),
            keywords: ["hoodie", "sudadera", "sweatshirt", "pullover", "hood"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            date_policy: UnparsedDatePolicy::Skip,
            display: DisplayStyle::euro(),
            ..Self::default()
        }
    }
}

/// Column layout of the ledger CSV
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerLayout {
    /// Written as a one-character string; anything but a single ASCII
    /// character is rejected when the config is read.
    #[serde(with = "ascii_delimiter")]
    pub delimiter: u8,
    /// date, supplier, amount, label, reference, payment method
    pub headers: Vec<String>,
    /// Description of a monthly total row; `{year}` and `{month}` are substituted
    pub summary_label: String,
    /// Description of the total row closing the undated records
    pub unknown_summary_label: String,
    /// Date cell for records kept under a sentinel date
    pub unknown_date_label: String,
}

impl Default for LedgerLayout {
    fn default() -> Self {
        Self {
            delimiter: b';',
            headers: [
                "Fecha del gasto",
                "Proveedor",
                "Importe pagado",
                "Concepto",
                "Nº de pedido",
                "Método de pago",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            summary_label: "TOTAL MES {year}-{month}".to_string(),
            unknown_summary_label: "TOTAL Desconocido".to_string(),
            unknown_date_label: "Fecha desconocida".to_string(),
        }
    }
}

mod ascii_delimiter {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(delimiter: &u8, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_char(char::from(*delimiter))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
        let c = char::deserialize(d)?;
        u8::try_from(c)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| D::Error::custom(format!("delimiter {c:?} is not a single ASCII character")))
    }
}
