use serde::{Deserialize, Serialize};

/// Unparsed text captured from one source order (bank/shop agnostic).
///
/// Nothing here is validated; any field may be empty or malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawExpenseFields {
    pub date_text: String,
    pub amount_text: String,
    /// Further amounts added to `amount_text` (shipping, service fees); empty ones are ignored
    pub extra_amount_texts: Vec<String>,
    /// Item names in source order; the label is picked from these
    pub label_candidates: Vec<String>,
    pub reference: String,
}

impl RawExpenseFields {
    pub fn new(
        date_text: impl Into<String>,
        amount_text: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            date_text: date_text.into(),
            amount_text: amount_text.into(),
            extra_amount_texts: Vec::new(),
            label_candidates: Vec::new(),
            reference: reference.into(),
        }
    }

    pub fn with_extra_amount(mut self, text: impl Into<String>) -> Self {
        self.extra_amount_texts.push(text.into());
        self
    }

    pub fn with_label(mut self, name: impl Into<String>) -> Self {
        self.label_candidates.push(name.into());
        self
    }
}
