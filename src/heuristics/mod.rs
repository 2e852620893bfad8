// src/heuristics/mod.rs

mod receipt;

use crate::expense_db::ReceiptRecord;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single receipt line item. Price extraction is not implemented —
/// the heuristic scanner only captures descriptions, so `price` stays
/// at the 0.0 placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub price: f64,
}

/// Fields the heuristic scanner could detect in raw OCR text. Absent
/// fields stay `None` here; defaults are filled in one place, by
/// [`ReceiptFields::into_record`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiptFields {
    pub merchant: Option<String>,
    pub date: Option<String>,
    pub total_amount: Option<f64>,
    pub items: Vec<LineItem>,
}

impl ReceiptFields {
    /// How many scalar fields were successfully extracted.
    pub fn coverage(&self) -> (usize, usize) {
        let total = 3;
        let filled = [
            self.merchant.is_some(),
            self.date.is_some(),
            self.total_amount.is_some(),
        ]
        .iter()
        .filter(|&&v| v)
        .count();
        (filled, total)
    }

    /// Normalize into a stored record: mint the id, fill defaults for
    /// anything the scanner missed, and retain the verbatim OCR text.
    pub fn into_record(self, raw_text: String) -> ReceiptRecord {
        ReceiptRecord {
            id: Uuid::new_v4(),
            date: self
                .date
                .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string()),
            merchant: self.merchant.unwrap_or_else(|| "Unknown".to_string()),
            total_amount: self.total_amount.unwrap_or(0.0),
            items: self.items,
            raw_text,
        }
    }
}

/// Date patterns a receipt line may carry, tried in this order.
pub const DATE_PATTERNS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y"];

/// Parse `s` against [`DATE_PATTERNS`]; first matching pattern wins.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_PATTERNS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Extract structured receipt fields from raw OCR text. Never fails:
/// unreadable input just yields an all-absent `ReceiptFields`.
pub fn extract_receipt(text: &str) -> ReceiptFields {
    receipt::extract(text)
}
