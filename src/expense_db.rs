use crate::categories::Category;
use crate::heuristics::LineItem;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// One processed receipt. Created once per successful OCR call, never
/// mutated or deleted for the life of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptRecord {
    pub id: Uuid,
    pub date: String,
    pub merchant: String,
    pub total_amount: f64,
    pub items: Vec<LineItem>,
    /// Verbatim OCR output, kept for re-analysis prompts.
    pub raw_text: String,
}

/// The expense derived from a receipt: a denormalized snapshot taken at
/// creation time, not a live view of the receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: Uuid,
    pub receipt_id: Uuid,
    pub date: String,
    pub merchant: String,
    pub amount: f64,
    pub category: Category,
}

impl ExpenseRecord {
    pub fn from_receipt(receipt: &ReceiptRecord, category: Category) -> Self {
        ExpenseRecord {
            id: Uuid::new_v4(),
            receipt_id: receipt.id,
            date: receipt.date.clone(),
            merchant: receipt.merchant.clone(),
            amount: receipt.total_amount,
            category,
        }
    }
}

/// Volatile record store: insertion-ordered, append + full-scan read
/// only. Lives for the process lifetime; one lock guards both vectors
/// so a receipt and its expense always land together.
#[derive(Default)]
pub struct ExpenseStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    receipts: Vec<ReceiptRecord>,
    expenses: Vec<ExpenseRecord>,
}

impl ExpenseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a receipt and its derived expense in one step.
    pub fn append_pair(&self, receipt: ReceiptRecord, expense: ExpenseRecord) {
        let mut inner = self.lock();
        inner.receipts.push(receipt);
        inner.expenses.push(expense);
        info!(
            receipts = inner.receipts.len(),
            expenses = inner.expenses.len(),
            "Record pair stored"
        );
    }

    /// Snapshot of all expenses, in insertion order.
    pub fn expenses(&self) -> Vec<ExpenseRecord> {
        self.lock().expenses.clone()
    }

    /// Snapshot of all receipts, in insertion order.
    pub fn receipts(&self) -> Vec<ReceiptRecord> {
        self.lock().receipts.clone()
    }

    /// (receipt count, expense count) as of call time.
    pub fn counts(&self) -> (usize, usize) {
        let inner = self.lock();
        (inner.receipts.len(), inner.expenses.len())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock still only ever holds fully appended pairs,
        // so recovering the guard is sound.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn sample_pair(merchant: &str, amount: f64) -> (ReceiptRecord, ExpenseRecord) {
        let receipt = ReceiptRecord {
            id: Uuid::new_v4(),
            date: "2025-06-01".to_string(),
            merchant: merchant.to_string(),
            total_amount: amount,
            items: Vec::new(),
            raw_text: String::new(),
        };
        let expense = ExpenseRecord::from_receipt(&receipt, Category::Other);
        (receipt, expense)
    }

    #[test]
    fn expense_snapshots_receipt_fields() {
        let (receipt, expense) = sample_pair("Cafe Luna", 12.5);
        assert_eq!(expense.receipt_id, receipt.id);
        assert_ne!(expense.id, receipt.id);
        assert_eq!(expense.merchant, "Cafe Luna");
        assert_eq!(expense.amount, 12.5);
        assert_eq!(expense.date, receipt.date);
    }

    #[test]
    fn append_then_read_round_trips_in_order() {
        let store = ExpenseStore::new();
        let mut expected = Vec::new();
        for i in 0..10 {
            let (receipt, expense) = sample_pair(&format!("m{i}"), i as f64);
            expected.push(expense.id);
            store.append_pair(receipt, expense);
        }
        let got: Vec<Uuid> = store.expenses().iter().map(|e| e.id).collect();
        assert_eq!(got, expected);
        assert_eq!(store.counts(), (10, 10));
    }

    #[test]
    fn concurrent_appends_drop_nothing() {
        let store = Arc::new(ExpenseStore::new());
        let threads = 16;
        let per_thread = 50;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..per_thread {
                        let (receipt, expense) = sample_pair(&format!("t{t}-{i}"), 1.0);
                        store.append_pair(receipt, expense);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let expenses = store.expenses();
        assert_eq!(expenses.len(), threads * per_thread);

        let mut ids: Vec<Uuid> = expenses.iter().map(|e| e.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), threads * per_thread);

        // Every expense still points at a stored receipt.
        let receipt_ids: Vec<Uuid> = store.receipts().iter().map(|r| r.id).collect();
        assert!(expenses.iter().all(|e| receipt_ids.contains(&e.receipt_id)));
    }
}
