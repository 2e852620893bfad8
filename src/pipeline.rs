// src/pipeline.rs

use crate::categorize;
use crate::expense_db::{ExpenseRecord, ExpenseStore, ReceiptRecord};
use crate::heuristics;
use crate::insights;
use crate::llm::GenerateText;
use crate::ocr::{OcrError, TextRecognizer};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// What a successful upload hands back to the transport layer.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub receipt: ReceiptRecord,
    pub expense: ExpenseRecord,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no receipt image provided")]
    EmptyImage,
    #[error(transparent)]
    Ocr(#[from] OcrError),
}

#[derive(Debug, Error)]
pub enum AskError {
    #[error("no question provided")]
    EmptyQuestion,
}

/// Wires upload → OCR → field extraction → categorization → store, and
/// question → insight engine. One instance per process, shared across
/// request handlers.
pub struct Pipeline {
    ocr: Box<dyn TextRecognizer>,
    llm: Box<dyn GenerateText>,
    db: Arc<ExpenseStore>,
}

impl Pipeline {
    pub fn new(
        ocr: Box<dyn TextRecognizer>,
        llm: Box<dyn GenerateText>,
        db: Arc<ExpenseStore>,
    ) -> Self {
        Pipeline { ocr, llm, db }
    }

    /// Process one receipt image end to end. Only the OCR call can
    /// abort the upload; categorization degrades to `Other` on its own.
    pub async fn upload(&self, image: &[u8]) -> Result<UploadOutcome, UploadError> {
        if image.is_empty() {
            return Err(UploadError::EmptyImage);
        }

        let ocr_output = self.ocr.recognize(image).await?;

        let fields = heuristics::extract_receipt(&ocr_output.content);
        let (filled, total) = fields.coverage();
        info!(
            filled,
            total,
            items = fields.items.len(),
            ocr_request = ?ocr_output.request_id,
            "Receipt fields extracted"
        );

        let receipt = fields.into_record(ocr_output.content);
        let category = categorize::categorize(self.llm.as_ref(), &receipt).await;
        let expense = ExpenseRecord::from_receipt(&receipt, category);

        info!(
            receipt_id = %receipt.id,
            merchant = %receipt.merchant,
            amount = receipt.total_amount,
            category = %category,
            "Receipt processed"
        );

        let outcome = UploadOutcome {
            receipt: receipt.clone(),
            expense: expense.clone(),
        };
        self.db.append_pair(receipt, expense);

        Ok(outcome)
    }

    /// Full expense history, in upload order.
    pub fn expenses(&self) -> Vec<ExpenseRecord> {
        self.db.expenses()
    }

    /// Answer a free-text spending question against the current history.
    pub async fn ask(&self, question: &str) -> Result<String, AskError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AskError::EmptyQuestion);
        }
        Ok(insights::answer(self.llm.as_ref(), question, &self.db.expenses()).await)
    }
}
