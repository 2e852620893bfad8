// src/categorize.rs

use crate::categories::Category;
use crate::expense_db::ReceiptRecord;
use crate::llm::GenerateText;
use tracing::{info, warn};

/// Build the categorization prompt from a receipt record. The full raw
/// OCR text goes in because merchant + amount alone are often too
/// little signal.
fn build_prompt(receipt: &ReceiptRecord) -> String {
    format!(
        "I have a receipt from {} for ${}.\n\
         The raw text from the receipt is: {}\n\n\
         Please categorize this expense into exactly one of these categories:\n\
         {}\n\n\
         Return only the category name.",
        receipt.merchant,
        receipt.total_amount,
        receipt.raw_text,
        Category::prompt_list(),
    )
}

/// Map free-text model output onto the vocabulary: exact match first,
/// then the first vocabulary member mentioned anywhere in the text,
/// then `Other`. Model output is free text and cannot be trusted to
/// echo a vocabulary term exactly.
pub fn resolve_category(completion: &str) -> Category {
    let trimmed = completion.trim();
    if let Some(category) = Category::from_exact(trimmed) {
        return category;
    }
    Category::find_mention(trimmed).unwrap_or(Category::Other)
}

/// Categorize a receipt. Total: every failure mode lands on `Other`,
/// so categorization can never abort an upload.
pub async fn categorize(llm: &dyn GenerateText, receipt: &ReceiptRecord) -> Category {
    let prompt = build_prompt(receipt);

    match llm.complete(&prompt).await {
        Ok(completion) => {
            let category = resolve_category(&completion);
            info!(category = %category, completion_len = completion.len(), "Expense categorized");
            category
        }
        Err(e) => {
            warn!(error = %e, "Categorization call failed — defaulting to Other");
            Category::Other
        }
    }
}
