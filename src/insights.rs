// src/insights.rs

use crate::categories::Category;
use crate::expense_db::ExpenseRecord;
use crate::heuristics::parse_date;
use crate::llm::{GenerateText, GenerationError};
use chrono::NaiveDate;
use tracing::{info, warn};

/// Summary sentinel when nothing has been recorded yet.
pub const EMPTY_HISTORY: &str = "No expenses recorded yet.";

const APOLOGY: &str = "Sorry, I couldn't analyze your expenses due to a technical issue.";

/// How many recent expenses the summary lists.
const RECENT_COUNT: usize = 5;

/// Render the expense history into the fixed-format summary block the
/// coach prompt is built around.
pub fn summarize(expenses: &[ExpenseRecord]) -> String {
    if expenses.is_empty() {
        return EMPTY_HISTORY.to_string();
    }

    let total: f64 = expenses.iter().map(|e| e.amount).sum();

    // Per-category sums in first-appearance order, not vocabulary order.
    let mut by_category: Vec<(Category, f64)> = Vec::new();
    for expense in expenses {
        match by_category.iter_mut().find(|(c, _)| *c == expense.category) {
            Some((_, sum)) => *sum += expense.amount,
            None => by_category.push((expense.category, expense.amount)),
        }
    }

    let mut summary = format!("Total spent: ${total:.2}\n");
    summary.push_str("Spending by category:\n");
    for (category, amount) in &by_category {
        summary.push_str(&format!("- {category}: ${amount:.2}\n"));
    }

    summary.push_str("\nRecent expenses:\n");
    for expense in recent(expenses) {
        let date = parse_date(&expense.date)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| expense.date.clone());
        summary.push_str(&format!(
            "- {date}: ${:.2} at {} ({})\n",
            expense.amount, expense.merchant, expense.category
        ));
    }

    summary
}

/// The `RECENT_COUNT` most recent expenses by date, descending. The
/// sort is stable, so same-date expenses keep their insertion order.
/// Unparseable dates sort oldest and are rendered verbatim upstream.
fn recent(expenses: &[ExpenseRecord]) -> Vec<&ExpenseRecord> {
    let mut sorted: Vec<&ExpenseRecord> = expenses.iter().collect();
    sorted.sort_by_key(|e| std::cmp::Reverse(parse_date(&e.date).unwrap_or(NaiveDate::MIN)));
    sorted.truncate(RECENT_COUNT);
    sorted
}

/// Build the spending-coach prompt around the summary block.
fn build_prompt(question: &str, summary: &str) -> String {
    format!(
        "You are an AI Spending Coach helping a user understand their expenses.\n\n\
         Here is a summary of the user's expenses:\n\
         {summary}\n\n\
         The user's question is: \"{question}\"\n\n\
         Provide a helpful, concise analysis addressing their question based on the expense data.\n\
         Focus on actionable insights and useful observations about spending patterns."
    )
}

/// Answer a free-text spending question against the given history.
/// Never a hard error: generation failures degrade to an apology.
pub async fn answer(
    llm: &dyn GenerateText,
    question: &str,
    expenses: &[ExpenseRecord],
) -> String {
    let summary = summarize(expenses);
    let prompt = build_prompt(question, &summary);
    info!(expenses = expenses.len(), prompt_len = prompt.len(), "Asking spending coach");

    match llm.complete(&prompt).await {
        Ok(text) => text,
        Err(GenerationError::Service { code, message }) => {
            warn!(code = %code, message = %message, "Generation service rejected the question");
            format!("Sorry, I couldn't analyze your expenses. Error: {message}")
        }
        Err(e) => {
            warn!(error = %e, "Generation call failed");
            APOLOGY.to_string()
        }
    }
}
