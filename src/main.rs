mod categories;
mod categorize;
mod config;
mod expense_db;
mod heuristics;
mod insights;
mod llm;
mod ocr;
mod pipeline;

use expense_db::ExpenseStore;
use pipeline::Pipeline;
use std::io::BufRead;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // init tracing
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter("info")
        .init();

    let config_path =
        std::env::var("COACH_CONFIG").unwrap_or_else(|_| ".config/coach.toml".to_string());
    let cfg = config::Config::load_or_default(&config_path)?;

    let image_paths: Vec<String> = std::env::args().skip(1).collect();
    if image_paths.is_empty() {
        eprintln!("Usage: receipt_coach <receipt-image>...");
        eprintln!("Processes each image, then answers spending questions from stdin.");
        return Ok(());
    }

    let db = Arc::new(ExpenseStore::new());
    let ocr_client = ocr::ReceiptOcrClient::new(&cfg.ocr)?;
    let llm_client = llm::GenerationClient::new(&cfg.llm)?;
    let pipeline = Pipeline::new(Box::new(ocr_client), Box::new(llm_client), Arc::clone(&db));

    for path in &image_paths {
        let span = tracing::info_span!("upload", file = %path);
        let _guard = span.enter();

        let image = std::fs::read(path)?;
        match pipeline.upload(&image).await {
            Ok(outcome) => {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }
            Err(e) => {
                tracing::error!(error = %e, "Upload failed");
            }
        }
    }

    let (receipts, expenses) = db.counts();
    info!(receipts, expenses, "Store statistics");

    println!("Ask about your spending (empty line to quit):");
    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            break;
        }
        match pipeline.ask(question).await {
            Ok(answer) => println!("\n{answer}\n"),
            Err(e) => eprintln!("{e}"),
        }
    }

    Ok(())
}
