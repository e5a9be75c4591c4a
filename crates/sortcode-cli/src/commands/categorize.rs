//! Categorize command implementation

use std::path::Path;

use anyhow::{bail, Context, Result};
use sortcode_core::{
    BatchOptions, BatchOrchestrator, CategorizationReport, Categorizer, ClassifierBackend,
    ClassifierClient,
};

use super::load_transactions;

/// Categorize a CSV of transactions and emit a JSON report.
pub async fn cmd_categorize(
    file: &Path,
    business_type: Option<&str>,
    user: Option<&str>,
    use_ai: bool,
    output: Option<&Path>,
) -> Result<()> {
    let transactions = load_transactions(file)?;
    if transactions.is_empty() {
        bail!("{} contains no transactions", file.display());
    }
    eprintln!(
        "📄 Loaded {} transactions from {}",
        transactions.len(),
        file.display()
    );

    let ai = if use_ai {
        let Some(client) = ClassifierClient::from_env() else {
            bail!(
                "--ai requires SORTCODE_AI_HOST (and optionally SORTCODE_AI_MODEL) to be set"
            );
        };
        if client.health_check().await {
            eprintln!("🤖 Classifier: {} at {}", client.model(), client.host());
        } else {
            eprintln!(
                "⚠️  Classifier at {} is not responding; inconclusive rows will fail",
                client.host()
            );
        }
        Some(client)
    } else {
        None
    };

    let engine = Categorizer::in_memory();
    let options = BatchOptions {
        business_type: business_type.map(str::to_string),
        user_id: user.map(str::to_string),
        ..BatchOptions::default()
    };
    let orchestrator = BatchOrchestrator::new(&engine, ai.as_ref(), options)
        .with_progress(Box::new(|done, total| {
            eprint!("\r  Categorizing {}/{}", done, total);
            if done == total {
                eprintln!();
            }
        }));

    let outcome = orchestrator.run(&transactions).await?;

    eprintln!(
        "✅ {} categorized, {} personal, {} for review, {} errors",
        outcome.summary.categorized,
        outcome.summary.personal,
        outcome.summary.manual_review,
        outcome.summary.errors
    );

    let report = CategorizationReport::build(
        &transactions,
        &outcome.results,
        &outcome.summary,
        business_type,
    );
    let json = report.to_json()?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("💾 Report written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
