//! Sortcode CLI - HMRC transaction categorization
//!
//! Usage:
//!   sortcode categorize --file statement.csv --business-type services
//!   sortcode categories --business-type retail
//!   sortcode audit --file statement.csv

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Categorize {
            file,
            business_type,
            user,
            ai,
            output,
        } => {
            commands::cmd_categorize(
                &file,
                business_type.as_deref(),
                user.as_deref(),
                ai,
                output.as_deref(),
            )
            .await
        }
        Commands::Categories { business_type } => {
            commands::cmd_categories(business_type.as_deref())
        }
        Commands::Audit {
            file,
            business_type,
        } => commands::cmd_audit(&file, business_type.as_deref()).await,
    }
}
