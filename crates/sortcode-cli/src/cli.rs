//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Sortcode - categorize bank transactions into HMRC tax categories
#[derive(Parser)]
#[command(name = "sortcode")]
#[command(about = "HMRC self-assessment transaction categorizer", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Categorize a CSV of transactions and emit a JSON report
    Categorize {
        /// CSV file with columns: id, description, amount, type[, date]
        #[arg(short, long)]
        file: PathBuf,

        /// Business type: retail, wholesale, services, construction,
        /// property, freelancer
        #[arg(short, long)]
        business_type: Option<String>,

        /// User id whose correction history should be consulted
        #[arg(short, long)]
        user: Option<String>,

        /// Consult the external AI classifier for inconclusive rows
        ///
        /// Requires SORTCODE_AI_HOST (and optionally SORTCODE_AI_MODEL,
        /// SORTCODE_AI_BACKEND) to be set.
        #[arg(long)]
        ai: bool,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the categories available to a business type
    Categories {
        /// Business type to filter by (all categories when omitted)
        #[arg(short, long)]
        business_type: Option<String>,
    },

    /// Run reasonableness checks over a CSV of transactions
    Audit {
        /// CSV file with columns: id, description, amount, type[, date]
        #[arg(short, long)]
        file: PathBuf,

        /// Business type used while categorizing before the audit
        #[arg(short, long)]
        business_type: Option<String>,
    },
}
