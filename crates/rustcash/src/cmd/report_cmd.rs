//! rcash-report - Summarise a GnuCash book.
//!
//! # Usage
//!
//! ```bash
//! rcash-report book.gnucash stats
//! rcash-report book.gnucash tree
//! rcash-report book.gnucash transactions --by-date
//! ```
//!
//! # Reports
//!
//! - `stats` - Entity counts and whether transactions are in date order
//! - `commodities` - List all commodities
//! - `tree` - Show the account hierarchy
//! - `transactions` - List transactions with their flow classification

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use super::{init_tracing, load_book};
use crate::report::{write_commodities, write_stats, write_transactions, write_tree};

/// Generate reports from GnuCash books.
#[derive(Parser, Debug)]
#[command(name = "rcash-report")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The GnuCash XML file, plain or gzip compressed
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// The report to generate
    #[command(subcommand)]
    report: Report,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Report {
    /// Show book statistics
    Stats,
    /// List all commodities
    Commodities,
    /// Show the account tree
    Tree,
    /// List transactions
    Transactions {
        /// Order by date posted instead of file order
        #[arg(short, long)]
        by_date: bool,
    },
}

/// Main entry point for the report command.
pub fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let book = load_book(&args.file)?;
    let mut stdout = io::stdout().lock();

    match &args.report {
        Report::Stats => write_stats(&book, &args.file, &mut stdout)?,
        Report::Commodities => write_commodities(&book, &mut stdout)?,
        Report::Tree => write_tree(&book, &mut stdout)?,
        Report::Transactions { by_date } => write_transactions(&book, *by_date, &mut stdout)?,
    }

    stdout.flush()?;
    Ok(())
}
