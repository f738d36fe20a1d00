//! rcash-query - Select splits from a GnuCash book.
//!
//! # Usage
//!
//! ```bash
//! rcash-query book.gnucash --from 2016-01-01 --to 2017-01-01 --account-path './/Fuel'
//! rcash-query book.gnucash --account-type expense --currency ISO4217:EUR --format json
//! ```
//!
//! Every given option narrows the result; without options all splits match.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone};
use clap::Parser;
use rustcash_core::AccountType;
use rustcash_query::Query;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use super::{init_tracing, load_book};
use crate::report::{write_matches_json, write_matches_text};

/// Query splits in a GnuCash book.
#[derive(Parser, Debug)]
#[command(name = "rcash-query")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The GnuCash XML file, plain or gzip compressed
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// First date posted to include (YYYY-MM-DD, local midnight)
    #[arg(long, value_name = "DATE", value_parser = parse_local_date)]
    from: Option<DateTime<FixedOffset>>,

    /// First date posted to exclude (YYYY-MM-DD, local midnight)
    #[arg(long, value_name = "DATE", value_parser = parse_local_date)]
    to: Option<DateTime<FixedOffset>>,

    /// Path expression selecting accounts, e.g. './/Fuel'
    #[arg(short = 'p', long, value_name = "PATH")]
    account_path: Option<String>,

    /// Account type, e.g. expense or BANK
    #[arg(short = 't', long, value_name = "TYPE")]
    account_type: Option<AccountType>,

    /// Transaction currency as SPACE:ID, e.g. ISO4217:EUR
    #[arg(short, long, value_name = "SPACE:ID", value_parser = parse_commodity_key)]
    currency: Option<CommodityKey>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Main entry point for the query command.
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

    let mut query = Query::new(&book);
    query = match (args.from, args.to) {
        (Some(from), Some(to)) => query.date_posted_range(from, to),
        (Some(from), None) => query.date_posted_after_equal(from),
        (None, Some(to)) => query.date_posted_before(to),
        (None, None) => query,
    };
    if let Some(CommodityKey { space, id }) = &args.currency {
        let currency = book
            .find_commodity(space, id)
            .with_context(|| format!("unknown commodity {space}:{id}"))?;
        query = query.currency(currency);
    }
    if let Some(account_type) = args.account_type {
        query = query.account_type(account_type);
    }
    if let Some(path) = &args.account_path {
        query = query.account_path(path)?;
    }

    let matches = query.execute();
    debug!(format = %args.format, matches = matches.len(), "rendering query results");

    let mut stdout = io::stdout().lock();
    match args.format {
        OutputFormat::Text => write_matches_text(&book, &matches, &mut stdout)?,
        OutputFormat::Json => write_matches_json(&book, &matches, &mut stdout)?,
    }
    stdout.flush()?;
    Ok(())
}

/// `YYYY-MM-DD` as midnight in the local time zone.
fn parse_local_date(s: &str) -> Result<DateTime<FixedOffset>, String> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))?;
    let local = date
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
        .ok_or_else(|| format!("{s} has no local midnight"))?;
    Ok(local.with_timezone(local.offset()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CommodityKey {
    space: String,
    id: String,
}

/// `SPACE:ID`, split at the first colon.
fn parse_commodity_key(s: &str) -> Result<CommodityKey, String> {
    match s.split_once(':') {
        Some((space, id)) if !space.is_empty() && !id.is_empty() => Ok(CommodityKey {
            space: space.to_string(),
            id: id.to_string(),
        }),
        _ => Err(format!("expected SPACE:ID, got {s:?}")),
    }
}
