//! Command implementations for CLI tools.
//!
//! Each module contains the full implementation for a command,
//! which can be invoked by thin wrapper binaries.

pub mod query_cmd;
pub mod report_cmd;

use anyhow::{Context, Result};
use rustcash_core::Book;
use rustcash_loader::Loader;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` still wins over the default level.
pub(crate) fn init_tracing(verbose: bool) {
    let level = if verbose { "rustcash=debug" } else { "rustcash=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load a book, naming the file in any error.
pub(crate) fn load_book(file: &Path) -> Result<Book> {
    Loader::new()
        .load(file)
        .with_context(|| format!("failed to load {}", file.display()))
}
