//! GnuCash XML book loader.
//!
//! This crate turns a GnuCash XML file (gzip-compressed or plain) into an
//! immutable [`Book`]. It reads the document in one forward pass: accounts
//! are linked to parents declared earlier and splits to accounts declared
//! earlier, so no second resolution pass is needed.
//!
//! # Features
//!
//! - Transparent gzip detection ([`Decompression`])
//! - Fatal, typed errors for every broken reference ([`LoadError`])
//! - Permissive currency lookups: an unknown commodity leaves the currency unset
//! - Pluggable event sources ([`EventSource`]) for callers with their own tokenizer
//!
//! # Example
//!
//! ```ignore
//! use rustcash_loader::Loader;
//! use std::path::Path;
//!
//! let book = Loader::new().load(Path::new("household.gnucash"))?;
//! for account in book.accounts() {
//!     println!("{}", account.name);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod decode;
mod events;

pub use events::{EventSource, XmlEvent, XmlEvents};

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::num::ParseIntError;
use std::path::{Path, PathBuf};

use rustcash_core::{
    AccountHandle, Book, BookBuilder, BookError, ParseNumericError, ParseReconciledStateError,
    ParseTimespecError,
};
use thiserror::Error;
use tracing::{debug, info};

use decode::{for_each_child, Resolver};

/// First two bytes of every gzip stream.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Errors that can occur during loading.
///
/// Every error aborts the load; no partial book is returned.
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error reading the input.
    #[error("failed to read {}: {source}", describe(.path))]
    Io {
        /// The file that failed to read, if the input was a file.
        path: Option<PathBuf>,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Malformed XML.
    #[error("malformed XML at byte {position}: {source}")]
    Xml {
        /// Byte offset in the decompressed stream.
        position: usize,
        /// The tokenizer error.
        #[source]
        source: quick_xml::Error,
    },

    /// The document ended inside an element.
    #[error("unexpected end of document")]
    UnexpectedEof,

    /// A record closed without a mandatory child.
    #[error("{element} is missing required field {field:?}")]
    MissingRequiredField {
        /// Record element name.
        element: &'static str,
        /// Missing child element name.
        field: &'static str,
    },

    /// A second account without parent.
    #[error("multiple root accounts: {root:?} and {rejected:?}")]
    MultipleRootAccounts {
        /// Name of the account that became the root.
        root: String,
        /// Name of the second parentless account.
        rejected: String,
    },

    /// An account names a parent that was not declared before it.
    #[error("account {account:?} refers to unknown parent {parent:?}")]
    ParentNotFound {
        /// Id of the child account.
        account: String,
        /// The unresolved parent id.
        parent: String,
    },

    /// A split posts to an account that was not declared before it.
    #[error("split refers to unknown account {id:?}")]
    AccountNotFound {
        /// The unresolved account id.
        id: String,
    },

    /// A malformed split value or quantity.
    #[error(transparent)]
    Numeric(#[from] ParseNumericError),

    /// A malformed timestamp.
    #[error(transparent)]
    Timespec(#[from] ParseTimespecError),

    /// A malformed split reconcile flag.
    #[error(transparent)]
    ReconciledState(#[from] ParseReconciledStateError),

    /// A malformed integer field.
    #[error("invalid integer {value:?} in {field}: {source}")]
    InvalidInteger {
        /// Element name.
        field: &'static str,
        /// The offending text.
        value: String,
        /// The parse failure.
        #[source]
        source: ParseIntError,
    },
}

fn describe(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map_or_else(|| "input".to_string(), |p| p.display().to_string())
}

impl LoadError {
    fn with_path(self, path: &Path) -> Self {
        match self {
            Self::Io { path: None, source } => Self::Io {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        }
    }
}

impl From<BookError> for LoadError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::MultipleRootAccounts { root, rejected } => {
                Self::MultipleRootAccounts { root, rejected }
            }
        }
    }
}

/// How the input bytes are decompressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Decompression {
    /// Gzip if the input starts with the gzip magic bytes, plain otherwise.
    #[default]
    Auto,
    /// Always gzip.
    Gzip,
    /// Never decompress.
    Plain,
}

/// GnuCash book loader.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    decompression: Decompression,
}

impl Loader {
    /// Create a new loader with automatic gzip detection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose how the input is decompressed.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let book = Loader::new()
    ///     .with_decompression(Decompression::Plain)
    ///     .load(Path::new("book.xml"))?;
    /// ```
    #[must_use]
    pub const fn with_decompression(mut self, decompression: Decompression) -> Self {
        self.decompression = decompression;
        self
    }

    /// Load a book from a file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the file cannot be read, is not well-formed,
    /// or contains a broken reference or malformed field.
    pub fn load(&self, path: &Path) -> Result<Book, LoadError> {
        debug!(path = %path.display(), "loading book");
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: Some(path.to_path_buf()),
            source,
        })?;
        self.load_reader(BufReader::new(file))
            .map_err(|e| e.with_path(path))
    }

    /// Load a book from a buffered reader.
    pub fn load_reader<R: BufRead>(&self, mut reader: R) -> Result<Book, LoadError> {
        let gzip = match self.decompression {
            Decompression::Gzip => true,
            Decompression::Plain => false,
            Decompression::Auto => {
                let head = reader
                    .fill_buf()
                    .map_err(|source| LoadError::Io { path: None, source })?;
                head.starts_with(&GZIP_MAGIC)
            }
        };
        if gzip {
            debug!("decompressing gzip input");
            let decoder = flate2::bufread::GzDecoder::new(reader);
            self.load_events(&mut XmlEvents::new(BufReader::new(decoder)))
        } else {
            self.load_events(&mut XmlEvents::new(reader))
        }
    }

    /// Load a book from uncompressed XML text.
    pub fn load_str(&self, xml: &str) -> Result<Book, LoadError> {
        self.load_events(&mut XmlEvents::new(xml.as_bytes()))
    }

    /// Load a book from any event source.
    ///
    /// The first start tag is taken as the document root (`gnc-v2`).
    pub fn load_events<S: EventSource + ?Sized>(&self, src: &mut S) -> Result<Book, LoadError> {
        loop {
            match src.next_event()? {
                XmlEvent::Start(_) => break,
                XmlEvent::Text(_) => {}
                XmlEvent::End(_) | XmlEvent::Eof => return Err(LoadError::UnexpectedEof),
            }
        }

        let mut state = LoadState::default();
        for_each_child(src, |src, name| {
            if name == "book" {
                for_each_child(src, |src, name| state.record(src, name))
            } else {
                state.record(src, name)
            }
        })?;

        let book = state.builder.build();
        info!(
            commodities = book.commodities().len(),
            accounts = book.accounts().len(),
            transactions = book.transactions().len(),
            "book loaded"
        );
        Ok(book)
    }
}

/// Everything resolved so far during one load.
#[derive(Default)]
struct LoadState {
    builder: BookBuilder,
    accounts: HashMap<String, AccountHandle>,
}

impl LoadState {
    /// Decode one direct child of the book.
    fn record<S: EventSource + ?Sized>(&mut self, src: &mut S, name: &str) -> Result<(), LoadError> {
        match name {
            "commodity" => {
                let commodity = decode::decode_commodity(src)?;
                debug!(%commodity, "commodity");
                if self.builder.add_commodity(commodity).is_none() {
                    debug!("template commodity dropped");
                }
            }
            "account" => {
                let record = decode::decode_account(src, &self.resolver())?;
                debug!(id = %record.id, name = %record.account.name, "account");
                let parent = if record.parent_id.is_empty() {
                    None
                } else {
                    let parent = self.accounts.get(&record.parent_id).copied().ok_or_else(|| {
                        LoadError::ParentNotFound {
                            account: record.id.clone(),
                            parent: record.parent_id.clone(),
                        }
                    })?;
                    Some(parent)
                };
                let handle = self.builder.add_account(record.account, parent)?;
                self.accounts.insert(record.id, handle);
            }
            "transaction" => {
                let transaction = decode::decode_transaction(src, &self.resolver())?;
                debug!(
                    description = %transaction.description,
                    splits = transaction.splits.len(),
                    "transaction"
                );
                self.builder.add_transaction(transaction);
            }
            other => {
                debug!(element = other, "skipping");
                src.skip_element()?;
            }
        }
        Ok(())
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver {
            builder: &self.builder,
            accounts: &self.accounts,
        }
    }
}

/// Load a book file.
///
/// This is a convenience function that creates a default loader.
pub fn load(path: &Path) -> Result<Book, LoadError> {
    Loader::new().load(path)
}
