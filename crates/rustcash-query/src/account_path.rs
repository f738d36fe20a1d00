//! Path expressions over the chart of accounts.
//!
//! A tag step matches every account whose *name contains* the step, so
//! `.//Fuel` finds "Fuel Costs". Accounts have no attributes or text, so
//! `[@attr]` and `[tag='v']` filters never match.

use std::hash::{Hash, Hasher};

use rustcash_core::{AccountHandle, Book};

use crate::error::QueryError;
use crate::path::{CompiledPath, PathNode};

/// An account seen as a [`PathNode`].
///
/// The node evaluation started from acts as the top: it reports no parent.
#[derive(Debug, Clone, Copy)]
pub struct AccountNode<'a> {
    book: &'a Book,
    handle: AccountHandle,
    top: AccountHandle,
}

impl<'a> AccountNode<'a> {
    /// Use `handle` as the context root.
    pub const fn new(book: &'a Book, handle: AccountHandle) -> Self {
        Self {
            book,
            handle,
            top: handle,
        }
    }

    /// The account this node stands for.
    pub const fn handle(&self) -> AccountHandle {
        self.handle
    }

    const fn at(&self, handle: AccountHandle) -> Self {
        Self {
            book: self.book,
            handle,
            top: self.top,
        }
    }
}

impl PartialEq for AccountNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for AccountNode<'_> {}

impl Hash for AccountNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
    }
}

impl PathNode for AccountNode<'_> {
    fn children(&self) -> Vec<Self> {
        self.book
            .account(self.handle)
            .children()
            .iter()
            .map(|h| self.at(*h))
            .collect()
    }

    fn parent(&self) -> Option<Self> {
        if self.handle == self.top {
            return None;
        }
        self.book.account(self.handle).parent().map(|h| self.at(h))
    }

    fn match_tag(&self, tag: &str) -> bool {
        self.book.account(self.handle).name.contains(tag)
    }

    fn match_tag_text(&self, _tag: &str, _text: &str) -> bool {
        false
    }

    fn match_attr(&self, _attr: &str) -> bool {
        false
    }

    fn match_attr_text(&self, _attr: &str, _text: &str) -> bool {
        false
    }
}

/// Evaluate a compiled path from `start`.
pub fn find_accounts_from(
    book: &Book,
    start: AccountHandle,
    path: &CompiledPath,
) -> Vec<AccountHandle> {
    path.find(&AccountNode::new(book, start))
        .into_iter()
        .map(|n| n.handle)
        .collect()
}

/// Compile `path` and evaluate it from the book's root.
///
/// A book without accounts yields no matches.
pub fn find_accounts(book: &Book, path: &str) -> Result<Vec<AccountHandle>, QueryError> {
    let compiled = CompiledPath::compile(path)?;
    Ok(book
        .root()
        .map(|root| find_accounts_from(book, root, &compiled))
        .unwrap_or_default())
}
