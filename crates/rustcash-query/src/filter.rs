//! Predicate queries over a book.
//!
//! A [`Query`] collects three lists of predicates and yields every split
//! that passes all of them:
//!
//! 1. transaction predicates decide whether a transaction is looked at at all;
//! 2. split predicates see each split of a retained transaction;
//! 3. account predicates see the account the split posts to.
//!
//! Matches come back in book order, then split order, without sorting or
//! de-duplication.

use std::collections::HashSet;

use rustcash_core::{
    Account, AccountHandle, AccountType, Book, CommodityHandle, DateTime, FixedOffset,
    ReconciledState, Split, Transaction,
};
use tracing::debug;

use crate::account_path::{find_accounts, find_accounts_from};
use crate::error::QueryError;
use crate::path::CompiledPath;

/// A transaction-level predicate.
pub type TransactionFilter<'a> = Box<dyn Fn(&Transaction) -> bool + 'a>;
/// A split-level predicate.
pub type SplitFilter<'a> = Box<dyn Fn(&Split) -> bool + 'a>;
/// An account-level predicate, given the split's account and its handle.
pub type AccountFilter<'a> = Box<dyn Fn(AccountHandle, &Account) -> bool + 'a>;

/// One matching split and its context.
#[derive(Debug, Clone, Copy)]
pub struct QueryMatch<'a> {
    /// The enclosing transaction.
    pub transaction: &'a Transaction,
    /// The matching split.
    pub split: &'a Split,
    /// Handle of the split's account.
    pub account: AccountHandle,
}

/// A query under construction.
///
/// # Example
///
/// ```ignore
/// let matches = Query::new(&book)
///     .date_posted_range(from, to)
///     .account_path(".//Fuel")?
///     .execute();
/// ```
pub struct Query<'a> {
    book: &'a Book,
    transaction_filters: Vec<TransactionFilter<'a>>,
    split_filters: Vec<SplitFilter<'a>>,
    account_filters: Vec<AccountFilter<'a>>,
}

impl std::fmt::Debug for Query<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("transaction_filters", &self.transaction_filters.len())
            .field("split_filters", &self.split_filters.len())
            .field("account_filters", &self.account_filters.len())
            .finish_non_exhaustive()
    }
}

impl<'a> Query<'a> {
    /// Start a query that matches every split of the book.
    pub fn new(book: &'a Book) -> Self {
        Self {
            book,
            transaction_filters: Vec::new(),
            split_filters: Vec::new(),
            account_filters: Vec::new(),
        }
    }

    /// Keep transactions for which `f` holds.
    #[must_use]
    pub fn filter_transactions(mut self, f: impl Fn(&Transaction) -> bool + 'a) -> Self {
        self.transaction_filters.push(Box::new(f));
        self
    }

    /// Keep splits for which `f` holds.
    #[must_use]
    pub fn filter_splits(mut self, f: impl Fn(&Split) -> bool + 'a) -> Self {
        self.split_filters.push(Box::new(f));
        self
    }

    /// Keep splits whose account satisfies `f`.
    #[must_use]
    pub fn filter_accounts(mut self, f: impl Fn(AccountHandle, &Account) -> bool + 'a) -> Self {
        self.account_filters.push(Box::new(f));
        self
    }

    /// Posted in `[after_equal, before)`.
    #[must_use]
    pub fn date_posted_range(
        self,
        after_equal: DateTime<FixedOffset>,
        before: DateTime<FixedOffset>,
    ) -> Self {
        self.filter_transactions(move |t| {
            t.date_posted
                .get()
                .is_some_and(|d| *d >= after_equal && *d < before)
        })
    }

    /// Posted at or after `after_equal`.
    #[must_use]
    pub fn date_posted_after_equal(self, after_equal: DateTime<FixedOffset>) -> Self {
        self.filter_transactions(move |t| t.date_posted.get().is_some_and(|d| *d >= after_equal))
    }

    /// Posted strictly before `before`.
    #[must_use]
    pub fn date_posted_before(self, before: DateTime<FixedOffset>) -> Self {
        self.filter_transactions(move |t| t.date_posted.get().is_some_and(|d| *d < before))
    }

    /// In exactly this commodity.
    #[must_use]
    pub fn currency(self, currency: CommodityHandle) -> Self {
        self.filter_transactions(move |t| t.currency == Some(currency))
    }

    /// Description contains `needle`.
    #[must_use]
    pub fn description_contains(self, needle: impl Into<String>) -> Self {
        let needle = needle.into();
        self.filter_transactions(move |t| t.description.contains(&needle))
    }

    /// Split has this reconcile flag.
    #[must_use]
    pub fn reconciled_state(self, state: ReconciledState) -> Self {
        self.filter_splits(move |s| s.reconciled_state == state)
    }

    /// Split memo contains `needle`.
    #[must_use]
    pub fn memo_contains(self, needle: impl Into<String>) -> Self {
        let needle = needle.into();
        self.filter_splits(move |s| s.memo.contains(&needle))
    }

    /// Account is of exactly this type.
    #[must_use]
    pub fn account_type(self, account_type: AccountType) -> Self {
        self.filter_accounts(move |_, a| a.account_type == account_type)
    }

    /// Account's top-level ancestor is of this type.
    #[must_use]
    pub fn basic_account_type(self, account_type: AccountType) -> Self {
        let book = self.book;
        self.filter_accounts(move |h, _| book.basic_type(h) == account_type)
    }

    /// Account is one of those `path` selects from the root.
    ///
    /// The path is resolved now; the candidate set is fixed from here on.
    pub fn account_path(self, path: &str) -> Result<Self, QueryError> {
        let accounts = find_accounts(self.book, path)?;
        debug!(path, candidates = accounts.len(), "account path resolved");
        Ok(self.account_in(accounts))
    }

    /// Like [`Query::account_path`] with an already compiled path.
    #[must_use]
    pub fn account_path_compiled(self, path: &CompiledPath) -> Self {
        let accounts = self
            .book
            .root()
            .map(|root| find_accounts_from(self.book, root, path))
            .unwrap_or_default();
        self.account_in(accounts)
    }

    fn account_in(self, accounts: Vec<AccountHandle>) -> Self {
        let set: HashSet<AccountHandle> = accounts.into_iter().collect();
        self.filter_accounts(move |h, _| set.contains(&h))
    }

    /// Run the query.
    pub fn execute(&self) -> Vec<QueryMatch<'a>> {
        let book = self.book;
        let mut matches = Vec::new();
        for transaction in book.transactions() {
            if !self.transaction_filters.iter().all(|f| f(transaction)) {
                continue;
            }
            for split in &transaction.splits {
                if !self.split_filters.iter().all(|f| f(split)) {
                    continue;
                }
                let account = book.account(split.account);
                if self.account_filters.iter().all(|f| f(split.account, account)) {
                    matches.push(QueryMatch {
                        transaction,
                        split,
                        account: split.account,
                    });
                }
            }
        }
        debug!(matches = matches.len(), "query executed");
        matches
    }
}
