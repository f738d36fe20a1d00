//! The loaded book: an arena of commodities, accounts and transactions.
//!
//! Entities refer to each other through [`CommodityHandle`] and
//! [`AccountHandle`], stable indexes into the arenas of the [`Book`] that
//! created them. Parent and child links between accounts are handles too, so
//! the tree can be walked both ways without shared ownership.
//!
//! A [`Book`] is only produced by [`BookBuilder::build`] and has no mutating
//! methods.
//!
//! # Example
//!
//! ```
//! use rustcash_core::{Account, AccountType, BookBuilder, Commodity};
//!
//! let mut builder = BookBuilder::new();
//! let eur = builder.add_commodity(Commodity::new("ISO4217", "EUR")).unwrap();
//! let root = builder.add_account(Account::new("Root Account", AccountType::Root), None).unwrap();
//! let car = builder
//!     .add_account(Account::new("Car", AccountType::Expense).with_currency(eur), Some(root))
//!     .unwrap();
//! let fuel = builder
//!     .add_account(Account::new("Fuel", AccountType::Expense), Some(car))
//!     .unwrap();
//!
//! let book = builder.build();
//! assert_eq!(book.full_name(fuel), "Car > Fuel");
//! assert_eq!(book.basic_type(fuel), AccountType::Expense);
//! ```

use thiserror::Error;

use crate::{Account, AccountType, Commodity, FlowKind, Split, Transaction};

/// Index of a [`Commodity`] within its [`Book`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommodityHandle(usize);

impl CommodityHandle {
    /// Position in [`Book::commodities`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Index of an [`Account`] within its [`Book`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountHandle(usize);

impl AccountHandle {
    /// Position in [`Book::accounts`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Errors raised while assembling a book.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    /// A second parentless account was added.
    #[error("account {rejected:?} has no parent but {root:?} is already the root")]
    MultipleRootAccounts {
        /// Name of the established root.
        root: String,
        /// Name of the rejected account.
        rejected: String,
    },
}

/// An immutable, fully cross-referenced ledger.
///
/// Handles passed to the accessors must come from this book; a foreign
/// handle may panic or return an unrelated entity.
#[derive(Debug, Clone, Default)]
pub struct Book {
    commodities: Vec<Commodity>,
    accounts: Vec<Account>,
    root: Option<AccountHandle>,
    transactions: Vec<Transaction>,
}

impl Book {
    /// Commodities in declaration order. Not deduplicated.
    #[must_use]
    pub fn commodities(&self) -> &[Commodity] {
        &self.commodities
    }

    /// Look up a commodity by handle.
    #[must_use]
    pub fn commodity(&self, handle: CommodityHandle) -> &Commodity {
        &self.commodities[handle.0]
    }

    /// The first commodity declared with the given key.
    #[must_use]
    pub fn find_commodity(&self, space: &str, id: &str) -> Option<CommodityHandle> {
        find_commodity(&self.commodities, space, id)
    }

    /// The root account, absent only for a book without accounts.
    #[must_use]
    pub const fn root(&self) -> Option<AccountHandle> {
        self.root
    }

    /// Accounts in declaration order.
    #[must_use]
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Handles of all accounts, in declaration order.
    pub fn account_handles(&self) -> impl Iterator<Item = AccountHandle> {
        (0..self.accounts.len()).map(AccountHandle)
    }

    /// Look up an account by handle.
    #[must_use]
    pub fn account(&self, handle: AccountHandle) -> &Account {
        &self.accounts[handle.0]
    }

    /// The account a split posts to.
    #[must_use]
    pub fn split_account(&self, split: &Split) -> &Account {
        self.account(split.account)
    }

    /// Transactions in document order (not necessarily sorted by date).
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The account followed by its parent, grandparent, ..., root.
    #[must_use]
    pub fn ancestors(&self, handle: AccountHandle) -> Vec<AccountHandle> {
        let mut chain = vec![handle];
        let mut current = self.account(handle).parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self.account(parent).parent;
        }
        chain
    }

    /// Names from below the root down to the account, joined by `" > "`.
    ///
    /// The root itself renders as `"<root>"`.
    #[must_use]
    pub fn full_name(&self, handle: AccountHandle) -> String {
        self.full_name_with(handle, " > ")
    }

    /// Like [`Book::full_name`] with a custom separator.
    #[must_use]
    pub fn full_name_with(&self, handle: AccountHandle, separator: &str) -> String {
        let chain = self.ancestors(handle);
        if chain.len() == 1 && self.account(handle).parent.is_none() {
            return "<root>".to_string();
        }
        chain
            .iter()
            .rev()
            .skip(1)
            .map(|h| self.account(*h).name.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Type of the top-level ancestor (the one directly below the root).
    ///
    /// The root reports its own type.
    #[must_use]
    pub fn basic_type(&self, handle: AccountHandle) -> AccountType {
        let chain = self.ancestors(handle);
        let top = if chain.len() >= 2 {
            chain[chain.len() - 2]
        } else {
            handle
        };
        self.account(top).account_type
    }

    /// Index of the first transaction posted earlier than its predecessor.
    #[must_use]
    pub fn first_unsorted_transaction(&self) -> Option<usize> {
        self.transactions
            .windows(2)
            .position(|pair| pair[1].date_posted < pair[0].date_posted)
            .map(|i| i + 1)
    }

    /// Transactions stably sorted by date posted. The book itself is untouched.
    #[must_use]
    pub fn transactions_by_date_posted(&self) -> Vec<&Transaction> {
        let mut sorted: Vec<&Transaction> = self.transactions.iter().collect();
        sorted.sort_by_key(|t| t.date_posted);
        sorted
    }

    /// Classify a two-split transaction by where the money flows.
    ///
    /// The split with the negative value is the source, the other one the
    /// destination; both are compared by [`Book::basic_type`].
    #[must_use]
    pub fn classify(&self, transaction: &Transaction) -> FlowKind {
        let [first, second] = transaction.splits.as_slice() else {
            return FlowKind::MultiSplit;
        };
        let (to, from) = if first.value.sign() < 0 {
            (second, first)
        } else {
            (first, second)
        };
        let to = self.basic_type(to.account);
        let from = self.basic_type(from.account);
        match (from, to) {
            (AccountType::Asset, AccountType::Expense) => FlowKind::Expense,
            (AccountType::Asset, AccountType::Asset) => FlowKind::Transfer,
            (AccountType::Income, AccountType::Asset) => FlowKind::Income,
            _ => FlowKind::Other,
        }
    }
}

fn find_commodity(commodities: &[Commodity], space: &str, id: &str) -> Option<CommodityHandle> {
    commodities
        .iter()
        .position(|c| c.matches(space, id))
        .map(CommodityHandle)
}

/// Assembles a [`Book`] in document order.
#[derive(Debug, Default)]
pub struct BookBuilder {
    book: Book,
}

impl BookBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a commodity. The `template:template` sentinel is dropped.
    pub fn add_commodity(&mut self, commodity: Commodity) -> Option<CommodityHandle> {
        if commodity.is_template() {
            return None;
        }
        self.book.commodities.push(commodity);
        Some(CommodityHandle(self.book.commodities.len() - 1))
    }

    /// The first commodity added with the given key.
    #[must_use]
    pub fn find_commodity(&self, space: &str, id: &str) -> Option<CommodityHandle> {
        find_commodity(&self.book.commodities, space, id)
    }

    /// Append an account, linking it as the last child of `parent`.
    ///
    /// An account without parent becomes the root; only one is allowed.
    pub fn add_account(
        &mut self,
        mut account: Account,
        parent: Option<AccountHandle>,
    ) -> Result<AccountHandle, BookError> {
        let handle = AccountHandle(self.book.accounts.len());
        match parent {
            None => {
                if let Some(root) = self.book.root {
                    return Err(BookError::MultipleRootAccounts {
                        root: self.book.accounts[root.0].name.clone(),
                        rejected: account.name,
                    });
                }
                self.book.root = Some(handle);
            }
            Some(parent) => self.book.accounts[parent.0].children.push(handle),
        }
        account.parent = parent;
        account.children.clear();
        self.book.accounts.push(account);
        Ok(handle)
    }

    /// The root, once one has been added.
    #[must_use]
    pub const fn root(&self) -> Option<AccountHandle> {
        self.book.root
    }

    /// Number of accounts added so far.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.book.accounts.len()
    }

    /// Append a transaction.
    pub fn add_transaction(&mut self, transaction: Transaction) {
        self.book.transactions.push(transaction);
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Book {
        self.book
    }
}
