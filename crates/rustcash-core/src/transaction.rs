//! Transactions and their splits.

use serde::Serialize;
use std::fmt;

use crate::book::{AccountHandle, CommodityHandle};
use crate::{Numeric, ReconciledState, Timespec};

/// One leg of a transaction, posting a value against exactly one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    /// Reconciliation flag.
    pub reconciled_state: ReconciledState,
    /// When the split was reconciled.
    pub reconcile_date: Timespec,
    /// Value in the transaction currency.
    pub value: Numeric,
    /// Quantity in the account commodity.
    pub quantity: Numeric,
    /// Memo line.
    pub memo: String,
    /// Action text (e.g. "Buy").
    pub action: String,
    /// The account this split posts to.
    pub account: AccountHandle,
}

impl Split {
    /// Create a split whose value and quantity are both `value`.
    #[must_use]
    pub fn new(account: AccountHandle, value: Numeric) -> Self {
        Self {
            reconciled_state: ReconciledState::default(),
            reconcile_date: Timespec::unset(),
            value,
            quantity: value,
            memo: String::new(),
            action: String::new(),
            account,
        }
    }

    /// Set the quantity.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: Numeric) -> Self {
        self.quantity = quantity;
        self
    }

    /// Set the memo.
    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    /// Set the reconciliation flag.
    #[must_use]
    pub const fn with_reconciled_state(mut self, state: ReconciledState) -> Self {
        self.reconciled_state = state;
        self
    }
}

/// A `<gnc:transaction>` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Transaction currency, absent when the declared commodity was not found.
    pub currency: Option<CommodityHandle>,
    /// Check number or other reference.
    pub num: String,
    /// Date the transaction takes effect.
    pub date_posted: Timespec,
    /// Date the transaction was typed in.
    pub date_entered: Timespec,
    /// Description.
    pub description: String,
    /// Splits in document order.
    pub splits: Vec<Split>,
}

impl Transaction {
    /// Create a transaction without splits.
    #[must_use]
    pub fn new(date_posted: impl Into<Timespec>, description: impl Into<String>) -> Self {
        Self {
            currency: None,
            num: String::new(),
            date_posted: date_posted.into(),
            date_entered: Timespec::unset(),
            description: description.into(),
            splits: Vec::new(),
        }
    }

    /// Set the currency.
    #[must_use]
    pub const fn with_currency(mut self, currency: CommodityHandle) -> Self {
        self.currency = Some(currency);
        self
    }

    /// Append a split.
    #[must_use]
    pub fn with_split(mut self, split: Split) -> Self {
        self.splits.push(split);
        self
    }
}

/// Direction of money in a simple two-split transaction.
///
/// See [`Book::classify`](crate::Book::classify).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FlowKind {
    /// From an asset into an expense.
    Expense,
    /// From income into an asset.
    Income,
    /// Between two assets.
    Transfer,
    /// Any other pair of account types.
    Other,
    /// Not exactly two splits.
    MultiSplit,
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Expense => "expense",
            Self::Income => "income",
            Self::Transfer => "transfer",
            Self::Other => "other",
            Self::MultiSplit => "multi-split",
        };
        f.write_str(s)
    }
}
