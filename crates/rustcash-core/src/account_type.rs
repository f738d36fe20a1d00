//! Account classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The type GnuCash assigns to every account (`<act:type>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccountType {
    /// No type, also used for unrecognised type tokens.
    #[default]
    None,
    /// Bank account.
    Bank,
    /// Cash in hand.
    Cash,
    /// Credit card.
    Credit,
    /// Generic asset.
    Asset,
    /// Generic liability.
    Liability,
    /// Stock holding.
    Stock,
    /// Mutual fund holding.
    Mutual,
    /// Currency trading account.
    Currency,
    /// Income.
    Income,
    /// Expense.
    Expense,
    /// Equity.
    Equity,
    /// Accounts receivable.
    Receivable,
    /// Accounts payable.
    Payable,
    /// The top of the account tree.
    Root,
    /// Trading account.
    Trading,
    /// Checking account.
    Checking,
    /// Savings account.
    Savings,
    /// Money market account.
    MoneyMarket,
    /// Credit line.
    CreditLine,
}

/// Error returned by [`AccountType::from_str`] for an unknown name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown account type {0:?}")]
pub struct UnknownAccountType(pub String);

impl AccountType {
    /// Every account type, in document enumeration order.
    pub const ALL: [Self; 20] = [
        Self::None,
        Self::Bank,
        Self::Cash,
        Self::Credit,
        Self::Asset,
        Self::Liability,
        Self::Stock,
        Self::Mutual,
        Self::Currency,
        Self::Income,
        Self::Expense,
        Self::Equity,
        Self::Receivable,
        Self::Payable,
        Self::Root,
        Self::Trading,
        Self::Checking,
        Self::Savings,
        Self::MoneyMarket,
        Self::CreditLine,
    ];

    /// Map a document token (`"BANK"`, `"MONEYMRKT"`, ...) to a type.
    ///
    /// Unknown tokens give [`AccountType::None`]; this never fails.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.token() == token)
            .unwrap_or(Self::None)
    }

    /// The upper-case token written in GnuCash files.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Bank => "BANK",
            Self::Cash => "CASH",
            Self::Credit => "CREDIT",
            Self::Asset => "ASSET",
            Self::Liability => "LIABILITY",
            Self::Stock => "STOCK",
            Self::Mutual => "MUTUAL",
            Self::Currency => "CURRENCY",
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
            Self::Equity => "EQUITY",
            Self::Receivable => "RECEIVABLE",
            Self::Payable => "PAYABLE",
            Self::Root => "ROOT",
            Self::Trading => "TRADING",
            Self::Checking => "CHECKING",
            Self::Savings => "SAVINGS",
            Self::MoneyMarket => "MONEYMRKT",
            Self::CreditLine => "CREDITLINE",
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Bank => "Bank",
            Self::Cash => "Cash",
            Self::Credit => "Credit",
            Self::Asset => "Asset",
            Self::Liability => "Liability",
            Self::Stock => "Stock",
            Self::Mutual => "Mutual",
            Self::Currency => "Currency",
            Self::Income => "Income",
            Self::Expense => "Expense",
            Self::Equity => "Equity",
            Self::Receivable => "Receivable",
            Self::Payable => "Payable",
            Self::Root => "Root",
            Self::Trading => "Trading",
            Self::Checking => "Checking",
            Self::Savings => "Savings",
            Self::MoneyMarket => "MoneyMrkt",
            Self::CreditLine => "CreditLine",
        }
    }

    /// Register column label for a positive value.
    #[must_use]
    pub const fn plus_label(self) -> &'static str {
        match self {
            Self::None | Self::Root => "",
            Self::Bank => "Deposit",
            Self::Cash => "Receive",
            Self::Liability | Self::Equity => "Decrease",
            Self::Income => "Charge",
            Self::Expense => "Expense",
            _ => "Increase",
        }
    }

    /// Register column label for a negative value.
    #[must_use]
    pub const fn minus_label(self) -> &'static str {
        match self {
            Self::None | Self::Root => "",
            Self::Bank => "Withdrawal",
            Self::Cash => "Spend",
            Self::Liability | Self::Equity => "Increase",
            Self::Income => "Income",
            Self::Expense => "Rebate",
            _ => "Decrease",
        }
    }

    /// Whether balances of this type are conventionally shown with the sign flipped.
    #[must_use]
    pub const fn invert_values(self) -> bool {
        matches!(self, Self::Liability | Self::Income | Self::Equity)
    }

    /// Whether this is the root account type.
    #[must_use]
    pub const fn is_root(self) -> bool {
        matches!(self, Self::Root)
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Strict, case-insensitive parse of either the token or the label.
impl FromStr for AccountType {
    type Err = UnknownAccountType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.token().eq_ignore_ascii_case(s) || t.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownAccountType(s.to_string()))
    }
}
