//! Accounts of the chart of accounts.

use crate::book::{AccountHandle, CommodityHandle};
use crate::AccountType;

/// A `<gnc:account>` record.
///
/// Tree links are handles into the owning [`Book`](crate::Book) and are only
/// set by [`BookBuilder::add_account`](crate::BookBuilder::add_account).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Account type.
    pub account_type: AccountType,
    /// Name of this node (not the full path).
    pub name: String,
    /// Free text description.
    pub description: String,
    /// Account code.
    pub code: String,
    /// Currency, absent when the declared commodity was not found.
    pub currency: Option<CommodityHandle>,
    /// Smallest commodity unit, usually 100.
    pub commodity_scu: i32,
    /// Whether the account overrides the commodity's SCU.
    pub non_standard_scu: bool,
    pub(crate) parent: Option<AccountHandle>,
    pub(crate) children: Vec<AccountHandle>,
}

impl Account {
    /// Create a detached account.
    #[must_use]
    pub fn new(name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            account_type,
            name: name.into(),
            description: String::new(),
            code: String::new(),
            currency: None,
            commodity_scu: 0,
            non_standard_scu: false,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Set the currency.
    #[must_use]
    pub const fn with_currency(mut self, currency: CommodityHandle) -> Self {
        self.currency = Some(currency);
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The parent account, `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<AccountHandle> {
        self.parent
    }

    /// Children in declaration order.
    #[must_use]
    pub fn children(&self) -> &[AccountHandle] {
        &self.children
    }

    /// Whether this account has no parent.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BookBuilder;

    #[test]
    fn test_detached_account() {
        let account = Account::new("Checking Account", AccountType::Bank)
            .with_description("Main bank account");
        assert_eq!(account.description, "Main bank account");
        assert!(account.code.is_empty());
        assert_eq!(account.currency, None);
        assert!(account.is_root());
        assert!(account.children().is_empty());
    }

    #[test]
    fn test_links_set_by_builder() {
        let mut b = BookBuilder::new();
        let root = b
            .add_account(Account::new("Root Account", AccountType::Root), None)
            .unwrap();
        let bank = b
            .add_account(
                Account::new("Bank", AccountType::Bank).with_description("Savings"),
                Some(root),
            )
            .unwrap();
        let book = b.build();
        assert_eq!(book.account(root).children(), [bank]);
        assert_eq!(book.account(bank).parent(), Some(root));
        assert!(!book.account(bank).is_root());
        assert_eq!(book.account(bank).description, "Savings");
    }
}
