//! Queries over a loaded GnuCash book.
//!
//! This crate answers questions such as "all splits posted against the fuel
//! account in 2016" against a [`Book`](rustcash_core::Book).
//!
//! # Overview
//!
//! - [`CompiledPath`] - A small path language (`.//Fuel`, `Expenses/*[1]`)
//!   evaluated over any [`PathNode`] tree
//! - [`AccountNode`] and [`find_accounts`] - The chart of accounts as such a
//!   tree, matching steps as name substrings
//! - [`Query`] - Composable transaction, split and account predicates
//!
//! # Example
//!
//! ```
//! use rustcash_core::{Account, AccountType, BookBuilder};
//! use rustcash_query::find_accounts;
//!
//! let mut builder = BookBuilder::new();
//! let root = builder.add_account(Account::new("Root", AccountType::Root), None).unwrap();
//! let car = builder.add_account(Account::new("Car", AccountType::Expense), Some(root)).unwrap();
//! let fuel = builder.add_account(Account::new("Fuel Costs", AccountType::Expense), Some(car)).unwrap();
//! let book = builder.build();
//!
//! assert_eq!(find_accounts(&book, ".//Fuel").unwrap(), vec![fuel]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account_path;
pub mod error;
pub mod filter;
pub mod path;

pub use account_path::{find_accounts, find_accounts_from, AccountNode};
pub use error::{PathError, PathErrorKind, QueryError};
pub use filter::{AccountFilter, Query, QueryMatch, SplitFilter, TransactionFilter};
pub use path::{CompiledPath, PathNode};
