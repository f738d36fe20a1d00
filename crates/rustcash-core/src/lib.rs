//! Core types for rustcash
//!
//! This crate provides the in-memory model of a GnuCash book:
//!
//! - [`Numeric`] - An exact rational amount as stored by GnuCash
//! - [`Timespec`] - An optional timestamp with its recorded offset
//! - [`AccountType`] and [`ReconciledState`] - The enumerations of the file format
//! - [`Commodity`], [`Account`], [`Transaction`] and [`Split`] - The records
//! - [`Book`] - The immutable arena tying them together, built with [`BookBuilder`]
//!
//! # Example
//!
//! ```
//! use rustcash_core::{Account, AccountType, BookBuilder, Numeric, Split, Transaction};
//!
//! let mut builder = BookBuilder::new();
//! let root = builder.add_account(Account::new("Root", AccountType::Root), None).unwrap();
//! let bank = builder.add_account(Account::new("Bank", AccountType::Bank), Some(root)).unwrap();
//! let fuel = builder.add_account(Account::new("Fuel", AccountType::Expense), Some(root)).unwrap();
//!
//! let date = "2016-06-15 10:59:00 +0200".parse::<rustcash_core::Timespec>().unwrap();
//! builder.add_transaction(
//!     Transaction::new(date, "Gas station")
//!         .with_split(Split::new(bank, "-4599/100".parse().unwrap()))
//!         .with_split(Split::new(fuel, Numeric::new(4599, 100))),
//! );
//!
//! let book = builder.build();
//! let total: Numeric = book.transactions()[0].splits.iter().map(|s| &s.value).sum();
//! assert!(total.is_zero());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod account_type;
pub mod book;
pub mod commodity;
pub mod numeric;
pub mod reconciled;
pub mod timespec;
pub mod transaction;

pub use account::Account;
pub use account_type::{AccountType, UnknownAccountType};
pub use book::{AccountHandle, Book, BookBuilder, BookError, CommodityHandle};
pub use commodity::Commodity;
pub use numeric::{gcd, lcm, Numeric, ParseNumericError};
pub use reconciled::{ParseReconciledStateError, ReconciledState};
pub use timespec::{ParseTimespecError, Timespec, TIMESPEC_FORMAT};
pub use transaction::{FlowKind, Split, Transaction};

// Re-export commonly used external types
pub use chrono::{DateTime, FixedOffset};
pub use rust_decimal::Decimal;
