//! GnuCash CLI tools.
//!
//! This crate provides command-line tools for reading GnuCash XML books:
//!
//! - `rcash-query`: Select splits by date, currency, account type or account path
//! - `rcash-report`: Statistics, commodities, account tree and transaction listings
//!
//! # Example Usage
//!
//! ```bash
//! rcash-report household.gnucash tree
//! rcash-query household.gnucash --from 2016-01-01 --to 2017-01-01 -p './/Fuel'
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
pub mod report;
