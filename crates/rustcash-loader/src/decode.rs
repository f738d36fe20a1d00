//! Decoders for the individual record elements.
//!
//! Every decoder is entered right after the record's start tag and returns
//! after consuming its end tag. Children it does not know (slots, lots, ids
//! of transactions and splits) are skipped with all their descendants.

use std::collections::HashMap;

use rustcash_core::{
    Account, AccountHandle, AccountType, BookBuilder, Commodity, CommodityHandle, Numeric,
    ReconciledState, Split, Timespec, Transaction,
};
use tracing::debug;

use crate::events::{EventSource, XmlEvent};
use crate::LoadError;

/// Call `f` for the start tag of every direct child of the current element.
///
/// `f` must consume the child it is handed.
pub(crate) fn for_each_child<S, F>(src: &mut S, mut f: F) -> Result<(), LoadError>
where
    S: EventSource + ?Sized,
    F: FnMut(&mut S, &str) -> Result<(), LoadError>,
{
    loop {
        match src.next_event()? {
            XmlEvent::Start(name) => f(&mut *src, &name)?,
            XmlEvent::End(_) => return Ok(()),
            XmlEvent::Text(_) => {}
            XmlEvent::Eof => return Err(LoadError::UnexpectedEof),
        }
    }
}

/// Lookups against what has been loaded so far.
pub(crate) struct Resolver<'a> {
    pub(crate) builder: &'a BookBuilder,
    pub(crate) accounts: &'a HashMap<String, AccountHandle>,
}

impl Resolver<'_> {
    /// Permissive: an unknown commodity is simply absent.
    fn currency(&self, key: Option<(String, String)>, owner: &str) -> Option<CommodityHandle> {
        let (space, id) = key?;
        let found = self.builder.find_commodity(&space, &id);
        if found.is_none() {
            debug!(%space, %id, owner, "currency not found, leaving it unset");
        }
        found
    }

    /// Strict: a split must post to a known account.
    fn account(&self, id: &str) -> Result<AccountHandle, LoadError> {
        self.accounts
            .get(id)
            .copied()
            .ok_or_else(|| LoadError::AccountNotFound { id: id.to_string() })
    }
}

/// Text of an identifier-like element, surrounding whitespace removed.
///
/// Free text (names, descriptions, memos) is kept as written.
fn read_key<S: EventSource + ?Sized>(src: &mut S) -> Result<String, LoadError> {
    Ok(src.read_text()?.trim().to_string())
}

/// `(space, id)` of an embedded commodity reference.
fn decode_commodity_key<S: EventSource + ?Sized>(
    src: &mut S,
) -> Result<Option<(String, String)>, LoadError> {
    let mut space = None;
    let mut id = None;
    for_each_child(src, |src, name| {
        match name {
            "space" => space = Some(read_key(src)?),
            "id" => id = Some(read_key(src)?),
            _ => src.skip_element()?,
        }
        Ok(())
    })?;
    Ok(space.zip(id))
}

fn decode_timespec<S: EventSource + ?Sized>(src: &mut S) -> Result<Timespec, LoadError> {
    let mut ts = Timespec::unset();
    for_each_child(src, |src, name| {
        match name {
            "date" => ts = src.read_text()?.parse()?,
            _ => src.skip_element()?,
        }
        Ok(())
    })?;
    Ok(ts)
}

fn decode_numeric<S: EventSource + ?Sized>(src: &mut S) -> Result<Numeric, LoadError> {
    Ok(src.read_text()?.trim().parse()?)
}

/// A `<gnc:commodity>` record.
pub(crate) fn decode_commodity<S: EventSource + ?Sized>(
    src: &mut S,
) -> Result<Commodity, LoadError> {
    let mut space = None;
    let mut id = None;
    let mut commodity = Commodity::default();
    for_each_child(src, |src, name| {
        match name {
            "space" => space = Some(read_key(src)?),
            "id" => id = Some(read_key(src)?),
            "name" => commodity.name = src.read_text()?,
            "xcode" => commodity.xcode = src.read_text()?,
            "fraction" => commodity.fraction = read_key(src)?,
            "get_quotes" => {
                src.skip_element()?;
                commodity.get_quotes = true;
            }
            "quote_source" => commodity.quote_source = src.read_text()?,
            "quote_tz" => commodity.quote_tz = src.read_text()?,
            _ => src.skip_element()?,
        }
        Ok(())
    })?;
    commodity.space = space.ok_or(LoadError::MissingRequiredField {
        element: "commodity",
        field: "space",
    })?;
    commodity.id = id.ok_or(LoadError::MissingRequiredField {
        element: "commodity",
        field: "id",
    })?;
    Ok(commodity)
}

/// An account as read from the document, before it is linked into the tree.
#[derive(Debug)]
pub(crate) struct AccountRecord {
    pub(crate) id: String,
    pub(crate) parent_id: String,
    pub(crate) account: Account,
}

/// A `<gnc:account>` record.
pub(crate) fn decode_account<S: EventSource + ?Sized>(
    src: &mut S,
    resolver: &Resolver<'_>,
) -> Result<AccountRecord, LoadError> {
    let mut id = String::new();
    let mut parent_id = String::new();
    let mut currency = None;
    let mut account = Account::new("", AccountType::None);
    for_each_child(src, |src, name| {
        match name {
            "name" => account.name = src.read_text()?,
            "id" => id = read_key(src)?,
            "type" => account.account_type = AccountType::from_token(src.read_text()?.trim()),
            "commodity" => currency = decode_commodity_key(src)?,
            "commodity-scu" => {
                let text = src.read_text()?;
                account.commodity_scu =
                    text.trim()
                        .parse()
                        .map_err(|source| LoadError::InvalidInteger {
                            field: "commodity-scu",
                            value: text.clone(),
                            source,
                        })?;
            }
            "non-standard-scu" => {
                src.skip_element()?;
                account.non_standard_scu = true;
            }
            "code" => account.code = src.read_text()?,
            "description" => account.description = src.read_text()?,
            "parent" => parent_id = read_key(src)?,
            _ => src.skip_element()?,
        }
        Ok(())
    })?;
    if id.is_empty() {
        return Err(LoadError::MissingRequiredField {
            element: "account",
            field: "id",
        });
    }
    if account.name.is_empty() {
        return Err(LoadError::MissingRequiredField {
            element: "account",
            field: "name",
        });
    }
    account.currency = resolver.currency(currency, &id);
    Ok(AccountRecord {
        id,
        parent_id,
        account,
    })
}

fn decode_split<S: EventSource + ?Sized>(
    src: &mut S,
    resolver: &Resolver<'_>,
) -> Result<Split, LoadError> {
    let mut account_id = None;
    let mut reconciled_state = ReconciledState::default();
    let mut reconcile_date = Timespec::unset();
    let mut value = Numeric::default();
    let mut quantity = Numeric::default();
    let mut memo = String::new();
    let mut action = String::new();
    for_each_child(src, |src, name| {
        match name {
            "reconciled-state" => reconciled_state = src.read_text()?.trim().parse()?,
            "reconcile-date" => reconcile_date = decode_timespec(src)?,
            "value" => value = decode_numeric(src)?,
            "quantity" => quantity = decode_numeric(src)?,
            "memo" => memo = src.read_text()?,
            "action" => action = src.read_text()?,
            "account" => account_id = Some(read_key(src)?),
            _ => src.skip_element()?,
        }
        Ok(())
    })?;
    let account_id = account_id.ok_or(LoadError::MissingRequiredField {
        element: "split",
        field: "account",
    })?;
    let mut split = Split::new(resolver.account(&account_id)?, value)
        .with_quantity(quantity)
        .with_reconciled_state(reconciled_state)
        .with_memo(memo);
    split.reconcile_date = reconcile_date;
    split.action = action;
    Ok(split)
}

/// A `<gnc:transaction>` record with its splits.
pub(crate) fn decode_transaction<S: EventSource + ?Sized>(
    src: &mut S,
    resolver: &Resolver<'_>,
) -> Result<Transaction, LoadError> {
    let mut currency = None;
    let mut transaction = Transaction::new(Timespec::unset(), "");
    for_each_child(src, |src, name| {
        match name {
            "currency" => currency = decode_commodity_key(src)?,
            "num" => transaction.num = src.read_text()?,
            "date-posted" => transaction.date_posted = decode_timespec(src)?,
            "date-entered" => transaction.date_entered = decode_timespec(src)?,
            "description" => transaction.description = src.read_text()?,
            "splits" => for_each_child(src, |src, name| {
                if name == "split" {
                    transaction.splits.push(decode_split(src, resolver)?);
                } else {
                    src.skip_element()?;
                }
                Ok(())
            })?,
            _ => src.skip_element()?,
        }
        Ok(())
    })?;
    transaction.currency = resolver.currency(currency, &transaction.description);
    Ok(transaction)
}
