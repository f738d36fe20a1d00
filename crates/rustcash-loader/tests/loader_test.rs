//! Integration tests for the loader crate.
//!
//! The household fixture mirrors the layout GnuCash 2.6+ writes, including
//! a price database and template transactions that must not leak into the
//! book.

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use rustcash_core::{AccountType, Numeric, ReconciledState};
use rustcash_loader::{load, Decompression, LoadError, Loader};

fn fixtures_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn household() -> rustcash_core::Book {
    load(&fixtures_path("household.xml")).expect("should load household fixture")
}

/// Wrap account and transaction records in a minimal document.
fn document(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8" ?>
<gnc-v2>
<gnc:book version="2.0.0">
<gnc:commodity version="2.0.0">
  <cmdty:space>ISO4217</cmdty:space>
  <cmdty:id>EUR</cmdty:id>
</gnc:commodity>
{body}
</gnc:book>
</gnc-v2>"#
    )
}

fn account(name: &str, id: &str, parent: Option<&str>) -> String {
    let parent = parent
        .map(|p| format!("<act:parent type=\"guid\">{p}</act:parent>"))
        .unwrap_or_default();
    format!(
        "<gnc:account version=\"2.0.0\"><act:name>{name}</act:name>\
         <act:id type=\"guid\">{id}</act:id><act:type>ASSET</act:type>{parent}</gnc:account>"
    )
}

fn transaction(splits: &[(&str, &str)]) -> String {
    let splits: String = splits
        .iter()
        .map(|(account, value)| {
            format!(
                "<trn:split><split:reconciled-state>n</split:reconciled-state>\
                 <split:value>{value}</split:value><split:quantity>{value}</split:quantity>\
                 <split:account type=\"guid\">{account}</split:account></trn:split>"
            )
        })
        .collect();
    format!(
        "<gnc:transaction version=\"2.0.0\">\
         <trn:currency><cmdty:space>ISO4217</cmdty:space><cmdty:id>EUR</cmdty:id></trn:currency>\
         <trn:date-posted><ts:date>2016-01-01 00:00:00 +0000</ts:date></trn:date-posted>\
         <trn:description>t</trn:description><trn:splits>{splits}</trn:splits></gnc:transaction>"
    )
}

#[test]
fn test_load_household() {
    let book = household();

    // EUR and USD; the template sentinel is dropped, the price quote's GBP never added
    assert_eq!(book.commodities().len(), 2);
    assert!(book.find_commodity("ISO4217", "GBP").is_none());
    let eur = book.find_commodity("ISO4217", "EUR").unwrap();
    assert!(book.commodity(eur).get_quotes);
    assert_eq!(book.commodity(eur).quote_source, "currency");

    // Template root stays out
    assert_eq!(book.accounts().len(), 14);
    let root = book.root().unwrap();
    assert_eq!(book.account(root).name, "Root Account");
    assert_eq!(book.account(root).account_type, AccountType::Root);

    assert_eq!(book.transactions().len(), 5);
}

#[test]
fn test_account_tree() {
    let book = household();
    let root = book.root().unwrap();
    let top: Vec<_> = book
        .account(root)
        .children()
        .iter()
        .map(|h| book.account(*h).name.as_str())
        .collect();
    assert_eq!(top, ["Assets", "Expenses", "Income", "Liabilities", "Equity"]);

    let checking = book
        .account_handles()
        .find(|h| book.account(*h).name == "Checking Account")
        .unwrap();
    let account = book.account(checking);
    assert_eq!(account.code, "1001");
    assert_eq!(account.description, "Main bank account");
    assert_eq!(account.commodity_scu, 100);
    assert!(!account.non_standard_scu);
    assert_eq!(
        book.full_name(checking),
        "Assets > Current Assets > Checking Account"
    );
    assert_eq!(book.basic_type(checking), AccountType::Asset);
}

#[test]
fn test_unknown_currency_is_absent() {
    let book = household();
    let card = book
        .accounts()
        .iter()
        .find(|a| a.name == "Credit Card")
        .unwrap();
    assert_eq!(card.currency, None);
    assert!(card.non_standard_scu);
    assert_eq!(card.account_type, AccountType::Credit);
}

#[test]
fn test_unknown_transaction_currency_is_absent() {
    let xml = document(
        &[
            account("Root", "r", None),
            account("Bank", "b", Some("r")),
            transaction(&[("b", "-1"), ("r", "1")]).replace(">EUR<", ">XXX<"),
        ]
        .concat(),
    );
    let book = Loader::new().load_str(&xml).unwrap();
    assert_eq!(book.transactions().len(), 1);
    assert_eq!(book.transactions()[0].currency, None);
    assert_eq!(book.transactions()[0].splits.len(), 2);
}

#[test]
fn test_free_text_keeps_whitespace() {
    let xml = document(
        "<gnc:account><act:name>Root</act:name><act:id>\n  r\n</act:id></gnc:account>\
         <gnc:account><act:name>  Fuel  </act:name><act:id> f </act:id>\
         <act:parent type=\"guid\">\n  r\n</act:parent></gnc:account>\
         <gnc:transaction>\
         <trn:currency><cmdty:space> ISO4217 </cmdty:space><cmdty:id> EUR </cmdty:id></trn:currency>\
         <trn:description> padded </trn:description><trn:splits><trn:split>\
         <split:reconciled-state> n </split:reconciled-state><split:value> 1/2 </split:value>\
         <split:memo>  m  </split:memo><split:account> f </split:account>\
         </trn:split></trn:splits></gnc:transaction>",
    );
    let book = Loader::new().load_str(&xml).unwrap();
    assert_eq!(book.accounts()[1].name, "  Fuel  ");
    let txn = &book.transactions()[0];
    assert_eq!(txn.description, " padded ");
    assert_eq!(txn.currency, book.find_commodity("ISO4217", "EUR"));
    assert_eq!(txn.splits[0].memo, "  m  ");
    assert_eq!(txn.splits[0].value, Numeric::new(1, 2));
    assert_eq!(book.split_account(&txn.splits[0]).name, "  Fuel  ");
}

#[test]
fn test_transactions_in_document_order() {
    let book = household();
    let descriptions: Vec<_> = book
        .transactions()
        .iter()
        .map(|t| t.description.as_str())
        .collect();
    assert_eq!(
        descriptions,
        ["Salary January", "Gas station", "Supermarket", "Gas station", "Shopping"]
    );
    // Supermarket (March) comes after Gas station (June)
    assert_eq!(book.first_unsorted_transaction(), Some(2));
}

#[test]
fn test_split_fields() {
    let book = household();
    let gas = &book.transactions()[1];
    assert_eq!(gas.num, "104");
    assert_eq!(gas.date_posted.to_string(), "2016-06-15 10:59:00 +0200");
    assert_eq!(gas.splits.len(), 2);

    let bank = &gas.splits[0];
    assert_eq!(bank.value, Numeric::new(-4599, 100));
    assert_eq!(bank.quantity, Numeric::new(-4599, 100));
    assert_eq!(bank.memo, "Diesel");
    assert_eq!(bank.reconciled_state, ReconciledState::Reconciled);
    assert_eq!(bank.reconcile_date.ymd(), "2016-06-30");
    assert_eq!(book.split_account(bank).name, "Checking Account");

    let total: Numeric = gas.splits.iter().map(|s| &s.value).sum();
    assert!(total.is_zero());
}

#[test]
fn test_gzip_file() {
    let xml = std::fs::read(fixtures_path("household.xml")).unwrap();
    let mut file = tempfile::Builder::new()
        .suffix(".gnucash")
        .tempfile()
        .unwrap();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&xml).unwrap();
    file.write_all(&encoder.finish().unwrap()).unwrap();
    file.flush().unwrap();

    let book = load(file.path()).unwrap();
    assert_eq!(book.accounts().len(), 14);
    assert_eq!(book.transactions().len(), 5);

    let forced = Loader::new()
        .with_decompression(Decompression::Gzip)
        .load(file.path())
        .unwrap();
    assert_eq!(forced.transactions().len(), 5);
}

#[test]
fn test_plain_forced_on_gzip_fails() {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(document("").as_bytes()).unwrap();
    let bytes = encoder.finish().unwrap();
    let result = Loader::new()
        .with_decompression(Decompression::Plain)
        .load_reader(bytes.as_slice());
    assert!(result.is_err());
}

#[test]
fn test_multiple_root_accounts() {
    let xml = document(&[account("Root", "r1", None), account("Other", "r2", None)].concat());
    let err = Loader::new().load_str(&xml).unwrap_err();
    assert!(
        matches!(err, LoadError::MultipleRootAccounts { ref root, ref rejected } if root == "Root" && rejected == "Other"),
        "unexpected error: {err}"
    );
}

#[test]
fn test_parent_not_found() {
    let xml = document(&[account("Root", "r", None), account("Orphan", "o", Some("X"))].concat());
    let err = Loader::new().load_str(&xml).unwrap_err();
    assert!(
        matches!(err, LoadError::ParentNotFound { ref account, ref parent } if account == "o" && parent == "X"),
        "unexpected error: {err}"
    );
}

#[test]
fn test_parent_must_precede_child() {
    let xml = document(&[account("Child", "c", Some("r")), account("Root", "r", None)].concat());
    assert!(matches!(
        Loader::new().load_str(&xml),
        Err(LoadError::ParentNotFound { .. })
    ));
}

#[test]
fn test_account_not_found() {
    let xml = document(
        &[
            account("Root", "r", None),
            account("Bank", "b", Some("r")),
            transaction(&[("b", "-1"), ("ghost", "1")]),
        ]
        .concat(),
    );
    let err = Loader::new().load_str(&xml).unwrap_err();
    assert!(
        matches!(err, LoadError::AccountNotFound { ref id } if id == "ghost"),
        "unexpected error: {err}"
    );
}

#[test]
fn test_missing_account_name() {
    let xml = document("<gnc:account><act:id>x</act:id></gnc:account>");
    assert!(matches!(
        Loader::new().load_str(&xml),
        Err(LoadError::MissingRequiredField {
            element: "account",
            field: "name"
        })
    ));
}

#[test]
fn test_malformed_numeric_aborts() {
    let xml = document(
        &[
            account("Root", "r", None),
            transaction(&[("r", "12/abc")]),
        ]
        .concat(),
    );
    assert!(matches!(
        Loader::new().load_str(&xml),
        Err(LoadError::Numeric(_))
    ));
}

#[test]
fn test_malformed_date_aborts() {
    let xml = document(
        &[
            account("Root", "r", None),
            "<gnc:transaction><trn:date-posted><ts:date>2016-01-01</ts:date></trn:date-posted></gnc:transaction>"
                .to_string(),
        ]
        .concat(),
    );
    assert!(matches!(
        Loader::new().load_str(&xml),
        Err(LoadError::Timespec(_))
    ));
}

#[test]
fn test_invalid_reconciled_state() {
    let xml = document(
        &[
            account("Root", "r", None),
            transaction(&[("r", "1")]).replace(">n<", ">z<"),
        ]
        .concat(),
    );
    assert!(matches!(
        Loader::new().load_str(&xml),
        Err(LoadError::ReconciledState(_))
    ));
}

#[test]
fn test_account_only_export() {
    // Files written by "Export Chart of Accounts" have no book element.
    let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<gnc-v2>
<gnc:count-data cd:type="commodity">1</gnc:count-data>
<gnc:commodity version="2.0.0">
  <cmdty:space>ISO4217</cmdty:space>
  <cmdty:id>EUR</cmdty:id>
</gnc:commodity>
<gnc:account version="2.0.0">
  <act:name>Root Account</act:name>
  <act:id type="guid">r</act:id>
  <act:type>ROOT</act:type>
</gnc:account>
<gnc:account version="2.0.0">
  <act:name>Assets</act:name>
  <act:id type="guid">a</act:id>
  <act:type>ASSET</act:type>
  <act:commodity>
    <cmdty:space>ISO4217</cmdty:space>
    <cmdty:id>EUR</cmdty:id>
  </act:commodity>
  <act:parent type="guid">r</act:parent>
</gnc:account>
</gnc-v2>"#;
    let book = Loader::new().load_str(xml).unwrap();
    assert_eq!(book.accounts().len(), 2);
    assert_eq!(book.accounts()[1].currency, book.find_commodity("ISO4217", "EUR"));
    assert!(book.transactions().is_empty());
}

#[test]
fn test_duplicate_commodity_first_wins() {
    let xml = document(
        "<gnc:commodity><cmdty:space>ISO4217</cmdty:space><cmdty:id>EUR</cmdty:id>\
         <cmdty:name>second</cmdty:name></gnc:commodity>",
    );
    let book = Loader::new().load_str(&xml).unwrap();
    assert_eq!(book.commodities().len(), 2);
    let eur = book.find_commodity("ISO4217", "EUR").unwrap();
    assert_eq!(eur.index(), 0);
    assert_eq!(book.commodity(eur).name, "");
}
