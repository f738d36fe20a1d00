//! Text and JSON rendering of books and query results.
//!
//! Every writer is generic over [`Write`] so the commands can target
//! stdout while tests render into a `Vec<u8>`.

use rustcash_core::{AccountHandle, Book, Numeric, Transaction};
use rustcash_query::QueryMatch;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

/// Decimal rendering for power-of-ten denominators, `num/den` otherwise.
pub fn format_value(value: &Numeric) -> String {
    let mut den = value.denominator();
    while den > 1 && den % 10 == 0 {
        den /= 10;
    }
    match value.to_decimal() {
        Some(d) if den == 1 => d.normalize().to_string(),
        _ => value.to_string(),
    }
}

/// Entity counts and the date-order check.
pub fn write_stats<W: Write>(book: &Book, file: &Path, writer: &mut W) -> io::Result<()> {
    let splits: usize = book.transactions().iter().map(|t| t.splits.len()).sum();

    writeln!(writer, "Book Statistics")?;
    writeln!(writer, "{}", "=".repeat(40))?;
    writeln!(writer)?;
    writeln!(writer, "File:         {}", file.display())?;
    writeln!(writer, "Commodities:  {}", book.commodities().len())?;
    writeln!(writer, "Accounts:     {}", book.accounts().len())?;
    writeln!(writer, "Transactions: {}", book.transactions().len())?;
    writeln!(writer, "Splits:       {splits}")?;

    let by_date = book.transactions_by_date_posted();
    if let (Some(first), Some(last)) = (by_date.first(), by_date.last()) {
        writeln!(
            writer,
            "Date range:   {} to {}",
            first.date_posted.ymd(),
            last.date_posted.ymd()
        )?;
    }

    match book.first_unsorted_transaction() {
        None => writeln!(writer, "Date order:   sorted")?,
        Some(i) => writeln!(
            writer,
            "Date order:   out of order at transaction {} ({:?})",
            i + 1,
            book.transactions()[i].description
        )?,
    }
    Ok(())
}

/// One line per commodity: `space:id`, then name and fraction if known.
pub fn write_commodities<W: Write>(book: &Book, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "Commodities ({} total)", book.commodities().len())?;
    writeln!(writer, "{}", "=".repeat(40))?;
    writeln!(writer)?;

    for commodity in book.commodities() {
        write!(writer, "{commodity}")?;
        if !commodity.name.is_empty() {
            write!(writer, "  {}", commodity.name)?;
        }
        if !commodity.fraction.is_empty() {
            write!(writer, "  1/{}", commodity.fraction)?;
        }
        if commodity.get_quotes {
            write!(writer, "  quotes:{}", commodity.quote_source)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// The account tree, two spaces of indentation per level.
pub fn write_tree<W: Write>(book: &Book, writer: &mut W) -> io::Result<()> {
    match book.root() {
        Some(root) => write_subtree(book, root, 0, writer),
        None => writeln!(writer, "(no accounts)"),
    }
}

fn write_subtree<W: Write>(
    book: &Book,
    handle: AccountHandle,
    depth: usize,
    writer: &mut W,
) -> io::Result<()> {
    let account = book.account(handle);
    write!(
        writer,
        "{}[{}] {}",
        "  ".repeat(depth),
        account.account_type,
        account.name
    )?;
    if let Some(currency) = account.currency {
        write!(writer, " ({})", book.commodity(currency))?;
    }
    writeln!(writer)?;

    for child in account.children() {
        write_subtree(book, *child, depth + 1, writer)?;
    }
    Ok(())
}

/// Every transaction with its flow classification and splits.
///
/// With `by_date` the listing follows date posted; otherwise document order.
pub fn write_transactions<W: Write>(book: &Book, by_date: bool, writer: &mut W) -> io::Result<()> {
    let transactions: Vec<&Transaction> = if by_date {
        book.transactions_by_date_posted()
    } else {
        book.transactions().iter().collect()
    };

    for txn in transactions {
        write!(writer, "{} [{}]", txn.date_posted.ymd(), book.classify(txn))?;
        if !txn.num.is_empty() {
            write!(writer, " #{}", txn.num)?;
        }
        writeln!(writer, " {}", txn.description)?;

        for split in &txn.splits {
            write!(
                writer,
                "  {} {:<40} {:>12}",
                split.reconciled_state,
                book.full_name(split.account),
                format_value(&split.value)
            )?;
            if !split.memo.is_empty() {
                write!(writer, "  ; {}", split.memo)?;
            }
            writeln!(writer)?;
        }
    }
    Ok(())
}

/// A query match flattened for output.
#[derive(Debug, Serialize)]
pub struct MatchRow {
    /// Date posted as `YYYY-MM-DD`.
    pub date: String,
    /// Transaction description.
    pub description: String,
    /// Full name of the split's account.
    pub account: String,
    /// Split value.
    pub value: Numeric,
    /// Split memo.
    pub memo: String,
    /// Reconcile flag letter.
    pub reconciled: char,
}

impl MatchRow {
    /// Flatten a match against its book.
    pub fn new(book: &Book, m: &QueryMatch<'_>) -> Self {
        Self {
            date: m.transaction.date_posted.ymd(),
            description: m.transaction.description.clone(),
            account: book.full_name(m.account),
            value: m.split.value,
            memo: m.split.memo.clone(),
            reconciled: m.split.reconciled_state.as_char(),
        }
    }
}

/// Query results as aligned text, followed by the total value.
pub fn write_matches_text<W: Write>(
    book: &Book,
    matches: &[QueryMatch<'_>],
    writer: &mut W,
) -> io::Result<()> {
    for m in matches {
        let row = MatchRow::new(book, m);
        write!(
            writer,
            "{} {} {:<30} {:<40} {:>12}",
            row.date,
            row.reconciled,
            row.description,
            row.account,
            format_value(&row.value)
        )?;
        if !row.memo.is_empty() {
            write!(writer, "  ; {}", row.memo)?;
        }
        writeln!(writer)?;
    }

    let total: Numeric = matches.iter().map(|m| &m.split.value).sum();
    writeln!(writer)?;
    writeln!(
        writer,
        "{} match(es), total {}",
        matches.len(),
        format_value(&total)
    )?;
    Ok(())
}

/// Query results as a pretty-printed JSON object.
pub fn write_matches_json<W: Write>(
    book: &Book,
    matches: &[QueryMatch<'_>],
    writer: &mut W,
) -> io::Result<()> {
    let rows: Vec<MatchRow> = matches.iter().map(|m| MatchRow::new(book, m)).collect();
    let total: Numeric = matches.iter().map(|m| &m.split.value).sum();
    let output = serde_json::json!({
        "count": rows.len(),
        "total": total,
        "matches": rows,
    });
    writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}
