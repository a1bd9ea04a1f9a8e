//! Tier 1: ruled-table extraction.
//!
//! Parses the tables the PDF access layer recovers from ruling lines,
//! mapping raw column headers onto canonical fields through a fixed alias
//! table. Returns nothing for borderless statements, which routes them to
//! the word-geometry tier.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::account::parse_account_info_table;
use crate::error::Result;
use crate::models::{AccountInfo, Transaction, TransactionType};
use crate::normalize::enrich::extract_counterparty;
use crate::normalize::{normalise_date, parse_amount};
use crate::pdf::PdfAccess;

lazy_static! {
    /// Raw header cell → canonical field.
    static ref HEADER_ALIASES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        for (alias, canonical) in [
            ("date", "transaction_date"),
            ("txn date", "transaction_date"),
            ("trans date", "transaction_date"),
            ("transaction date", "transaction_date"),
            ("posting date", "transaction_date"),
            ("date & time", "transaction_date"),
            ("date and time", "transaction_date"),
            ("value date", "value_date"),
            ("val date", "value_date"),
            ("effective date", "value_date"),
            ("description", "description"),
            ("particulars", "description"),
            ("details", "description"),
            ("narrative", "description"),
            ("remarks", "description"),
            ("transaction details", "description"),
            ("counterparty", "counterparty"),
            ("debit", "debit"),
            ("withdrawal", "debit"),
            ("withdrawals", "debit"),
            ("dr", "debit"),
            ("debit amount", "debit"),
            ("payments", "debit"),
            ("credit", "credit"),
            ("deposit", "credit"),
            ("deposits", "credit"),
            ("cr", "credit"),
            ("credit amount", "credit"),
            ("receipts", "credit"),
            ("balance", "balance"),
            ("bal", "balance"),
            ("running balance", "balance"),
            ("closing balance", "balance"),
            ("available balance", "balance"),
            ("ledger balance", "balance"),
            ("cheque", "cheque"),
            ("chq", "cheque"),
            ("cheque no", "cheque"),
            ("reference", "reference"),
            ("ref", "reference"),
            ("ref no", "reference"),
        ] {
            m.insert(alias, canonical);
        }
        m
    };

    static ref CCY_SUFFIX: Regex = Regex::new(r"\s*\([a-z]{3}\)\s*$").unwrap();
    static ref LEADING_DIGIT: Regex = Regex::new(r"^\d").unwrap();
}

/// Result of the table tier: the ledger plus whatever the header table
/// said about the account.
pub struct TableTier {
    pub transactions: Vec<Transaction>,
    pub account_info: AccountInfo,
}

/// Map a raw header cell to its canonical field name.
fn normalise_header(raw: &str) -> Option<&'static str> {
    let cleaned: String = raw.chars().filter(|c| c.is_ascii()).collect();
    let cleaned = cleaned.to_lowercase().replace('\n', " ");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        return None;
    }
    if let Some(hit) = HEADER_ALIASES.get(cleaned.as_str()) {
        return Some(hit);
    }
    let no_ccy = CCY_SUFFIX.replace(&cleaned, "").trim().to_string();
    if let Some(hit) = HEADER_ALIASES.get(no_ccy.as_str()) {
        return Some(hit);
    }
    if cleaned == "#" || cleaned == "no" || cleaned == "no." {
        return Some("sequence");
    }
    None
}

/// Run the table tier over the whole document.
///
/// Returns `None` when the PDF is not table-structured: no tables on the
/// first pages, no table with an amount + balance column, or repeated
/// header-only tables (borderless data under a ruled header).
pub fn extract_tables(pdf: &dyn PdfAccess, currency: &str) -> Result<Option<TableTier>> {
    let mut transactions: Vec<Transaction> = Vec::new();
    let mut account_info = AccountInfo::default();
    let mut found_account_table = false;
    let mut header_only = 0usize;

    for page in 0..pdf.page_count() {
        let tables = pdf.page_tables(page)?;
        if tables.is_empty() {
            if page < 2 && transactions.is_empty() {
                info!("no tables on first pages; PDF is not table-structured");
                return Ok(None);
            }
            continue;
        }

        for table in &tables {
            let Some(header_row) = table.first() else { continue };
            let mapped: Vec<Option<&'static str>> =
                header_row.iter().map(|h| normalise_header(h)).collect();

            if page == 0 && !found_account_table {
                let all_cells = table
                    .iter()
                    .flat_map(|row| row.iter())
                    .map(|c| c.to_lowercase())
                    .collect::<Vec<_>>()
                    .join(" ");
                if all_cells.contains("opening balance") || all_cells.contains("account number") {
                    account_info = parse_account_info_table(table);
                    found_account_table = true;
                    continue;
                }
            }

            let has = |name: &str| mapped.iter().any(|m| *m == Some(name));
            if !has("transaction_date") || !has("balance") || (!has("debit") && !has("credit")) {
                continue;
            }

            if table.len() < 2 {
                header_only += 1;
                if header_only >= 2 {
                    info!("tables have headers but no data rows; deferring to word extraction");
                    return Ok(None);
                }
                continue;
            }

            debug!(page = page + 1, rows = table.len() - 1, "transaction table found");

            for row in &table[1..] {
                if let Some(txn) = parse_row(row, &mapped, page, currency) {
                    transactions.push(txn);
                }
            }
        }
    }

    if transactions.is_empty() {
        return Ok(None);
    }

    inject_header_balances(&mut transactions, &account_info);

    info!(
        count = transactions.len(),
        "table extraction successful (no model calls)"
    );

    Ok(Some(TableTier { transactions, account_info }))
}

fn cell<'a>(row: &'a [String], mapped: &[Option<&'static str>], name: &str) -> Option<&'a str> {
    mapped
        .iter()
        .position(|m| *m == Some(name))
        .and_then(|i| row.get(i))
        .map(|s| s.as_str())
}

fn parse_row(
    row: &[String],
    mapped: &[Option<&'static str>],
    page: usize,
    currency: &str,
) -> Option<Transaction> {
    let date_raw = cell(row, mapped, "transaction_date").unwrap_or("").trim();
    // Continuation and summary rows carry no date.
    if !LEADING_DIGIT.is_match(date_raw) {
        return None;
    }

    let debit = cell(row, mapped, "debit").and_then(parse_amount);
    let credit = cell(row, mapped, "credit").and_then(parse_amount);
    let balance = cell(row, mapped, "balance").and_then(parse_amount);
    let desc_raw = cell(row, mapped, "description").unwrap_or("");
    let description = desc_raw.replace('\n', " ").trim().to_string();

    let (transaction_type, amount) = match (debit, credit) {
        (Some(d), None) => (TransactionType::Debit, d),
        (None, Some(c)) => (TransactionType::Credit, c),
        (Some(d), Some(c)) if d >= c => (TransactionType::Debit, d),
        (Some(_), Some(c)) => (TransactionType::Credit, c),
        (None, None) => {
            let upper = description.to_uppercase();
            let kind = if upper.contains("BALANCE B/F")
                || upper.contains("BALANCE BROUGHT")
                || upper.contains("OPENING")
            {
                TransactionType::OpeningBalance
            } else if upper.contains("BALANCE C/F")
                || upper.contains("BALANCE CARRIED")
                || upper.contains("CLOSING")
            {
                TransactionType::ClosingBalance
            } else {
                return None;
            };
            (kind, Decimal::ZERO)
        }
    };

    let value_date = cell(row, mapped, "value_date").unwrap_or("").trim();
    let date = normalise_date(value_date).or_else(|| normalise_date(date_raw));

    Some(Transaction {
        date,
        description,
        transaction_type,
        amount: amount.abs(),
        balance,
        reference: cell(row, mapped, "reference")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        counterparty: extract_counterparty(desc_raw),
        channel: None,
        category: None,
        is_cash: false,
        is_cheque: false,
        page_number: (page + 1) as u32,
        currency: currency.to_string(),
        account_section: 0,
    })
}

/// When the header table printed opening/ledger balances and the ledger
/// has no explicit opening/closing rows, synthesize them so downstream
/// scoring sees the full chain.
fn inject_header_balances(transactions: &mut Vec<Transaction>, info: &AccountInfo) {
    let balance_row = |kind: TransactionType,
                       description: &str,
                       balance: Decimal,
                       date: Option<String>,
                       currency: &str| Transaction {
        date,
        description: description.to_string(),
        transaction_type: kind,
        amount: Decimal::ZERO,
        balance: Some(balance),
        reference: None,
        counterparty: None,
        channel: None,
        category: None,
        is_cash: false,
        is_cheque: false,
        page_number: 1,
        currency: currency.to_string(),
        account_section: 0,
    };

    let currency = transactions
        .first()
        .map(|t| t.currency.clone())
        .unwrap_or_else(|| "SGD".to_string());

    if let Some(opening) = info.opening_balance {
        let present = transactions
            .iter()
            .any(|t| t.transaction_type == TransactionType::OpeningBalance);
        if !present {
            let date = info.opening_date.as_deref().and_then(normalise_date);
            transactions.insert(
                0,
                balance_row(
                    TransactionType::OpeningBalance,
                    "OPENING BALANCE",
                    opening,
                    date,
                    &currency,
                ),
            );
        }
    }

    if let Some(closing) = info.closing_balance {
        let present = transactions
            .iter()
            .any(|t| t.transaction_type == TransactionType::ClosingBalance);
        if !present {
            let date = info.closing_date.as_deref().and_then(normalise_date);
            transactions.push(balance_row(
                TransactionType::ClosingBalance,
                "CLOSING BALANCE",
                closing,
                date,
                &currency,
            ));
        }
    }
}
