//! Tier 2: word-geometry extraction for borderless statements.
//!
//! Discovers a column layout from the header row, assigns every word below
//! it to a column by x-midpoint, and assembles rows with a small state
//! machine that understands description continuations, HSBC
//! sub-transactions, opening/closing markers, currency sections and
//! per-page summaries.

use tracing::{debug, info};

use super::columns::{self, ColumnKind, ColumnLayout};
use super::patterns::{
    is_currency_code, BALANCE_MARKER, CLOSING_MARKER, CODE_ONLY_ROW, DATE_ROW, FOOTER_ROW,
    HSBC_SUMMARY, OPENING_MARKER, SUMMARY_ROW,
};
use crate::error::Result;
use crate::models::{Transaction, TransactionType};
use crate::normalize::{normalise_date, quick_chain_score, scan_amount};
use crate::pdf::{PageWord, PdfAccess};

/// Fewer assembled rows than this abandons the tier (falls through to the
/// model tier).
pub const MIN_ROWS: usize = 3;

/// Movements sampled by the reverse-chronology heuristic.
const REVERSE_PROBE: usize = 20;

/// A row under assembly: raw column texts, before amount/date parsing.
#[derive(Debug, Clone, Default)]
struct RawRow {
    txn_date: String,
    value_date: String,
    description: String,
    counterparty: String,
    withdrawal: String,
    deposit: String,
    balance: String,
    currency: Option<String>,
    section: u32,
    page: u32,
}

/// Currency-section tracker, shared across pages.
struct SectionState {
    currency: Option<String>,
    section: u32,
    /// A closing marker was seen and no boundary has consumed it yet.
    pending_break: bool,
}

impl SectionState {
    fn switch(&mut self, code: &str, page: usize) {
        if self.currency.as_deref() != Some(code) {
            self.currency = Some(code.to_string());
            self.section += 1;
            self.pending_break = false;
            info!(page = page + 1, currency = code, section = self.section, "new currency section");
        }
    }

    fn note_closing(&mut self) {
        self.pending_break = true;
    }

    /// A BROUGHT FORWARD after a CARRIED FORWARD opens a new section,
    /// unless a currency marker already did.
    fn open_section(&mut self) {
        if self.pending_break {
            self.section += 1;
            self.pending_break = false;
        }
    }
}

/// Run the word-geometry tier. `currency_hint` seeds the first section's
/// currency (usually from the account header).
pub fn extract_words(
    pdf: &dyn PdfAccess,
    currency_hint: Option<String>,
) -> Result<Option<Vec<Transaction>>> {
    // Base layout from the first few pages; later pages re-discover their
    // own header and fall back to this one.
    let mut base_layout: Option<ColumnLayout> = None;
    for page in 0..pdf.page_count().min(5) {
        let words = pdf.page_words(page)?;
        if let Some(layout) = columns::discover_layout(&words, pdf.page_width(page)) {
            base_layout = Some(layout);
            break;
        }
    }
    let Some(base_layout) = base_layout else {
        info!("no column header discovered; PDF is not word-extractable");
        return Ok(None);
    };

    debug!(
        columns = base_layout.spans.len(),
        header_y = base_layout.header_y,
        "column layout discovered"
    );

    let mut state =
        SectionState { currency: currency_hint.clone(), section: 0, pending_break: false };
    let mut raws: Vec<RawRow> = Vec::new();

    for page in 0..pdf.page_count() {
        let text = pdf.page_text(page).unwrap_or_default();
        let words = pdf.page_words(page)?;
        if !is_transaction_page(&text, &words, pdf.page_width(page)) {
            continue;
        }

        // Aspire shifts its header between page 1 and the rest, so each
        // page re-runs discovery and inherits the base layout otherwise.
        let page_layout = columns::discover_layout(&words, pdf.page_width(page));
        let layout = page_layout.as_ref().unwrap_or(&base_layout);

        assemble_page(page, &words, layout, &mut state, &mut raws);
    }

    let mut transactions: Vec<Transaction> = raws
        .iter()
        .filter_map(|raw| finalize_row(raw, currency_hint.as_deref()))
        .collect();

    if transactions.len() < MIN_ROWS {
        info!(count = transactions.len(), "word tier produced too few rows; abandoning");
        return Ok(None);
    }

    // Newest-first statements (Aspire) chain better reversed.
    let forward = quick_chain_score(&transactions, REVERSE_PROBE);
    let reversed: Vec<Transaction> = transactions.iter().rev().cloned().collect();
    let backward = quick_chain_score(&reversed, REVERSE_PROBE);
    if backward > forward {
        info!(forward, backward, "reverse-chronological order detected; reversing");
        transactions = reversed;
    }

    info!(count = transactions.len(), "word extraction successful (no model calls)");
    Ok(Some(transactions))
}

/// Cheap page filter: obvious legend pages are skipped, anything with
/// balance markers, dates or a discoverable header is processed.
fn is_transaction_page(text: &str, words: &[PageWord], page_width: f32) -> bool {
    if text.contains("TRANSACTION CODE DESCRIPTION") {
        return false;
    }
    let lower = text.to_lowercase();
    if lower.contains("confirmation of validity") && text.trim().len() < 500 {
        return false;
    }
    if text.contains("BALANCE B/F")
        || text.contains("BALANCE C/F")
        || text.contains("Balance Brought Forward")
        || text.contains("Balance Carried Forward")
    {
        return true;
    }
    if DATE_ROW.is_match(text) {
        return true;
    }
    columns::discover_layout(words, page_width).is_some()
}

fn assemble_page(
    page: usize,
    words: &[PageWord],
    layout: &ColumnLayout,
    state: &mut SectionState,
    out: &mut Vec<RawRow>,
) {
    let data_top = layout.data_top();

    // Standalone currency codes above the data region open a new section.
    for w in words {
        if w.top < data_top && is_currency_code(w.text.trim()) {
            state.switch(w.text.trim(), page);
        }
    }

    let date_col = layout.date_column();
    let desc_col = layout.description_column();
    let bands = columns::band_words(words);

    let mut current: Option<RawRow> = None;
    let mut past_closing = false;
    let mut in_summary = false;

    for (band_y, row_words) in &bands {
        if (*band_y as f32) < data_top {
            continue;
        }

        let row_full = row_words
            .iter()
            .map(|w| w.text.trim())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();

        // A standalone currency code mid-page is a section boundary; a
        // parenthesized one is a multi-line header remnant.
        if is_currency_code(&row_full) {
            if let Some(row) = current.take() {
                out.push(row);
            }
            state.switch(&row_full, page);
            continue;
        }
        if CODE_ONLY_ROW.is_match(&row_full) {
            continue;
        }

        let cells = columns::assign_columns(row_words, layout);
        let date_text = date_col.map(|c| columns::cell_text(&cells, c)).unwrap_or_default();
        let mut desc_text =
            desc_col.map(|c| columns::cell_text(&cells, c)).unwrap_or_default();
        let mut w_text = columns::cell_text(&cells, ColumnKind::Withdrawal);
        let mut d_text = columns::cell_text(&cells, ColumnKind::Deposit);
        let b_text = columns::cell_text(&cells, ColumnKind::Balance);

        let cpty_text = if desc_col != Some(ColumnKind::Counterparty) {
            columns::cell_text(&cells, ColumnKind::Counterparty)
        } else {
            String::new()
        };

        // No description column hit: borrow the first non-amount cell.
        if desc_text.is_empty() {
            for (kind, cell) in &cells {
                if matches!(
                    kind,
                    ColumnKind::Withdrawal
                        | ColumnKind::Deposit
                        | ColumnKind::Balance
                        | ColumnKind::TransactionDate
                        | ColumnKind::ValueDate
                ) {
                    continue;
                }
                if !cell.trim().is_empty() {
                    desc_text = cell.trim().to_string();
                    break;
                }
            }
        }

        let has_txn_date = !date_text.is_empty() && DATE_ROW.is_match(&date_text);

        // Summary/total rows. A dated row survives: some banks use
        // descriptions like "Interest Earned" for real transactions.
        if SUMMARY_ROW.is_match(&desc_text) && !has_txn_date {
            continue;
        }
        if SUMMARY_ROW.is_match(&row_full) {
            continue;
        }
        if FOOTER_ROW.is_match(&row_full) {
            continue;
        }

        // HSBC page summaries put WITHDRAWALS/DEPOSITS in the date column
        // and can span two bands.
        if !date_text.is_empty() && HSBC_SUMMARY.is_match(&date_text) {
            in_summary = true;
            continue;
        }
        if in_summary {
            let upper = row_full.to_uppercase();
            if upper.contains("ASAT") || upper.contains("BALANCECARRIED") {
                continue;
            } else if upper.contains("BALANCEBROUGHT") {
                in_summary = false;
            } else if !has_txn_date {
                continue;
            } else {
                in_summary = false;
            }
        }

        let is_balance_entry = BALANCE_MARKER.is_match(&desc_text);
        let is_opening = OPENING_MARKER.is_match(&desc_text);
        let is_closing = CLOSING_MARKER.is_match(&desc_text);

        if is_opening {
            past_closing = false;
        } else if past_closing && !is_balance_entry {
            // Footer zone after the closing balance.
            continue;
        }

        // Aspire prints '-' for an empty amount cell.
        if w_text.trim() == "-" {
            w_text.clear();
        }
        if d_text.trim() == "-" {
            d_text.clear();
        }

        let has_amount = !w_text.is_empty() || !d_text.is_empty() || !b_text.is_empty();
        let has_desc = !desc_text.is_empty();

        if has_txn_date || is_balance_entry {
            if let Some(row) = current.take() {
                out.push(row);
            }
            if is_closing {
                past_closing = true;
                state.note_closing();
            }
            if is_opening {
                state.open_section();
            }
            current = Some(RawRow {
                txn_date: date_text.clone(),
                value_date: {
                    let v = columns::cell_text(&cells, ColumnKind::ValueDate);
                    if v.is_empty() {
                        date_text.clone()
                    } else {
                        v
                    }
                },
                description: desc_text,
                counterparty: cpty_text,
                withdrawal: w_text,
                deposit: d_text,
                balance: b_text,
                currency: state.currency.clone(),
                section: state.section,
                page: (page + 1) as u32,
            });
        } else if let Some(row) = current.as_mut() {
            if has_amount {
                if !row.balance.is_empty() && !b_text.is_empty() {
                    // A second balance under the same date is an HSBC
                    // sub-transaction; it inherits the date.
                    let inherited = RawRow {
                        txn_date: row.txn_date.clone(),
                        value_date: row.value_date.clone(),
                        description: desc_text,
                        counterparty: cpty_text,
                        withdrawal: w_text,
                        deposit: d_text,
                        balance: b_text,
                        currency: state.currency.clone(),
                        section: state.section,
                        page: (page + 1) as u32,
                    };
                    out.push(std::mem::replace(row, inherited));
                } else {
                    if has_desc {
                        row.description.push(' ');
                        row.description.push_str(&desc_text);
                        if !cpty_text.is_empty() {
                            row.counterparty.push(' ');
                            row.counterparty.push_str(&cpty_text);
                        }
                    }
                    if row.withdrawal.is_empty() && !w_text.is_empty() {
                        row.withdrawal = w_text;
                    }
                    if row.deposit.is_empty() && !d_text.is_empty() {
                        row.deposit = d_text;
                    }
                    if row.balance.is_empty() && !b_text.is_empty() {
                        row.balance = b_text;
                    }
                }
            } else if has_desc {
                row.description.push(' ');
                row.description.push_str(&desc_text);
                if !cpty_text.is_empty() {
                    row.counterparty.push(' ');
                    row.counterparty.push_str(&cpty_text);
                }
            }
        }
    }

    if let Some(row) = current.take() {
        out.push(row);
    }
}

/// Turn a raw row into a normalized transaction, or drop it.
fn finalize_row(raw: &RawRow, currency_hint: Option<&str>) -> Option<Transaction> {
    let desc = raw.description.trim().to_string();
    let upper = desc.to_uppercase();

    let mut withdrawal = scan_amount(&raw.withdrawal, false);
    let mut deposit = scan_amount(&raw.deposit, false);
    // Only the balance column honours the DR suffix.
    let balance = scan_amount(&raw.balance, true);

    let is_opening = ["BALANCE B/F", "BALANCE BROUGHT", "BALANCEBROUGHT", "OPENING BALANCE"]
        .iter()
        .any(|k| upper.contains(k));
    let is_closing = ["BALANCE C/F", "BALANCE CARRIED", "BALANCECARRIED", "CLOSING BALANCE"]
        .iter()
        .any(|k| upper.contains(k));

    let transaction_type = if is_opening {
        TransactionType::OpeningBalance
    } else if is_closing {
        // C/F rows carry statement totals in the amount columns.
        withdrawal = None;
        deposit = None;
        TransactionType::ClosingBalance
    } else {
        match (withdrawal, deposit) {
            (Some(_), None) => TransactionType::Debit,
            (None, Some(_)) => TransactionType::Credit,
            (Some(w), Some(d)) if w >= d => TransactionType::Debit,
            (Some(_), Some(_)) => TransactionType::Credit,
            (None, None) => return None,
        }
    };

    let amount = match transaction_type {
        TransactionType::Debit => withdrawal.unwrap_or_default().abs(),
        TransactionType::Credit => deposit.unwrap_or_default().abs(),
        _ => rust_decimal::Decimal::ZERO,
    };

    let counterparty = raw.counterparty.trim().to_string();
    let description = if counterparty.is_empty() {
        desc
    } else {
        format!("{} | {}", desc, counterparty)
    };

    let date = normalise_date(&raw.value_date).or_else(|| normalise_date(&raw.txn_date));

    Some(Transaction {
        date,
        description,
        transaction_type,
        amount,
        balance,
        reference: None,
        counterparty: if counterparty.is_empty() { None } else { Some(counterparty) },
        channel: None,
        category: None,
        is_cash: false,
        is_cheque: false,
        page_number: raw.page,
        currency: raw
            .currency
            .clone()
            .or_else(|| currency_hint.map(|c| c.to_string()))
            .unwrap_or_else(|| "SGD".to_string()),
        account_section: raw.section,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfError;
    use crate::pdf::{PageTable, PdfAccess};
    use rust_decimal::Decimal;
    use std::result::Result;
    use std::str::FromStr;

    fn w(text: &str, x0: f32, x1: f32, top: f32) -> PageWord {
        PageWord::new(text, x0, x1, top, top + 10.0)
    }

    /// Borderless fixture: one page, header + rows given as words.
    struct WordsPdf {
        pages: Vec<Vec<PageWord>>,
    }

    impl PdfAccess for WordsPdf {
        fn page_count(&self) -> usize {
            self.pages.len()
        }
        fn page_width(&self, _page: usize) -> f32 {
            612.0
        }
        fn page_text(&self, page: usize) -> Result<String, PdfError> {
            Ok(self.pages[page]
                .iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" "))
        }
        fn page_words(&self, page: usize) -> Result<Vec<PageWord>, PdfError> {
            Ok(self.pages[page].clone())
        }
        fn page_tables(&self, _page: usize) -> Result<Vec<PageTable>, PdfError> {
            Ok(Vec::new())
        }
        fn render_page(&self, _page: usize, _dpi: u32) -> Result<Vec<u8>, PdfError> {
            Err(PdfError::Render("fixture".to_string()))
        }
    }

    fn header(y: f32) -> Vec<PageWord> {
        vec![
            w("Date", 40.0, 70.0, y),
            w("Description", 120.0, 190.0, y),
            w("Withdrawal", 300.0, 364.0, y),
            w("Deposit", 420.0, 460.0, y),
            w("Balance", 520.0, 560.0, y),
        ]
    }

    fn movement(y: f32, date: &str, desc: &str, col: ColumnKind, amount: &str, balance: &str) -> Vec<PageWord> {
        let amount_x = match col {
            ColumnKind::Withdrawal => (305.0, 360.0),
            _ => (420.0, 458.0),
        };
        let mut row = vec![
            w(date, 40.0, 74.0, y),
            w(desc, 120.0, 200.0, y),
            w(amount, amount_x.0, amount_x.1, y),
        ];
        row.push(w(balance, 505.0, 566.0, y));
        row
    }

    #[test]
    fn assembles_basic_rows() {
        let mut page = header(100.0);
        page.extend(movement(140.0, "01 DEC", "GIRO SALARY", ColumnKind::Deposit, "1,000.00", "2,000.00"));
        page.extend(movement(160.0, "02 DEC", "FAST PAYMENT", ColumnKind::Withdrawal, "500.00", "1,500.00"));
        page.extend(movement(180.0, "03 DEC", "NETS PURCHASE", ColumnKind::Withdrawal, "100.00", "1,400.00"));
        let pdf = WordsPdf { pages: vec![page] };

        let txns = extract_words(&pdf, Some("SGD".to_string())).unwrap().unwrap();
        assert_eq!(txns.len(), 3);
        assert_eq!(txns[0].transaction_type, TransactionType::Credit);
        assert_eq!(txns[0].amount, Decimal::from_str("1000.00").unwrap());
        assert_eq!(txns[1].transaction_type, TransactionType::Debit);
        assert_eq!(txns[2].date.as_deref(), Some("03 DEC"));
    }

    #[test]
    fn description_continuation_joins_lines() {
        let mut page = header(100.0);
        page.extend(movement(140.0, "01 DEC", "FAST PAYMENT", ColumnKind::Withdrawal, "500.00", "1,500.00"));
        page.push(w("GELMAX PTE LTD", 120.0, 210.0, 152.0));
        page.extend(movement(180.0, "02 DEC", "GIRO", ColumnKind::Deposit, "50.00", "1,550.00"));
        page.extend(movement(200.0, "03 DEC", "GIRO", ColumnKind::Deposit, "10.00", "1,560.00"));
        let pdf = WordsPdf { pages: vec![page] };

        let txns = extract_words(&pdf, None).unwrap().unwrap();
        assert_eq!(txns.len(), 4);
        assert_eq!(txns[0].description, "FAST PAYMENT GELMAX PTE LTD");
    }

    #[test]
    fn hsbc_sub_transactions_and_dr_suffix() {
        let mut page = header(100.0);
        page.extend(movement(140.0, "30SEP2025", "PAYMENT ONE", ColumnKind::Withdrawal, "100.00", "900.00"));
        // Sub-transaction: amounts + new balance, no date.
        page.push(w("PAYMENT TWO", 120.0, 200.0, 160.0));
        page.push(w("200.00", 305.0, 360.0, 160.0));
        page.push(w("1,234.56DR", 505.0, 566.0, 160.0));
        page.extend(movement(190.0, "01OCT2025", "PAYMENT THREE", ColumnKind::Deposit, "50.00", "60.00"));
        let pdf = WordsPdf { pages: vec![page] };

        let txns = extract_words(&pdf, None).unwrap().unwrap();
        assert_eq!(txns.len(), 3);
        assert_eq!(txns[0].date.as_deref(), Some("30 SEP"));
        assert_eq!(txns[1].date.as_deref(), Some("30 SEP"), "sub-transaction inherits date");
        assert_eq!(txns[1].balance, Some(Decimal::from_str("-1234.56").unwrap()));
        assert_eq!(txns[2].date.as_deref(), Some("01 OCT"));
    }

    #[test]
    fn reverses_newest_first_statements() {
        let mut page = header(100.0);
        // Aspire-style: newest first, so balances chain downward.
        page.extend(movement(140.0, "03 DEC", "PAYMENT C", ColumnKind::Deposit, "100.00", "1,300.00"));
        page.extend(movement(160.0, "02 DEC", "PAYMENT B", ColumnKind::Deposit, "100.00", "1,200.00"));
        page.extend(movement(180.0, "01 DEC", "PAYMENT A", ColumnKind::Deposit, "100.00", "1,100.00"));
        let pdf = WordsPdf { pages: vec![page] };

        let txns = extract_words(&pdf, None).unwrap().unwrap();
        assert_eq!(txns[0].description, "PAYMENT A");
        assert_eq!(txns[2].description, "PAYMENT C");
    }

    #[test]
    fn dash_amounts_are_empty_not_zero() {
        let mut page = header(100.0);
        let mut row = movement(140.0, "01 DEC", "CARD PAYMENT", ColumnKind::Deposit, "100.00", "1,100.00");
        row.push(w("-", 320.0, 330.0, 140.0)); // dash in withdrawal column
        page.extend(row);
        page.extend(movement(160.0, "02 DEC", "TOP UP", ColumnKind::Deposit, "50.00", "1,150.00"));
        page.extend(movement(180.0, "03 DEC", "TOP UP", ColumnKind::Deposit, "25.00", "1,175.00"));
        let pdf = WordsPdf { pages: vec![page] };

        let txns = extract_words(&pdf, None).unwrap().unwrap();
        assert_eq!(txns[0].transaction_type, TransactionType::Credit);
        assert_eq!(txns[0].amount, Decimal::from_str("100.00").unwrap());
    }

    #[test]
    fn currency_section_boundaries_increment_once() {
        let mut page = header(100.0);
        page.extend(movement(140.0, "01 DEC", "PAYMENT", ColumnKind::Deposit, "100.00", "1,100.00"));
        page.push(w("BALANCE CARRIED FORWARD", 120.0, 260.0, 160.0));
        page.push(w("1,100.00", 505.0, 566.0, 160.0));
        // Mid-page currency marker then a USD section.
        page.push(w("USD", 120.0, 150.0, 180.0));
        page.push(w("BALANCE BROUGHT FORWARD", 120.0, 260.0, 200.0));
        page.push(w("9,000.00", 505.0, 566.0, 200.0));
        page.extend(movement(220.0, "02 DEC", "USD INWARD", ColumnKind::Deposit, "500.00", "9,500.00"));
        page.extend(movement(240.0, "03 DEC", "USD INWARD", ColumnKind::Deposit, "100.00", "9,600.00"));
        let pdf = WordsPdf { pages: vec![page] };

        let txns = extract_words(&pdf, Some("SGD".to_string())).unwrap().unwrap();
        let sections: Vec<u32> = txns.iter().map(|t| t.account_section).collect();
        assert_eq!(sections.iter().min(), Some(&0));
        assert_eq!(sections.iter().max(), Some(&1));
        // Monotonically non-decreasing in source order.
        assert!(sections.windows(2).all(|p| p[0] <= p[1]));
        let usd: Vec<&Transaction> = txns.iter().filter(|t| t.currency == "USD").collect();
        assert_eq!(usd.len(), 3);
    }

    #[test]
    fn carried_then_brought_forward_increments_section_exactly_once() {
        let mut page = header(100.0);
        page.extend(movement(140.0, "01 DEC", "PAYMENT", ColumnKind::Deposit, "100.00", "1,100.00"));
        page.push(w("BALANCE CARRIED FORWARD", 120.0, 260.0, 160.0));
        page.push(w("1,100.00", 505.0, 566.0, 160.0));
        page.push(w("BALANCE BROUGHT FORWARD", 120.0, 260.0, 180.0));
        page.push(w("1,100.00", 505.0, 566.0, 180.0));
        page.extend(movement(200.0, "02 DEC", "PAYMENT", ColumnKind::Deposit, "100.00", "1,200.00"));
        page.extend(movement(220.0, "03 DEC", "PAYMENT", ColumnKind::Deposit, "100.00", "1,300.00"));
        let pdf = WordsPdf { pages: vec![page] };

        let txns = extract_words(&pdf, Some("SGD".to_string())).unwrap().unwrap();
        let max_section = txns.iter().map(|t| t.account_section).max().unwrap();
        assert_eq!(max_section, 1);
        // The brought-forward row and everything after it sit in the new
        // section.
        let opening = txns
            .iter()
            .find(|t| t.transaction_type == TransactionType::OpeningBalance)
            .unwrap();
        assert_eq!(opening.account_section, 1);
    }

    #[test]
    fn abandons_below_minimum_rows() {
        let mut page = header(100.0);
        page.extend(movement(140.0, "01 DEC", "ONLY ROW", ColumnKind::Deposit, "100.00", "1,100.00"));
        let pdf = WordsPdf { pages: vec![page] };
        assert!(extract_words(&pdf, None).unwrap().is_none());
    }

    #[test]
    fn summary_and_footer_rows_are_ignored() {
        let mut page = header(100.0);
        page.extend(movement(140.0, "01 DEC", "PAYMENT", ColumnKind::Deposit, "100.00", "1,100.00"));
        page.push(w("Total Deposit 100.00", 120.0, 260.0, 160.0));
        page.push(w("Deposit Insurance Scheme applies", 120.0, 300.0, 180.0));
        page.extend(movement(200.0, "02 DEC", "PAYMENT", ColumnKind::Deposit, "100.00", "1,200.00"));
        page.extend(movement(220.0, "03 DEC", "PAYMENT", ColumnKind::Deposit, "100.00", "1,300.00"));
        let pdf = WordsPdf { pages: vec![page] };

        let txns = extract_words(&pdf, None).unwrap().unwrap();
        assert_eq!(txns.len(), 3);
        assert!(txns.iter().all(|t| !t.description.contains("Insurance")));
    }
}
