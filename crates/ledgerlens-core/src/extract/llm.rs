//! Tier 3: language-model extraction.
//!
//! Last resort for statements neither deterministic tier can read: page
//! text (or vision-OCR text for scanned documents) is cleaned, batched
//! with a one-page overlap, and parsed by the chat model into transaction
//! records, which are validated and deduplicated.

use std::collections::HashSet;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::patterns::{DATE_ROW, MONEY, SKIP_PAGE};
use crate::bank::{patterns as bank_patterns, Bank};
use crate::error::{LensError, ModelError, Result};
use crate::model::{CancelToken, ChatMessage, ChatModel, ExtractorConfig, VisionModel};
use crate::models::{Transaction, TransactionType};
use crate::normalize::normalise_date;
use crate::pdf::PdfAccess;

/// Pattern-dominance threshold for skipping a page outright.
const SKIP_DOMINANCE: f64 = 0.4;

const OCR_PROMPT: &str = "You are an OCR engine. Extract ALL text from this bank statement page \
exactly as it appears, preserving the layout as much as possible.\n\n\
Rules:\n\
- Reproduce every line of text you see, in reading order (top to bottom, left to right)\n\
- Preserve column alignment using spaces where possible\n\
- Include all numbers, dates, amounts, and descriptions exactly as printed\n\
- For table rows, separate columns with ' | ' (pipe with spaces)\n\
- Do NOT add any commentary. Output ONLY the extracted text";

const TRANSACTION_PROMPT: &str = "You are an expert bank statement transaction parser for \
Singapore banks. Parse ALL transactions from the following bank statement page(s).\n\n\
CRITICAL RULES:\n\
- Each transaction has: transaction_date, value_date, description, withdrawal (if debit), \
deposit (if credit), balance\n\
- Normalise ALL dates to \"DD MMM\" format (e.g. \"30 NOV\", \"01 DEC\")\n\
- Amounts: return as plain numbers (no commas). E.g. 1943.69 not \"1,943.69\"\n\
- Multi-line descriptions: concatenate into ONE description string separated by spaces\n\
- \"BALANCE B/F\" or \"BALANCE BROUGHT FORWARD\" means transaction_type = \"opening_balance\"\n\
- \"BALANCE C/F\" or \"BALANCE CARRIED FORWARD\" means transaction_type = \"closing_balance\"\n\
- Withdrawals / Debits: transaction_type = \"debit\". Deposits / Credits: \"credit\"\n\
- Do NOT create transactions from summary sections (e.g. \"Total Debit Amount\"), only from \
individual transaction lines\n\
- channel is one of: FAST, GIRO, ATM, DEBIT PURCHASE, CHEQUE, NETS, PayNow, PAYMENT/TRANSFER, \
REMITTANCE\n\
- counterparty: who the transaction is with, extracted from the description\n\
- Do NOT skip any transactions. Do NOT invent transactions that aren't in the text\n\
- If a page has \"BALANCE B/F\" already seen in a previous batch, still include it \
(dedup happens later)\n\n\
Return ONLY a valid JSON array (no markdown fences) of objects with keys: transaction_date, \
value_date, description, withdrawal, deposit, balance, transaction_type, channel, \
counterparty, reference.\n\n\
Bank statement page text:\n";

/// A transaction as the model returns it. Every absent field adopts its
/// default; the model is an untrusted producer.
#[derive(Debug, Deserialize)]
struct WireTransaction {
    #[serde(default)]
    transaction_date: Option<String>,
    #[serde(default)]
    value_date: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    withdrawal: Option<f64>,
    #[serde(default)]
    deposit: Option<f64>,
    #[serde(default)]
    balance: Option<f64>,
    #[serde(default)]
    transaction_type: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    counterparty: Option<String>,
    #[serde(default)]
    reference: Option<String>,
}

struct PageText {
    number: usize,
    text: String,
}

struct Batch {
    text: String,
    first_page: usize,
}

pub struct LlmTier<'a> {
    pub chat: &'a dyn ChatModel,
    pub vision: Option<&'a dyn VisionModel>,
    pub config: &'a ExtractorConfig,
}

impl LlmTier<'_> {
    /// Run the model tier. `scanned` routes page text through vision OCR.
    /// Returns the deduplicated transactions and the number of batches
    /// processed.
    pub fn extract(
        &self,
        pdf: &dyn PdfAccess,
        bank: Bank,
        scanned: bool,
        cancel: &CancelToken,
    ) -> Result<(Vec<Transaction>, usize)> {
        let pages = if scanned {
            self.ocr_pages(pdf, cancel)?
        } else {
            let mut pages = Vec::new();
            for page in 0..pdf.page_count() {
                pages.push(PageText { number: page + 1, text: pdf.page_text(page)? });
            }
            pages
        };

        let batches = build_batches(pages, bank);
        if batches.is_empty() {
            warn!("no transaction pages left after filtering");
            return Ok((Vec::new(), 0));
        }
        info!(batches = batches.len(), "processing model batches");

        let mut transactions: Vec<Transaction> = Vec::new();
        let batch_count = batches.len();

        for (i, batch) in batches.into_iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(LensError::ExtractionCancelled);
            }
            match self.extract_batch(&batch) {
                Ok(mut txns) => {
                    debug!(batch = i + 1, count = txns.len(), "batch parsed");
                    transactions.append(&mut txns);
                }
                Err(ModelError::Cancelled) => return Err(LensError::ExtractionCancelled),
                Err(e) => {
                    // A failed batch is a gap, not a failure: completeness
                    // scoring reflects it.
                    warn!(batch = i + 1, "batch failed: {e}");
                }
            }
        }

        Ok((deduplicate(transactions), batch_count))
    }

    fn ocr_pages(&self, pdf: &dyn PdfAccess, cancel: &CancelToken) -> Result<Vec<PageText>> {
        let Some(vision) = self.vision else {
            return Err(LensError::Model(ModelError::Api(
                "scanned PDF but no vision backend wired".to_string(),
            )));
        };
        let mut pages = Vec::new();
        for page in 0..pdf.page_count() {
            if cancel.is_cancelled() {
                return Err(LensError::ExtractionCancelled);
            }
            info!(page = page + 1, total = pdf.page_count(), "vision OCR");
            let png = pdf.render_page(page, self.config.render_dpi)?;
            let text = vision.analyze_image(&png, OCR_PROMPT, self.config.vision_deadline)?;
            pages.push(PageText { number: page + 1, text });
        }
        Ok(pages)
    }

    fn extract_batch(&self, batch: &Batch) -> std::result::Result<Vec<Transaction>, ModelError> {
        let messages = [
            ChatMessage::system(
                "You are an expert bank statement transaction parser for Singapore banks. \
                 Return only valid JSON arrays. Do not wrap in markdown.",
            ),
            ChatMessage::user(format!("{TRANSACTION_PROMPT}{}", batch.text)),
        ];

        let mut last_err = ModelError::Api("no attempt made".to_string());
        for attempt in 0..=self.config.batch_retries {
            match self.chat.chat(&messages, self.config.chat_deadline) {
                Ok(response) => {
                    let values = parse_model_json(&response)?;
                    return Ok(values
                        .into_iter()
                        .filter_map(|v| serde_json::from_value::<WireTransaction>(v).ok())
                        .filter_map(|wire| from_wire(wire, batch.first_page))
                        .collect());
                }
                Err(e) if e.is_retryable() && attempt < self.config.batch_retries => {
                    warn!(attempt = attempt + 1, "retryable model failure: {e}");
                    last_err = e;
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err)
    }
}

/// Should this page be skipped entirely? Near-blank pages and pages whose
/// dominant content is a legend / T&C / code sheet, unless transaction
/// signals are present.
fn is_skip_page(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.len() < 80 {
        return true;
    }
    let has_money = MONEY.is_match(trimmed);
    let has_dates = DATE_ROW.is_match(trimmed);
    if has_money && has_dates {
        return false;
    }
    if let Some(m) = SKIP_PAGE.find(trimmed) {
        // Skip only when the pattern region dominates the page.
        let tail = trimmed.len() - m.start();
        if (tail as f64) > (trimmed.len() as f64) * SKIP_DOMINANCE {
            return true;
        }
    }
    false
}

/// Does the page look like it carries transaction rows?
fn has_transactions(text: &str) -> bool {
    let lower = text.to_lowercase();
    let has_balance = lower.contains("balance") || lower.contains("bal.");
    has_balance && DATE_ROW.is_match(text) && MONEY.is_match(text)
}

/// Filter and clean pages, then batch them adaptively with a one-page
/// overlap so rows split across a boundary are recovered.
fn build_batches(pages: Vec<PageText>, bank: Bank) -> Vec<Batch> {
    let cleaned: Vec<PageText> = pages
        .into_iter()
        .filter(|p| {
            if is_skip_page(&p.text) {
                debug!(page = p.number, "skipping page (skip pattern)");
                return false;
            }
            if !has_transactions(&p.text) {
                debug!(page = p.number, "skipping page (no transaction signals)");
                return false;
            }
            true
        })
        .map(|p| PageText {
            number: p.number,
            text: bank_patterns::strip_noise(&p.text, bank),
        })
        .collect();

    if cleaned.is_empty() {
        return Vec::new();
    }

    // Dense pages get smaller batches so the model does not drop rows.
    let avg_chars =
        cleaned.iter().map(|p| p.text.len()).sum::<usize>() as f64 / cleaned.len() as f64;
    let batch_size = if avg_chars > 1500.0 {
        2
    } else if avg_chars > 1000.0 {
        3
    } else {
        5
    };
    debug!(avg_chars = avg_chars as usize, batch_size, "adaptive batch sizing");

    let overlap = 1usize;
    let step = (batch_size - overlap).max(1);

    let mut batches = Vec::new();
    let mut i = 0usize;
    while i < cleaned.len() {
        let end = (i + batch_size).min(cleaned.len());
        let text = cleaned[i..end]
            .iter()
            .map(|p| format!("--- Page {} ---\n{}", p.number, p.text))
            .collect::<Vec<_>>()
            .join("\n\n");
        batches.push(Batch { text, first_page: cleaned[i].number });
        if end == cleaned.len() {
            break;
        }
        i += step;
    }
    batches
}

/// Parse the model's response into a JSON array, stripping markdown fences
/// and unwrapping a `{"transactions": [...]}` envelope.
fn parse_model_json(response: &str) -> std::result::Result<Vec<serde_json::Value>, ModelError> {
    let mut text = response.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    let text = text.trim();

    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| ModelError::Json(e.to_string()))?;
    match value {
        serde_json::Value::Array(items) => Ok(items),
        serde_json::Value::Object(mut map) => match map.remove("transactions") {
            Some(serde_json::Value::Array(items)) => Ok(items),
            _ => Err(ModelError::Json("expected a JSON array".to_string())),
        },
        _ => Err(ModelError::Json("expected a JSON array".to_string())),
    }
}

/// Validate a wire record into a transaction. Rows that fail the date
/// grammar or sign constraints are rejected rather than repaired.
fn from_wire(wire: WireTransaction, page: usize) -> Option<Transaction> {
    let withdrawal = wire.withdrawal.and_then(Decimal::from_f64).map(|d| d.round_dp(2));
    let deposit = wire.deposit.and_then(Decimal::from_f64).map(|d| d.round_dp(2));
    let balance = wire.balance.and_then(Decimal::from_f64).map(|d| d.round_dp(2));

    if withdrawal.is_some_and(|v| v.is_sign_negative())
        || deposit.is_some_and(|v| v.is_sign_negative())
    {
        return None;
    }

    let declared = wire.transaction_type.as_deref().unwrap_or("");
    let transaction_type = match declared {
        "opening_balance" => TransactionType::OpeningBalance,
        "closing_balance" => TransactionType::ClosingBalance,
        "debit" => TransactionType::Debit,
        "credit" => TransactionType::Credit,
        _ => match (withdrawal, deposit) {
            (Some(_), None) => TransactionType::Debit,
            (None, Some(_)) => TransactionType::Credit,
            (Some(w), Some(d)) if w >= d => TransactionType::Debit,
            (Some(_), Some(_)) => TransactionType::Credit,
            (None, None) => return None,
        },
    };

    let date = wire
        .value_date
        .as_deref()
        .and_then(normalise_date)
        .or_else(|| wire.transaction_date.as_deref().and_then(normalise_date));
    // An undated movement from the model is noise, not a sub-transaction.
    if date.is_none() && transaction_type.is_movement() {
        return None;
    }

    let amount = match transaction_type {
        TransactionType::Debit => withdrawal.unwrap_or_default(),
        TransactionType::Credit => deposit.unwrap_or_default(),
        _ => Decimal::ZERO,
    };

    Some(Transaction {
        date,
        description: wire.description.trim().to_string(),
        transaction_type,
        amount,
        balance,
        reference: wire.reference.filter(|s| !s.trim().is_empty()),
        counterparty: wire.counterparty.filter(|s| !s.trim().is_empty()),
        channel: wire.channel.filter(|s| !s.trim().is_empty()),
        category: None,
        is_cash: false,
        is_cheque: false,
        page_number: page as u32,
        currency: "SGD".to_string(),
        account_section: 0,
    })
}

/// Remove duplicates introduced by the one-page batch overlap.
///
/// Pass 1 is an exact fingerprint; pass 2 keys on the balance, which
/// catches descriptions the model rendered differently in two batches.
/// Idempotent, and preserves first-seen order.
pub fn deduplicate(transactions: Vec<Transaction>) -> Vec<Transaction> {
    let type_tag = |t: TransactionType| match t {
        TransactionType::Credit => "credit",
        TransactionType::Debit => "debit",
        TransactionType::OpeningBalance => "opening_balance",
        TransactionType::ClosingBalance => "closing_balance",
    };

    let before = transactions.len();
    let mut seen_exact: HashSet<String> = HashSet::new();
    let mut pass1: Vec<Transaction> = Vec::new();
    for t in transactions {
        let desc: String = t.description.chars().take(60).collect();
        let key = format!(
            "{}|{}|{}|{}|{}",
            t.date.as_deref().unwrap_or(""),
            desc,
            t.amount.round_dp(2),
            t.balance.map(|b| b.round_dp(2).to_string()).unwrap_or_default(),
            type_tag(t.transaction_type),
        );
        if seen_exact.insert(key) {
            pass1.push(t);
        }
    }

    let mut seen_balance: HashSet<String> = HashSet::new();
    let mut pass2: Vec<Transaction> = Vec::new();
    for t in pass1 {
        if let (Some(balance), true) = (t.balance, t.transaction_type.is_movement()) {
            let key = format!(
                "{}|{}|{}|{}",
                t.date.as_deref().unwrap_or(""),
                balance.round_dp(2),
                type_tag(t.transaction_type),
                t.amount.round_dp(2),
            );
            if !seen_balance.insert(key) {
                continue;
            }
        }
        pass2.push(t);
    }

    if pass2.len() < before {
        info!(removed = before - pass2.len(), "deduplication removed overlap duplicates");
    }
    pass2
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn wire_json(desc: &str, balance: f64) -> serde_json::Value {
        serde_json::json!({
            "transaction_date": "01 DEC",
            "value_date": "01 DEC",
            "description": desc,
            "withdrawal": 100.0,
            "deposit": null,
            "balance": balance,
            "transaction_type": "debit",
            "channel": "FAST",
            "counterparty": "GELMAX",
            "reference": "SG123"
        })
    }

    #[test]
    fn parses_plain_and_fenced_json() {
        let plain = r#"[{"description": "A"}]"#;
        assert_eq!(parse_model_json(plain).unwrap().len(), 1);

        let fenced = "```json\n[{\"description\": \"A\"}]\n```";
        assert_eq!(parse_model_json(fenced).unwrap().len(), 1);

        let wrapped = r#"{"transactions": [{"description": "A"}, {"description": "B"}]}"#;
        assert_eq!(parse_model_json(wrapped).unwrap().len(), 2);

        assert!(parse_model_json("not json").is_err());
    }

    #[test]
    fn wire_rows_are_validated() {
        let ok: WireTransaction = serde_json::from_value(wire_json("PAYMENT", 900.0)).unwrap();
        let txn = from_wire(ok, 1).unwrap();
        assert_eq!(txn.transaction_type, TransactionType::Debit);
        assert_eq!(txn.amount, Decimal::from_str("100.00").unwrap());
        assert_eq!(txn.channel.as_deref(), Some("FAST"));

        // Negative amount violates the sign constraint.
        let mut bad = wire_json("PAYMENT", 900.0);
        bad["withdrawal"] = serde_json::json!(-5.0);
        let bad: WireTransaction = serde_json::from_value(bad).unwrap();
        assert!(from_wire(bad, 1).is_none());

        // Unparseable date on a movement is rejected.
        let mut undated = wire_json("PAYMENT", 900.0);
        undated["transaction_date"] = serde_json::json!("whenever");
        undated["value_date"] = serde_json::Value::Null;
        let undated: WireTransaction = serde_json::from_value(undated).unwrap();
        assert!(from_wire(undated, 1).is_none());
    }

    #[test]
    fn missing_wire_fields_adopt_defaults() {
        let sparse: WireTransaction =
            serde_json::from_value(serde_json::json!({"description": "X"})).unwrap();
        assert!(from_wire(sparse, 1).is_none()); // no amounts at all
    }

    #[test]
    fn dedup_removes_exact_and_fuzzy_duplicates() {
        let a: WireTransaction = serde_json::from_value(wire_json("PAYMENT", 900.0)).unwrap();
        let a = from_wire(a, 1).unwrap();
        let exact_dup = a.clone();
        let mut fuzzy_dup = a.clone();
        // Same balance/date/type/amount, mangled description.
        fuzzy_dup.description = "PAYMENT (misrendered)".to_string();
        let mut distinct = a.clone();
        distinct.balance = Some(Decimal::from_str("800.00").unwrap());
        distinct.description = "OTHER PAYMENT".to_string();

        let out = deduplicate(vec![a.clone(), exact_dup, fuzzy_dup, distinct]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].description, "PAYMENT");
    }

    #[test]
    fn dedup_is_idempotent() {
        let a: WireTransaction = serde_json::from_value(wire_json("PAYMENT", 900.0)).unwrap();
        let a = from_wire(a, 1).unwrap();
        let mut b = a.clone();
        b.balance = Some(Decimal::from_str("800.00").unwrap());
        let once = deduplicate(vec![a, b]);
        let twice = deduplicate(once.clone());
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn skip_page_requires_dominance() {
        let mut legend = String::from("TRANSACTION CODE DESCRIPTION\n");
        legend.push_str(&"CODE MEANING EXPLANATION ROW\n".repeat(20));
        assert!(is_skip_page(&legend));

        // Same marker buried at the end of a transaction-rich page.
        let mut rich = "01 DEC FAST PAYMENT 1,943.69 127,543.16\n".repeat(20);
        rich.push_str("TRANSACTION CODE DESCRIPTION");
        assert!(!is_skip_page(&rich));

        assert!(is_skip_page("short page"));
    }

    #[test]
    fn batches_overlap_by_one_page() {
        let page = |n: usize| PageText {
            number: n,
            text: format!("balance 01 DEC 1,000.00 row {n} {}", "x".repeat(100)),
        };
        let batches = build_batches((1..=7).map(page).collect(), Bank::Unknown);
        // 7 sparse pages at batch size 5, step 4: pages 1-5 then 4-7.
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].first_page, 1);
        assert_eq!(batches[1].first_page, 5);
    }
}
