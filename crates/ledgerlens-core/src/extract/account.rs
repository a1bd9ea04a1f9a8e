//! Account-info extraction: header-table key/value parse, generic regex
//! pass over the first pages, and an optional model pass.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use crate::error::ModelError;
use crate::model::{ChatMessage, ChatModel, ExtractorConfig};
use crate::models::AccountInfo;
use crate::normalize::parse_amount;
use crate::pdf::PdfAccess;

lazy_static! {
    static ref ACCOUNT_NO: Regex =
        Regex::new(r"(?i)(?:Account\s*(?:No\.?|Number)|A/C\s*No\.?)\s*:?\s*(\d[\d\s\-]+\d)")
            .unwrap();
    static ref STATEMENT_PERIOD: Regex = Regex::new(
        r"(\d{1,2}[\s\-][A-Za-z]{3}[\s\-]\d{4})\s+(?:TO|to|-)\s+(\d{1,2}[\s\-][A-Za-z]{3}[\s\-]\d{4})"
    )
    .unwrap();
    static ref STATEMENT_DATE: Regex = Regex::new(
        r"(?i)Statement\s*Date\s*:?\s*(\d{1,2}[A-Za-z]{3}\d{4}|\d{1,2}[\s\-][A-Za-z]{3}[\s\-]\d{4})"
    )
    .unwrap();
    static ref CURRENCY: Regex =
        Regex::new(r"\b(SGD|USD|MYR|IDR|EUR|GBP|AUD|HKD)\b").unwrap();
    static ref HOLDER_LINE: Regex = Regex::new(r"^[A-Z\s.&,\-()]+$").unwrap();
    static ref AMOUNT_WITH_DATE: Regex = Regex::new(r"([\d,]+\.\d{2})\s*(.*)").unwrap();
    static ref NUMBER_WITH_CCY: Regex = Regex::new(r"([\d\-]+)\s*(?:-\s*(\w+))?").unwrap();
}

/// Regex pass over the first three pages. Works for any bank; every field
/// is best-effort.
pub fn extract_from_text(pdf: &dyn PdfAccess) -> AccountInfo {
    let mut info = AccountInfo::default();

    for page in 0..pdf.page_count().min(3) {
        let Ok(text) = pdf.page_text(page) else { continue };
        let lines: Vec<&str> = text.lines().collect();

        for line in &lines {
            let s = line.trim();
            if info.account_number.is_none() {
                if let Some(caps) = ACCOUNT_NO.captures(s) {
                    info.account_number =
                        Some(caps[1].chars().filter(|c| c.is_ascii_digit()).collect());
                }
            }
            if info.statement_period.is_none() {
                if let Some(caps) = STATEMENT_PERIOD.captures(s) {
                    info.statement_period = Some(format!("{} to {}", &caps[1], &caps[2]));
                }
            }
            if info.statement_date.is_none() {
                if let Some(caps) = STATEMENT_DATE.captures(s) {
                    info.statement_date = Some(caps[1].to_string());
                }
            }
            if info.currency.is_none() {
                if let Some(caps) = CURRENCY.captures(s) {
                    info.currency = Some(caps[1].to_string());
                }
            }
        }

        // Account holder: first prominent all-caps line after the
        // statement banner / address block.
        if info.account_holder.is_none() {
            let mut found_marker = false;
            for line in &lines {
                let s = line.trim();
                if s.to_uppercase().contains("STATEMENT OF ACCOUNT") || s.contains("Singapore") {
                    found_marker = true;
                    continue;
                }
                if !found_marker || s.len() <= 5 || s != s.to_uppercase().as_str() {
                    continue;
                }
                const NOT_NAMES: [&str; 9] = [
                    "ACCOUNT", "OCBC", "DBS", "UOB", "STATEMENT", "TRANSACTION", "BALANCE",
                    "BUSINESS", "PAGE",
                ];
                if NOT_NAMES.iter().any(|skip| s.contains(skip)) {
                    continue;
                }
                if HOLDER_LINE.is_match(s) {
                    info.account_holder = Some(s.to_string());
                    break;
                }
            }
        }
    }

    info
}

/// Parse a DBS-style key/value header table:
///
/// ```text
/// Account Number : | 0725385342 - SGD | Account Name : | HOH JIA PTE. LTD.
/// Opening Balance : | 84,650.03 01-Sep-2025 | ...
/// ```
pub fn parse_account_info_table(table: &[Vec<String>]) -> AccountInfo {
    let mut info = AccountInfo::default();

    for row in table {
        let cells: Vec<String> = row.iter().map(|c| c.trim().to_string()).collect();
        for (i, cell) in cells.iter().enumerate() {
            let key = cell.to_lowercase();
            let value = cells.get(i + 1).map(|s| s.as_str()).unwrap_or("");
            if value.is_empty() {
                continue;
            }

            if key.contains("account number") {
                if let Some(caps) = NUMBER_WITH_CCY.captures(value) {
                    info.account_number = Some(caps[1].trim().to_string());
                    if let Some(ccy) = caps.get(2) {
                        info.currency = Some(ccy.as_str().trim().to_string());
                    }
                }
            } else if key.contains("account name") {
                let name = Regex::new(r"\s*-\s*\d[\d\-]+.*$")
                    .map(|re| re.replace(value, "").trim().to_string())
                    .unwrap_or_else(|_| value.to_string());
                info.account_holder = Some(name);
            } else if key.contains("product type") {
                info.account_type = Some(value.to_string());
            } else if key.contains("opening balance") {
                if let Some(caps) = AMOUNT_WITH_DATE.captures(value) {
                    info.opening_balance = parse_amount(&caps[1]);
                    let date = caps[2].trim();
                    if !date.is_empty() {
                        info.opening_date = Some(date.to_string());
                    }
                }
            } else if key.contains("ledger balance") {
                if let Some(caps) = AMOUNT_WITH_DATE.captures(value) {
                    info.closing_balance = parse_amount(&caps[1]);
                    let date = caps[2].trim();
                    if !date.is_empty() {
                        info.closing_date = Some(date.to_string());
                    }
                }
            } else if key.contains("available balance") {
                if let Some(caps) = AMOUNT_WITH_DATE.captures(value) {
                    info.available_balance = parse_amount(&caps[1]);
                }
            }
        }
    }

    if let (Some(open), Some(close)) = (&info.opening_date, &info.closing_date) {
        info.statement_period = Some(format!("{open} to {close}"));
    }
    info
}

const ACCOUNT_INFO_PROMPT: &str = "You are an expert bank statement parser for Singapore banks.\n\
Extract the following from this bank statement's first page(s).\n\n\
Return ONLY valid JSON (no markdown fences):\n\
{\n\
  \"account_holder\": \"company or person name\",\n\
  \"bank\": \"full bank name\",\n\
  \"account_number\": \"account number\",\n\
  \"currency\": \"SGD or other\",\n\
  \"statement_period\": \"DD MMM YYYY to DD MMM YYYY\",\n\
  \"account_type\": \"type of account (e.g. Business, Savings, Current)\"\n\
}\n\n\
If a field is not found, use null.\n\n\
Bank statement text:\n";

#[derive(Debug, Default, Deserialize)]
struct WireAccountInfo {
    #[serde(default)]
    account_holder: Option<String>,
    #[serde(default)]
    bank: Option<String>,
    #[serde(default)]
    account_number: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    statement_period: Option<String>,
    #[serde(default)]
    account_type: Option<String>,
}

/// Ask the chat model for account info. Failures degrade to an empty
/// record; deterministic extraction overrides it field by field anyway.
pub fn extract_with_model(
    chat: &dyn ChatModel,
    first_pages_text: &str,
    config: &ExtractorConfig,
) -> Result<AccountInfo, ModelError> {
    let truncated: String = first_pages_text.chars().take(4000).collect();
    let messages = [
        ChatMessage::system(
            "You are an expert bank statement parser for Singapore banks. Return only valid JSON.",
        ),
        ChatMessage::user(format!("{ACCOUNT_INFO_PROMPT}{truncated}")),
    ];
    let response = chat.chat(&messages, config.chat_deadline)?;

    let mut text = response.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    let wire: WireAccountInfo = serde_json::from_str(text.trim()).unwrap_or_else(|e| {
        warn!("account info response unparseable: {e}");
        WireAccountInfo::default()
    });

    Ok(AccountInfo {
        account_holder: wire.account_holder,
        bank: wire.bank,
        account_number: wire.account_number,
        currency: wire.currency,
        statement_period: wire.statement_period,
        account_type: wire.account_type,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn parses_dbs_header_table() {
        let table: Vec<Vec<String>> = vec![
            vec![
                "Account Number :".to_string(),
                "0725385342 - SGD".to_string(),
                "Account Name :".to_string(),
                "HOH JIA PTE. LTD.".to_string(),
            ],
            vec![
                "Opening Balance :".to_string(),
                "84,650.03 01-Sep-2025".to_string(),
                "Ledger Balance :".to_string(),
                "157,657.34 30-Sep-2025".to_string(),
            ],
        ];
        let info = parse_account_info_table(&table);
        assert_eq!(info.account_number.as_deref(), Some("0725385342"));
        assert_eq!(info.currency.as_deref(), Some("SGD"));
        assert_eq!(info.account_holder.as_deref(), Some("HOH JIA PTE. LTD."));
        assert_eq!(info.opening_balance, Some(Decimal::from_str("84650.03").unwrap()));
        assert_eq!(info.closing_balance, Some(Decimal::from_str("157657.34").unwrap()));
        assert_eq!(
            info.statement_period.as_deref(),
            Some("01-Sep-2025 to 30-Sep-2025")
        );
    }

    #[test]
    fn regex_pass_finds_number_period_and_holder() {
        use crate::pdf::{PageTable, PageWord, PdfAccess};
        use crate::error::PdfError;

        struct TextPdf(String);
        impl PdfAccess for TextPdf {
            fn page_count(&self) -> usize {
                1
            }
            fn page_width(&self, _page: usize) -> f32 {
                612.0
            }
            fn page_text(&self, _page: usize) -> Result<String, PdfError> {
                Ok(self.0.clone())
            }
            fn page_words(&self, _page: usize) -> Result<Vec<PageWord>, PdfError> {
                Ok(Vec::new())
            }
            fn page_tables(&self, _page: usize) -> Result<Vec<PageTable>, PdfError> {
                Ok(Vec::new())
            }
            fn render_page(&self, _page: usize, _dpi: u32) -> Result<Vec<u8>, PdfError> {
                Err(PdfError::Render("fixture".to_string()))
            }
        }

        let pdf = TextPdf(
            "STATEMENT OF ACCOUNT\nGELMAX HOLDINGS PTE. LTD.\nAccount No. : 683-123456-001\n\
             1 DEC 2025 TO 31 DEC 2025\nSGD"
                .to_string(),
        );
        let info = extract_from_text(&pdf);
        assert_eq!(info.account_number.as_deref(), Some("683123456001"));
        assert_eq!(
            info.statement_period.as_deref(),
            Some("1 DEC 2025 to 31 DEC 2025")
        );
        assert_eq!(info.currency.as_deref(), Some("SGD"));
        assert_eq!(info.account_holder.as_deref(), Some("GELMAX HOLDINGS PTE. LTD."));
    }
}
