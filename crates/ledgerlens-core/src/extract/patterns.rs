//! Compiled regexes shared by the extraction tiers.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A day + three-letter month, tolerating HSBC's separator-less form.
    pub static ref DATE_ROW: Regex = Regex::new(
        r"(?i)\d{1,2}[\s\-/]?(JAN|FEB|MAR|APR|MAY|JUN|JUL|AUG|SEP|OCT|NOV|DEC)"
    )
    .unwrap();

    /// Monetary amount anywhere in a page's text.
    pub static ref MONEY: Regex = Regex::new(r"\d{1,3}(?:,\d{3})*\.\d{2}").unwrap();

    /// Statement summary/total rows that must not become transactions.
    pub static ref SUMMARY_ROW: Regex = Regex::new(
        r"(?i)(Total Withdrawal|Total Deposit|Total Interest|Average Balance|Withholding Tax|Total Debit|Total Credit|Grand Total|Closing Statement|ENDOFSTATEMENT|END\s*OF\s*STATEMENT)"
    )
    .unwrap();

    /// Footer/disclaimer rows (deposit insurance, issuer boilerplate).
    pub static ref FOOTER_ROW: Regex = Regex::new(
        r"(?i)(Deposit\s*Insurance|Singaporedollardeposit|currency\s*deposits.*not\s*insured|structureddeposits|Issued\s*by\s*The\s*Hongkong|S\$100,000\s*in\s*aggregate|aggregate\s*per\s*depositor)"
    )
    .unwrap();

    /// HSBC per-page summary rows start with WITHDRAWALS / DEPOSITS in the
    /// date column.
    pub static ref HSBC_SUMMARY: Regex = Regex::new(r"(?i)^(WITHDRAWALS?|DEPOSITS?)\b").unwrap();

    /// Any opening/closing balance marker, tolerating missing whitespace
    /// (HSBC emits BALANCEBROUGHTFORWARD).
    pub static ref BALANCE_MARKER: Regex = Regex::new(
        r"(?i)BALANCE\s*[BC]/F|OPENING\s+BALANCE|CLOSING\s+BALANCE|BALANCE\s*BROUGHT|BALANCE\s*CARRIED"
    )
    .unwrap();

    pub static ref OPENING_MARKER: Regex =
        Regex::new(r"(?i)BALANCE\s*B/F|BALANCE\s*BROUGHT|OPENING\s+BALANCE").unwrap();

    pub static ref CLOSING_MARKER: Regex =
        Regex::new(r"(?i)BALANCE\s*C/F|BALANCE\s*CARRIED|CLOSING\s+BALANCE").unwrap();

    /// A row that is only a (possibly parenthesized) three-letter code:
    /// either a currency-section header or a multi-line header remnant.
    pub static ref CODE_ONLY_ROW: Regex = Regex::new(r"^\(?[A-Z]{3}\)?$").unwrap();

    /// Dominant-content patterns for pages Tier 3 should skip outright.
    pub static ref SKIP_PAGE: Regex = Regex::new(
        r"(?i)(TRANSACTION CODE DESCRIPTION|CHECK YOUR STATEMENT|UPDATING YOUR PERSONAL PARTICULARS|IMPORTANT NOTES|Important Information|Transaction codes|TRANSACTION CODES USED|Deposit Insurance Scheme Singapore|Terms and Conditions|interest\s*rate\s*schedule|This page is intentionally left blank)"
    )
    .unwrap();
}

/// ISO currency codes recognised as section markers.
pub static CURRENCY_CODES: &[&str] = &[
    "SGD", "USD", "EUR", "GBP", "CNY", "JPY", "AUD", "HKD", "MYR", "IDR", "THB", "PHP", "INR",
    "KRW", "NZD", "CHF", "CAD", "TWD", "VND",
];

pub fn is_currency_code(text: &str) -> bool {
    CURRENCY_CODES.contains(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_row_matches_all_bank_forms() {
        assert!(DATE_ROW.is_match("01 DEC"));
        assert!(DATE_ROW.is_match("01-Sep-2025"));
        assert!(DATE_ROW.is_match("30SEP2025"));
        assert!(!DATE_ROW.is_match("WITHDRAWALS"));
    }

    #[test]
    fn balance_markers_tolerate_concatenation() {
        assert!(BALANCE_MARKER.is_match("BALANCEBROUGHTFORWARD"));
        assert!(OPENING_MARKER.is_match("BALANCE B/F"));
        assert!(CLOSING_MARKER.is_match("BALANCE CARRIED FORWARD"));
        assert!(!OPENING_MARKER.is_match("BALANCE CARRIED FORWARD"));
    }

    #[test]
    fn code_only_rows() {
        assert!(CODE_ONLY_ROW.is_match("USD"));
        assert!(CODE_ONLY_ROW.is_match("(SGD)"));
        assert!(!CODE_ONLY_ROW.is_match("USD ACCOUNT"));
    }
}
