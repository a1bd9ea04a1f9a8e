//! Validation reports, accuracy scoring and statement metrics.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::account::AccountInfo;
use super::transaction::Transaction;

/// How the final transaction set was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionMethod {
    /// Tier 1: ruled-table parse.
    #[serde(rename = "table")]
    Table,
    /// Tier 2: word-geometry reconstruction.
    #[serde(rename = "words")]
    Words,
    /// Tier 3: language-model parse of page text.
    #[serde(rename = "llm")]
    Llm,
    /// Tier 3 over vision-OCR text (scanned PDF).
    #[serde(rename = "llm+ocr")]
    LlmOcr,
}

/// One broken link in a balance chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainBreak {
    /// Row index within its section's movement list.
    pub index: usize,
    /// Account section the break occurred in.
    pub section: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Truncated description of the offending row.
    pub description: String,
    pub expected_balance: Decimal,
    pub actual_balance: Decimal,
    pub difference: Decimal,
}

/// Result of walking the running-balance chain per account section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceChainReport {
    pub total_links: usize,
    pub valid_links: usize,
    pub invalid_links: usize,
    pub chain_accuracy_pct: f64,
    /// Number of independent account sections found.
    pub sections: usize,
    /// Up to 20 recorded breaks.
    pub breaks: Vec<ChainBreak>,
}

/// One weighted component of the accuracy score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreComponent {
    /// Component value in [0, 100].
    pub value: f64,
    /// Weight in percent; all weights sum to 100.
    pub weight: u32,
}

/// Composite extraction accuracy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccuracyReport {
    /// Weighted score in [0, 100].
    pub overall_score: f64,
    /// Letter grade: A+ / A / B / C / D / F.
    pub grade: String,
    /// Per-component breakdown, keyed by component name.
    pub breakdown: BTreeMap<String, ScoreComponent>,
}

/// Per-currency slice of the metrics for multi-currency statements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyMetrics {
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_balance: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_balance: Option<Decimal>,
    pub total_credits: usize,
    pub total_credit_amount: Decimal,
    pub total_debits: usize,
    pub total_debit_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_balance: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_balance: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_balance: Option<Decimal>,
    pub transaction_count: usize,
}

/// Aggregate figures computed from the normalized ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_balance: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_balance: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_eod_balance: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_eod_balance: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_eod_balance: Option<Decimal>,

    pub total_no_of_credit_transactions: usize,
    pub total_amount_of_credit_transactions: Decimal,
    pub total_no_of_debit_transactions: usize,
    pub total_amount_of_debit_transactions: Decimal,

    pub average_deposit: Decimal,
    pub average_withdrawal: Decimal,
    pub max_credit_transaction: Decimal,
    pub min_credit_transaction: Decimal,
    pub max_debit_transaction: Decimal,
    pub min_debit_transaction: Decimal,

    pub total_no_of_cash_deposits: usize,
    pub total_amount_of_cash_deposits: Decimal,
    pub total_no_of_cash_withdrawals: usize,
    pub total_amount_of_cash_withdrawals: Decimal,
    pub total_no_of_cheque_withdrawals: usize,
    pub total_amount_of_cheque_withdrawals: Decimal,

    pub total_fees_charged: Decimal,

    /// Currency with the most movements.
    pub currency: String,

    /// Present only when the statement spans more than one currency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_breakdown: Option<BTreeMap<String, CurrencyMetrics>>,
}

/// The single structured record returned by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Detected bank display name, or "unknown".
    pub bank: String,
    pub account_info: AccountInfo,
    pub transactions: Vec<Transaction>,
    pub metrics: StatementMetrics,
    pub accuracy: AccuracyReport,
    pub balance_chain: BalanceChainReport,
    pub extraction_method: ExtractionMethod,
    pub pages_processed: usize,
    /// Distinct currencies seen, in section order.
    pub currencies: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_method_wire_names() {
        assert_eq!(
            serde_json::to_string(&ExtractionMethod::Table).unwrap(),
            "\"table\""
        );
        assert_eq!(
            serde_json::to_string(&ExtractionMethod::LlmOcr).unwrap(),
            "\"llm+ocr\""
        );
    }
}
