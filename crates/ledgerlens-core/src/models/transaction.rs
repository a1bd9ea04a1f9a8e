//! The central ledger entity and its derived attributes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction or role of a ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Money in.
    Credit,
    /// Money out.
    Debit,
    /// `BALANCE B/F` / `BALANCE BROUGHT FORWARD` row.
    OpeningBalance,
    /// `BALANCE C/F` / `BALANCE CARRIED FORWARD` row.
    ClosingBalance,
}

impl TransactionType {
    /// Whether this row participates in balance-chain validation.
    pub fn is_movement(&self) -> bool {
        matches!(self, TransactionType::Credit | TransactionType::Debit)
    }
}

/// Spend/income category derived from description keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    SalaryPayroll,
    Rent,
    Utilities,
    FoodBeverage,
    Transport,
    SupplierPayment,
    Revenue,
    Loan,
    TaxGovernment,
    Insurance,
    FeesCharges,
    Transfer,
    Purchase,
    Refund,
    Other,
}

/// A single normalized statement row.
///
/// Immutable once emitted by the normalizer. `date` is the year-less
/// `DD MMM` form; the sign of the movement is carried by
/// `transaction_type`, never by `amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Normalized `DD MMM` date. `None` only for a sub-transaction that
    /// inherits the preceding row's date and could not be dated itself.
    pub date: Option<String>,

    /// Free-text description, multi-line fragments joined with spaces.
    pub description: String,

    /// Row role.
    pub transaction_type: TransactionType,

    /// Non-negative movement amount. Zero for opening/closing rows.
    pub amount: Decimal,

    /// Running balance after this row, when the statement prints one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    pub is_cash: bool,
    pub is_cheque: bool,

    /// 1-based source page.
    pub page_number: u32,

    /// ISO currency code of the section this row belongs to.
    pub currency: String,

    /// Partition key for multi-currency statements; monotonically
    /// non-decreasing in source order.
    pub account_section: u32,
}

impl Transaction {
    /// Movement with its sign applied: credits positive, debits negative,
    /// opening/closing rows zero.
    pub fn signed_amount(&self) -> Decimal {
        match self.transaction_type {
            TransactionType::Credit => self.amount,
            TransactionType::Debit => -self.amount,
            _ => Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn txn(kind: TransactionType, amount: &str) -> Transaction {
        Transaction {
            date: Some("01 DEC".to_string()),
            description: "TEST".to_string(),
            transaction_type: kind,
            amount: Decimal::from_str(amount).unwrap(),
            balance: None,
            reference: None,
            counterparty: None,
            channel: None,
            category: None,
            is_cash: false,
            is_cheque: false,
            page_number: 1,
            currency: "SGD".to_string(),
            account_section: 0,
        }
    }

    #[test]
    fn signed_amount_follows_type() {
        assert_eq!(
            txn(TransactionType::Credit, "10.50").signed_amount(),
            Decimal::from_str("10.50").unwrap()
        );
        assert_eq!(
            txn(TransactionType::Debit, "10.50").signed_amount(),
            Decimal::from_str("-10.50").unwrap()
        );
        assert_eq!(
            txn(TransactionType::OpeningBalance, "10.50").signed_amount(),
            Decimal::ZERO
        );
    }

    #[test]
    fn serializes_snake_case_type() {
        let t = txn(TransactionType::OpeningBalance, "0");
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"opening_balance\""));
    }
}
