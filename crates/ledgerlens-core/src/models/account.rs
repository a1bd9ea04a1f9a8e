//! Account header information extracted from the statement's first pages.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account holder / bank / period metadata.
///
/// Every field is optional: statements differ wildly in what they print,
/// and the header parse must never fail an extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_holder: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement_period: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,

    /// Opening balance printed in a header table (DBS style), if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_balance: Option<Decimal>,

    /// Date attached to the header opening balance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_date: Option<String>,

    /// Closing/ledger balance printed in a header table, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_balance: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_balance: Option<Decimal>,
}

impl AccountInfo {
    /// Overlay deterministic values on top of `self` (model-extracted info
    /// loses to table/regex-extracted info field by field).
    pub fn merge_preferring(&mut self, other: &AccountInfo) {
        macro_rules! take {
            ($field:ident) => {
                if other.$field.is_some() {
                    self.$field = other.$field.clone();
                }
            };
        }
        take!(account_holder);
        take!(bank);
        take!(account_number);
        take!(currency);
        take!(statement_period);
        take!(statement_date);
        take!(account_type);
        take!(opening_balance);
        take!(opening_date);
        take!(closing_balance);
        take!(closing_date);
        take!(available_balance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_other_when_present() {
        let mut base = AccountInfo {
            bank: Some("HSBC".to_string()),
            account_number: Some("111".to_string()),
            ..Default::default()
        };
        let better = AccountInfo {
            account_number: Some("0725385342".to_string()),
            currency: Some("SGD".to_string()),
            ..Default::default()
        };
        base.merge_preferring(&better);
        assert_eq!(base.bank.as_deref(), Some("HSBC"));
        assert_eq!(base.account_number.as_deref(), Some("0725385342"));
        assert_eq!(base.currency.as_deref(), Some("SGD"));
    }
}
