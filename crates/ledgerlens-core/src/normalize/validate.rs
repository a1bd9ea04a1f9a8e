//! Balance-chain validation.
//!
//! The running-balance chain is the strongest correctness signal a
//! statement offers: within one account section, each movement must
//! satisfy `prev_balance + signed_amount == balance` to within a rounding
//! tolerance. Broken links are reported, never raised.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{BalanceChainReport, ChainBreak, Transaction, TransactionType};

/// Two-cent rounding tolerance.
fn tolerance() -> Decimal {
    Decimal::new(2, 2)
}

/// Maximum breaks retained in the report.
const MAX_BREAKS: usize = 20;

/// Group transactions by account section. When no explicit section tags
/// are present, `opening_balance` rows start new sections.
fn partition(transactions: &[Transaction]) -> BTreeMap<u32, Vec<&Transaction>> {
    let mut sections: BTreeMap<u32, Vec<&Transaction>> = BTreeMap::new();
    let has_tags = transactions.iter().any(|t| t.account_section != 0);

    if has_tags {
        for t in transactions {
            sections.entry(t.account_section).or_default().push(t);
        }
    } else {
        let mut current = 0u32;
        for t in transactions {
            if t.transaction_type == TransactionType::OpeningBalance
                && sections.get(&current).is_some_and(|v| !v.is_empty())
            {
                current += 1;
            }
            sections.entry(current).or_default().push(t);
        }
    }
    sections
}

/// Walk every section's chain and report link validity.
pub fn validate_balance_chain(transactions: &[Transaction]) -> BalanceChainReport {
    let sections = partition(transactions);
    let mut valid = 0usize;
    let mut invalid = 0usize;
    let mut breaks: Vec<ChainBreak> = Vec::new();

    for (section_id, rows) in &sections {
        let movements: Vec<&&Transaction> = rows
            .iter()
            .filter(|t| t.transaction_type.is_movement() && t.balance.is_some())
            .collect();
        if movements.len() < 2 {
            continue;
        }

        for i in 1..movements.len() {
            let prev = movements[i - 1].balance.unwrap_or_default();
            let curr = movements[i].balance.unwrap_or_default();
            let expected = (prev + movements[i].signed_amount()).round_dp(2);
            let diff = (expected - curr).abs();
            if diff <= tolerance() {
                valid += 1;
            } else {
                invalid += 1;
                if breaks.len() < MAX_BREAKS {
                    breaks.push(ChainBreak {
                        index: i,
                        section: *section_id,
                        date: movements[i].date.clone(),
                        description: movements[i].description.chars().take(50).collect(),
                        expected_balance: expected,
                        actual_balance: curr,
                        difference: diff.round_dp(2),
                    });
                }
            }
        }
    }

    let total = valid + invalid;
    let pct = if total > 0 {
        (valid as f64 / total as f64 * 1000.0).round() / 10.0
    } else {
        100.0
    };

    debug!(valid, invalid, pct, sections = sections.len(), "balance chain validated");

    BalanceChainReport {
        total_links: total,
        valid_links: valid,
        invalid_links: invalid,
        chain_accuracy_pct: pct,
        sections: sections.len(),
        breaks,
    }
}

/// Count valid links among the first `limit` balance-bearing movements.
/// Used by the reverse-chronology heuristic: a reversed list that chains
/// strictly better than the forward list is emitted reversed.
pub fn quick_chain_score(transactions: &[Transaction], limit: usize) -> usize {
    let subset: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.transaction_type.is_movement() && t.balance.is_some())
        .take(limit)
        .collect();
    if subset.len() < 2 {
        return 0;
    }
    let mut valid = 0usize;
    for i in 1..subset.len() {
        let prev = subset[i - 1].balance.unwrap_or_default();
        let curr = subset[i].balance.unwrap_or_default();
        let expected = (prev + subset[i].signed_amount()).round_dp(2);
        if (expected - curr).abs() <= tolerance() {
            valid += 1;
        }
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn movement(kind: TransactionType, amount: &str, balance: &str, section: u32) -> Transaction {
        Transaction {
            date: Some("01 DEC".to_string()),
            description: "ROW".to_string(),
            transaction_type: kind,
            amount: Decimal::from_str(amount).unwrap(),
            balance: Some(Decimal::from_str(balance).unwrap()),
            reference: None,
            counterparty: None,
            channel: None,
            category: None,
            is_cash: false,
            is_cheque: false,
            page_number: 1,
            currency: "SGD".to_string(),
            account_section: section,
        }
    }

    #[test]
    fn clean_chain_is_fully_valid() {
        let txns = vec![
            movement(TransactionType::Credit, "100.00", "1100.00", 0),
            movement(TransactionType::Debit, "50.00", "1050.00", 0),
            movement(TransactionType::Credit, "25.00", "1075.00", 0),
        ];
        let report = validate_balance_chain(&txns);
        assert_eq!(report.total_links, 2);
        assert_eq!(report.valid_links, 2);
        assert_eq!(report.chain_accuracy_pct, 100.0);
        assert!(report.breaks.is_empty());
    }

    #[test]
    fn break_is_recorded_with_expected_and_actual() {
        let txns = vec![
            movement(TransactionType::Credit, "100.00", "1100.00", 0),
            movement(TransactionType::Debit, "50.00", "1150.00", 0),
        ];
        let report = validate_balance_chain(&txns);
        assert_eq!(report.invalid_links, 1);
        assert_eq!(report.breaks.len(), 1);
        let b = &report.breaks[0];
        assert_eq!(b.expected_balance, Decimal::from_str("1050.00").unwrap());
        assert_eq!(b.actual_balance, Decimal::from_str("1150.00").unwrap());
    }

    #[test]
    fn two_cent_tolerance_is_inclusive() {
        let txns = vec![
            movement(TransactionType::Credit, "100.00", "1100.00", 0),
            movement(TransactionType::Credit, "100.00", "1200.02", 0),
        ];
        let report = validate_balance_chain(&txns);
        assert_eq!(report.valid_links, 1);
    }

    #[test]
    fn sections_validate_independently() {
        // SGD section chains internally; the USD section starts from an
        // unrelated balance and must not be linked to the SGD tail.
        let txns = vec![
            movement(TransactionType::Credit, "100.00", "1100.00", 0),
            movement(TransactionType::Debit, "100.00", "1000.00", 0),
            movement(TransactionType::Credit, "500.00", "9500.00", 1),
            movement(TransactionType::Credit, "500.00", "10000.00", 1),
        ];
        let report = validate_balance_chain(&txns);
        assert_eq!(report.sections, 2);
        assert_eq!(report.total_links, 2);
        assert_eq!(report.valid_links, 2);
    }

    #[test]
    fn opening_rows_split_untagged_sections() {
        let opening = |balance: &str| Transaction {
            transaction_type: TransactionType::OpeningBalance,
            amount: Decimal::ZERO,
            ..movement(TransactionType::Credit, "0", balance, 0)
        };
        let txns = vec![
            opening("1000.00"),
            movement(TransactionType::Credit, "100.00", "1100.00", 0),
            opening("5000.00"),
            movement(TransactionType::Debit, "100.00", "4900.00", 0),
        ];
        let report = validate_balance_chain(&txns);
        assert_eq!(report.sections, 2);
        // Each section has a single movement, so no links to check.
        assert_eq!(report.total_links, 0);
        assert_eq!(report.chain_accuracy_pct, 100.0);
    }

    #[test]
    fn quick_score_prefers_correct_direction() {
        let forward = vec![
            movement(TransactionType::Credit, "100.00", "1100.00", 0),
            movement(TransactionType::Credit, "100.00", "1200.00", 0),
            movement(TransactionType::Credit, "100.00", "1300.00", 0),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(quick_chain_score(&forward, 20), 2);
        assert_eq!(quick_chain_score(&reversed, 20), 0);
    }
}
