//! Weighted extraction accuracy score.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{
    AccuracyReport, BalanceChainReport, ScoreComponent, StatementMetrics, Transaction,
};

fn component(value: f64, weight: u32) -> ScoreComponent {
    ScoreComponent { value: (value * 10.0).round() / 10.0, weight }
}

fn grade_for(score: f64) -> &'static str {
    if score >= 95.0 {
        "A+"
    } else if score >= 90.0 {
        "A"
    } else if score >= 80.0 {
        "B"
    } else if score >= 70.0 {
        "C"
    } else if score >= 50.0 {
        "D"
    } else {
        "F"
    }
}

/// Compose the five weighted signals into a 0–100 score with a letter
/// grade.
pub fn compute_accuracy(
    transactions: &[Transaction],
    metrics: &StatementMetrics,
    chain: &BalanceChainReport,
) -> AccuracyReport {
    let mut breakdown: BTreeMap<String, ScoreComponent> = BTreeMap::new();

    // 1. Balance-chain continuity (40%).
    let chain_pct = chain.chain_accuracy_pct;
    breakdown.insert("balance_chain".to_string(), component(chain_pct, 40));

    // 2. Opening/closing presence (20%).
    let has_opening = metrics.opening_balance.is_some();
    let has_closing = metrics.closing_balance.is_some();
    let presence = if has_opening && has_closing {
        100.0
    } else if has_opening || has_closing {
        50.0
    } else {
        0.0
    };
    breakdown.insert("opening_closing_present".to_string(), component(presence, 20));

    // 3. Accounting equation (20%): opening + credits - debits ≈ closing.
    // A fully continuous chain already proves the ledger, and the simple
    // equation does not hold across currencies, so it is trusted outright.
    let equation = if chain_pct >= 99.9 {
        100.0
    } else if let (Some(opening), Some(closing)) =
        (metrics.opening_balance, metrics.closing_balance)
    {
        let expected = opening + metrics.total_amount_of_credit_transactions
            - metrics.total_amount_of_debit_transactions;
        let diff = (expected - closing).abs();
        let denom = closing.abs().max(Decimal::ONE);
        let rel_err = (diff / denom).to_f64().unwrap_or(1.0);
        (100.0 - rel_err * 100.0 / 0.05).clamp(0.0, 100.0)
    } else {
        50.0
    };
    breakdown.insert("accounting_equation".to_string(), component(equation, 20));

    // 4. Amount completeness (10%): each 1% of movements missing an amount
    // costs 5 points.
    let movements: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.transaction_type.is_movement())
        .collect();
    let missing_amount = movements.iter().filter(|t| t.amount.is_zero()).count();
    let missing_pct = missing_amount as f64 / movements.len().max(1) as f64 * 100.0;
    breakdown.insert(
        "completeness".to_string(),
        component((100.0 - missing_pct * 5.0).max(0.0), 10),
    );

    // 5. Balance completeness (10%).
    let null_balance = movements.iter().filter(|t| t.balance.is_none()).count();
    let null_pct = null_balance as f64 / movements.len().max(1) as f64 * 100.0;
    breakdown.insert(
        "balance_completeness".to_string(),
        component((100.0 - null_pct * 5.0).max(0.0), 10),
    );

    let total_weight: u32 = breakdown.values().map(|c| c.weight).sum();
    let weighted: f64 = breakdown.values().map(|c| c.value * c.weight as f64).sum();
    let overall = ((weighted / total_weight as f64) * 10.0).round() / 10.0;

    debug!(overall, grade = grade_for(overall), "accuracy scored");

    AccuracyReport {
        overall_score: overall,
        grade: grade_for(overall).to_string(),
        breakdown,
    }
}
