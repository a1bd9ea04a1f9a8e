//! Statement metrics computed from the normalized ledger.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::{
    Category, CurrencyMetrics, StatementMetrics, Transaction, TransactionType,
};

fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().copied().sum();
    Some((sum / Decimal::from(values.len())).round_dp(2))
}

fn max(values: &[Decimal]) -> Option<Decimal> {
    values.iter().copied().max()
}

fn min(values: &[Decimal]) -> Option<Decimal> {
    values.iter().copied().min()
}

/// Compute the aggregate figures for one ledger.
pub fn compute_metrics(transactions: &[Transaction]) -> StatementMetrics {
    let credits: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Credit)
        .collect();
    let debits: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Debit)
        .collect();

    let credit_amounts: Vec<Decimal> =
        credits.iter().filter(|t| !t.amount.is_zero()).map(|t| t.amount).collect();
    let debit_amounts: Vec<Decimal> =
        debits.iter().filter(|t| !t.amount.is_zero()).map(|t| t.amount).collect();
    let balances: Vec<Decimal> = transactions.iter().filter_map(|t| t.balance).collect();

    let mut opening = transactions
        .iter()
        .find(|t| t.transaction_type == TransactionType::OpeningBalance)
        .and_then(|t| t.balance);
    let mut closing = transactions
        .iter()
        .rev()
        .find(|t| t.transaction_type == TransactionType::ClosingBalance)
        .and_then(|t| t.balance);

    // No explicit opening/closing rows: fall back to the first/last
    // printed balance.
    if opening.is_none() {
        opening = balances.first().copied();
    }
    if closing.is_none() {
        closing = balances.last().copied();
    }

    let cash_deposits: Vec<&&Transaction> =
        credits.iter().filter(|t| t.is_cash).collect();
    let cash_withdrawals: Vec<&&Transaction> =
        debits.iter().filter(|t| t.is_cash).collect();
    let cheque_withdrawals: Vec<&&Transaction> =
        debits.iter().filter(|t| t.is_cheque).collect();
    let fees: Decimal = debits
        .iter()
        .filter(|t| t.category == Some(Category::FeesCharges))
        .map(|t| t.amount)
        .sum();

    // Primary currency: the one carrying the most movements.
    let mut per_currency: BTreeMap<String, usize> = BTreeMap::new();
    for t in transactions.iter().filter(|t| t.transaction_type.is_movement()) {
        *per_currency.entry(t.currency.clone()).or_default() += 1;
    }
    let primary = per_currency
        .iter()
        .max_by_key(|(_, n)| **n)
        .map(|(c, _)| c.clone())
        .unwrap_or_else(|| "SGD".to_string());

    let breakdown = if per_currency.len() > 1 {
        Some(currency_breakdown(transactions))
    } else {
        None
    };

    StatementMetrics {
        opening_balance: opening,
        closing_balance: closing,
        max_eod_balance: max(&balances),
        min_eod_balance: min(&balances),
        avg_eod_balance: mean(&balances),
        total_no_of_credit_transactions: credits.len(),
        total_amount_of_credit_transactions: credit_amounts.iter().copied().sum(),
        total_no_of_debit_transactions: debits.len(),
        total_amount_of_debit_transactions: debit_amounts.iter().copied().sum(),
        average_deposit: mean(&credit_amounts).unwrap_or_default(),
        average_withdrawal: mean(&debit_amounts).unwrap_or_default(),
        max_credit_transaction: max(&credit_amounts).unwrap_or_default(),
        min_credit_transaction: min(&credit_amounts).unwrap_or_default(),
        max_debit_transaction: max(&debit_amounts).unwrap_or_default(),
        min_debit_transaction: min(&debit_amounts).unwrap_or_default(),
        total_no_of_cash_deposits: cash_deposits.len(),
        total_amount_of_cash_deposits: cash_deposits.iter().map(|t| t.amount).sum(),
        total_no_of_cash_withdrawals: cash_withdrawals.len(),
        total_amount_of_cash_withdrawals: cash_withdrawals.iter().map(|t| t.amount).sum(),
        total_no_of_cheque_withdrawals: cheque_withdrawals.len(),
        total_amount_of_cheque_withdrawals: cheque_withdrawals.iter().map(|t| t.amount).sum(),
        total_fees_charged: fees,
        currency: primary,
        currency_breakdown: breakdown,
    }
}

fn currency_breakdown(transactions: &[Transaction]) -> BTreeMap<String, CurrencyMetrics> {
    let mut currencies: Vec<String> = transactions.iter().map(|t| t.currency.clone()).collect();
    currencies.sort();
    currencies.dedup();

    let mut out = BTreeMap::new();
    for ccy in currencies {
        let rows: Vec<&Transaction> =
            transactions.iter().filter(|t| t.currency == ccy).collect();
        let credits: Vec<&&Transaction> = rows
            .iter()
            .filter(|t| t.transaction_type == TransactionType::Credit)
            .collect();
        let debits: Vec<&&Transaction> = rows
            .iter()
            .filter(|t| t.transaction_type == TransactionType::Debit)
            .collect();
        let balances: Vec<Decimal> = rows.iter().filter_map(|t| t.balance).collect();

        let opening = rows
            .iter()
            .find(|t| t.transaction_type == TransactionType::OpeningBalance)
            .and_then(|t| t.balance)
            .or_else(|| balances.first().copied());
        let closing = rows
            .iter()
            .rev()
            .find(|t| t.transaction_type == TransactionType::ClosingBalance)
            .and_then(|t| t.balance)
            .or_else(|| balances.last().copied());

        out.insert(
            ccy.clone(),
            CurrencyMetrics {
                currency: ccy,
                opening_balance: opening,
                closing_balance: closing,
                total_credits: credits.len(),
                total_credit_amount: credits.iter().map(|t| t.amount).sum(),
                total_debits: debits.len(),
                total_debit_amount: debits.iter().map(|t| t.amount).sum(),
                max_balance: max(&balances),
                min_balance: min(&balances),
                avg_balance: mean(&balances),
                transaction_count: rows
                    .iter()
                    .filter(|t| t.transaction_type.is_movement())
                    .count(),
            },
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn row(
        kind: TransactionType,
        amount: &str,
        balance: &str,
        currency: &str,
        section: u32,
    ) -> Transaction {
        Transaction {
            date: Some("01 DEC".to_string()),
            description: "ROW".to_string(),
            transaction_type: kind,
            amount: dec(amount),
            balance: Some(dec(balance)),
            reference: None,
            counterparty: None,
            channel: None,
            category: None,
            is_cash: false,
            is_cheque: false,
            page_number: 1,
            currency: currency.to_string(),
            account_section: section,
        }
    }

    #[test]
    fn basic_totals_and_balances() {
        let mut opening = row(TransactionType::OpeningBalance, "0", "1000.00", "SGD", 0);
        opening.amount = Decimal::ZERO;
        let txns = vec![
            opening,
            row(TransactionType::Credit, "200.00", "1200.00", "SGD", 0),
            row(TransactionType::Debit, "50.00", "1150.00", "SGD", 0),
            {
                let mut closing =
                    row(TransactionType::ClosingBalance, "0", "1150.00", "SGD", 0);
                closing.amount = Decimal::ZERO;
                closing
            },
        ];
        let m = compute_metrics(&txns);
        assert_eq!(m.opening_balance, Some(dec("1000.00")));
        assert_eq!(m.closing_balance, Some(dec("1150.00")));
        assert_eq!(m.total_no_of_credit_transactions, 1);
        assert_eq!(m.total_amount_of_credit_transactions, dec("200.00"));
        assert_eq!(m.total_no_of_debit_transactions, 1);
        assert_eq!(m.max_eod_balance, Some(dec("1200.00")));
        assert_eq!(m.min_eod_balance, Some(dec("1000.00")));
        assert_eq!(m.currency, "SGD");
        assert!(m.currency_breakdown.is_none());
    }

    #[test]
    fn falls_back_to_first_and_last_balance() {
        let txns = vec![
            row(TransactionType::Credit, "200.00", "1200.00", "SGD", 0),
            row(TransactionType::Debit, "50.00", "1150.00", "SGD", 0),
        ];
        let m = compute_metrics(&txns);
        assert_eq!(m.opening_balance, Some(dec("1200.00")));
        assert_eq!(m.closing_balance, Some(dec("1150.00")));
    }

    #[test]
    fn cash_and_fee_rollups() {
        let mut atm = row(TransactionType::Debit, "300.00", "700.00", "SGD", 0);
        atm.is_cash = true;
        let mut fee = row(TransactionType::Debit, "15.00", "685.00", "SGD", 0);
        fee.category = Some(Category::FeesCharges);
        let m = compute_metrics(&[atm, fee]);
        assert_eq!(m.total_no_of_cash_withdrawals, 1);
        assert_eq!(m.total_amount_of_cash_withdrawals, dec("300.00"));
        assert_eq!(m.total_fees_charged, dec("15.00"));
    }

    #[test]
    fn multi_currency_breakdown_present() {
        let txns = vec![
            row(TransactionType::Credit, "200.00", "1200.00", "SGD", 0),
            row(TransactionType::Debit, "50.00", "1150.00", "SGD", 0),
            row(TransactionType::Credit, "10.00", "510.00", "USD", 1),
        ];
        let m = compute_metrics(&txns);
        assert_eq!(m.currency, "SGD");
        let breakdown = m.currency_breakdown.expect("multi-currency breakdown");
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown["USD"].total_credits, 1);
        assert_eq!(breakdown["USD"].total_credit_amount, dec("10.00"));
    }
}
