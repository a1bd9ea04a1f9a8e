//! Derived transaction attributes: channel, counterparty, category and
//! cash/cheque flags, filled in a single pass over the ledger.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{Category, Transaction};

lazy_static! {
    static ref REF_HEX: Regex = Regex::new(r"^[0-9a-fA-F]{16,}$").unwrap();
    static ref REF_PREFIX: Regex = Regex::new(r"^(EBGPP|X1AF|ADV |RTF |SGD |\d{14,})").unwrap();
    static ref REF_USER: Regex = Regex::new(r"^\d+\s+U:").unwrap();
    static ref REF_CCY_AMOUNT: Regex = Regex::new(r"(?i)^SGD\s+[\d,.]+$").unwrap();
    static ref REF_GENERIC: Regex =
        Regex::new(r"(?i)^(OTHER|SALARY PAYMENT|SUPPLIER PAYMENT|CLEARING LOANS)$").unwrap();
}

/// Detect the payment channel from the description. Returns a member of
/// the fixed channel vocabulary, or "OTHER".
pub fn detect_channel(description: &str) -> &'static str {
    let upper = description.to_uppercase();
    if upper.contains("FAST PAYMENT") || upper.contains("FAST") {
        return "FAST";
    }
    if upper.contains("INTERBANK GIRO") || upper.contains("IBG") || upper.contains("GIRO") {
        return "GIRO";
    }
    if upper.contains("REMITTANCE") || upper.contains("RTF ") {
        return "REMITTANCE";
    }
    if upper.contains("ATM") {
        return "ATM";
    }
    if upper.contains("DEBIT PURCHASE") || upper.contains("DEBIT PURC") {
        return "DEBIT PURCHASE";
    }
    if upper.contains("CHEQUE") || upper.contains("CHQ") {
        return "CHEQUE";
    }
    if upper.contains("NETS") {
        return "NETS";
    }
    if upper.contains("PAYNOW") {
        return "PayNow";
    }
    if upper.contains("PAYMENT") || upper.contains("TRANSFER") || upper.contains("TRF") {
        return "PAYMENT/TRANSFER";
    }
    "OTHER"
}

/// Pull a counterparty name out of a multi-fragment description.
///
/// Fragments are separated with ` | ` when tiers join columns or lines.
/// The first fragment is usually the channel; reference-looking fragments
/// are skipped.
pub fn extract_counterparty(description: &str) -> Option<String> {
    if description.is_empty() {
        return None;
    }
    let joined = description.replace('\n', " | ");
    for fragment in joined.split(" | ").skip(1) {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        if REF_HEX.is_match(fragment)
            || REF_PREFIX.is_match(fragment)
            || REF_USER.is_match(fragment)
            || REF_CCY_AMOUNT.is_match(fragment)
            || REF_GENERIC.is_match(fragment)
        {
            continue;
        }
        if fragment.len() > 2 && fragment.chars().any(|c| c.is_alphabetic()) {
            return Some(fragment.to_string());
        }
    }
    None
}

/// Keyword dictionary over the fixed category set. First match wins.
pub fn categorize(description: &str) -> Category {
    let upper = description.to_uppercase();
    let any = |kws: &[&str]| kws.iter().any(|k| upper.contains(k));

    if any(&["SALARY", "PAYROLL", "WAGES", "CPF"]) {
        return Category::SalaryPayroll;
    }
    if any(&["RENT", "LEASE", "TENANCY", "PROPERTY"]) {
        return Category::Rent;
    }
    if any(&[
        "SP SERVICES", "SINGTEL", "STARHUB", "M1", "UTILITIES", "POWER SUPPLY", "TOWN COUNCIL",
        "PUB ", "WATER", "ELECTRICITY", "SIMBA TELECOM",
    ]) {
        return Category::Utilities;
    }
    if any(&[
        "FOOD", "RESTAURANT", "CAFE", "COFFEE", "MCDONALD", "DELIVEROO", "GRAB FOOD",
        "FOODPANDA", "KFC", "SUBWAY", "STARBUCKS", "TOAST BOX", "YA KUN", "BAKERY", "ESPRESSO",
        "KOPITIAM", "HAWKER",
    ]) {
        return Category::FoodBeverage;
    }
    if any(&[
        "TAXI", "GRAB ", "GOJEK", "COMFORTDELGRO", "CDG ENGIE", "TRANSIT", "EZ-LINK", "LTA",
        "PARKING", "SBS TRANSIT", "SMRT",
    ]) {
        return Category::Transport;
    }
    if any(&["CARDUP", "SUPPLIER", "INVOICE", "VENDOR", "PURCHASE ORDER"]) {
        return Category::SupplierPayment;
    }
    if any(&[
        "ADYEN", "STRIPE", "PAYNOW", "COLLECTION", "REVENUE", "SALES", "PAYMENT RECEIVED",
        "CUSTOMER PAYMENT",
    ]) {
        return Category::Revenue;
    }
    if any(&["LOAN", "MORTGAGE", "FINANCING", "EMI", "INSTALMENT"]) {
        return Category::Loan;
    }
    if any(&["IRAS", "GST", "TAX", "ACRA", "GOVERNMENT", "CUSTOMS"]) {
        return Category::TaxGovernment;
    }
    if any(&["INSURANCE", "AIA", "PRUDENTIAL", "GREAT EASTERN", "NTUC INCOME"]) {
        return Category::Insurance;
    }
    if any(&[
        "BANK CHARGE", "SERVICE CHARGE", "FEE", "INTEREST", "LATE CHARGE", "ANNUAL FEE",
        "COMM ON",
    ]) {
        return Category::FeesCharges;
    }
    if any(&["REFUND", "REVERSAL", "REBATE"]) {
        return Category::Refund;
    }
    if any(&["TRANSFER", "TRF", "IBG", "REMITTANCE", "TELEGRAPHIC"]) {
        return Category::Transfer;
    }
    if any(&["DEBIT PURCHASE", "DEBIT PURC", "VISA"]) {
        return Category::Purchase;
    }
    Category::Other
}

pub fn is_cash(description: &str) -> bool {
    let upper = description.to_uppercase();
    ["CASH DEPOSIT", "CASH WITHDRAWAL", "ATM WITHDRAWAL", "ATM DEPOSIT", "CDM", "CASH DEP", "ATM"]
        .iter()
        .any(|k| upper.contains(k))
}

pub fn is_cheque(description: &str) -> bool {
    let upper = description.to_uppercase();
    ["CHEQUE", "CHQ"].iter().any(|k| upper.contains(k))
}

/// Fill every derived attribute on the ledger in one pass. Existing
/// counterparties (from a dedicated statement column or the model) are
/// kept.
pub fn enrich_all(transactions: &mut [Transaction]) {
    for txn in transactions.iter_mut() {
        let desc = txn.description.clone();
        if txn.channel.is_none() {
            txn.channel = Some(detect_channel(&desc).to_string());
        }
        if txn.counterparty.is_none() {
            txn.counterparty = extract_counterparty(&desc);
        }
        if txn.category.is_none() {
            txn.category = Some(categorize(&desc));
        }
        txn.is_cash = is_cash(&desc);
        txn.is_cheque = is_cheque(&desc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_detection() {
        assert_eq!(detect_channel("FAST PAYMENT OTHR GELMAX"), "FAST");
        assert_eq!(detect_channel("INTERBANK GIRO SALARY"), "GIRO");
        assert_eq!(detect_channel("ATM WITHDRAWAL BEDOK"), "ATM");
        assert_eq!(detect_channel("CHQ DEPOSIT 000123"), "CHEQUE");
        assert_eq!(detect_channel("PAYNOW TO JANE"), "PayNow");
        assert_eq!(detect_channel("FUNDS TRANSFER"), "PAYMENT/TRANSFER");
        assert_eq!(detect_channel("POS PURCHASE"), "OTHER");
    }

    #[test]
    fn counterparty_skips_references() {
        let desc = "FAST PAYMENT | 25112897276901123456 | GELMAX PTE LTD | OTHER";
        assert_eq!(extract_counterparty(desc).as_deref(), Some("GELMAX PTE LTD"));

        let hex = "FAST PAYMENT | a1b2c3d4e5f6a7b8c9d0 | ACME PTE LTD";
        assert_eq!(extract_counterparty(hex).as_deref(), Some("ACME PTE LTD"));
    }

    #[test]
    fn counterparty_none_for_single_fragment() {
        assert_eq!(extract_counterparty("BALANCE BROUGHT FORWARD"), None);
    }

    #[test]
    fn category_first_match_wins() {
        assert_eq!(categorize("SALARY PAYMENT DEC"), Category::SalaryPayroll);
        assert_eq!(categorize("SERVICE CHARGE NOV"), Category::FeesCharges);
        assert_eq!(categorize("GRAB FOOD ORDER"), Category::FoodBeverage);
        assert_eq!(categorize("IRAS GST PAYMENT"), Category::TaxGovernment);
        assert_eq!(categorize("PAYNOW FROM ACME PTE LTD"), Category::Revenue);
        assert_eq!(categorize("MISC ROW"), Category::Other);
    }

    #[test]
    fn cash_and_cheque_flags_are_keyword_only() {
        assert!(is_cash("ATM WITHDRAWAL"));
        assert!(is_cash("CASH DEPOSIT CDM"));
        assert!(!is_cash("FAST PAYMENT"));
        assert!(is_cheque("CHEQUE DEPOSIT 001"));
        assert!(is_cheque("CHQ 000123"));
        assert!(!is_cheque("GIRO PAYMENT"));
    }
}
