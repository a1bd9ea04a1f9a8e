//! Monetary amount parsing.

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

lazy_static! {
    // First money-looking token in a cell, optionally suffixed with DR
    // (HSBC negative-balance convention).
    static ref CELL_AMOUNT: Regex = Regex::new(r"([\d,]+\.\d{2})\s*(DR)?").unwrap();
}

/// Parse a full table cell as an amount: `6,540.00` → 6540.00.
///
/// Commas are thousands separators; parentheses negate; a bare `-`
/// (Aspire's empty marker) and blank cells return `None`.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned = raw.replace([',', ' '], "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    let (cleaned, negate) = match cleaned.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (inner, true),
        None => (cleaned, false),
    };
    let value = Decimal::from_str(cleaned).ok()?;
    Some(if negate { -value } else { value })
}

/// Scan loose column text for the first amount, tolerating trailing
/// watermark characters. With `allow_dr`, a `DR` suffix negates the value.
pub fn scan_amount(raw: &str, allow_dr: bool) -> Option<Decimal> {
    let cleaned = raw.replace(' ', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    let caps = CELL_AMOUNT.captures(cleaned)?;
    let value = Decimal::from_str(&caps[1].replace(',', "")).ok()?;
    if allow_dr && caps.get(2).is_some() {
        Some(-value)
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn parses_comma_separated() {
        assert_eq!(parse_amount("6,540.00"), Some(dec("6540.00")));
        assert_eq!(parse_amount("1,234,567.89"), Some(dec("1234567.89")));
        assert_eq!(parse_amount("0.01"), Some(dec("0.01")));
    }

    #[test]
    fn parentheses_negate() {
        assert_eq!(parse_amount("(1,000.00)"), Some(dec("-1000.00")));
    }

    #[test]
    fn dash_and_blank_are_empty_not_zero() {
        assert_eq!(parse_amount("-"), None);
        assert_eq!(parse_amount("  "), None);
        assert_eq!(scan_amount("-", false), None);
    }

    #[test]
    fn round_trips_formatted_values() {
        for raw in ["0.00", "1.50", "999.99", "1,000.00", "305,465.02", "12,345,678.90"] {
            let parsed = parse_amount(raw).unwrap();
            let formatted = format_with_commas(parsed);
            assert_eq!(parse_amount(&formatted), Some(parsed), "round trip for {raw}");
        }
    }

    #[test]
    fn dr_suffix_negates_only_when_allowed() {
        assert_eq!(scan_amount("1,234.56DR", true), Some(dec("-1234.56")));
        assert_eq!(scan_amount("1,234.56 DR", true), Some(dec("-1234.56")));
        assert_eq!(scan_amount("1,234.56DR", false), Some(dec("1234.56")));
        assert_eq!(scan_amount("305,465.02", true), Some(dec("305465.02")));
    }

    #[test]
    fn scan_ignores_trailing_watermark() {
        assert_eq!(scan_amount("127,543.16 xyz", false), Some(dec("127543.16")));
    }

    fn format_with_commas(value: Decimal) -> String {
        let s = format!("{:.2}", value);
        let (int_part, frac) = s.split_once('.').unwrap();
        let digits: Vec<char> = int_part.chars().collect();
        let mut out = String::new();
        for (i, c) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(*c);
        }
        format!("{out}.{frac}")
    }
}
