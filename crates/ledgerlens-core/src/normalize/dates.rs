//! Date normalization to the canonical year-less `DD MMM` form.

use lazy_static::lazy_static;
use regex::Regex;

/// Fixed three-letter month set.
pub static MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

lazy_static! {
    // DDMMMYYYY, no separators (HSBC: 30SEP2025)
    static ref DATE_COMPACT: Regex = Regex::new(r"(\d{2})([A-Za-z]{3})(\d{4})").unwrap();
    // DD-MMM-YYYY (DBS: 01-Sep-2025)
    static ref DATE_DASHED: Regex = Regex::new(r"(\d{1,2})-([A-Za-z]{3})-\d{4}").unwrap();
    // DD MMM or DD MMM YYYY (OCBC / UOB / Aspire)
    static ref DATE_SPACED: Regex =
        Regex::new(r"(\d{1,2})\s+([A-Za-z]{3})(?:\s+\d{4})?").unwrap();
    // DD/MM or DD/MM/YYYY
    static ref DATE_SLASHED: Regex = Regex::new(r"(\d{1,2})/(\d{1,2})(?:/\d{2,4})?").unwrap();
}

fn month_index(name: &str) -> Option<usize> {
    let upper = name.to_uppercase();
    MONTHS.iter().position(|m| *m == upper)
}

fn canonical(day: &str, month: &str) -> Option<String> {
    let day_num: u32 = day.parse().ok()?;
    if !(1..=31).contains(&day_num) {
        return None;
    }
    month_index(month)?;
    Some(format!("{:02} {}", day_num, month.to_uppercase()))
}

/// Normalise any supported date grammar to `DD MMM`.
///
/// Accepts `01-Sep-2025`, `01 DEC 2025`, `01/12/2025`, `30SEP2025` and the
/// already-canonical `01 DEC`. Returns `None` when nothing parseable is
/// found. Idempotent over its own output.
pub fn normalise_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(caps) = DATE_COMPACT.captures(raw) {
        if let Some(out) = canonical(&caps[1], &caps[2]) {
            return Some(out);
        }
    }
    if let Some(caps) = DATE_DASHED.captures(raw) {
        if let Some(out) = canonical(&caps[1], &caps[2]) {
            return Some(out);
        }
    }
    if let Some(caps) = DATE_SPACED.captures(raw) {
        if let Some(out) = canonical(&caps[1], &caps[2]) {
            return Some(out);
        }
    }
    if let Some(caps) = DATE_SLASHED.captures(raw) {
        let month: usize = caps[2].parse().ok()?;
        if (1..=12).contains(&month) {
            if let Some(out) = canonical(&caps[1], MONTHS[month - 1]) {
                return Some(out);
            }
        }
    }
    None
}

/// Sortable (month, day) key for a canonical `DD MMM` date.
pub fn date_ordinal(date: &str) -> Option<(usize, u32)> {
    let (day, month) = date.split_once(' ')?;
    Some((month_index(month)?, day.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_all_grammars() {
        assert_eq!(normalise_date("01-Sep-2025").as_deref(), Some("01 SEP"));
        assert_eq!(normalise_date("01 DEC 2025").as_deref(), Some("01 DEC"));
        assert_eq!(normalise_date("01/12/2025").as_deref(), Some("01 DEC"));
        assert_eq!(normalise_date("30SEP2025").as_deref(), Some("30 SEP"));
        assert_eq!(normalise_date("01 DEC").as_deref(), Some("01 DEC"));
        assert_eq!(normalise_date("1 31 Dec 2025").as_deref(), Some("31 DEC"));
    }

    #[test]
    fn zero_pads_day_and_uppercases_month() {
        assert_eq!(normalise_date("5 jan").as_deref(), Some("05 JAN"));
        assert_eq!(normalise_date("5/3/24").as_deref(), Some("05 MAR"));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(normalise_date(""), None);
        assert_eq!(normalise_date("WITHDRAWALS"), None);
        assert_eq!(normalise_date("99 XYZ"), None);
        assert_eq!(normalise_date("32 JAN"), None);
        assert_eq!(normalise_date("15/13/2025"), None);
    }

    #[test]
    fn idempotent_over_own_output() {
        for raw in ["01-Sep-2025", "30SEP2025", "01/12/2025", "9 MAY 2024", "01 DEC"] {
            let once = normalise_date(raw).unwrap();
            let twice = normalise_date(&once).unwrap();
            assert_eq!(once, twice, "not idempotent for {raw}");
        }
    }

    #[test]
    fn ordinal_orders_dates() {
        assert!(date_ordinal("01 JAN").unwrap() < date_ordinal("02 JAN").unwrap());
        assert!(date_ordinal("28 FEB").unwrap() < date_ordinal("01 MAR").unwrap());
        assert_eq!(date_ordinal("bogus"), None);
    }
}
