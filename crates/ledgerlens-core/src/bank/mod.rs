//! Issuing-bank identification.

mod detect;
pub mod patterns;

pub use detect::BankDetector;

use serde::{Deserialize, Serialize};

/// Closed set of known issuers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bank {
    Ocbc,
    Dbs,
    Posb,
    Uob,
    StandardChartered,
    Hsbc,
    Citibank,
    Maybank,
    Cimb,
    BankOfChina,
    Icbc,
    Gxs,
    Trust,
    MariBank,
    Revolut,
    Wise,
    Aspire,
    Airwallex,
    Unknown,
}

impl Bank {
    /// Canonical display name.
    pub fn name(&self) -> &'static str {
        match self {
            Bank::Ocbc => "OCBC",
            Bank::Dbs => "DBS",
            Bank::Posb => "POSB",
            Bank::Uob => "UOB",
            Bank::StandardChartered => "Standard Chartered",
            Bank::Hsbc => "HSBC",
            Bank::Citibank => "Citibank",
            Bank::Maybank => "Maybank",
            Bank::Cimb => "CIMB",
            Bank::BankOfChina => "Bank of China",
            Bank::Icbc => "ICBC",
            Bank::Gxs => "GXS Bank",
            Bank::Trust => "Trust Bank",
            Bank::MariBank => "MariBank",
            Bank::Revolut => "Revolut",
            Bank::Wise => "Wise",
            Bank::Aspire => "Aspire",
            Bank::Airwallex => "Airwallex",
            Bank::Unknown => "unknown",
        }
    }

    /// All real banks (excludes `Unknown`), in detection priority order.
    pub fn all() -> &'static [Bank] {
        &[
            Bank::Ocbc,
            Bank::Dbs,
            Bank::Posb,
            Bank::Uob,
            Bank::StandardChartered,
            Bank::Hsbc,
            Bank::Citibank,
            Bank::Maybank,
            Bank::Cimb,
            Bank::BankOfChina,
            Bank::Icbc,
            Bank::Gxs,
            Bank::Trust,
            Bank::MariBank,
            Bank::Revolut,
            Bank::Wise,
            Bank::Aspire,
            Bank::Airwallex,
        ]
    }

    /// Resolve a free-form name (e.g. a vision model answer) against the
    /// closed set: exact match first, then containment.
    pub fn from_answer(answer: &str) -> Option<Bank> {
        let answer = answer.trim().trim_matches(|c| c == '"' || c == '\'');
        for bank in Self::all() {
            if bank.name().eq_ignore_ascii_case(answer) {
                return Some(*bank);
            }
        }
        let lower = answer.to_lowercase();
        for bank in Self::all() {
            if lower.contains(&bank.name().to_lowercase()) {
                return Some(*bank);
            }
        }
        None
    }
}

/// Which step of the cascade produced the identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSource {
    /// Logo read by the vision model.
    Vision,
    /// Product-line literal (e.g. "AUTOSAVE ACCOUNT").
    Product,
    /// Bank keyword match.
    Keyword,
}

/// A bank identification with its confidence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BankLayout {
    pub bank: Bank,
    /// Confidence in [0, 1].
    pub confidence: f32,
    pub source: DetectionSource,
}

impl BankLayout {
    pub fn unknown() -> Self {
        Self { bank: Bank::Unknown, confidence: 0.0, source: DetectionSource::Keyword }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_exact_and_fuzzy_answers() {
        assert_eq!(Bank::from_answer("HSBC"), Some(Bank::Hsbc));
        assert_eq!(Bank::from_answer("\"DBS\""), Some(Bank::Dbs));
        assert_eq!(
            Bank::from_answer("This looks like an OCBC statement"),
            Some(Bank::Ocbc)
        );
        assert_eq!(Bank::from_answer("unknown"), None);
    }
}
