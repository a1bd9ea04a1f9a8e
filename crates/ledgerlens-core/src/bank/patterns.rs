//! Per-bank keyword, product and noise tables.

use lazy_static::lazy_static;
use regex::Regex;

use super::Bank;

/// Bank name keywords, in match priority order. Short keywords (four
/// characters or fewer) are matched with word-boundary anchoring to avoid
/// partial collisions.
pub static BANK_KEYWORDS: &[(Bank, &[&str])] = &[
    (Bank::Ocbc, &["OCBC Bank", "Oversea-Chinese Banking", "OCBC"]),
    (Bank::Dbs, &["DBS Bank", "Development Bank of Singapore", "DBS/POSB", "DBS"]),
    (Bank::Posb, &["POSB"]),
    (Bank::Uob, &["United Overseas Bank", "UOB"]),
    (Bank::StandardChartered, &["Standard Chartered"]),
    (Bank::Hsbc, &["HSBC", "The Hongkong and Shanghai Banking"]),
    (Bank::Citibank, &["Citibank"]),
    (Bank::Maybank, &["Maybank"]),
    (Bank::Cimb, &["CIMB"]),
    (Bank::BankOfChina, &["Bank of China"]),
    (Bank::Icbc, &["ICBC"]),
    (Bank::Gxs, &["GXS Bank", "GXS"]),
    (Bank::Trust, &["Trust Bank", "Trust"]),
    (Bank::MariBank, &["MariBank"]),
    (Bank::Revolut, &["Revolut"]),
    (Bank::Wise, &["Wise", "TransferWise"]),
    (Bank::Aspire, &["Aspire"]),
    (Bank::Airwallex, &["Airwallex", "ANEXT"]),
];

/// Product names that uniquely identify a bank, for statements whose bank
/// name only appears inside the logo image.
pub static BANK_PRODUCTS: &[(Bank, &[&str])] = &[
    (
        Bank::Dbs,
        &[
            "AUTOSAVE ACCOUNT",
            "MULTIPLIER ACCOUNT",
            "MY ACCOUNT",
            "DBS TREASURES",
            "POSB SAYE",
            "POSB EVERYDAY",
        ],
    ),
    (Bank::Ocbc, &["360 ACCOUNT", "FRANK ACCOUNT", "OCBC VOYAGE"]),
    (Bank::Uob, &["UNIPLUS", "ONE ACCOUNT", "STASH ACCOUNT"]),
    (Bank::StandardChartered, &["BONUSSAVER", "JUMPSTART"]),
    (Bank::Hsbc, &["EVERYDAY GLOBAL ACCOUNT", "GLOBAL SAVINGS ACCOUNT", "CURRENT ACCOUNT"]),
    (Bank::Aspire, &["ASPIRE BUSINESS ACCOUNT"]),
];

lazy_static! {
    static ref NOISE_OCBC: Vec<Regex> = compile(&[
        r"(?i)Deposit Insurance Scheme.*",
        r"(?i)Please turn over.*",
        r"RNB\w+\\?\d+",
    ]);
    static ref NOISE_DBS: Vec<Regex> = compile(&[
        r"(?i)Page \d+\s*/\s*\d+",
        r"(?i)Page \d+ of \d+",
        r"DBS Bank Ltd.*",
        r"(?i)Printed By\s*:.*",
        r"(?i)Printed On\s*:.*",
        r"(?i)Deposit Insurance Scheme.*?\.",
        r"(?i)Transactions performed on a non-working day.*",
        r"(?i)If date requested is a non business day.*",
    ]);
    static ref NOISE_UOB: Vec<Regex> = compile(&[
        r"(?i)Page \d+ of \d+",
        r"United Overseas Bank Limited.*",
    ]);
    static ref NOISE_SCB: Vec<Regex> = compile(&[r"(?i)Page \d+ of \d+"]);
    static ref NOISE_HSBC: Vec<Regex> = compile(&[
        r"(?i)Page\s*\d+\s*of\s*\d+",
        r"(?i)Deposit Insurance Scheme.*",
        r"(?i)Issued by The Hongkong.*",
        r"ENDOFSTATEMENT",
    ]);
    static ref NOISE_DEFAULT: Vec<Regex> = compile(&[
        r"(?i)Page \d+\s*/\s*\d+",
        r"(?i)Page \d+ of \d+",
    ]);
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).expect("static noise pattern")).collect()
}

/// Noise regexes for a bank, always including the generic page-number set.
pub fn noise_patterns(bank: Bank) -> Vec<&'static Regex> {
    let specific: &'static Vec<Regex> = match bank {
        Bank::Ocbc => &*NOISE_OCBC,
        Bank::Dbs | Bank::Posb => &*NOISE_DBS,
        Bank::Uob => &*NOISE_UOB,
        Bank::StandardChartered => &*NOISE_SCB,
        Bank::Hsbc => &*NOISE_HSBC,
        _ => &*NOISE_DEFAULT,
    };
    let mut out: Vec<&'static Regex> = specific.iter().collect();
    if !std::ptr::eq(specific, &*NOISE_DEFAULT) {
        out.extend(NOISE_DEFAULT.iter());
    }
    out
}

/// Strip per-page boilerplate for the detected bank.
pub fn strip_noise(text: &str, bank: Bank) -> String {
    let mut cleaned = text.to_string();
    for re in noise_patterns(bank) {
        cleaned = re.replace_all(&cleaned, "").into_owned();
    }
    cleaned.trim().to_string()
}
