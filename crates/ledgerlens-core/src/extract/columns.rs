//! Column-layout discovery for the word-geometry tier.
//!
//! Finds the header row of a statement page by scoring every y-band of
//! words (and merged adjacent bands, for multi-line headers) against a
//! canonical column-alias dictionary, then turns the matched header words
//! into x-intervals by splitting at the midpoints between neighbours.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::pdf::PageWord;

/// Vertical tolerance when banding words into rows.
pub const Y_BAND: f32 = 4.0;

/// Maximum vertical span a multi-line header may occupy.
const HEADER_MERGE_SPAN: f32 = 16.0;

/// Data rows start this far below the header band.
const DATA_GAP: f32 = 8.0;

/// Minimum alias hits for a header candidate.
const MIN_HEADER_SCORE: usize = 2;

lazy_static! {
    static ref CCY_PAREN: Regex = Regex::new(r"\([a-z]{3}\)").unwrap();
    static ref CCY_SUFFIX: Regex = Regex::new(r"\s*\([a-z]{3}\)\s*$").unwrap();
}

/// Canonical statement columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    TransactionDate,
    ValueDate,
    Description,
    Counterparty,
    Cheque,
    Reference,
    Withdrawal,
    Deposit,
    Balance,
}

impl ColumnKind {
    pub fn all() -> &'static [ColumnKind] {
        &[
            ColumnKind::TransactionDate,
            ColumnKind::ValueDate,
            ColumnKind::Description,
            ColumnKind::Counterparty,
            ColumnKind::Cheque,
            ColumnKind::Reference,
            ColumnKind::Withdrawal,
            ColumnKind::Deposit,
            ColumnKind::Balance,
        ]
    }

    /// Header aliases, richer than the table tier's set: borderless banks
    /// use looser labels.
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            ColumnKind::TransactionDate => &[
                "transaction date",
                "txn date",
                "trans date",
                "date",
                "date & time",
                "date and time",
                "transaction",
                "trans",
            ],
            ColumnKind::ValueDate => &["value date", "posting date", "effective date"],
            ColumnKind::Description => &[
                "description",
                "particulars",
                "details",
                "narrative",
                "remarks",
                "transaction details",
            ],
            ColumnKind::Counterparty => &["counterparty", "payee", "beneficiary", "sender"],
            ColumnKind::Cheque => &["cheque", "chq", "check", "cheque no"],
            ColumnKind::Reference => &["reference", "ref", "ref no", "reference no"],
            ColumnKind::Withdrawal => &[
                "withdrawal",
                "withdrawals",
                "debit",
                "debits",
                "debit amount",
                "withdrawal amount",
                "payments",
            ],
            ColumnKind::Deposit => &[
                "deposit",
                "deposits",
                "credit",
                "credits",
                "credit amount",
                "deposit amount",
                "receipts",
            ],
            ColumnKind::Balance => &[
                "balance",
                "running balance",
                "closing balance",
                "available balance",
                "ledger balance",
            ],
        }
    }

    pub fn is_amount(&self) -> bool {
        matches!(self, ColumnKind::Withdrawal | ColumnKind::Deposit)
    }
}

/// Discovered per-page column layout: the header's y-band and an ordered
/// mapping from canonical column to x-interval.
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    pub header_y: f32,
    pub header_y_max: f32,
    /// Matched header-word extents, ordered left to right.
    pub spans: Vec<(ColumnKind, f32, f32)>,
    /// Midpoint-split intervals, ordered left to right.
    pub bounds: Vec<(ColumnKind, f32, f32)>,
}

impl ColumnLayout {
    pub fn bound(&self, kind: ColumnKind) -> Option<(f32, f32)> {
        self.bounds.iter().find(|(k, _, _)| *k == kind).map(|(_, a, b)| (*a, *b))
    }

    pub fn has(&self, kind: ColumnKind) -> bool {
        self.bound(kind).is_some()
    }

    /// Top of the data region.
    pub fn data_top(&self) -> f32 {
        self.header_y_max + DATA_GAP
    }

    fn max_right(&self) -> f32 {
        self.bounds.iter().map(|(_, _, r)| *r).fold(0.0, f32::max)
    }

    /// The column whose date drives row assembly.
    pub fn date_column(&self) -> Option<ColumnKind> {
        if self.has(ColumnKind::TransactionDate) {
            Some(ColumnKind::TransactionDate)
        } else if self.has(ColumnKind::ValueDate) {
            Some(ColumnKind::ValueDate)
        } else {
            None
        }
    }

    /// The column that carries row descriptions.
    pub fn description_column(&self) -> Option<ColumnKind> {
        for kind in [ColumnKind::Description, ColumnKind::Counterparty, ColumnKind::Cheque] {
            if self.has(kind) {
                return Some(kind);
            }
        }
        None
    }
}

/// Bilingual headers carry non-ASCII glyphs that must not defeat alias
/// matching; data capture keeps them.
fn strip_non_ascii(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii()).collect::<String>().trim().to_string()
}

/// Group words into 4-point y-bands keyed by quantized top coordinate.
pub fn band_words(words: &[PageWord]) -> BTreeMap<i32, Vec<&PageWord>> {
    let mut bands: BTreeMap<i32, Vec<&PageWord>> = BTreeMap::new();
    for w in words {
        let key = ((w.top / Y_BAND).round() * Y_BAND) as i32;
        bands.entry(key).or_default().push(w);
    }
    for row in bands.values_mut() {
        row.sort_by(|a, b| a.x0.partial_cmp(&b.x0).unwrap_or(std::cmp::Ordering::Equal));
    }
    bands
}

fn score_row(row_words: &[&PageWord]) -> (usize, Vec<(ColumnKind, f32, f32)>) {
    let row_text = row_words
        .iter()
        .map(|w| strip_non_ascii(&w.text).to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    let row_text_no_ccy = CCY_PAREN.replace_all(&row_text, "").trim().to_string();

    let mut matches: Vec<(ColumnKind, f32, f32)> = Vec::new();
    let mut score = 0usize;

    for kind in ColumnKind::all() {
        for alias in kind.aliases() {
            if !row_text.contains(alias) && !row_text_no_ccy.contains(alias) {
                continue;
            }
            let alias_words: Vec<&str> = alias.split_whitespace().collect();
            let mut span: Option<(f32, f32)> = None;
            for w in row_words {
                let wt = strip_non_ascii(&w.text).to_lowercase();
                let wt_clean = CCY_SUFFIX.replace(&wt, "").trim().to_string();
                let wt_words: Vec<&str> = wt_clean.split_whitespace().collect();
                let hit = alias_words.contains(&wt_clean.as_str())
                    || alias_words.contains(&wt.as_str())
                    || wt_clean.contains(alias)
                    || wt.contains(alias)
                    || wt_words.iter().any(|t| alias_words.contains(t));
                if hit {
                    span = Some(match span {
                        Some((x0, x1)) => (x0.min(w.x0), x1.max(w.x1)),
                        None => (w.x0, w.x1),
                    });
                }
            }
            if let Some((x0, x1)) = span {
                if !matches.iter().any(|(k, _, _)| k == kind) {
                    matches.push((*kind, x0, x1));
                    score += 1;
                }
                break;
            }
        }
    }

    (score, matches)
}

fn valid_header(matches: &[(ColumnKind, f32, f32)]) -> bool {
    let has_amount = matches.iter().any(|(k, _, _)| k.is_amount());
    let has_balance = matches.iter().any(|(k, _, _)| *k == ColumnKind::Balance);
    has_amount && has_balance
}

/// Discover the column layout of a page, or `None` when no y-band (alone
/// or merged with its neighbours within 16 points) looks like a statement
/// header with at least one amount column and a balance column.
pub fn discover_layout(words: &[PageWord], page_width: f32) -> Option<ColumnLayout> {
    if words.is_empty() {
        return None;
    }
    let bands = band_words(words);
    let ys: Vec<i32> = bands.keys().copied().collect();

    let mut best: Option<(usize, f32, f32, Vec<(ColumnKind, f32, f32)>)> = None;

    for (idx, y) in ys.iter().enumerate() {
        let row = &bands[y];
        let (score, matches) = score_row(row);
        if valid_header(&matches) && best.as_ref().map_or(true, |(s, ..)| score > *s) {
            best = Some((score, *y as f32, *y as f32, matches));
        }

        // Multi-line headers: merge with the next one or two bands.
        for span in 1..=2usize {
            let Some(next_y) = ys.get(idx + span) else { break };
            if (*next_y - *y) as f32 > HEADER_MERGE_SPAN {
                break;
            }
            let mut merged: Vec<&PageWord> = row.clone();
            for s in 1..=span {
                merged.extend(bands[&ys[idx + s]].iter().copied());
            }
            merged.sort_by(|a, b| a.x0.partial_cmp(&b.x0).unwrap_or(std::cmp::Ordering::Equal));
            let (mscore, mmatches) = score_row(&merged);
            if valid_header(&mmatches) && best.as_ref().map_or(true, |(s, ..)| mscore > *s) {
                best = Some((mscore, *y as f32, *next_y as f32, mmatches));
            }
        }
    }

    let (score, header_y, header_y_max, mut spans) = best?;
    if score < MIN_HEADER_SCORE {
        return None;
    }

    spans.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    // Interval boundary between adjacent columns is the midpoint of their
    // header-word midpoints; outer columns run to the page margins.
    let mids: Vec<f32> = spans.iter().map(|(_, x0, x1)| (x0 + x1) / 2.0).collect();
    let mut bounds = Vec::with_capacity(spans.len());
    for (i, (kind, _, _)) in spans.iter().enumerate() {
        let left = if i == 0 { 0.0 } else { (mids[i - 1] + mids[i]) / 2.0 };
        let right = if i == spans.len() - 1 {
            page_width
        } else {
            (mids[i] + mids[i + 1]) / 2.0
        };
        bounds.push((*kind, left, right));
    }

    Some(ColumnLayout { header_y, header_y_max, spans, bounds })
}

/// Assign a row's words to columns by x-midpoint. Words outside every
/// interval (watermarks, marginalia) are dropped silently.
pub fn assign_columns(row_words: &[&PageWord], layout: &ColumnLayout) -> Vec<(ColumnKind, String)> {
    let max_right = layout.max_right();
    let mut cells: Vec<(ColumnKind, String)> = Vec::new();
    for w in row_words {
        let mid = w.x_mid();
        if mid > max_right {
            continue;
        }
        let Some((kind, _, _)) =
            layout.bounds.iter().find(|(_, left, right)| mid >= *left && mid <= *right)
        else {
            continue;
        };
        match cells.iter_mut().find(|(k, _)| k == kind) {
            Some((_, text)) => {
                text.push(' ');
                text.push_str(w.text.trim());
            }
            None => cells.push((*kind, w.text.trim().to_string())),
        }
    }
    cells
}

/// Fetch one assigned cell.
pub fn cell_text(cells: &[(ColumnKind, String)], kind: ColumnKind) -> String {
    cells
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, t)| t.trim().to_string())
        .unwrap_or_default()
}
