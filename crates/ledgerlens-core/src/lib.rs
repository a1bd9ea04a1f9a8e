//! Core library for bank-statement extraction.
//!
//! This crate converts heterogeneous statement PDFs (bordered, borderless,
//! bilingual, multi-currency, scanned) into a normalized transaction
//! ledger with a mathematically validated balance chain:
//! - PDF access (text, word geometry, ruled tables, rasterization)
//! - bank identification (vision logo, product names, keywords)
//! - a three-tier extraction cascade (tables, word geometry, model)
//! - normalization, balance-chain validation and accuracy scoring

pub mod bank;
pub mod error;
pub mod extract;
pub mod model;
pub mod models;
pub mod normalize;
pub mod pdf;

pub use bank::{Bank, BankDetector, BankLayout, DetectionSource};
pub use error::{LensError, ModelError, PdfError, Result};
pub use extract::{ColumnKind, ColumnLayout, StatementExtractor, MIN_TRANSACTIONS};
pub use model::{CancelToken, ChatMessage, ChatModel, ChatRole, ExtractorConfig, VisionModel};
pub use models::{
    AccountInfo, AccuracyReport, BalanceChainReport, Category, ChainBreak, ExtractionMethod,
    ExtractionResult, StatementMetrics, Transaction, TransactionType,
};
pub use pdf::{PageTable, PageWord, PdfAccess, PdfiumStatement};
