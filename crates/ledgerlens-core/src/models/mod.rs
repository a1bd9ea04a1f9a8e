//! Data models for the extraction core.

pub mod account;
pub mod report;
pub mod transaction;

pub use account::AccountInfo;
pub use report::{
    AccuracyReport, BalanceChainReport, ChainBreak, CurrencyMetrics, ExtractionMethod,
    ExtractionResult, ScoreComponent, StatementMetrics,
};
pub use transaction::{Category, Transaction, TransactionType};
