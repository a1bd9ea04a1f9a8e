//! Extraction pipeline: tier selection, normalization and result assembly.

pub mod account;
pub mod columns;
pub mod llm;
pub mod patterns;
pub mod tables;
pub mod words;

pub use columns::{ColumnKind, ColumnLayout};

use tracing::{info, warn};

use crate::bank::{Bank, BankDetector, BankLayout};
use crate::error::{LensError, PdfError, Result};
use crate::model::{CancelToken, ChatModel, ExtractorConfig, VisionModel};
use crate::models::{AccountInfo, ExtractionMethod, ExtractionResult, Transaction};
use crate::normalize;
use crate::pdf::PdfAccess;

/// An extraction that ends with fewer rows than this is a failure.
pub const MIN_TRANSACTIONS: usize = 3;

/// Upstream layout hints above this confidence skip bank detection.
const HINT_CONFIDENCE: f32 = 0.7;

/// The three-tier extraction pipeline.
///
/// Deterministic on digital PDFs: the table and word tiers never call a
/// model, and the model tier only runs when both come up short.
pub struct StatementExtractor<'a> {
    chat: Option<&'a dyn ChatModel>,
    vision: Option<&'a dyn VisionModel>,
    config: ExtractorConfig,
}

impl<'a> StatementExtractor<'a> {
    pub fn new() -> Self {
        Self { chat: None, vision: None, config: ExtractorConfig::default() }
    }

    /// Wire a chat backend (enables Tier 3 and model account info).
    pub fn with_chat(mut self, chat: &'a dyn ChatModel) -> Self {
        self.chat = Some(chat);
        self
    }

    /// Wire a vision backend (enables logo detection and scanned OCR).
    pub fn with_vision(mut self, vision: &'a dyn VisionModel) -> Self {
        self.vision = Some(vision);
        self
    }

    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the full pipeline on an open PDF.
    pub fn extract(
        &self,
        pdf: &dyn PdfAccess,
        hint: Option<BankLayout>,
        cancel: &CancelToken,
    ) -> Result<ExtractionResult> {
        if pdf.page_count() == 0 {
            return Err(LensError::Pdf(PdfError::NoPages));
        }
        if cancel.is_cancelled() {
            return Err(LensError::ExtractionCancelled);
        }

        // Bank identification conditions tier quirks and noise stripping.
        let layout = match hint {
            Some(h) if h.confidence > HINT_CONFIDENCE => h,
            _ => {
                let mut detector = BankDetector::new().with_render_dpi(self.config.render_dpi);
                if let Some(vision) = self.vision {
                    detector = detector.with_vision(vision, self.config.vision_deadline);
                }
                detector.detect(pdf, cancel)?
            }
        };
        let bank = layout.bank;
        info!(bank = bank.name(), confidence = layout.confidence, "bank identified");

        let scanned = pdf.is_scanned();
        if scanned {
            info!("scanned PDF detected; routing to vision OCR + model tier");
        }

        let mut account_info = account::extract_from_text(pdf);
        let currency_hint = account_info.currency.clone();

        // Tier cascade: tables, then word geometry, then the model.
        let mut method = ExtractionMethod::Table;
        let mut pages_processed = pdf.page_count();
        let mut transactions: Vec<Transaction> = Vec::new();

        if !scanned {
            if let Some(tier) = tables::extract_tables(
                pdf,
                currency_hint.as_deref().unwrap_or("SGD"),
            )? {
                if tier.transactions.len() >= MIN_TRANSACTIONS {
                    account_info.merge_preferring(&tier.account_info);
                    transactions = tier.transactions;
                } else {
                    info!(
                        count = tier.transactions.len(),
                        "table tier produced too few rows; trying word tier"
                    );
                }
            }

            if transactions.is_empty() {
                if let Some(rows) = words::extract_words(pdf, currency_hint.clone())? {
                    transactions = rows;
                    method = ExtractionMethod::Words;
                }
            }
        }

        if transactions.is_empty() {
            let Some(chat) = self.chat else {
                warn!("deterministic tiers exhausted and no chat backend wired");
                return Err(LensError::ExtractionFailed(MIN_TRANSACTIONS));
            };
            let tier = llm::LlmTier { chat, vision: self.vision, config: &self.config };
            let (rows, batches) = tier.extract(pdf, bank, scanned, cancel)?;
            transactions = rows;
            pages_processed = batches;
            method = if scanned { ExtractionMethod::LlmOcr } else { ExtractionMethod::Llm };

            // The model also gets a shot at account info on this path.
            let mut first_pages = String::new();
            for page in 0..pdf.page_count().min(2) {
                if scanned {
                    break;
                }
                if let Ok(text) = pdf.page_text(page) {
                    first_pages.push_str(&text);
                    first_pages.push('\n');
                }
            }
            if !first_pages.is_empty() {
                match account::extract_with_model(chat, &first_pages, &self.config) {
                    Ok(model_info) => {
                        let deterministic = account_info;
                        account_info = model_info;
                        account_info.merge_preferring(&deterministic);
                    }
                    Err(e) => warn!("model account info failed: {e}"),
                }
            }
        }

        if transactions.len() < MIN_TRANSACTIONS {
            return Err(LensError::ExtractionFailed(MIN_TRANSACTIONS));
        }

        if bank != Bank::Unknown {
            account_info.bank = Some(bank.name().to_string());
        }

        Ok(self.assemble(bank, account_info, transactions, method, pages_processed))
    }

    /// Normalize, validate, score and package the final record.
    fn assemble(
        &self,
        bank: Bank,
        account_info: AccountInfo,
        mut transactions: Vec<Transaction>,
        method: ExtractionMethod,
        pages_processed: usize,
    ) -> ExtractionResult {
        normalize::enrich_all(&mut transactions);

        let balance_chain = normalize::validate_balance_chain(&transactions);
        let metrics = normalize::compute_metrics(&transactions);
        let accuracy = normalize::compute_accuracy(&transactions, &metrics, &balance_chain);

        let mut currencies: Vec<String> = Vec::new();
        for t in &transactions {
            if !currencies.contains(&t.currency) {
                currencies.push(t.currency.clone());
            }
        }

        info!(
            transactions = transactions.len(),
            chain_pct = balance_chain.chain_accuracy_pct,
            score = accuracy.overall_score,
            grade = %accuracy.grade,
            "extraction complete"
        );

        ExtractionResult {
            bank: bank.name().to_string(),
            account_info,
            transactions,
            metrics,
            accuracy,
            balance_chain,
            extraction_method: method,
            pages_processed,
            currencies,
        }
    }
}

impl Default for StatementExtractor<'_> {
    fn default() -> Self {
        Self::new()
    }
}
