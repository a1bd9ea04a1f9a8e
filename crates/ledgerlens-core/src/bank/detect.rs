//! Bank detection cascade: vision logo read, then product names, then
//! keywords.

use std::io::Cursor;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, info, warn};

use super::patterns::{BANK_KEYWORDS, BANK_PRODUCTS};
use super::{Bank, BankLayout, DetectionSource};
use crate::error::{LensError, ModelError, Result};
use crate::model::{CancelToken, VisionModel};
use crate::pdf::PdfAccess;

/// Fraction of page 1 (from the top) submitted for logo detection.
const LOGO_CROP_RATIO: f32 = 0.20;

/// Identifies the issuing institution from the statement's first pages.
pub struct BankDetector<'a> {
    vision: Option<&'a dyn VisionModel>,
    vision_deadline: Duration,
    render_dpi: u32,
}

impl<'a> BankDetector<'a> {
    pub fn new() -> Self {
        Self {
            vision: None,
            vision_deadline: Duration::from_secs(60),
            render_dpi: 150,
        }
    }

    /// Wire a vision backend for the logo step.
    pub fn with_vision(mut self, vision: &'a dyn VisionModel, deadline: Duration) -> Self {
        self.vision = Some(vision);
        self.vision_deadline = deadline;
        self
    }

    pub fn with_render_dpi(mut self, dpi: u32) -> Self {
        self.render_dpi = dpi;
        self
    }

    /// Run the cascade, stopping at the first confident result.
    pub fn detect(&self, pdf: &dyn PdfAccess, cancel: &CancelToken) -> Result<BankLayout> {
        if let Some(vision) = self.vision {
            if cancel.is_cancelled() {
                return Err(LensError::ExtractionCancelled);
            }
            match self.detect_from_logo(pdf, vision) {
                Ok(Some(bank)) => {
                    info!(bank = bank.name(), "bank detected via logo");
                    return Ok(BankLayout {
                        bank,
                        confidence: 0.90,
                        source: DetectionSource::Vision,
                    });
                }
                Ok(None) => {}
                Err(LensError::Model(ModelError::Cancelled)) => {
                    return Err(LensError::ExtractionCancelled)
                }
                Err(e) => warn!("vision bank detection failed: {e}"),
            }
        }

        let mut sample = String::new();
        for page in 0..pdf.page_count().min(3) {
            if let Ok(text) = pdf.page_text(page) {
                sample.push_str(&text);
                sample.push(' ');
            }
        }

        Ok(detect_from_text(&sample))
    }

    /// Crop the top of page 1 and ask the vision model to read the logo.
    fn detect_from_logo(
        &self,
        pdf: &dyn PdfAccess,
        vision: &dyn VisionModel,
    ) -> Result<Option<Bank>> {
        let png = pdf.render_page(0, self.render_dpi)?;
        let full = image::load_from_memory(&png)?;
        let header_height = ((full.height() as f32) * LOGO_CROP_RATIO).max(1.0) as u32;
        let header = full.crop_imm(0, 0, full.width(), header_height);

        let mut cropped = Vec::new();
        header.write_to(&mut Cursor::new(&mut cropped), image::ImageFormat::Png)?;

        let names: Vec<&str> = Bank::all().iter().map(|b| b.name()).collect();
        let prompt = format!(
            "Look at this bank statement header image and identify the Singapore bank \
             from its logo or branding.\n\
             Return ONLY the bank name, one of: {}.\n\
             If you cannot identify it, return: unknown",
            names.join(", ")
        );

        let answer = vision.analyze_image(&cropped, &prompt, self.vision_deadline)?;
        match Bank::from_answer(&answer) {
            Some(bank) => Ok(Some(bank)),
            None => {
                warn!(answer = answer.trim(), "vision returned unrecognised bank");
                Ok(None)
            }
        }
    }
}

impl Default for BankDetector<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Text fallback: product literals first (no false positives), then bank
/// keywords with word-boundary anchoring for short names.
pub fn detect_from_text(sample: &str) -> BankLayout {
    let lower = sample.to_lowercase();

    for (bank, products) in BANK_PRODUCTS {
        for product in *products {
            if lower.contains(&product.to_lowercase()) {
                debug!(bank = bank.name(), product, "bank detected via product name");
                return BankLayout {
                    bank: *bank,
                    confidence: 0.85,
                    source: DetectionSource::Product,
                };
            }
        }
    }

    for (bank, keywords) in BANK_KEYWORDS {
        for keyword in *keywords {
            let hit = if keyword.len() <= 4 {
                // Word boundaries stop e.g. "OCBCish" from matching OCBC.
                Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword)))
                    .map(|re| re.is_match(sample))
                    .unwrap_or(false)
            } else {
                lower.contains(&keyword.to_lowercase())
            };
            if hit {
                debug!(bank = bank.name(), keyword, "bank detected via keyword");
                return BankLayout {
                    bank: *bank,
                    confidence: 0.70,
                    source: DetectionSource::Keyword,
                };
            }
        }
    }

    BankLayout::unknown()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_name_beats_keyword() {
        let layout = detect_from_text("AUTOSAVE ACCOUNT statement for UOB customer");
        assert_eq!(layout.bank, Bank::Dbs);
        assert_eq!(layout.source, DetectionSource::Product);
        assert!(layout.confidence > 0.7);
    }

    #[test]
    fn short_keyword_requires_word_boundary() {
        assert_eq!(detect_from_text("the OCBCish company").bank, Bank::Unknown);
        assert_eq!(detect_from_text("OCBC Bank statement").bank, Bank::Ocbc);
        assert_eq!(detect_from_text("paid via UOB transfer").bank, Bank::Uob);
    }

    #[test]
    fn unknown_on_no_match() {
        let layout = detect_from_text("a plain utility bill");
        assert_eq!(layout.bank, Bank::Unknown);
        assert_eq!(layout.confidence, 0.0);
    }

    #[test]
    fn hsbc_global_savings_product() {
        let layout = detect_from_text("GLOBAL SAVINGS ACCOUNT statement");
        assert_eq!(layout.bank, Bank::Hsbc);
    }
}
