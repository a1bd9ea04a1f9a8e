//! PDF access layer.
//!
//! Read-only view over an open statement PDF: page text, words with
//! geometry, ruled tables and rasterized pages. The extraction tiers only
//! ever see the [`PdfAccess`] trait, so tests drive the whole pipeline
//! through in-memory fixtures.

mod lattice;
mod pdfium;

pub use pdfium::PdfiumStatement;

use crate::error::PdfError;

/// Mean extractable characters per page below which a document is treated
/// as scanned.
const SCANNED_CHAR_THRESHOLD: f32 = 20.0;

/// A word with its bounding box, in top-down page coordinates (points).
#[derive(Debug, Clone, PartialEq)]
pub struct PageWord {
    pub text: String,
    pub x0: f32,
    pub x1: f32,
    pub top: f32,
    pub bottom: f32,
}

impl PageWord {
    pub fn new(text: impl Into<String>, x0: f32, x1: f32, top: f32, bottom: f32) -> Self {
        Self { text: text.into(), x0, x1, top, bottom }
    }

    /// Horizontal midpoint, used for column assignment.
    pub fn x_mid(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn y_mid(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }
}

/// A rectangular table: rows of cell strings. Cells may contain embedded
/// newlines when a cell spans several text lines.
pub type PageTable = Vec<Vec<String>>;

/// Read-only capabilities over an open PDF.
///
/// Single-owner per extraction; implementations are not required to be
/// thread-safe.
pub trait PdfAccess {
    fn page_count(&self) -> usize;

    /// Page width in points.
    fn page_width(&self, page: usize) -> f32;

    /// Decoded page text with preserved line breaks.
    fn page_text(&self, page: usize) -> Result<String, PdfError>;

    /// Words with geometry in natural reading order.
    fn page_words(&self, page: usize) -> Result<Vec<PageWord>, PdfError>;

    /// Ruled tables detected on the page. Empty for borderless layouts.
    fn page_tables(&self, page: usize) -> Result<Vec<PageTable>, PdfError>;

    /// Rasterize a page to PNG bytes at the given DPI.
    fn render_page(&self, page: usize, dpi: u32) -> Result<Vec<u8>, PdfError>;

    /// Scanned-document heuristic: mean extractable characters per page
    /// over the first three pages is below a small threshold.
    fn is_scanned(&self) -> bool {
        let sample = self.page_count().min(3);
        if sample == 0 {
            return false;
        }
        let mut total = 0usize;
        for page in 0..sample {
            total += self
                .page_text(page)
                .map(|t| t.trim().chars().count())
                .unwrap_or(0);
        }
        (total as f32 / sample as f32) < SCANNED_CHAR_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SparsePdf {
        pages: Vec<&'static str>,
    }

    impl PdfAccess for SparsePdf {
        fn page_count(&self) -> usize {
            self.pages.len()
        }
        fn page_width(&self, _page: usize) -> f32 {
            612.0
        }
        fn page_text(&self, page: usize) -> Result<String, PdfError> {
            Ok(self.pages[page].to_string())
        }
        fn page_words(&self, _page: usize) -> Result<Vec<PageWord>, PdfError> {
            Ok(Vec::new())
        }
        fn page_tables(&self, _page: usize) -> Result<Vec<PageTable>, PdfError> {
            Ok(Vec::new())
        }
        fn render_page(&self, _page: usize, _dpi: u32) -> Result<Vec<u8>, PdfError> {
            Err(PdfError::Render("fixture".to_string()))
        }
    }

    #[test]
    fn scanned_when_pages_are_nearly_empty() {
        let pdf = SparsePdf { pages: vec!["a", "", "b c"] };
        assert!(pdf.is_scanned());
    }

    #[test]
    fn not_scanned_with_real_text() {
        let text = "STATEMENT OF ACCOUNT 01 DEC 2025 TO 31 DEC 2025 balance 1,234.56";
        let pdf = SparsePdf { pages: vec![text, text, text] };
        assert!(!pdf.is_scanned());
    }

    #[test]
    fn word_midpoints() {
        let w = PageWord::new("Balance", 100.0, 140.0, 50.0, 60.0);
        assert_eq!(w.x_mid(), 120.0);
        assert_eq!(w.y_mid(), 55.0);
    }
}
