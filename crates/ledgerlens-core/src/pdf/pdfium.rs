//! PDF access backed by pdfium (text, geometry, rendering) and lopdf
//! (encryption probing, ruling-line detection).

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::debug;

use super::lattice;
use super::{PageTable, PageWord, PdfAccess};
use crate::error::PdfError;

/// Horizontal gap (relative to glyph height) that splits two characters
/// into separate words.
const WORD_GAP_FACTOR: f32 = 0.35;

/// Characters whose tops differ by more than this belong to different
/// text lines.
const LINE_TOL: f32 = 2.0;

/// An open statement PDF.
///
/// Owns the raw bytes plus a parallel lopdf parse used for the ruled-table
/// lattice. The pdfium document is re-opened per call (it borrows the
/// bytes), and extracted words are cached per page. Single-owner per
/// extraction; not thread-safe.
pub struct PdfiumStatement {
    pdfium: Pdfium,
    data: Vec<u8>,
    structure: lopdf::Document,
    page_count: usize,
    word_cache: RefCell<HashMap<usize, Vec<PageWord>>>,
}

impl PdfiumStatement {
    /// Open a statement from raw bytes.
    ///
    /// A PDF encrypted with an empty user password is decrypted
    /// transparently; any other key fails with [`PdfError::Encrypted`].
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, PdfError> {
        let mut structure = lopdf::Document::load_mem(&data)
            .map_err(|e| PdfError::Unreadable(e.to_string()))?;

        let data = if structure.is_encrypted() {
            if structure.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("decrypted PDF with empty password");
            let mut decrypted = Vec::new();
            structure
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Unreadable(e.to_string()))?;
            decrypted
        } else {
            data
        };

        let pdfium = bind_pdfium()?;
        let page_count = {
            let document = pdfium
                .load_pdf_from_byte_slice(&data, None)
                .map_err(|e| PdfError::Unreadable(format!("{e:?}")))?;
            document.pages().len() as usize
        };
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!(pages = page_count, "opened statement PDF");

        Ok(Self {
            pdfium,
            data,
            structure,
            page_count,
            word_cache: RefCell::new(HashMap::new()),
        })
    }

    /// Open a statement from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PdfError> {
        let data = std::fs::read(path).map_err(|e| PdfError::Unreadable(e.to_string()))?;
        Self::from_bytes(data)
    }

    fn with_page<T>(
        &self,
        page: usize,
        f: impl FnOnce(&PdfPage) -> Result<T, PdfError>,
    ) -> Result<T, PdfError> {
        if page >= self.page_count {
            return Err(PdfError::InvalidPage(page));
        }
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(&self.data, None)
            .map_err(|e| PdfError::Unreadable(format!("{e:?}")))?;
        let page = document
            .pages()
            .get(page as u16)
            .map_err(|e| PdfError::Unreadable(format!("{e:?}")))?;
        f(&page)
    }

    fn extract_words(&self, page: &PdfPage) -> Result<Vec<PageWord>, PdfError> {
        let height = page.height().value;
        let text = page
            .text()
            .map_err(|e| PdfError::Unreadable(format!("{e:?}")))?;

        // Collect characters with top-down bounds, then assemble words by
        // whitespace and gap breaks within each text line.
        let mut words: Vec<PageWord> = Vec::new();
        let mut current: Option<PageWord> = None;

        let mut flush = |current: &mut Option<PageWord>, words: &mut Vec<PageWord>| {
            if let Some(word) = current.take() {
                if !word.text.trim().is_empty() {
                    words.push(word);
                }
            }
        };

        for segment in text.segments().iter() {
            let Ok(chars) = segment.chars() else {
                continue;
            };
            for ch in chars.iter() {
                let Some(glyph) = ch.unicode_char() else {
                    continue;
                };
                let Ok(bounds) = ch.loose_bounds() else {
                    continue;
                };
                let x0 = bounds.left.value;
                let x1 = bounds.right.value;
                let top = height - bounds.top.value;
                let bottom = height - bounds.bottom.value;

                if glyph.is_whitespace() {
                    flush(&mut current, &mut words);
                    continue;
                }

                let split = match &current {
                    Some(word) => {
                        let glyph_h = (bottom - top).abs().max(1.0);
                        let gap = x0 - word.x1;
                        (word.top - top).abs() > LINE_TOL
                            || gap > (glyph_h * WORD_GAP_FACTOR).max(1.0)
                    }
                    None => false,
                };
                if split {
                    flush(&mut current, &mut words);
                }

                match current.as_mut() {
                    Some(word) => {
                        word.text.push(glyph);
                        word.x1 = word.x1.max(x1);
                        word.top = word.top.min(top);
                        word.bottom = word.bottom.max(bottom);
                    }
                    None => {
                        current = Some(PageWord::new(glyph.to_string(), x0, x1, top, bottom));
                    }
                }
            }
            flush(&mut current, &mut words);
        }
        flush(&mut current, &mut words);

        // Natural reading order: top-to-bottom in 4pt bands, then
        // left-to-right.
        words.sort_by(|a, b| {
            let band_a = (a.top / 4.0).round() as i32;
            let band_b = (b.top / 4.0).round() as i32;
            band_a
                .cmp(&band_b)
                .then(a.x0.partial_cmp(&b.x0).unwrap_or(std::cmp::Ordering::Equal))
        });

        Ok(words)
    }
}

impl PdfAccess for PdfiumStatement {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_width(&self, page: usize) -> f32 {
        self.with_page(page, |p| Ok(p.width().value)).unwrap_or(612.0)
    }

    fn page_text(&self, page: usize) -> Result<String, PdfError> {
        self.with_page(page, |p| {
            p.text()
                .map(|t| t.all())
                .map_err(|e| PdfError::Unreadable(format!("{e:?}")))
        })
    }

    fn page_words(&self, page: usize) -> Result<Vec<PageWord>, PdfError> {
        if let Some(cached) = self.word_cache.borrow().get(&page) {
            return Ok(cached.clone());
        }
        let words = self.with_page(page, |p| self.extract_words(p))?;
        self.word_cache.borrow_mut().insert(page, words.clone());
        Ok(words)
    }

    fn page_tables(&self, page: usize) -> Result<Vec<PageTable>, PdfError> {
        let words = self.page_words(page)?;
        let height = self.with_page(page, |p| Ok(p.height().value))?;
        Ok(lattice::tables_for_page(&self.structure, page, &words, height))
    }

    fn render_page(&self, page: usize, dpi: u32) -> Result<Vec<u8>, PdfError> {
        let image = self.with_page(page, |p| {
            let scale = dpi as f32 / 72.0;
            let width = (p.width().value * scale) as i32;
            let height = (p.height().value * scale) as i32;
            let config = PdfRenderConfig::new().set_target_size(width, height);
            let bitmap = p
                .render_with_config(&config)
                .map_err(|e| PdfError::Render(format!("{e:?}")))?;
            Ok(bitmap.as_image())
        })?;
        encode_png(&image)
    }
}

fn bind_pdfium() -> Result<Pdfium, PdfError> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./lib/"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| PdfError::Unreadable(format!("pdfium unavailable: {e:?}")))?;
    Ok(Pdfium::new(bindings))
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, PdfError> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PdfError::Render(e.to_string()))?;
    Ok(buf)
}
