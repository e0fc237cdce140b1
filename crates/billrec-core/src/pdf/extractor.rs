//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, warn};

use super::{PageSource, PdfProcessor, Result};
use crate::error::PdfError;

/// Page break emitted by pdf-extract between pages.
const FORM_FEED: char = '\u{000c}';

/// PDF text extractor.
///
/// Page texts come from lopdf, page by page. When lopdf returns no text at all
/// (some producers use font encodings it cannot map), the whole document is read
/// with pdf-extract and split on form feeds.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    max_pages: usize,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            max_pages: 0,
        }
    }

    /// Limit the number of pages read (0 = unlimited).
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    fn page_limit(&self) -> u32 {
        let count = self.page_count();
        if self.max_pages == 0 {
            count
        } else {
            count.min(self.max_pages as u32)
        }
    }

    fn pages_from_full_text(&self) -> Result<Vec<String>> {
        let text = self.extract_text()?;
        let limit = self.page_limit() as usize;

        let mut pages: Vec<String> = text.split(FORM_FEED).map(str::to_string).collect();
        if pages.last().is_some_and(|p| p.trim().is_empty()) && pages.len() > 1 {
            pages.pop();
        }
        if limit > 0 {
            pages.truncate(limit);
        }
        Ok(pages)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSource for PdfExtractor {
    fn pages(&self) -> Result<Vec<String>> {
        let limit = self.page_limit();
        if limit == 0 {
            return Err(PdfError::NoPages);
        }

        let mut pages = Vec::with_capacity(limit as usize);
        for page in 1..=limit {
            let text = self.extract_page_text(page).unwrap_or_else(|e| {
                warn!("lopdf could not read page {}: {}", page, e);
                String::new()
            });
            pages.push(text);
        }

        if pages.iter().all(|p| p.trim().is_empty()) {
            debug!("lopdf returned no text, falling back to pdf-extract");
            return self.pages_from_full_text();
        }

        Ok(pages)
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // Save decrypted document to raw_data for pdf_extract
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        if self.raw_data.is_empty() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self
            .document
            .as_ref()
            .ok_or(PdfError::Parse("No document loaded".to_string()))?;

        if page == 0 || page > self.page_count() {
            return Err(PdfError::InvalidPage(page));
        }

        doc.extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
    }

    #[test]
    fn test_pages_without_document() {
        let extractor = PdfExtractor::new();
        assert!(matches!(extractor.pages(), Err(PdfError::NoPages)));
        assert!(matches!(extractor.extract_page_text(1), Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_load_garbage() {
        let mut extractor = PdfExtractor::new();
        assert!(matches!(extractor.load(b"not a pdf"), Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_in_memory_pages() {
        let pages = vec!["a".to_string(), "b".to_string()];
        assert_eq!(pages.pages().unwrap(), pages);
    }
}
