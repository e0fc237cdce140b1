//! PDF processing module: the page text provider for the pipeline.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Source of ordered page texts for one document.
pub trait PageSource {
    /// Text of every page, in page order.
    fn pages(&self) -> Result<Vec<String>>;
}

/// Page texts already held in memory.
impl PageSource for Vec<String> {
    fn pages(&self) -> Result<Vec<String>> {
        Ok(self.clone())
    }
}

/// Read the page texts of a PDF file, keeping at most `max_pages` (0 = all).
pub fn read_pages(path: &std::path::Path, max_pages: usize) -> Result<Vec<String>> {
    let data = std::fs::read(path).map_err(|e| PdfError::Parse(format!("{}: {}", path.display(), e)))?;
    let mut extractor = PdfExtractor::new().with_max_pages(max_pages);
    extractor.load(&data)?;
    extractor.pages()
}

/// Trait for PDF processing implementations.
pub trait PdfProcessor: PageSource {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_pages_missing_file() {
        let err = read_pages(std::path::Path::new("/nonexistent/bill.pdf"), 0).unwrap_err();
        assert!(matches!(err, PdfError::Parse(msg) if msg.contains("bill.pdf")));
    }

    #[test]
    fn test_read_pages_not_a_pdf() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"plain text").unwrap();
        assert!(matches!(read_pages(file.path(), 0), Err(PdfError::Parse(_))));
    }
}
