//! PDF text extraction.

mod extractor;

pub use extractor::{PdfExtractor, PdfTextSource};

use std::path::Path;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;
}

/// Anything that can turn a document into the text lines of its first page.
pub trait TextSource {
    /// Visible text of the first page, one entry per line, in document order.
    fn first_page_lines(&self, path: &Path) -> Result<Vec<String>>;
}

impl<T: TextSource + ?Sized> TextSource for &T {
    fn first_page_lines(&self, path: &Path) -> Result<Vec<String>> {
        (**self).first_page_lines(path)
    }
}

/// Split extracted text into lines without trailing carriage returns.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(|l| l.trim_end_matches('\r').to_string()).collect()
}
