// Document text extraction
// Maps a file on disk to a plain text blob tagged with its format


pub mod csv;
pub mod docx;
pub mod pdf;
pub mod pptx;
pub mod text;
pub mod xlsx;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::{RagError, Result};

pub use self::csv::CsvExtractor;
pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;
pub use pptx::PptxExtractor;
pub use text::TextExtractor;
pub use xlsx::XlsxExtractor;

/// Text extracted from one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBlob {
    pub filename: String,
    pub text: String,
    /// Lowercase extension including the leading dot
    pub format: String,
}

/// Turns one kind of file into plain text
pub trait Extractor: Send + Sync {
    /// Lowercase extensions, with leading dot, handled by this extractor
    fn extensions(&self) -> &[&'static str];

    fn extract(&self, path: &Path) -> Result<String>;
}

/// Registry of extractors keyed by file extension
pub struct ExtractorRegistry {
    extractors: HashMap<String, Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// Create an empty registry
    #[inline]
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// Registry with every built-in format
    #[inline]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(PdfExtractor);
        registry.register(DocxExtractor);
        registry.register(TextExtractor);
        registry.register(XlsxExtractor);
        registry.register(PptxExtractor);
        registry.register(CsvExtractor);
        registry
    }

    /// Register an extractor for all of its extensions, replacing earlier ones
    #[inline]
    pub fn register<E: Extractor + 'static>(&mut self, extractor: E) {
        let extractor: Arc<dyn Extractor> = Arc::new(extractor);
        for extension in extractor.extensions() {
            self.extractors
                .insert((*extension).to_string(), Arc::clone(&extractor));
        }
    }

    #[inline]
    pub fn get_for_path(&self, path: &Path) -> Option<Arc<dyn Extractor>> {
        let format = format_tag(path)?;
        self.extractors.get(&format).cloned()
    }

    #[inline]
    pub fn is_supported(&self, path: &Path) -> bool {
        self.get_for_path(path).is_some()
    }

    /// All registered extensions, sorted
    #[inline]
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.extractors.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }

    /// Extract a document, tagging it with its file name and format
    #[inline]
    pub fn extract(&self, path: &Path) -> Result<DocumentBlob> {
        let filename = file_name(path);
        let format = format_tag(path).unwrap_or_default();
        let extractor = self
            .get_for_path(path)
            .ok_or_else(|| RagError::Extraction {
                file: filename.clone(),
                message: format!("unsupported format '{}'", format),
            })?;

        debug!("Extracting {} as {}", path.display(), format);
        let text = extractor.extract(path)?;

        Ok(DocumentBlob {
            filename,
            text,
            format,
        })
    }
}

impl Default for ExtractorRegistry {
    #[inline]
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Lowercase ".ext" tag for a path, if it has an extension
#[inline]
pub fn format_tag(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Decode UTF-8, dropping byte sequences that are not valid
pub(crate) fn decode_utf8(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

pub(crate) fn extraction_error(path: &Path, message: impl std::fmt::Display) -> RagError {
    RagError::Extraction {
        file: file_name(path),
        message: message.to_string(),
    }
}
