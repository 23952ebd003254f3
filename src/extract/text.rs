use std::fs;
use std::path::Path;

use super::{Extractor, decode_utf8, extraction_error};
use crate::Result;

/// Plain text and text-like formats, read as UTF-8 with invalid bytes dropped
pub struct TextExtractor;

impl Extractor for TextExtractor {
    #[inline]
    fn extensions(&self) -> &[&'static str] {
        &[".txt", ".md", ".log", ".json", ".xml"]
    }

    #[inline]
    fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|e| extraction_error(path, e))?;
        Ok(decode_utf8(&bytes))
    }
}
