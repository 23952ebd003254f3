use std::fs;
use std::path::Path;

use itertools::Itertools;

use super::{Extractor, decode_utf8, extraction_error};
use crate::Result;

/// CSV rows rendered as `a | b | c` lines
pub struct CsvExtractor;

impl Extractor for CsvExtractor {
    #[inline]
    fn extensions(&self) -> &[&'static str] {
        &[".csv"]
    }

    #[inline]
    fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|e| extraction_error(path, e))?;
        let content = decode_utf8(&bytes);
        render_csv(&content).map_err(|e| extraction_error(path, e))
    }
}

pub(crate) fn render_csv(content: &str) -> std::result::Result<String, ::csv::Error> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut text = String::new();
    for record in reader.records() {
        let record = record?;
        text.push_str(&record.iter().join(" | "));
        text.push('\n');
    }
    Ok(text)
}
