use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use tracing::{debug, warn};

use super::{Extractor, extraction_error};
use crate::Result;

/// PDF text layer via pdf-extract
///
/// The parser panics on some malformed files instead of returning an error,
/// so a panic is contained here and reported for that file alone.
pub struct PdfExtractor;

impl Extractor for PdfExtractor {
    #[inline]
    fn extensions(&self) -> &[&'static str] {
        &[".pdf"]
    }

    #[inline]
    fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|e| extraction_error(path, e))?;
        let text = match panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(&bytes)
        })) {
            Ok(extracted) => extracted
                .map_err(|e| extraction_error(path, format!("PDF extraction failed: {e}")))?,
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                warn!("PDF parser panicked on {}: {}", path.display(), reason);
                return Err(extraction_error(
                    path,
                    format!("PDF parser panicked: {reason}"),
                ));
            }
        };
        debug!("Extracted {} chars from PDF {}", text.len(), path.display());
        Ok(text)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
