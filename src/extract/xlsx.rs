use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use itertools::Itertools;

use super::{Extractor, extraction_error};
use crate::Result;

/// Spreadsheets, one section per sheet and one `a | b` line per non-blank row
pub struct XlsxExtractor;

impl Extractor for XlsxExtractor {
    #[inline]
    fn extensions(&self) -> &[&'static str] {
        &[".xlsx", ".xls"]
    }

    #[inline]
    fn extract(&self, path: &Path) -> Result<String> {
        let mut workbook = open_workbook_auto(path).map_err(|e| extraction_error(path, e))?;

        let mut text = String::new();
        for sheet_name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&sheet_name)
                .map_err(|e| extraction_error(path, format!("sheet '{sheet_name}': {e}")))?;

            text.push_str("\n=== Sheet: ");
            text.push_str(&sheet_name);
            text.push_str(" ===\n");
            for row in range.rows().filter(|row| !is_blank_row(row)) {
                text.push_str(&render_row(row));
                text.push('\n');
            }
        }
        Ok(text)
    }
}

fn is_blank_row(row: &[Data]) -> bool {
    row.iter().all(|cell| match cell {
        Data::Empty => true,
        Data::String(value) => value.trim().is_empty(),
        _ => false,
    })
}

fn render_row(row: &[Data]) -> String {
    row.iter()
        .map(|cell| match cell {
            Data::Empty => String::new(),
            other => other.to_string(),
        })
        .join(" | ")
}
