use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

use super::{Extractor, extraction_error};
use crate::Result;

const DOCUMENT_PART: &str = "word/document.xml";

/// Word documents: body paragraphs first, then table cells row by row
pub struct DocxExtractor;

impl Extractor for DocxExtractor {
    #[inline]
    fn extensions(&self) -> &[&'static str] {
        &[".docx"]
    }

    #[inline]
    fn extract(&self, path: &Path) -> Result<String> {
        let file = File::open(path).map_err(|e| extraction_error(path, e))?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| extraction_error(path, e))?;
        let mut part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| extraction_error(path, format!("{DOCUMENT_PART}: {e}")))?;

        let mut xml = String::new();
        part.read_to_string(&mut xml)
            .map_err(|e| extraction_error(path, e))?;

        parse_document_xml(&xml).map_err(|e| extraction_error(path, e))
    }
}

/// Render WordprocessingML body text
///
/// Top-level paragraphs become lines. Each top-level table contributes its cell
/// texts separated by spaces followed by one newline per table, after all
/// paragraphs.
pub(crate) fn parse_document_xml(xml: &str) -> std::result::Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut body = String::new();
    let mut tables = String::new();
    let mut paragraph = String::new();
    let mut cell_paragraphs: Vec<String> = Vec::new();
    let mut table_depth = 0usize;
    let mut in_text = false;
    let mut in_run = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => paragraph.clear(),
                b"r" => in_run = true,
                b"t" => in_text = true,
                b"tbl" => table_depth += 1,
                b"tc" if table_depth == 1 => cell_paragraphs.clear(),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" => finish_paragraph("", table_depth, &mut body, &mut cell_paragraphs),
                // Tab stops in paragraph properties share the element name
                b"tab" if in_run => paragraph.push('\t'),
                b"br" | b"cr" if in_run => paragraph.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => paragraph.push_str(&t.unescape()?),
            Event::End(e) => match e.local_name().as_ref() {
                b"r" => in_run = false,
                b"t" => in_text = false,
                b"p" => {
                    finish_paragraph(&paragraph, table_depth, &mut body, &mut cell_paragraphs);
                }
                b"tc" if table_depth == 1 => {
                    tables.push_str(&cell_paragraphs.join("\n"));
                    tables.push(' ');
                }
                b"tbl" => {
                    table_depth = table_depth.saturating_sub(1);
                    if table_depth == 0 {
                        tables.push('\n');
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    body.push_str(&tables);
    Ok(body)
}

fn finish_paragraph(
    paragraph: &str,
    table_depth: usize,
    body: &mut String,
    cell_paragraphs: &mut Vec<String>,
) {
    match table_depth {
        0 => {
            body.push_str(paragraph);
            body.push('\n');
        }
        1 => cell_paragraphs.push(paragraph.to_string()),
        // Nested tables are not part of the outer cell text
        _ => {}
    }
}
