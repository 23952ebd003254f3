use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use super::{Extractor, extraction_error};
use crate::Result;

/// PowerPoint decks, one section per slide with the text of each shape
pub struct PptxExtractor;

impl Extractor for PptxExtractor {
    #[inline]
    fn extensions(&self) -> &[&'static str] {
        &[".pptx"]
    }

    #[inline]
    fn extract(&self, path: &Path) -> Result<String> {
        let file = File::open(path).map_err(|e| extraction_error(path, e))?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| extraction_error(path, e))?;

        let mut slides: Vec<(u32, String)> = archive
            .file_names()
            .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
            .collect();
        slides.sort_unstable();
        debug!("Found {} slides in {}", slides.len(), path.display());

        let mut text = String::new();
        for (position, (_, name)) in slides.iter().enumerate() {
            let mut xml = String::new();
            archive
                .by_name(name)
                .map_err(|e| extraction_error(path, format!("{name}: {e}")))?
                .read_to_string(&mut xml)
                .map_err(|e| extraction_error(path, e))?;

            text.push_str("\n=== Slide ");
            text.push_str(&(position + 1).to_string());
            text.push_str(" ===\n");
            for shape_text in parse_slide_xml(&xml).map_err(|e| extraction_error(path, e))? {
                text.push_str(&shape_text);
                text.push('\n');
            }
        }
        Ok(text)
    }
}

/// `ppt/slides/slide12.xml` -> 12
fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Text of each top-level shape that owns a text body, paragraphs joined by newlines
pub(crate) fn parse_slide_xml(xml: &str) -> std::result::Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut shapes = Vec::new();
    let mut group_depth = 0usize;
    let mut in_shape = false;
    let mut has_text_body = false;
    let mut paragraphs: Vec<String> = Vec::new();
    let mut paragraph = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"grpSp" => group_depth += 1,
                b"sp" if group_depth == 0 => {
                    in_shape = true;
                    has_text_body = false;
                    paragraphs.clear();
                }
                b"txBody" if in_shape => has_text_body = true,
                b"p" if in_shape => paragraph.clear(),
                b"t" if in_shape => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" if in_shape && has_text_body => paragraphs.push(String::new()),
                b"br" if in_shape => paragraph.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => paragraph.push_str(&t.unescape()?),
            Event::End(e) => match e.local_name().as_ref() {
                b"grpSp" => group_depth = group_depth.saturating_sub(1),
                b"t" => in_text = false,
                b"p" if in_shape => paragraphs.push(std::mem::take(&mut paragraph)),
                b"sp" if in_shape => {
                    if has_text_body {
                        shapes.push(paragraphs.join("\n"));
                    }
                    in_shape = false;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}
