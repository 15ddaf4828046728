// ABOUTME: PDF support: text extraction with pdf-extract and plain text pages rendered with printpdf.
// ABOUTME: Compiled with the `pdf` feature and registered for FileKind::Pdf by default.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::error::{FileError, Result};
use crate::handler::FormatHandler;
use crate::kind::FileKind;

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN: Mm = Mm(10.0);
const TOP: f32 = 280.0;
const BOTTOM: f32 = 15.0;
const LINE_HEIGHT: f32 = 5.0;
const FONT_SIZE: f32 = 12.0;
const LAYER: &str = "text";

/// Reads PDF text and writes text as A4 pages in Helvetica, one line per row.
#[derive(Debug, Clone, Default)]
pub struct PdfHandler;

impl FormatHandler for PdfHandler {
    fn read(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|e| FileError::io(path, e))?;
        pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| FileError::format(FileKind::Pdf, path, e))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        let (doc, page, layer) = PdfDocument::new(title, PAGE_WIDTH, PAGE_HEIGHT, LAYER);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| FileError::format(FileKind::Pdf, path, e))?;

        let mut current = doc.get_page(page).get_layer(layer);
        let mut y = TOP;
        for line in content.lines() {
            if y < BOTTOM {
                let (page, layer) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, LAYER);
                current = doc.get_page(page).get_layer(layer);
                y = TOP;
            }
            current.use_text(line, FONT_SIZE, MARGIN, Mm(y), &font);
            y -= LINE_HEIGHT;
        }

        let file = File::create(path).map_err(|e| FileError::io(path, e))?;
        doc.save(&mut BufWriter::new(file))
            .map_err(|e| FileError::format(FileKind::Pdf, path, e))
    }
}
