// ABOUTME: Word support via docx-rs: paragraph text out of .docx files and one paragraph per line in.
// ABOUTME: Compiled with the `docx` feature and registered for FileKind::Document by default.

use std::fs::{self, File};
use std::path::Path;

use docx_rs::{DocumentChild, Docx, Paragraph, ParagraphChild, Run, RunChild};

use crate::error::{FileError, Result};
use crate::handler::FormatHandler;
use crate::kind::FileKind;

/// Reads and writes Office Open XML documents.
///
/// Legacy binary `.doc` files share the extension family but are not
/// readable; they fail with [`FileError::Format`].
#[derive(Debug, Clone, Default)]
pub struct DocxHandler;

impl FormatHandler for DocxHandler {
    fn read(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|e| FileError::io(path, e))?;
        let docx = docx_rs::read_docx(&bytes)
            .map_err(|e| FileError::format(FileKind::Document, path, e))?;

        let paragraphs: Vec<String> = docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(p) => Some(paragraph_text(p)),
                _ => None,
            })
            .collect();
        Ok(paragraphs.join("\n"))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        let docx = content.lines().fold(Docx::new(), |docx, line| {
            docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)))
        });
        let file = File::create(path).map_err(|e| FileError::io(path, e))?;
        docx.build()
            .pack(file)
            .map_err(|e| FileError::format(FileKind::Document, path, e))
    }
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        let ParagraphChild::Run(run) = child else {
            continue;
        };
        for part in &run.children {
            match part {
                RunChild::Text(t) => text.push_str(&t.text),
                RunChild::Tab(_) => text.push('\t'),
                _ => {}
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_one_paragraph_per_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sample.docx");

        DocxHandler.write(&path, "TODAY'S DATA\nsecond paragraph").unwrap();
        assert_eq!(
            DocxHandler.read(&path).unwrap(),
            "TODAY'S DATA\nsecond paragraph"
        );
    }

    #[test]
    fn test_plain_bytes_are_format_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.doc");
        fs::write(&path, b"\xd0\xcf\x11\xe0 binary word").unwrap();

        let err = DocxHandler.read(&path).unwrap_err();
        assert!(matches!(
            err,
            FileError::Format {
                kind: FileKind::Document,
                ..
            }
        ));
    }
}
