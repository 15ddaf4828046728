// ABOUTME: Integration tests for extension-dispatched file reading and writing.
// ABOUTME: Uses temp directories to cover text round trips, unknown and unsupported formats, and custom handlers.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use dputils_files::{
    get_bytes, get_data, get_data_with_encoding, save_data, FileError, FileKind, FormatHandler,
    Formats, Result,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Stores written content in memory, standing in for a PDF codec.
#[derive(Default, Clone)]
struct MemoryHandler {
    written: Arc<Mutex<Vec<String>>>,
}

impl FormatHandler for MemoryHandler {
    fn read(&self, _path: &Path) -> Result<String> {
        Ok(self.written.lock().unwrap().join("\n"))
    }

    fn write(&self, _path: &Path, content: &str) -> Result<()> {
        self.written.lock().unwrap().push(content.to_string());
        Ok(())
    }
}

#[test]
fn text_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.md");

    assert!(save_data(&path, "# Title\nbody").unwrap());
    assert_eq!(get_data(&path).unwrap(), "# Title\nbody");
    assert_eq!(get_bytes(&path).unwrap(), b"# Title\nbody".to_vec());
}

#[test]
fn reads_with_explicit_encoding() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legacy.txt");
    fs::write(&path, [0x6e, 0x61, 0xef, 0x76, 0x65]).unwrap();

    assert_eq!(get_data_with_encoding(&path, "windows-1252").unwrap(), "naïve");
}

#[test]
fn unknown_extension_is_not_written() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("image.png");

    assert!(!save_data(&path, "data").unwrap());
    assert!(!path.exists());
}

#[test]
fn unknown_extension_cannot_be_read_as_text() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("archive.bin");
    fs::write(&path, [0u8, 1, 2]).unwrap();

    assert!(matches!(get_data(&path), Err(FileError::UnknownFormat(_))));
    assert_eq!(get_bytes(&path).unwrap(), vec![0u8, 1, 2]);
}

#[test]
fn pdf_without_handler_is_unsupported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sample.pdf");

    let err = Formats::empty().save_data(&path, "Hello").unwrap_err();
    assert!(matches!(
        err,
        FileError::Unsupported {
            kind: FileKind::Pdf,
            ..
        }
    ));
}

#[test]
fn registered_handler_is_used() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sample.pdf");
    fs::write(&path, b"%PDF-1.4").unwrap();

    let handler = MemoryHandler::default();
    let formats = Formats::empty().register(FileKind::Pdf, handler.clone());

    assert!(formats.supports(FileKind::Pdf));
    assert!(!formats.supports(FileKind::Text));
    assert!(formats
        .save_data(&path, "Hello I am inserting this new text")
        .unwrap());
    assert_eq!(
        formats.get_data(&path).unwrap(),
        "Hello I am inserting this new text"
    );
}

#[test]
fn latin1_registry_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("menu.txt");
    let formats = Formats::with_encoding("latin1");

    assert!(formats.save_data(&path, "crème brûlée").unwrap());
    assert_eq!(fs::read(&path).unwrap().len(), "crème brûlée".chars().count());
    assert_eq!(formats.get_data(&path).unwrap(), "crème brûlée");
}

#[cfg(feature = "pdf")]
#[test]
fn pdf_round_trip_with_default_registry() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.pdf");

    assert!(save_data(&path, "Quarterly numbers").unwrap());
    let text = get_data(&path).unwrap();
    assert!(text.contains("Quarterly"), "got {text:?}");
    assert!(get_bytes(&path).unwrap().starts_with(b"%PDF"));
}

#[cfg(feature = "docx")]
#[test]
fn docx_round_trip_with_default_registry() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("letter.docx");

    assert!(save_data(&path, "Dear reader\nRegards").unwrap());
    assert_eq!(get_data(&path).unwrap(), "Dear reader\nRegards");
}

#[test]
fn missing_and_directory_paths() {
    let dir = TempDir::new().unwrap();

    let missing = dir.path().join("nope.txt");
    assert!(matches!(get_data(&missing), Err(FileError::NotFound(_))));

    let folder = dir.path().join("folder.txt");
    fs::create_dir(&folder).unwrap();
    assert!(matches!(get_data(&folder), Err(FileError::NotAFile(_))));
}
