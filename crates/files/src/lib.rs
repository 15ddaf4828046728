// ABOUTME: Reading and writing text content across file formats behind one call.
// ABOUTME: Dispatches on the file extension to a registry of FormatHandlers for text, PDF and Word files.

//! File content helpers.
//!
//! [`get_data`] and [`save_data`] pick a handler from the file extension.
//! Plain text is always handled. PDF (`pdf` feature) and Word `.docx`
//! (`docx` feature) handlers are registered when their features are on,
//! which is the default. Other handlers can be added to a [`Formats`] registry.

pub mod error;
pub mod handler;
pub mod kind;

#[cfg(feature = "docx")]
mod docx;
#[cfg(feature = "pdf")]
mod pdf;

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

pub use error::{FileError, Result};
pub use handler::{FormatHandler, TextHandler};
pub use kind::FileKind;

#[cfg(feature = "docx")]
pub use docx::DocxHandler;
#[cfg(feature = "pdf")]
pub use pdf::PdfHandler;

/// Handlers keyed by file kind.
pub struct Formats {
    handlers: HashMap<FileKind, Box<dyn FormatHandler>>,
}

impl Formats {
    /// Registry with the UTF-8 text handler and every enabled document handler.
    pub fn new() -> Self {
        Self::with_encoding("utf-8")
    }

    /// Like [`Formats::new`], but the text handler uses `encoding`.
    pub fn with_encoding(encoding: &str) -> Self {
        #[allow(unused_mut)]
        let mut formats = Self::empty().register(FileKind::Text, TextHandler::new(encoding));
        #[cfg(feature = "pdf")]
        {
            formats = formats.register(FileKind::Pdf, PdfHandler);
        }
        #[cfg(feature = "docx")]
        {
            formats = formats.register(FileKind::Document, DocxHandler);
        }
        formats
    }

    /// Registry with no handlers at all.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register (or replace) the handler for `kind`.
    pub fn register(mut self, kind: FileKind, handler: impl FormatHandler + 'static) -> Self {
        self.handlers.insert(kind, Box::new(handler));
        self
    }

    pub fn supports(&self, kind: FileKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    fn handler(&self, kind: FileKind, path: &Path) -> Result<&dyn FormatHandler> {
        if kind == FileKind::Unknown {
            return Err(FileError::UnknownFormat(path.to_path_buf()));
        }
        self.handlers
            .get(&kind)
            .map(|h| &**h)
            .ok_or_else(|| FileError::Unsupported {
                kind,
                path: path.to_path_buf(),
            })
    }

    /// Reads the text content of `path`.
    pub fn get_data(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        check_file(path)?;
        let kind = FileKind::from_path(path);
        debug!(path = %path.display(), %kind, "reading file");
        self.handler(kind, path)?.read(path)
    }

    /// Reads the raw bytes of `path`, whatever its format.
    pub fn get_bytes(&self, path: impl AsRef<Path>) -> Result<Vec<u8>> {
        let path = path.as_ref();
        check_file(path)?;
        fs::read(path).map_err(|e| FileError::io(path, e))
    }

    /// Writes `content` to `path` with the handler for its format.
    ///
    /// Returns `Ok(false)` when the extension is not recognised and nothing was written.
    pub fn save_data(&self, path: impl AsRef<Path>, content: &str) -> Result<bool> {
        let path = path.as_ref();
        let kind = FileKind::from_path(path);
        if kind == FileKind::Unknown {
            warn!(path = %path.display(), "file type could not be understood, nothing written");
            return Ok(false);
        }
        self.handler(kind, path)?.write(path, content)?;
        Ok(true)
    }
}

impl Default for Formats {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Formats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formats")
            .field("kinds", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn check_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(FileError::NotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(FileError::NotAFile(path.to_path_buf()));
    }
    Ok(())
}

/// Reads the text content of `path` using the default registry.
pub fn get_data(path: impl AsRef<Path>) -> Result<String> {
    Formats::new().get_data(path)
}

/// Reads a text file decoded with `encoding`.
pub fn get_data_with_encoding(path: impl AsRef<Path>, encoding: &str) -> Result<String> {
    Formats::with_encoding(encoding).get_data(path)
}

/// Reads the raw bytes of `path`.
pub fn get_bytes(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    Formats::new().get_bytes(path)
}

/// Writes `content` to `path` using the default registry.
pub fn save_data(path: impl AsRef<Path>, content: &str) -> Result<bool> {
    Formats::new().save_data(path, content)
}
