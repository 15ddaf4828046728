// ABOUTME: FormatHandler trait for per-format readers/writers and the built-in plain-text handler.
// ABOUTME: TextHandler decodes and encodes with a named encoding via encoding_rs.

use std::fs;
use std::path::Path;

use encoding_rs::Encoding;

use crate::error::{FileError, Result};

/// Reads and writes the text content of one file format.
pub trait FormatHandler: Send + Sync {
    fn read(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, content: &str) -> Result<()>;
}

/// Plain text files in a configurable encoding.
#[derive(Debug, Clone)]
pub struct TextHandler {
    encoding: String,
}

impl TextHandler {
    /// `encoding` is a WHATWG label such as `utf-8`, `latin1` or `shift_jis`.
    pub fn new(encoding: impl Into<String>) -> Self {
        Self {
            encoding: encoding.into(),
        }
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }
}

impl Default for TextHandler {
    fn default() -> Self {
        Self::new("utf-8")
    }
}

impl TextHandler {
    fn resolve(&self, path: &Path) -> Result<&'static Encoding> {
        Encoding::for_label(self.encoding.as_bytes()).ok_or_else(|| {
            FileError::encoding(path, format!("unsupported encoding {:?}", self.encoding))
        })
    }
}

impl FormatHandler for TextHandler {
    /// A leading BOM is stripped only when it belongs to the configured encoding.
    fn read(&self, path: &Path) -> Result<String> {
        let encoding = self.resolve(path)?;
        let bytes = fs::read(path).map_err(|e| FileError::io(path, e))?;
        let (decoded, had_errors) = encoding.decode_with_bom_removal(&bytes);
        if had_errors {
            return Err(FileError::encoding(
                path,
                format!("content is not valid {}", encoding.name()),
            ));
        }
        Ok(decoded.into_owned())
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        let encoding = self.resolve(path)?;
        let (encoded, used, had_errors) = encoding.encode(content);
        if had_errors {
            return Err(FileError::encoding(
                path,
                format!("content cannot be encoded as {}", used.name()),
            ));
        }
        fs::write(path, encoded).map_err(|e| FileError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_latin1_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cafe.txt");
        fs::write(&path, [0x63, 0x61, 0x66, 0xe9]).unwrap();

        assert_eq!(TextHandler::new("latin1").read(&path).unwrap(), "café");
        let err = TextHandler::default().read(&path).unwrap_err();
        assert!(matches!(err, FileError::Encoding { .. }));
    }

    #[test]
    fn test_unknown_label() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "x").unwrap();
        let err = TextHandler::new("klingon").read(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported encoding"));
    }

    #[test]
    fn test_bom_of_other_encoding_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bom.txt");
        fs::write(&path, [0xef, 0xbb, 0xbf, 0x61]).unwrap();

        assert_eq!(TextHandler::default().read(&path).unwrap(), "a");
        assert_eq!(TextHandler::new("latin1").read(&path).unwrap(), "\u{ef}\u{bb}\u{bf}a");
    }

    #[test]
    fn test_write_uses_configured_encoding() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cafe.txt");
        let handler = TextHandler::new("latin1");

        handler.write(&path, "café").unwrap();
        assert_eq!(fs::read(&path).unwrap(), vec![0x63, 0x61, 0x66, 0xe9]);
        assert_eq!(handler.read(&path).unwrap(), "café");

        let err = handler.write(&path, "日本").unwrap_err();
        assert!(matches!(err, FileError::Encoding { .. }));
    }
}
