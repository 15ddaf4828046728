// ABOUTME: File kind detection from path extensions.
// ABOUTME: Maps .doc/.docx, .pdf and a fixed list of text extensions onto FileKind.

use std::fmt;
use std::path::Path;

/// Extensions read and written as plain text.
pub const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "css", "html", "py", "java", "cpp", "ipynb", "md", "lock", "toml", "rst",
];

/// Format family of a file, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Document,
    Pdf,
    Text,
    Unknown,
}

impl FileKind {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let ext = match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_ascii_lowercase(),
            None => return FileKind::Unknown,
        };
        match ext.as_str() {
            "doc" | "docx" => FileKind::Document,
            "pdf" => FileKind::Pdf,
            e if TEXT_EXTENSIONS.contains(&e) => FileKind::Text,
            _ => FileKind::Unknown,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileKind::Document => "doc/docx",
            FileKind::Pdf => "pdf",
            FileKind::Text => "text",
            FileKind::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}
