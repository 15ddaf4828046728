// ABOUTME: Error types for file reading and writing.
// ABOUTME: Provides the FileError enum covering lookup, format dispatch, codec, encoding and IO failures.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::kind::FileKind;

/// Errors that can occur while reading or writing files.
#[derive(Debug, Error)]
pub enum FileError {
    /// The path does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The path exists but is not a regular file.
    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),

    /// The extension maps to no known format.
    #[error("file type could not be understood: {}", .0.display())]
    UnknownFormat(PathBuf),

    /// The format is known but no handler is registered for it.
    #[error("no handler registered for {kind} files: {}", .path.display())]
    Unsupported { kind: FileKind, path: PathBuf },

    /// The encoding label is unknown or the bytes are not valid in it.
    #[error("encoding error for {}: {message}", .path.display())]
    Encoding { path: PathBuf, message: String },

    /// A PDF or Word codec rejected the file or the content.
    #[error("invalid {kind} file {}: {message}", .path.display())]
    Format {
        kind: FileKind,
        path: PathBuf,
        message: String,
    },

    /// Underlying IO failure.
    #[error("could not access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileError {
    /// Wraps an IO error with the path it happened on.
    pub fn io(path: &Path, source: io::Error) -> Self {
        FileError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Creates an Encoding error with a custom message.
    pub fn encoding(path: &Path, message: impl Into<String>) -> Self {
        FileError::Encoding {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

impl FileError {
    /// Creates a Format error for a codec failure.
    pub fn format(kind: FileKind, path: &Path, message: impl std::fmt::Display) -> Self {
        FileError::Format {
            kind,
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

/// Result alias for file operations.
pub type Result<T> = std::result::Result<T, FileError>;
