//! Error types for the docdown library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for docdown operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during document conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input file does not exist.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file format could not be determined.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The file format is recognized but not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Error reading ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// A required document part is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// Error serializing the document model.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The library was built without the DOCX reader.
    #[error(
        "DOCX reader not available: this build was compiled without the `docx` feature. \
         Rebuild with `--features docx` (it is on by default) to convert documents"
    )]
    ReaderUnavailable,
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownFormat;
        assert_eq!(err.to_string(), "Unknown file format");

        let err = Error::UnsupportedFormat("Excel Workbook".to_string());
        assert_eq!(err.to_string(), "Unsupported format: Excel Workbook");

        let err = Error::NotFound(PathBuf::from("notes.docx"));
        assert_eq!(err.to_string(), "File not found: notes.docx");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_reader_unavailable_mentions_feature() {
        let msg = Error::ReaderUnavailable.to_string();
        assert!(msg.contains("--features docx"));
    }
}
