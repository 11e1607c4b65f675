//! Error types for docxkit.

use thiserror::Error;

/// Result type for docxkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while transforming a DOCX container.
#[derive(Error, Debug)]
pub enum Error {
    /// Input is not a ZIP archive or lacks a required internal entry.
    #[error("Invalid DOCX container: {0}")]
    InvalidContainer(String),

    /// An XML part of the container could not be parsed.
    #[error("Malformed document markup: {0}")]
    MalformedMarkup(String),

    /// Markup references a relationship id that does not exist (strict mode).
    #[error("Relationship not found: {0}")]
    RelationshipNotFound(String),

    /// Media file not found in the DOCX archive.
    #[error("Media not found: {0}")]
    MediaNotFound(String),

    /// Error occurred during file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::MalformedMarkup(err.to_string())
    }
}
