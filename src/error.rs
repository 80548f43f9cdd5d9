//! Error types for the pdf-collate library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the pdf-collate library
///
/// A duplicate document is not an error: `DocumentCollection::add` reports it
/// as `AddOutcome::DuplicateConflict` so the caller can decide what to do.
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// File could not be read or was rejected by the PDF codec
    #[error("Failed to load {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// Page range violates 1 <= start <= end <= total_pages
    #[error("Invalid page range {start}-{end}: pages must be between 1 and {total_pages} with start <= end")]
    InvalidRange { start: u32, end: u32, total_pages: u32 },

    /// Page range text could not be parsed
    #[error("Invalid page range expression: {0}")]
    InvalidRangeExpression(String),

    /// A plan referenced a page the source does not have
    #[error("Page index {page_index} is out of bounds for {} ({page_count} pages)", path.display())]
    PageOutOfBounds {
        path: PathBuf,
        page_index: u32,
        page_count: u32,
    },

    /// Writing the output file failed
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Export requested with nothing selected
    #[error("Nothing to export: {0}")]
    NothingToExport(String),

    /// Range operation requested before a source document was loaded
    #[error("No source document loaded")]
    NoSourceLoaded,
}

impl Error {
    /// Build a `Load` error from any displayable reason
    pub fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True for failures that mean a single input file could not be loaded.
    ///
    /// These are reported per file and never abort a batch.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Error::FileNotFound(_) | Error::Load { .. } | Error::EmptyPdf(_) | Error::Pdf(_)
        )
    }
}
