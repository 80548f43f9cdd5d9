//! Opening PDFs for reading
//!
//! A [`PdfHandle`] is the open, parsed form of one source file. Each handle
//! is owned by exactly one `Document` (or split session) and is released
//! when its owner removes it.

use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, ObjectId};

use crate::error::{Error, Result};

/// An open PDF with its page tree resolved to a flat list
#[derive(Debug)]
pub struct PdfHandle {
    path: PathBuf,
    document: Document,
    /// Page object ids in natural page order
    page_ids: Vec<ObjectId>,
}

impl PdfHandle {
    /// Open and parse the PDF at `path`
    ///
    /// Fails with `FileNotFound` if nothing is at `path`, `Load` if the codec
    /// rejects the bytes and `EmptyPdf` if the page tree has no pages.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        let document = Document::load(path).map_err(|e| Error::load(path, e))?;

        let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(Error::EmptyPdf(path.to_path_buf()));
        }

        log::debug!("Opened {} ({} pages)", path.display(), page_ids.len());

        Ok(Self {
            path: path.to_path_buf(),
            document,
            page_ids,
        })
    }

    /// Path the handle was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of pages in the document
    pub fn page_count(&self) -> u32 {
        self.page_ids.len() as u32
    }

    /// Object id of the page at a 0-based index
    pub fn page_id(&self, index: u32) -> Option<ObjectId> {
        self.page_ids.get(index as usize).copied()
    }

    /// Read-only page dictionary at a 0-based index, e.g. for previews
    pub fn page(&self, index: u32) -> Result<&Dictionary> {
        let page_id = self.page_id(index).ok_or_else(|| Error::PageOutOfBounds {
            path: self.path.clone(),
            page_index: index,
            page_count: self.page_count(),
        })?;

        Ok(self.document.get_object(page_id)?.as_dict()?)
    }

    /// The parsed document
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Give up the handle and take the parsed document
    pub(crate) fn into_document(self) -> Document {
        self.document
    }

    /// Release the handle
    pub fn close(self) {
        log::debug!("Closed {}", self.path.display());
    }
}
