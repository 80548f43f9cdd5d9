//! Ordered document collection with content-based duplicate tracking
//!
//! The collection's order is the merge order. Every document gets an opaque
//! [`DocumentId`] when it is added; reordering and removal are keyed on that
//! id, never on file names or display labels.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fingerprint::{fingerprint, ContentHash};
use crate::order::reorder_by_key;
use crate::pdf::reader::PdfHandle;

/// Opaque, stable identifier assigned to a document when it is added
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc-{}", self.0)
    }
}

/// Whether other documents in the collection share this one's content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    Normal,
    Duplicate,
}

/// One loaded source file within a collection
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    hash: ContentHash,
    status: DocumentStatus,
    handle: PdfHandle,
}

impl Document {
    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn path(&self) -> &Path {
        self.handle.path()
    }

    pub fn page_count(&self) -> u32 {
        self.handle.page_count()
    }

    pub fn hash(&self) -> ContentHash {
        self.hash
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    pub fn is_duplicate(&self) -> bool {
        self.status == DocumentStatus::Duplicate
    }

    /// Read-only access to the open PDF, for previews
    pub fn handle(&self) -> &PdfHandle {
        &self.handle
    }

    /// Human-readable label: "name.pdf (3 pages)". Display only.
    pub fn label(&self) -> String {
        let name = self
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path().display().to_string());
        let pages = self.page_count();
        let noun = if pages == 1 { "page" } else { "pages" };
        format!("{name} ({pages} {noun})")
    }

    fn close(self) {
        log::debug!("Releasing {} ({})", self.id, self.path().display());
        self.handle.close();
    }
}

/// Result of a non-forced add
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The document was appended
    Added { id: DocumentId, hash: ContentHash },
    /// A document with the same content is already present; nothing changed
    DuplicateConflict {
        hash: ContentHash,
        existing: DocumentId,
    },
}

/// Per-file result of [`DocumentCollection::add_batch`]
#[derive(Debug)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub result: Result<AddOutcome>,
}

/// Ordered sequence of documents; the order is the export order
#[derive(Debug, Default)]
pub struct DocumentCollection {
    documents: Vec<Document>,
    /// Number of documents per content hash, rebuilt after every mutation
    hash_counts: HashMap<ContentHash, usize>,
    next_id: u64,
}

impl DocumentCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents in collection order
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    /// Identifiers in collection order
    pub fn ids(&self) -> Vec<DocumentId> {
        self.documents.iter().map(Document::id).collect()
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    /// Current position of a document
    pub fn position(&self, id: DocumentId) -> Option<usize> {
        self.documents.iter().position(|doc| doc.id == id)
    }

    /// Total pages across all documents
    pub fn total_pages(&self) -> u64 {
        self.documents.iter().map(|doc| doc.page_count() as u64).sum()
    }

    /// Number of documents sharing `hash`
    pub fn hash_count(&self, hash: &ContentHash) -> usize {
        self.hash_counts.get(hash).copied().unwrap_or(0)
    }

    /// Add a file unless its content is already in the collection
    ///
    /// Returns `DuplicateConflict` without touching the collection when a
    /// document with the same fingerprint exists; the caller may then decide
    /// to [`force_add`](Self::force_add). Load failures leave the collection
    /// unchanged.
    pub fn add(&mut self, path: &Path) -> Result<AddOutcome> {
        let hash = fingerprint(path)?;

        if let Some(existing) = self.documents.iter().find(|doc| doc.hash == hash) {
            log::debug!(
                "{} duplicates {} ({})",
                path.display(),
                existing.id,
                hash.short()
            );
            return Ok(AddOutcome::DuplicateConflict {
                hash,
                existing: existing.id,
            });
        }

        let id = self.append(path, hash)?;
        Ok(AddOutcome::Added { id, hash })
    }

    /// Add a file even if its content is already present
    pub fn force_add(&mut self, path: &Path) -> Result<DocumentId> {
        let hash = fingerprint(path)?;
        self.append(path, hash)
    }

    /// Add several files in order
    ///
    /// Every path is attempted; a failure on one file does not stop the rest.
    pub fn add_batch<I, P>(&mut self, paths: I) -> Vec<BatchEntry>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths
            .into_iter()
            .map(|path| {
                let path = path.as_ref();
                let result = self.add(path);
                if let Err(e) = &result {
                    log::warn!("Skipping {}: {}", path.display(), e);
                }
                BatchEntry {
                    path: path.to_path_buf(),
                    result,
                }
            })
            .collect()
    }

    fn append(&mut self, path: &Path, hash: ContentHash) -> Result<DocumentId> {
        // Nothing is mutated until the handle is open; on error it never was
        let handle = PdfHandle::open(path)?;

        let id = DocumentId(self.next_id);
        self.next_id += 1;

        log::debug!("Added {} as {} ({})", path.display(), id, hash.short());
        self.documents.push(Document {
            id,
            hash,
            status: DocumentStatus::Normal,
            handle,
        });
        self.refresh_statuses();
        Ok(id)
    }

    /// Remove a document and release its handle. Returns false if `id` is unknown.
    pub fn remove(&mut self, id: DocumentId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        self.documents.remove(index).close();
        self.refresh_statuses();
        true
    }

    /// Replace the order with `new_order`
    ///
    /// `new_order` must be a permutation of the current ids. Otherwise the
    /// collection is left as it was and false is returned.
    pub fn reorder(&mut self, new_order: &[DocumentId]) -> bool {
        let applied = reorder_by_key(&mut self.documents, new_order, Document::id);
        if applied {
            self.refresh_statuses();
        } else {
            log::debug!("Rejected reorder: not a permutation of the current documents");
        }
        applied
    }

    /// Keep the first document for each content hash and remove the rest
    ///
    /// Returns how many documents were removed. Idempotent: once no
    /// duplicates remain this returns 0 and changes nothing.
    pub fn remove_duplicates(&mut self) -> usize {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(self.documents.len());
        let mut removed = 0;

        for doc in self.documents.drain(..) {
            if seen.insert(doc.hash) {
                kept.push(doc);
            } else {
                removed += 1;
                doc.close();
            }
        }

        self.documents = kept;
        if removed > 0 {
            log::debug!("Removed {removed} duplicate documents");
        }
        self.refresh_statuses();
        removed
    }

    /// Documents currently marked duplicate, in collection order
    pub fn duplicates(&self) -> Vec<&Document> {
        self.documents.iter().filter(|doc| doc.is_duplicate()).collect()
    }

    /// Remove every document, releasing all handles
    pub fn clear(&mut self) {
        for doc in self.documents.drain(..) {
            doc.close();
        }
        self.refresh_statuses();
    }

    /// Rebuild hash counts and statuses from scratch.
    ///
    /// A full rescan per mutation; collections hold tens of files.
    fn refresh_statuses(&mut self) {
        self.hash_counts.clear();
        for doc in &self.documents {
            *self.hash_counts.entry(doc.hash).or_insert(0) += 1;
        }

        for doc in &mut self.documents {
            doc.status = if self.hash_counts[&doc.hash] > 1 {
                DocumentStatus::Duplicate
            } else {
                DocumentStatus::Normal
            };
        }
    }
}

impl Drop for DocumentCollection {
    fn drop(&mut self) {
        self.clear();
    }
}
