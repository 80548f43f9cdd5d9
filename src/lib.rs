//! pdf-collate library
//!
//! Merging whole PDFs and extracting page ranges, with the bookkeeping done
//! up front: content-based duplicate detection, id-keyed reordering and
//! range validation. This library provides:
//! - An ordered document collection with duplicate tracking
//! - Page range lists over a single source
//! - Page plans built from either, and writing them out atomically
//!
//! # Example
//!
//! ```no_run
//! use pdf_collate::collection::AddOutcome;
//! use pdf_collate::pdf::WriteOptions;
//! use pdf_collate::session::MergeSession;
//! use std::path::Path;
//!
//! let mut session = MergeSession::new(WriteOptions::default());
//! for name in ["1. intro.pdf", "2. advanced.pdf"] {
//!     match session.collection_mut().add(Path::new(name)) {
//!         Ok(AddOutcome::Added { .. }) => {}
//!         Ok(AddOutcome::DuplicateConflict { .. }) => eprintln!("{name} is already included"),
//!         Err(e) => eprintln!("Skipping {name}: {e}"),
//!     }
//! }
//!
//! session.export(Path::new("merged.pdf")).expect("Failed to merge PDFs");
//! ```

pub mod collection;
pub mod engine;
pub mod error;
pub mod fingerprint;
mod order;
pub mod pdf;
pub mod ranges;
pub mod session;

// Re-export commonly used items
pub use error::{Error, Result};
