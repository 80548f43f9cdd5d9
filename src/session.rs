//! Application state for the two workflows
//!
//! A front end holds one of these and turns user gestures into calls on it.
//! Neither session does any I/O except loading sources and exporting.

use std::path::{Path, PathBuf};

use crate::collection::DocumentCollection;
use crate::engine::{export_ranges, merge_collection, write_plan, OutputPlan};
use crate::error::{Error, Result};
use crate::pdf::reader::PdfHandle;
use crate::pdf::writer::{WriteOptions, WriteSummary};
use crate::ranges::{RangeId, RangeList};

/// Merge many files into one
#[derive(Debug, Default)]
pub struct MergeSession {
    collection: DocumentCollection,
    options: WriteOptions,
}

impl MergeSession {
    pub fn new(options: WriteOptions) -> Self {
        Self {
            collection: DocumentCollection::new(),
            options,
        }
    }

    pub fn collection(&self) -> &DocumentCollection {
        &self.collection
    }

    pub fn collection_mut(&mut self) -> &mut DocumentCollection {
        &mut self.collection
    }

    /// Pages the export would write, in order
    pub fn plan(&self) -> OutputPlan {
        merge_collection(&self.collection)
    }

    /// Write all documents, in collection order, to `output`
    pub fn export(&self, output: &Path) -> Result<WriteSummary> {
        if self.collection.is_empty() {
            return Err(Error::NothingToExport("no documents have been added".to_string()));
        }
        write_plan(&self.plan(), output, &self.options)
    }
}

/// Cut ranges of pages out of one source file
#[derive(Debug, Default)]
pub struct SplitSession {
    source: Option<PdfHandle>,
    ranges: RangeList,
    options: WriteOptions,
}

impl SplitSession {
    pub fn new(options: WriteOptions) -> Self {
        Self {
            source: None,
            ranges: RangeList::new(),
            options,
        }
    }

    /// Load a new source, returning its page count
    ///
    /// Existing ranges are discarded since they referred to the old source.
    /// If loading fails the previous source and ranges are kept.
    pub fn load(&mut self, path: &Path) -> Result<u32> {
        let handle = PdfHandle::open(path)?;
        let total_pages = handle.page_count();

        if let Some(previous) = self.source.replace(handle) {
            previous.close();
        }
        self.ranges.clear();

        log::info!("Loaded {} ({} pages)", path.display(), total_pages);
        Ok(total_pages)
    }

    pub fn source(&self) -> Option<&PdfHandle> {
        self.source.as_ref()
    }

    pub fn source_path(&self) -> Option<PathBuf> {
        self.source.as_ref().map(|handle| handle.path().to_path_buf())
    }

    /// Page count of the loaded source, 0 if none
    pub fn total_pages(&self) -> u32 {
        self.source.as_ref().map_or(0, PdfHandle::page_count)
    }

    /// Validate and append a range against the loaded source
    pub fn add_range(&mut self, start: u32, end: u32) -> Result<usize> {
        let total_pages = self.loaded()?.page_count();
        self.ranges.add_range(start, end, total_pages)
    }

    pub fn remove_range(&mut self, index: usize) -> bool {
        self.ranges.remove_range(index)
    }

    pub fn reorder(&mut self, new_order: &[RangeId]) -> bool {
        self.ranges.reorder(new_order)
    }

    pub fn ranges(&self) -> &RangeList {
        &self.ranges
    }

    /// Pages the export would write, in order
    pub fn plan(&self) -> Result<OutputPlan> {
        let source = self.loaded()?;
        export_ranges(source.path(), source.page_count(), &self.ranges)
    }

    /// Write the selected ranges, in list order, to `output`
    pub fn export(&self, output: &Path) -> Result<WriteSummary> {
        if self.ranges.is_empty() {
            return Err(Error::NothingToExport("no page ranges have been added".to_string()));
        }
        write_plan(&self.plan()?, output, &self.options)
    }

    fn loaded(&self) -> Result<&PdfHandle> {
        self.source.as_ref().ok_or(Error::NoSourceLoaded)
    }
}

impl Drop for SplitSession {
    fn drop(&mut self) {
        if let Some(handle) = self.source.take() {
            handle.close();
        }
    }
}
