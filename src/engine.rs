//! Turning a collection or a range list into an ordered page plan, and
//! writing that plan out
//!
//! Planning is pure: it reads current state and produces an [`OutputPlan`].
//! Only [`write_plan`] touches the filesystem.

use std::path::{Path, PathBuf};

use crate::collection::DocumentCollection;
use crate::error::{Error, Result};
use crate::pdf::writer::{PageWriter, WriteOptions, WriteSummary};
use crate::ranges::RangeList;

/// One output page: which source, which page (0-based)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub source: PathBuf,
    pub page_index: u32,
}

/// Ordered list of pages that make up the output document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputPlan {
    entries: Vec<PlanEntry>,
}

impl OutputPlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter()
    }

    fn push(&mut self, source: &Path, page_index: u32) {
        self.entries.push(PlanEntry {
            source: source.to_path_buf(),
            page_index,
        });
    }
}

/// Every page of every document, in collection order then page order
pub fn merge_collection(collection: &DocumentCollection) -> OutputPlan {
    let mut plan = OutputPlan::default();
    for doc in collection.iter() {
        for page_index in 0..doc.page_count() {
            plan.push(doc.path(), page_index);
        }
    }
    plan
}

/// Pages of `source` selected by `ranges`, in list order
///
/// Every range is checked against `total_pages` before anything is planned;
/// one bad range fails the whole export. Overlapping ranges repeat pages.
pub fn export_ranges(source: &Path, total_pages: u32, ranges: &RangeList) -> Result<OutputPlan> {
    for entry in ranges.iter() {
        entry.range.check(total_pages)?;
    }

    let mut plan = OutputPlan::default();
    for entry in ranges.iter() {
        for page_index in entry.range.page_indices() {
            plan.push(source, page_index);
        }
    }
    Ok(plan)
}

/// Serialize `plan` to `output`
///
/// Fails with `NothingToExport` on an empty plan without touching `output`.
pub fn write_plan(plan: &OutputPlan, output: &Path, options: &WriteOptions) -> Result<WriteSummary> {
    if plan.is_empty() {
        return Err(Error::NothingToExport("the page plan is empty".to_string()));
    }

    log::info!("Writing {} pages to {}", plan.len(), output.display());

    let mut writer = PageWriter::new(options.clone());
    for entry in plan.iter() {
        writer.add_page(&entry.source, entry.page_index)?;
    }
    writer.write(output)
}
