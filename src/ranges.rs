//! Page ranges over a single source document
//!
//! Ranges are 1-indexed and inclusive. They are validated against the
//! source's page count when added and again at export time. Ranges are not
//! checked against each other: overlapping ranges simply repeat pages.

use std::fmt;

use crate::error::{Error, Result};
use crate::order::reorder_by_key;

/// Opaque, stable identifier assigned to a range when it is added
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RangeId(u64);

impl fmt::Display for RangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "range-{}", self.0)
    }
}

/// Inclusive, 1-indexed page range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    start: u32,
    end: u32,
}

impl PageRange {
    /// Create a range, checking `1 <= start <= end <= total_pages`
    pub fn new(start: u32, end: u32, total_pages: u32) -> Result<Self> {
        let range = Self { start, end };
        range.check(total_pages)?;
        Ok(range)
    }

    /// Parse "N" or "N-M" against a document of `total_pages` pages.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_collate::ranges::PageRange;
    ///
    /// let range = PageRange::parse("2-4", 10).unwrap();
    /// assert_eq!((range.start(), range.end()), (2, 4));
    ///
    /// let single = PageRange::parse("7", 10).unwrap();
    /// assert_eq!(single.len(), 1);
    ///
    /// assert!(PageRange::parse("9-11", 10).is_err());
    /// ```
    pub fn parse(expr: &str, total_pages: u32) -> Result<Self> {
        let expr = expr.trim();
        let number = |s: &str| -> Result<u32> {
            s.trim()
                .parse()
                .map_err(|_| Error::InvalidRangeExpression(expr.to_string()))
        };

        let (start, end) = match expr.split_once('-') {
            Some((start, end)) => (number(start)?, number(end)?),
            None => {
                let page = number(expr)?;
                (page, page)
            }
        };

        Self::new(start, end, total_pages)
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of pages covered
    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Always false: a valid range covers at least one page
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Re-validate against a (possibly changed) page count
    pub fn check(&self, total_pages: u32) -> Result<()> {
        if self.start < 1 || self.start > self.end || self.end > total_pages {
            return Err(Error::InvalidRange {
                start: self.start,
                end: self.end,
                total_pages,
            });
        }
        Ok(())
    }

    /// 0-based page indices in ascending order
    pub fn page_indices(&self) -> impl Iterator<Item = u32> {
        (self.start - 1)..self.end
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pages {} to {}", self.start, self.end)
    }
}

/// A range together with its identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeEntry {
    pub id: RangeId,
    pub range: PageRange,
}

/// Ordered list of page ranges; the order is the export order
#[derive(Debug, Default, Clone)]
pub struct RangeList {
    entries: Vec<RangeEntry>,
    next_id: u64,
}

impl RangeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a range, returning its position
    ///
    /// On `InvalidRange` the list is unchanged.
    pub fn add_range(&mut self, start: u32, end: u32, total_pages: u32) -> Result<usize> {
        let range = PageRange::new(start, end, total_pages)?;
        Ok(self.push(range))
    }

    /// Append an already validated range, returning its position
    pub fn push(&mut self, range: PageRange) -> usize {
        let id = RangeId(self.next_id);
        self.next_id += 1;

        log::debug!("Added {id}: {range}");
        self.entries.push(RangeEntry { id, range });
        self.entries.len() - 1
    }

    /// Remove the range at `index`; false if out of bounds
    pub fn remove_range(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.entries.remove(index);
        true
    }

    /// Replace the order with `new_order`, which must be a permutation of
    /// the current ids; otherwise nothing changes and false is returned
    pub fn reorder(&mut self, new_order: &[RangeId]) -> bool {
        reorder_by_key(&mut self.entries, new_order, |entry| entry.id)
    }

    /// Identifiers in list order
    pub fn ids(&self) -> Vec<RangeId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RangeEntry> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&RangeEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
