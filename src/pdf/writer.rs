//! Assembling output PDFs page by page using lopdf
//!
//! Source documents are imported into one target document the way the lopdf
//! merge example does it: renumber each source's objects past the target's
//! highest id, move all objects across, then build a fresh page tree whose
//! kids are the selected pages.
//! https://github.com/J-F-Liu/lopdf/blob/main/examples/merge.rs

use std::collections::{HashMap, HashSet};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::pdf::metadata::stamp_info;
use crate::pdf::reader::PdfHandle;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Deepest page tree we will walk when resolving inherited attributes
const MAX_TREE_DEPTH: usize = 64;

/// Options for writing the output PDF
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Compress streams before saving
    pub compress: bool,
    /// PDF version written in the header
    pub pdf_version: String,
    /// Value for the Info dictionary's Producer entry
    pub producer: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compress: true,
            pdf_version: "1.5".to_string(),
            producer: "pdf-collate".to_string(),
        }
    }
}

/// Result of a successful write
#[derive(Debug, Clone)]
pub struct WriteSummary {
    /// Where the file was written
    pub output: PathBuf,
    /// Pages in the written document
    pub page_count: usize,
    /// Size of the written file in bytes
    pub file_size: u64,
}

/// Builds one output document from pages of any number of source files
pub struct PageWriter {
    target: Document,
    /// Page ids of each imported source, renumbered into `target`
    imported: HashMap<PathBuf, Vec<ObjectId>>,
    /// Source pages already placed once; repeats get a copy
    placed: HashSet<ObjectId>,
    kids: Vec<ObjectId>,
    options: WriteOptions,
}

impl PageWriter {
    /// Start an empty output document
    pub fn new(options: WriteOptions) -> Self {
        Self {
            target: Document::with_version(options.pdf_version.as_str()),
            imported: HashMap::new(),
            placed: HashSet::new(),
            kids: Vec::new(),
            options,
        }
    }

    /// Number of pages added so far
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append page `page_index` (0-based) of `source` to the output
    pub fn add_page(&mut self, source: &Path, page_index: u32) -> Result<()> {
        let source_pages = self.import(source)?;
        let page_id = source_pages.get(page_index as usize).copied().ok_or_else(|| {
            Error::PageOutOfBounds {
                path: source.to_path_buf(),
                page_index,
                page_count: source_pages.len() as u32,
            }
        })?;

        let page = resolve_page(&self.target, page_id)?;

        let out_id = if self.placed.insert(page_id) {
            self.target.objects.insert(page_id, Object::Dictionary(page));
            page_id
        } else {
            // Same source page used again: each output page needs its own object
            self.target.add_object(page)
        };

        self.kids.push(out_id);
        Ok(())
    }

    /// Load a source into the target document once, returning its page ids
    fn import(&mut self, source: &Path) -> Result<Vec<ObjectId>> {
        if let Some(pages) = self.imported.get(source) {
            return Ok(pages.clone());
        }

        let mut doc = PdfHandle::open(source)?.into_document();

        // Renumber objects in this document to avoid conflicts
        doc.renumber_objects_with(self.target.max_id + 1);
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();

        self.target.max_id = doc.max_id;
        self.target.objects.extend(doc.objects);

        log::debug!(
            "Imported {} ({} pages) into output",
            source.display(),
            pages.len()
        );
        self.imported.insert(source.to_path_buf(), pages.clone());
        Ok(pages)
    }

    /// Finish the document and save it to `output`
    ///
    /// The file is written to a temporary path next to `output` and renamed
    /// into place only after the whole document has been written, so a failed
    /// write never leaves a truncated file at `output`.
    pub fn write(mut self, output: &Path) -> Result<WriteSummary> {
        if self.kids.is_empty() {
            return Err(Error::NothingToExport("no pages were added".to_string()));
        }

        let page_count = self.kids.len();
        let pages_id = self.target.new_object_id();

        let kids: Vec<Object> = self.kids.iter().map(|&id| Object::Reference(id)).collect();

        let mut pages_object = Dictionary::new();
        pages_object.set("Type", Object::Name(b"Pages".to_vec()));
        pages_object.set("Count", Object::Integer(page_count as i64));
        pages_object.set("Kids", Object::Array(kids));
        self.target
            .objects
            .insert(pages_id, Object::Dictionary(pages_object));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = self.target.add_object(catalog);

        self.target.trailer.set("Root", Object::Reference(catalog_id));

        for &page_id in &self.kids {
            if let Ok(Object::Dictionary(dict)) = self.target.get_object_mut(page_id) {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }

        stamp_info(&mut self.target, &self.options.producer, Local::now());

        // Drop source catalogs, page trees and unselected pages
        let pruned = self.target.prune_objects();
        log::debug!("Pruned {} unreferenced objects", pruned.len());
        self.target.renumber_objects();

        if self.options.compress {
            self.target.compress();
        }

        save_atomic(&mut self.target, output)?;

        let file_size = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
        log::debug!(
            "Wrote {} pages ({} bytes) to {}",
            page_count,
            file_size,
            output.display()
        );

        Ok(WriteSummary {
            output: output.to_path_buf(),
            page_count,
            file_size,
        })
    }
}

/// Copy a page dictionary with inherited attributes filled in from its ancestors
fn resolve_page(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let mut page = doc.get_object(page_id)?.as_dict()?.clone();

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(node_id) = parent {
        if depth == MAX_TREE_DEPTH {
            break;
        }
        depth += 1;

        let Ok(node) = doc.get_object(node_id).and_then(Object::as_dict) else {
            break;
        };
        for key in INHERITABLE_KEYS {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    page.remove(b"Parent");
    Ok(page)
}

/// Save through a temp file in the destination directory, then rename
fn save_atomic(doc: &mut Document, output: &Path) -> Result<()> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let write_err = |source: std::io::Error| Error::Write {
        path: output.to_path_buf(),
        source,
    };

    let mut temp = NamedTempFile::new_in(&dir).map_err(write_err)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        doc.save_to(&mut writer)
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        writer.flush().map_err(write_err)?;
    }
    temp.as_file().sync_all().map_err(write_err)?;

    // Dropping `temp` on any error above deletes the partial file
    temp.persist(output).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};
    use tempfile::TempDir;

    /// PDF whose page contents are `(<label> <index>) Tj`; Resources and
    /// MediaBox live on the Pages node so pages must inherit them.
    fn write_pdf(path: &Path, label: &str, pages: usize) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut kids = Vec::new();
        for i in 0..pages {
            let content = format!("BT /F1 12 Tf 72 720 Td ({label} {i}) Tj ET");
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    fn uncompressed() -> WriteOptions {
        WriteOptions {
            compress: false,
            ..Default::default()
        }
    }

    fn page_texts(path: &Path) -> Vec<String> {
        let doc = Document::load(path).unwrap();
        doc.get_pages()
            .into_values()
            .map(|id| String::from_utf8_lossy(&doc.get_page_content(id).unwrap()).into_owned())
            .collect()
    }

    #[test]
    fn test_pages_written_in_call_order() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        write_pdf(&a, "alpha", 3);
        write_pdf(&b, "beta", 2);
        let out = dir.path().join("out.pdf");

        let mut writer = PageWriter::new(uncompressed());
        writer.add_page(&b, 1).unwrap();
        writer.add_page(&a, 0).unwrap();
        writer.add_page(&a, 2).unwrap();
        assert_eq!(writer.page_count(), 3);

        let summary = writer.write(&out).unwrap();
        assert_eq!(summary.page_count, 3);
        assert!(summary.file_size > 0);

        let texts = page_texts(&out);
        assert_eq!(texts.len(), 3);
        assert!(texts[0].contains("(beta 1)"));
        assert!(texts[1].contains("(alpha 0)"));
        assert!(texts[2].contains("(alpha 2)"));
    }

    #[test]
    fn test_repeated_page_gets_distinct_object() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.pdf");
        write_pdf(&a, "alpha", 2);
        let out = dir.path().join("out.pdf");

        let mut writer = PageWriter::new(uncompressed());
        writer.add_page(&a, 0).unwrap();
        writer.add_page(&a, 0).unwrap();
        writer.write(&out).unwrap();

        let doc = Document::load(&out).unwrap();
        let ids: HashSet<ObjectId> = doc.get_pages().into_values().collect();
        assert_eq!(ids.len(), 2);
        assert!(page_texts(&out).iter().all(|t| t.contains("(alpha 0)")));
    }

    #[test]
    fn test_inherited_attributes_are_kept() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.pdf");
        write_pdf(&a, "alpha", 1);
        let out = dir.path().join("out.pdf");

        let mut writer = PageWriter::new(uncompressed());
        writer.add_page(&a, 0).unwrap();
        writer.write(&out).unwrap();

        let doc = Document::load(&out).unwrap();
        let page_id = doc.get_pages().into_values().next().unwrap();
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        assert!(page.has(b"MediaBox"));
        assert!(page.has(b"Resources"));
    }

    #[test]
    fn test_page_index_out_of_bounds() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.pdf");
        write_pdf(&a, "alpha", 2);

        let mut writer = PageWriter::new(WriteOptions::default());
        let err = writer.add_page(&a, 2).unwrap_err();
        assert!(matches!(
            err,
            Error::PageOutOfBounds { page_index: 2, page_count: 2, .. }
        ));
        assert_eq!(writer.page_count(), 0);
    }

    #[test]
    fn test_write_without_pages_fails() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.pdf");

        let writer = PageWriter::new(WriteOptions::default());
        assert!(matches!(
            writer.write(&out).unwrap_err(),
            Error::NothingToExport(_)
        ));
        assert!(!out.exists());
    }

    #[test]
    fn test_failed_write_leaves_no_output() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.pdf");
        write_pdf(&a, "alpha", 1);
        let out = dir.path().join("missing-dir").join("out.pdf");

        let mut writer = PageWriter::new(WriteOptions::default());
        writer.add_page(&a, 0).unwrap();
        let err = writer.write(&out).unwrap_err();

        assert!(matches!(err, Error::Write { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.pdf");
        write_pdf(&a, "alpha", 1);
        let out = dir.path().join("out.pdf");

        let mut writer = PageWriter::new(WriteOptions::default());
        writer.add_page(&a, 0).unwrap();
        writer.write(&out).unwrap();

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.pdf".to_string(), "out.pdf".to_string()]);
    }
}
