//! PDF metadata: reading document info and stamping output documents

use std::path::Path;

use chrono::{DateTime, Local};
use lopdf::{Dictionary, Document, Object, StringFormat};

use crate::error::Result;
use crate::fingerprint::{fingerprint, ContentHash};
use crate::pdf::reader::PdfHandle;

/// PDF metadata
#[derive(Debug, Clone)]
pub struct PdfInfo {
    /// Number of pages in the PDF
    pub page_count: u32,
    /// Fingerprint of the file's bytes
    pub fingerprint: ContentHash,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
}

/// Extract metadata from a PDF file
pub fn extract_info(path: &Path) -> Result<PdfInfo> {
    let fingerprint = fingerprint(path)?;
    let handle = PdfHandle::open(path)?;

    let info = info_dictionary(handle.document());
    let title = info.and_then(|dict| string_field(dict, b"Title"));
    let author = info.and_then(|dict| string_field(dict, b"Author"));

    let page_count = handle.page_count();
    handle.close();

    Ok(PdfInfo {
        page_count,
        fingerprint,
        title,
        author,
    })
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    let info_id = doc.trailer.get(b"Info").and_then(Object::as_reference).ok()?;
    doc.get_object(info_id).and_then(Object::as_dict).ok()
}

fn string_field(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

/// Set Producer, CreationDate and ModDate on the output document's Info dictionary
pub fn stamp_info(doc: &mut Document, producer: &str, now: DateTime<Local>) {
    let date = format_pdf_date(now);

    let mut info = Dictionary::new();
    info.set(
        "Producer",
        Object::String(producer.as_bytes().to_vec(), StringFormat::Literal),
    );
    info.set(
        "CreationDate",
        Object::String(date.as_bytes().to_vec(), StringFormat::Literal),
    );
    info.set(
        "ModDate",
        Object::String(date.into_bytes(), StringFormat::Literal),
    );

    let info_id = doc.add_object(info);
    doc.trailer.set("Info", Object::Reference(info_id));
}

/// Format a timestamp as a PDF date string: D:YYYYMMDDHHmmSSOHH'mm'
fn format_pdf_date(time: DateTime<Local>) -> String {
    let offset = time.format("%z").to_string();
    let (hours, minutes) = offset.split_at(offset.len().saturating_sub(2));
    format!("D:{}{}'{}'", time.format("%Y%m%d%H%M%S"), hours, minutes)
}
