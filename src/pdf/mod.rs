//! PDF codec layer: opening sources, writing output, document info

pub mod reader;
pub mod writer;
pub mod metadata;

// Re-export commonly used items
pub use reader::PdfHandle;
pub use writer::{PageWriter, WriteOptions, WriteSummary};
pub use metadata::{extract_info, PdfInfo};
