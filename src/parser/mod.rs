pub mod pages;
pub mod pdf;
pub mod stats;

use std::collections::BTreeMap;

use lopdf::{Document, ObjectId};

use crate::error::{Result, StudyError};

pub use pages::{PageSet, parse_page_spec};
pub use pdf::{extract_pages, extract_text_from_pages};
pub use stats::{DocumentStats, analyze_document};

/// An opened PDF, scoped to a single extraction or analysis call.
///
/// Dropping it releases the parsed object table.
pub(crate) struct PdfDocument {
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
}

impl PdfDocument {
    /// Parse raw bytes. Fails with `CorruptDocument` or `EmptyDocument`.
    pub fn open(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(StudyError::CorruptDocument("no data".to_string()));
        }

        let mut doc = Document::load_mem(bytes)?;

        // Documents encrypted with an empty user password open transparently
        if doc.is_encrypted() {
            doc.decrypt("").map_err(|_| {
                StudyError::CorruptDocument("document is password protected".to_string())
            })?;
            tracing::debug!("Decrypted PDF with empty password");
        }

        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(StudyError::EmptyDocument);
        }

        tracing::debug!("Opened PDF with {} pages", pages.len());
        Ok(Self { doc, pages })
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// `(1-indexed number, object id)` pairs in page order.
    pub fn pages(&self) -> impl Iterator<Item = (u32, ObjectId)> + '_ {
        self.pages.iter().map(|(n, id)| (*n, *id))
    }

    pub fn inner(&self) -> &Document {
        &self.doc
    }
}
