//! Structural statistics for a whole PDF.
//!
//! Counts are taken from each page's content stream: a text block is one
//! `BT`..`ET` object that shows text, and a line starts at every
//! text-positioning operator inside a block. Shown strings are read one byte
//! per character, so composite (CID) fonts are counted by code unit.

use std::collections::{BTreeMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StudyError};

use super::PdfDocument;

/// `TJ` adjustments at or below this (thousandths of an em) read as a space.
const TJ_SPACE_THRESHOLD: f32 = -250.0;

const INFO_KEYS: [(&[u8], &str); 8] = [
    (b"Title", "title"),
    (b"Author", "author"),
    (b"Subject", "subject"),
    (b"Keywords", "keywords"),
    (b"Creator", "creator"),
    (b"Producer", "producer"),
    (b"CreationDate", "creationDate"),
    (b"ModDate", "modDate"),
];

/// Aggregate counts over every page of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStats {
    pub total_pages: usize,
    pub total_images: usize,
    pub total_text_blocks: usize,
    pub total_lines: usize,
    pub total_words: usize,
    pub total_characters: usize,
    /// Document info entries, empty values included.
    pub metadata: BTreeMap<String, String>,
    pub pages: Vec<PageStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageStats {
    /// 1-indexed.
    pub number: u32,
    pub images: usize,
    pub blocks: Vec<TextBlock>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextBlock {
    pub lines: Vec<String>,
}

impl TextBlock {
    pub fn word_count(&self) -> usize {
        self.lines.iter().map(|l| l.split_whitespace().count()).sum()
    }

    pub fn char_count(&self) -> usize {
        self.lines.iter().map(|l| l.chars().count()).sum()
    }
}

impl PageStats {
    pub fn line_count(&self) -> usize {
        self.blocks.iter().map(|b| b.lines.len()).sum()
    }

    pub fn word_count(&self) -> usize {
        self.blocks.iter().map(TextBlock::word_count).sum()
    }

    pub fn char_count(&self) -> usize {
        self.blocks.iter().map(TextBlock::char_count).sum()
    }
}

/// Analyze every page of a PDF.
pub fn analyze_document(bytes: &[u8]) -> Result<DocumentStats> {
    let doc = PdfDocument::open(bytes)?;
    let inner = doc.inner();

    let mut pages = Vec::with_capacity(doc.page_count() as usize);
    for (number, page_id) in doc.pages() {
        let content = inner.get_and_decode_page_content(page_id).map_err(|e| {
            StudyError::CorruptDocument(format!("page {} content: {}", number, e))
        })?;

        pages.push(PageStats {
            number,
            images: count_page_images(inner, page_id),
            blocks: collect_text_blocks(&content.operations),
        });
    }

    let stats = DocumentStats {
        total_pages: pages.len(),
        total_images: pages.iter().map(|p| p.images).sum(),
        total_text_blocks: pages.iter().map(|p| p.blocks.len()).sum(),
        total_lines: pages.iter().map(PageStats::line_count).sum(),
        total_words: pages.iter().map(PageStats::word_count).sum(),
        total_characters: pages.iter().map(PageStats::char_count).sum(),
        metadata: read_info(inner),
        pages,
    };

    tracing::debug!(
        "PDF analysis: {} pages, {} blocks, {} words, {} images",
        stats.total_pages,
        stats.total_text_blocks,
        stats.total_words,
        stats.total_images
    );

    Ok(stats)
}

fn collect_text_blocks(operations: &[lopdf::content::Operation]) -> Vec<TextBlock> {
    let mut blocks = Vec::new();
    let mut block: Option<TextBlock> = None;
    let mut line: Option<String> = None;

    for op in operations {
        match op.operator.as_str() {
            "BT" => {
                block = Some(TextBlock::default());
                line = None;
            }
            "ET" => {
                if let Some(mut b) = block.take() {
                    if let Some(l) = line.take() {
                        b.lines.push(l);
                    }
                    if !b.lines.is_empty() {
                        blocks.push(b);
                    }
                }
            }
            "Td" | "TD" | "T*" | "Tm" => {
                if let (Some(b), Some(l)) = (block.as_mut(), line.take()) {
                    b.lines.push(l);
                }
            }
            "Tj" | "TJ" | "'" | "\"" => {
                let Some(b) = block.as_mut() else {
                    continue;
                };
                // ' and " move to the next line before showing
                if matches!(op.operator.as_str(), "'" | "\"")
                    && let Some(l) = line.take()
                {
                    b.lines.push(l);
                }
                let shown = shown_text(&op.operands);
                line.get_or_insert_with(String::new).push_str(&shown);
            }
            _ => {}
        }
    }

    blocks
}

fn shown_text(operands: &[Object]) -> String {
    let mut text = String::new();
    for operand in operands {
        match operand {
            Object::String(bytes, _) => text.push_str(&decode_pdf_string(bytes)),
            Object::Array(items) => {
                for item in items {
                    match item {
                        Object::String(bytes, _) => text.push_str(&decode_pdf_string(bytes)),
                        other => {
                            if let Ok(adjust) = other.as_float()
                                && adjust <= TJ_SPACE_THRESHOLD
                            {
                                text.push(' ');
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
    text
}

/// Decode a PDF string: UTF-16BE when it carries a BOM, bytes otherwise.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }
    bytes
        .iter()
        .map(|&b| b as char)
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect()
}

/// Number of distinct image XObjects in a page's (possibly inherited) resources.
fn count_page_images(doc: &Document, page_id: ObjectId) -> usize {
    let Some(resources) = page_resources(doc, page_id) else {
        return 0;
    };
    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .and_then(|o| doc.dereference(o).ok())
        .and_then(|(_, o)| o.as_dict().ok())
    else {
        return 0;
    };

    let mut seen = HashSet::new();
    let mut direct = 0;
    for (_, obj) in xobjects.iter() {
        let Ok((id, resolved)) = doc.dereference(obj) else {
            continue;
        };
        if !is_image_stream(resolved) {
            continue;
        }
        match id {
            Some(id) => {
                seen.insert(id);
            }
            None => direct += 1,
        }
    }
    seen.len() + direct
}

fn is_image_stream(obj: &Object) -> bool {
    obj.as_stream()
        .ok()
        .and_then(|stream| stream.dict.get(b"Subtype").ok())
        .and_then(|subtype| subtype.as_name().ok())
        .is_some_and(|name| name == b"Image")
}

/// A page's `/Resources`, walking up `/Parent` for inherited ones.
fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    loop {
        if let Ok(resources) = node.get(b"Resources")
            && let Ok((_, Object::Dictionary(dict))) = doc.dereference(resources)
        {
            return Some(dict);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
}

fn read_info(doc: &Document) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    let Some(info) = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|o| doc.dereference(o).ok())
        .and_then(|(_, o)| o.as_dict().ok())
    else {
        return metadata;
    };

    for (key, name) in INFO_KEYS {
        let value = match info.get(key) {
            Ok(Object::String(bytes, _)) => decode_pdf_string(bytes),
            Ok(Object::Name(bytes)) => String::from_utf8_lossy(bytes).into_owned(),
            _ => String::new(),
        };
        metadata.insert(name.to_string(), value.trim().to_string());
    }

    metadata
}
