use crate::error::{Result, StudyError};

use super::PdfDocument;
use super::pages::{PageSet, parse_page_spec};

/// Extract the text of the pages selected by `page_spec` from a PDF.
///
/// Pages are emitted in ascending order, each preceded by a
/// `--- Page N ---` banner. Only the final result is trimmed.
pub fn extract_text_from_pages(bytes: &[u8], page_spec: &str) -> Result<String> {
    extract_pages(bytes, &parse_page_spec(page_spec)?)
}

/// [`extract_text_from_pages`] for an already parsed selection.
pub fn extract_pages(bytes: &[u8], pages: &PageSet) -> Result<String> {
    let doc = PdfDocument::open(bytes)?;

    let page_count = doc.page_count();
    if let Some(max) = pages.max_index()
        && max >= page_count
    {
        return Err(StudyError::PageOutOfRange {
            page: max + 1,
            page_count,
        });
    }

    let mut extracted = String::new();
    for number in pages.page_numbers() {
        let text = page_text(&doc, number)?;
        extracted.push_str(&format!("\n\n--- Page {} ---\n\n{}", number, text));
    }

    tracing::debug!(
        "Extracted {} chars from {} of {} pages",
        extracted.len(),
        pages.len(),
        page_count
    );

    Ok(extracted.trim().to_string())
}

fn page_text(doc: &PdfDocument, number: u32) -> Result<String> {
    let text = doc.inner().extract_text(&[number]).map_err(|e| {
        StudyError::CorruptDocument(format!("failed to extract text from page {}: {}", number, e))
    })?;

    Ok(clean_pdf_text(&text))
}

/// Strip PDF artifacts that survive text extraction.
fn clean_pdf_text(text: &str) -> String {
    text.replace('\u{0}', "").replace('\u{FEFF}', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::testing::build_pdf;

    fn five_pages() -> Vec<u8> {
        build_pdf(&[
            vec![vec!["Cells divide by mitosis"]],
            vec![vec!["Second page"]],
            vec![vec!["Third page"]],
            vec![vec!["Fourth page"]],
            vec![vec!["Fifth page"]],
        ])
    }

    #[test]
    fn test_single_page_starts_with_banner() {
        let bytes = build_pdf(&[vec![vec!["Photosynthesis converts light"]]]);
        let text = extract_text_from_pages(&bytes, "1").unwrap();
        assert!(text.starts_with("--- Page 1 ---"));
        assert!(text.contains("Photosynthesis converts light"));
    }

    #[test]
    fn test_pages_follow_sorted_order() {
        let text = extract_text_from_pages(&five_pages(), "4,2").unwrap();
        let second = text.find("--- Page 2 ---").unwrap();
        let fourth = text.find("--- Page 4 ---").unwrap();
        assert!(second < fourth);
        assert!(text.contains("Second page"));
        assert!(text.contains("Fourth page"));
        assert!(!text.contains("Third page"));
        assert!(!text.contains("--- Page 1 ---"));
    }

    #[test]
    fn test_page_out_of_range_names_requested_page_and_length() {
        let err = extract_text_from_pages(&five_pages(), "2,10").unwrap_err();
        match &err {
            StudyError::PageOutOfRange { page, page_count } => {
                assert_eq!(*page, 10);
                assert_eq!(*page_count, 5);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        let msg = err.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains('5'));
    }

    #[test]
    fn test_out_of_range_reports_maximum_page() {
        let err = extract_text_from_pages(&five_pages(), "7,9,8").unwrap_err();
        assert!(matches!(err, StudyError::PageOutOfRange { page: 9, .. }));
    }

    #[test]
    fn test_last_page_is_in_range() {
        let text = extract_text_from_pages(&five_pages(), "5").unwrap();
        assert!(text.starts_with("--- Page 5 ---"));
    }

    #[test]
    fn test_spec_errors_surface_unchanged() {
        assert!(matches!(
            extract_text_from_pages(&five_pages(), "3-1"),
            Err(StudyError::MalformedPageSpec { .. })
        ));
        assert!(matches!(
            extract_text_from_pages(&five_pages(), ""),
            Err(StudyError::EmptyPageSpec)
        ));
    }

    #[test]
    fn test_corrupt_and_empty_documents() {
        assert!(matches!(
            extract_text_from_pages(b"%PDF-garbage", "1"),
            Err(StudyError::CorruptDocument(_))
        ));
        assert!(matches!(
            extract_text_from_pages(&build_pdf(&[]), "1"),
            Err(StudyError::EmptyDocument)
        ));
    }

    #[test]
    fn test_result_is_trimmed_only_at_the_ends() {
        let text = extract_text_from_pages(&five_pages(), "1-2").unwrap();
        assert!(!text.starts_with('\n'));
        assert!(!text.ends_with('\n'));
        assert!(text.contains("\n\n--- Page 2 ---\n\n"));
    }

    #[test]
    fn test_parsed_selection_matches_page_spec() {
        let pages = parse_page_spec("2-3").unwrap();
        assert_eq!(
            extract_pages(&five_pages(), &pages).unwrap(),
            extract_text_from_pages(&five_pages(), "2-3").unwrap()
        );
    }

    #[test]
    fn test_clean_pdf_text() {
        assert_eq!(clean_pdf_text("a\u{0}b\u{FEFF}c"), "abc");
    }
}
