//! Error taxonomy for page selection, document access and content generation.

use thiserror::Error;

use crate::llm::Provider;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, StudyError>;

/// Every failure a core operation can surface.
///
/// All variants are terminal for the operation that raised them; nothing is
/// retried internally.
#[derive(Error, Debug)]
pub enum StudyError {
    /// A page token is not `N` or `N-M`, or a range runs backwards.
    #[error("Invalid page specification '{spec}': {reason}")]
    MalformedPageSpec { spec: String, reason: String },

    /// The page specification is empty.
    #[error("No valid page numbers provided")]
    EmptyPageSpec,

    /// A requested page lies beyond the end of the document.
    #[error("Page number {page} exceeds PDF length ({page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },

    /// The bytes could not be opened as a paged document.
    #[error("Could not read PDF: {0}")]
    CorruptDocument(String),

    /// The document opened but has no pages.
    #[error("PDF has no pages")]
    EmptyDocument,

    /// Text handed to a generator or evaluator is blank.
    #[error("Input text is empty")]
    EmptyInput,

    /// A provider name that is not one of the supported backends.
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// No API key is configured for the provider.
    #[error("API key not found for provider {provider}. Set {env_var} or run 'learnify auth'.")]
    MissingCredential {
        provider: Provider,
        env_var: &'static str,
    },

    /// The provider round trip or the parse of its reply failed.
    #[error("Error generating {what}: {reason}")]
    GenerationFailed { what: String, reason: String },

    /// A quiz without questions cannot be scored.
    #[error("Quiz has no questions")]
    EmptyQuiz,
}

impl StudyError {
    pub(crate) fn malformed(spec: &str, reason: impl Into<String>) -> Self {
        Self::MalformedPageSpec {
            spec: spec.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn generation(what: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::GenerationFailed {
            what: what.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<lopdf::Error> for StudyError {
    fn from(err: lopdf::Error) -> Self {
        StudyError::CorruptDocument(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_out_of_range_message_names_both_bounds() {
        let err = StudyError::PageOutOfRange {
            page: 10,
            page_count: 5,
        };
        assert_eq!(err.to_string(), "Page number 10 exceeds PDF length (5)");
    }

    #[test]
    fn test_missing_credential_names_env_var() {
        let err = StudyError::MissingCredential {
            provider: Provider::Groq,
            env_var: "GROQ_API_KEY",
        };
        let msg = err.to_string();
        assert!(msg.contains("groq"));
        assert!(msg.contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_generation_failed_wraps_reason() {
        let err = StudyError::generation("quiz", "expected 3 questions, got 2");
        assert_eq!(
            err.to_string(),
            "Error generating quiz: expected 3 questions, got 2"
        );
    }
}
