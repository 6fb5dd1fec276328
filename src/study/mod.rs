//! Learning content produced from extracted text, and the user's answers to it.

pub mod evaluator;
pub mod generator;
pub mod session;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::llm::Provider;

pub use evaluator::{AnswerEvaluation, AnswerOutcome, QuizResult, evaluate_answer, evaluate_quiz};
pub use generator::{
    AnalyticsGenerator, ContentGenerator, QuizGenerator, SummaryGenerator, generate,
};
pub use session::Session;

/// User answers keyed by question position.
///
/// Serialized with string keys (`{"0": "A"}`).
pub type UserAnswers = BTreeMap<usize, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Summary,
    Quiz,
    AnalyticsQuestions,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Summary => write!(f, "summary"),
            ContentKind::Quiz => write!(f, "quiz"),
            ContentKind::AnalyticsQuestions => write!(f, "analytics questions"),
        }
    }
}

/// Where a piece of content came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentMetadata {
    pub provider: Provider,
    pub model: String,
    pub generated_at: DateTime<Utc>,
}

impl ContentMetadata {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            model: provider.model_id().to_string(),
            generated_at: Utc::now(),
        }
    }
}

/// A generated artifact of one kind, tagged with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeneratedContent {
    Summary {
        content: String,
        metadata: ContentMetadata,
    },
    Quiz {
        content: Quiz,
        metadata: ContentMetadata,
    },
    AnalyticsQuestions {
        content: AnalyticsQuestions,
        metadata: ContentMetadata,
    },
}

impl GeneratedContent {
    pub fn kind(&self) -> ContentKind {
        match self {
            GeneratedContent::Summary { .. } => ContentKind::Summary,
            GeneratedContent::Quiz { .. } => ContentKind::Quiz,
            GeneratedContent::AnalyticsQuestions { .. } => ContentKind::AnalyticsQuestions,
        }
    }

    pub fn metadata(&self) -> &ContentMetadata {
        match self {
            GeneratedContent::Summary { metadata, .. }
            | GeneratedContent::Quiz { metadata, .. }
            | GeneratedContent::AnalyticsQuestions { metadata, .. } => metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<QuizOption>,
    /// Label of the correct option, e.g. `"B"`.
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    pub label: String,
    pub text: String,
}

impl fmt::Display for QuizOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.label, self.text)
    }
}

impl QuizQuestion {
    pub fn option(&self, label: &str) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.label == label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsQuestions {
    pub questions: Vec<AnalyticsQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsQuestion {
    pub question: String,
    pub evaluation_criteria: Vec<String>,
}
