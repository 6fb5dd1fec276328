use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::evaluator::{AnswerEvaluation, QuizResult, evaluate_quiz};
use super::{AnalyticsQuestions, ContentKind, GeneratedContent, Quiz, UserAnswers};
use crate::error::{Result, StudyError};
use crate::llm::Provider;

/// Everything one study run produced: the content for one document
/// selection, the answers given to it and their results.
///
/// Holds at most one item per [`ContentKind`]; regenerating a kind
/// replaces the old item and clears the answers tied to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub file_name: String,
    /// Canonical form of the selected pages, e.g. `1-3,5`.
    pub page_spec: String,
    pub provider: Provider,
    #[serde(default)]
    pub contents: Vec<GeneratedContent>,
    #[serde(default)]
    pub quiz_answers: UserAnswers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_result: Option<QuizResult>,
    #[serde(default)]
    pub analytics_answers: UserAnswers,
    #[serde(default)]
    pub evaluations: BTreeMap<usize, AnswerEvaluation>,
}

impl Session {
    pub fn new(file_name: impl Into<String>, page_spec: impl Into<String>, provider: Provider) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            file_name: file_name.into(),
            page_spec: page_spec.into(),
            provider,
            contents: Vec::new(),
            quiz_answers: UserAnswers::new(),
            quiz_result: None,
            analytics_answers: UserAnswers::new(),
            evaluations: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, content: GeneratedContent) {
        match content.kind() {
            ContentKind::Quiz => {
                self.quiz_answers.clear();
                self.quiz_result = None;
            }
            ContentKind::AnalyticsQuestions => {
                self.analytics_answers.clear();
                self.evaluations.clear();
            }
            ContentKind::Summary => {}
        }
        let kind = content.kind();
        self.contents.retain(|c| c.kind() != kind);
        self.contents.push(content);
    }

    pub fn content(&self, kind: ContentKind) -> Option<&GeneratedContent> {
        self.contents.iter().find(|c| c.kind() == kind)
    }

    pub fn summary(&self) -> Option<&str> {
        match self.content(ContentKind::Summary)? {
            GeneratedContent::Summary { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        match self.content(ContentKind::Quiz)? {
            GeneratedContent::Quiz { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn analytics_questions(&self) -> Option<&AnalyticsQuestions> {
        match self.content(ContentKind::AnalyticsQuestions)? {
            GeneratedContent::AnalyticsQuestions { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn answer_quiz(&mut self, index: usize, answer: impl Into<String>) {
        self.quiz_answers.insert(index, answer.into());
        self.quiz_result = None;
    }

    /// Score the recorded quiz answers. Without a quiz this is `EmptyQuiz`.
    pub fn score_quiz(&mut self) -> Result<&QuizResult> {
        let quiz = self.quiz().ok_or(StudyError::EmptyQuiz)?;
        let result = evaluate_quiz(quiz, &self.quiz_answers)?;
        Ok(self.quiz_result.insert(result))
    }

    pub fn answer_analytics(&mut self, index: usize, answer: impl Into<String>) {
        self.analytics_answers.insert(index, answer.into());
        self.evaluations.remove(&index);
    }

    pub fn record_evaluation(&mut self, index: usize, evaluation: AnswerEvaluation) {
        self.evaluations.insert(index, evaluation);
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
