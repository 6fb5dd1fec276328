//! Summary, quiz and analytical question generation.
//!
//! Each generator owns one system prompt and one reply schema. [`generate`]
//! drives any of them through a single request; a reply that does not fit
//! the schema fails the whole call.

use std::sync::LazyLock;

use anyhow::{Result as AnyResult, bail};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info};

use super::{
    AnalyticsQuestion, AnalyticsQuestions, ContentKind, ContentMetadata, GeneratedContent, Quiz,
    QuizOption, QuizQuestion,
};
use crate::error::{Result, StudyError};
use crate::llm::LlmClient;
use crate::llm::parsing::parse_json_reply;
use crate::llm::prompts::{SUMMARY_SYSTEM_PROMPT, analytics_system_prompt, quiz_system_prompt};

const OPTION_LABELS: [&str; 4] = ["A", "B", "C", "D"];

static LABEL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*([A-Da-d])\s*[.):]\s*(.*)$").expect("option label pattern is valid")
});

/// One kind of learning content.
pub trait ContentGenerator {
    type Output;

    const KIND: ContentKind;

    fn system_prompt(&self) -> String;

    /// Turn the raw reply into checked content.
    fn parse(&self, response: &str) -> AnyResult<Self::Output>;

    fn into_content(output: Self::Output, metadata: ContentMetadata) -> GeneratedContent;
}

pub struct SummaryGenerator;

impl ContentGenerator for SummaryGenerator {
    type Output = String;

    const KIND: ContentKind = ContentKind::Summary;

    fn system_prompt(&self) -> String {
        SUMMARY_SYSTEM_PROMPT.to_string()
    }

    fn parse(&self, response: &str) -> AnyResult<String> {
        let summary = response.trim();
        if summary.is_empty() {
            bail!("empty summary");
        }
        Ok(summary.to_string())
    }

    fn into_content(output: String, metadata: ContentMetadata) -> GeneratedContent {
        GeneratedContent::Summary {
            content: output,
            metadata,
        }
    }
}

/// Multiple-choice quiz with a fixed number of questions.
pub struct QuizGenerator {
    pub questions: usize,
}

#[derive(Deserialize)]
struct RawQuiz {
    questions: Vec<RawQuizQuestion>,
}

#[derive(Deserialize)]
struct RawQuizQuestion {
    question: String,
    options: Vec<String>,
    correct_answer: String,
}

impl ContentGenerator for QuizGenerator {
    type Output = Quiz;

    const KIND: ContentKind = ContentKind::Quiz;

    fn system_prompt(&self) -> String {
        quiz_system_prompt(self.questions)
    }

    fn parse(&self, response: &str) -> AnyResult<Quiz> {
        let raw: RawQuiz = parse_json_reply(response)?;
        if raw.questions.len() != self.questions {
            bail!(
                "expected {} questions, got {}",
                self.questions,
                raw.questions.len()
            );
        }

        let questions = raw
            .questions
            .into_iter()
            .enumerate()
            .map(|(i, q)| check_quiz_question(q).map_err(|e| e.context(format!("question {}", i + 1))))
            .collect::<AnyResult<Vec<_>>>()?;

        Ok(Quiz { questions })
    }

    fn into_content(output: Quiz, metadata: ContentMetadata) -> GeneratedContent {
        GeneratedContent::Quiz {
            content: output,
            metadata,
        }
    }
}

fn check_quiz_question(raw: RawQuizQuestion) -> AnyResult<QuizQuestion> {
    let question = raw.question.trim().to_string();
    if question.is_empty() {
        bail!("question text is empty");
    }
    if raw.options.len() != OPTION_LABELS.len() {
        bail!("expected 4 options, got {}", raw.options.len());
    }

    let options = label_options(&raw.options);

    let correct_answer = normalize_correct_answer(&raw.correct_answer, &options)?;

    Ok(QuizQuestion {
        question,
        options,
        correct_answer,
    })
}

/// `["A. Paris", "B. Rome", ..]` loses its prefixes when all four options
/// carry A, B, C and D in order. Any other list keeps its text and is
/// labelled by position.
fn label_options(options: &[String]) -> Vec<QuizOption> {
    let stripped: Option<Vec<QuizOption>> = options
        .iter()
        .zip(OPTION_LABELS)
        .map(|(option, label)| {
            LABEL_PREFIX
                .captures(option)
                .filter(|caps| caps[1].eq_ignore_ascii_case(label))
                .map(|caps| QuizOption {
                    label: label.to_string(),
                    text: caps[2].trim().to_string(),
                })
        })
        .collect();

    stripped.unwrap_or_else(|| {
        options
            .iter()
            .zip(OPTION_LABELS)
            .map(|(option, label)| QuizOption {
                label: label.to_string(),
                text: option.trim().to_string(),
            })
            .collect()
    })
}

fn normalize_correct_answer(answer: &str, options: &[QuizOption]) -> AnyResult<String> {
    let answer = answer.trim();
    let bare_letter = answer.chars().count() == 1;

    let by_text = || {
        options
            .iter()
            .find(|o| o.text.eq_ignore_ascii_case(answer))
            .map(|o| o.label.clone())
    };
    let by_label = || {
        let label = if bare_letter {
            answer.to_ascii_uppercase()
        } else {
            LABEL_PREFIX.captures(answer)?[1].to_ascii_uppercase()
        };
        options.iter().any(|o| o.label == label).then_some(label)
    };

    // A bare letter names a label; anything longer is more likely option text
    let label = if bare_letter {
        by_label().or_else(by_text)
    } else {
        by_text().or_else(by_label)
    };

    match label {
        Some(label) => Ok(label),
        None => bail!("correct answer '{}' is not one of the options", answer),
    }
}

/// Open-ended questions, each with grading criteria.
pub struct AnalyticsGenerator {
    pub questions: usize,
}

#[derive(Deserialize)]
struct RawAnalytics {
    questions: Vec<RawAnalyticsQuestion>,
}

#[derive(Deserialize)]
struct RawAnalyticsQuestion {
    question: String,
    evaluation_criteria: Vec<String>,
}

impl ContentGenerator for AnalyticsGenerator {
    type Output = AnalyticsQuestions;

    const KIND: ContentKind = ContentKind::AnalyticsQuestions;

    fn system_prompt(&self) -> String {
        analytics_system_prompt(self.questions)
    }

    fn parse(&self, response: &str) -> AnyResult<AnalyticsQuestions> {
        let raw: RawAnalytics = parse_json_reply(response)?;
        if raw.questions.len() != self.questions {
            bail!(
                "expected {} questions, got {}",
                self.questions,
                raw.questions.len()
            );
        }

        let mut questions = Vec::with_capacity(raw.questions.len());
        for (i, q) in raw.questions.into_iter().enumerate() {
            let question = q.question.trim().to_string();
            if question.is_empty() {
                bail!("question {}: question text is empty", i + 1);
            }
            let evaluation_criteria: Vec<String> = q
                .evaluation_criteria
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
            if evaluation_criteria.is_empty() {
                bail!("question {}: no evaluation criteria", i + 1);
            }
            questions.push(AnalyticsQuestion {
                question,
                evaluation_criteria,
            });
        }

        Ok(AnalyticsQuestions { questions })
    }

    fn into_content(output: AnalyticsQuestions, metadata: ContentMetadata) -> GeneratedContent {
        GeneratedContent::AnalyticsQuestions {
            content: output,
            metadata,
        }
    }
}

/// Run `generator` over `text` with one request to `client`.
pub async fn generate<G: ContentGenerator>(
    client: &LlmClient,
    generator: &G,
    text: &str,
) -> Result<GeneratedContent> {
    if text.trim().is_empty() {
        return Err(StudyError::EmptyInput);
    }

    info!("Generating {} with {}", G::KIND, client.provider());
    let reply = client
        .complete(&generator.system_prompt(), text)
        .await
        .map_err(|e| StudyError::generation(G::KIND.to_string(), format!("{e:#}")))?;

    let output = generator
        .parse(&reply)
        .map_err(|e| StudyError::generation(G::KIND.to_string(), format!("{e:#}")))?;
    debug!("Parsed {} reply ({} chars)", G::KIND, reply.len());

    Ok(G::into_content(output, ContentMetadata::new(client.provider())))
}
