//! Scoring of quiz answers and grading of analytical answers.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Quiz, UserAnswers};
use crate::error::{Result, StudyError};
use crate::llm::LlmClient;
use crate::llm::parsing::parse_json_reply;
use crate::llm::prompts::{evaluation_system_prompt, evaluation_user_prompt};

/// Score of a whole quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub total_questions: usize,
    pub correct_answers: usize,
    pub percentage: f64,
    pub user_answers: UserAnswers,
    pub outcomes: Vec<AnswerOutcome>,
}

/// How one quiz question was answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub index: usize,
    pub given: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// Grade of one analytical answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEvaluation {
    pub score: u8,
    pub feedback: String,
    pub suggestions: Vec<String>,
    pub model_answer: String,
}

#[derive(Deserialize)]
struct RawEvaluation {
    score: f64,
    feedback: String,
    #[serde(default)]
    suggestions: Vec<String>,
    model_answer: String,
}

/// Compare `answers` against the quiz key.
///
/// Labels are compared exactly; an unanswered question counts as wrong.
/// Answers for positions the quiz does not have are kept in
/// `user_answers` but not scored.
pub fn evaluate_quiz(quiz: &Quiz, answers: &UserAnswers) -> Result<QuizResult> {
    if quiz.questions.is_empty() {
        return Err(StudyError::EmptyQuiz);
    }

    let outcomes: Vec<AnswerOutcome> = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let given = answers.get(&index).cloned();
            let is_correct = given.as_deref() == Some(question.correct_answer.as_str());
            AnswerOutcome {
                index,
                given,
                correct_answer: question.correct_answer.clone(),
                is_correct,
            }
        })
        .collect();

    let total_questions = outcomes.len();
    let correct_answers = outcomes.iter().filter(|o| o.is_correct).count();
    let percentage = correct_answers as f64 / total_questions as f64 * 100.0;

    debug!(
        "Quiz scored {}/{} ({:.1}%)",
        correct_answers, total_questions, percentage
    );

    Ok(QuizResult {
        total_questions,
        correct_answers,
        percentage,
        user_answers: answers.clone(),
        outcomes,
    })
}

/// Grade one free-text answer against its criteria with a single request.
pub async fn evaluate_answer(
    client: &LlmClient,
    question: &str,
    criteria: &[String],
    answer: &str,
) -> Result<AnswerEvaluation> {
    if answer.trim().is_empty() {
        return Err(StudyError::EmptyInput);
    }

    info!("Evaluating answer with {}", client.provider());
    let reply = client
        .complete(
            &evaluation_system_prompt(criteria),
            &evaluation_user_prompt(question, answer),
        )
        .await
        .map_err(|e| StudyError::generation("evaluation", format!("{e:#}")))?;

    let raw: RawEvaluation =
        parse_json_reply(&reply).map_err(|e| StudyError::generation("evaluation", format!("{e:#}")))?;

    if !raw.score.is_finite() || !(0.0..=100.0).contains(&raw.score) {
        return Err(StudyError::generation(
            "evaluation",
            format!("score {} is outside 0-100", raw.score),
        ));
    }

    Ok(AnswerEvaluation {
        score: raw.score.round() as u8,
        feedback: raw.feedback.trim().to_string(),
        suggestions: raw
            .suggestions
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        model_answer: raw.model_answer.trim().to_string(),
    })
}
