use anyhow::{Context, Result};
use console::{Emoji, style};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use super::generate::{
    Selection, generate_selected, prepare, print_content, questions_per_set, resolve_provider,
    save_session,
};
use crate::cli::spinner;
use crate::config::Config;
use crate::llm::{LlmClient, Provider};
use crate::study::{AnswerEvaluation, ContentKind, QuizResult, Session, evaluate_answer};

static QUESTION: Emoji<'_, '_> = Emoji("❓ ", "");
static BULB: Emoji<'_, '_> = Emoji("💡 ", "");
static TROPHY: Emoji<'_, '_> = Emoji("🏆 ", "");
static SCALE: Emoji<'_, '_> = Emoji("⚖️  ", "");
static PASS: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static FAIL: Emoji<'_, '_> = Emoji("❌ ", "[X] ");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

pub struct StudyArgs {
    pub file: Option<PathBuf>,
    pub pages: Option<String>,
    pub session: Option<PathBuf>,
    pub provider: Option<Provider>,
    pub questions: Option<usize>,
    pub output: Option<PathBuf>,
}

pub async fn run(args: StudyArgs) -> Result<()> {
    println!();
    println!("{}", style(" Learnify - Study ").bold().reverse());
    println!();

    let config = Config::load_or_default()?;

    let mut session = match args.session {
        Some(ref path) => {
            let session = load_session(path)?;
            println!(
                "{}Resuming {} pages {}",
                QUESTION,
                style(&session.file_name).cyan().bold(),
                style(&session.page_spec).yellow()
            );
            session
        }
        None => {
            let (Some(file), Some(pages)) = (args.file.as_deref(), args.pages.as_deref()) else {
                anyhow::bail!("A PDF file and --pages are required without --session");
            };
            let provider = resolve_provider(args.provider, &config)?;
            let questions = questions_per_set(args.questions, &config)?;

            let (text, mut session) = prepare(file, pages, provider)?;
            let client = LlmClient::new(provider, &config)?;
            generate_selected(&client, &mut session, &text, Selection::ALL, questions).await?;
            session
        }
    };

    if let Some(content) = session.content(ContentKind::Summary) {
        print_content(content);
    }

    let mut input = io::stdin().lock();

    if session.quiz().is_some() {
        take_quiz(&mut session, &mut input)?;
    }

    if session.analytics_questions().is_some() {
        let provider = args.provider.unwrap_or(session.provider);
        let client = LlmClient::new(provider, &config)?;
        answer_analytics(&client, &mut session, &mut input).await?;
    }

    if let Some(path) = args.output {
        save_session(&session, &path)?;
    }

    Ok(())
}

fn load_session(path: &Path) -> Result<Session> {
    let json =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Session::from_json(&json).with_context(|| format!("Invalid session file {}", path.display()))
}

fn take_quiz(session: &mut Session, input: &mut impl BufRead) -> Result<()> {
    let Some(quiz) = session.quiz().cloned() else {
        return Ok(());
    };

    println!();
    println!("{}{}", QUESTION, style("Quiz").bold().underlined());

    for (i, question) in quiz.questions.iter().enumerate() {
        println!();
        println!("  {} {}", style(format!("{}.", i + 1)).cyan().bold(), question.question);
        for option in &question.options {
            println!("     {}", option);
        }

        let Some(answer) = prompt_line("Your answer (A-D, Enter to skip)", input)? else {
            break;
        };
        let answer = answer.trim().to_ascii_uppercase();
        if !answer.is_empty() {
            session.answer_quiz(i, answer);
        }
    }

    let result = session.score_quiz()?.clone();
    print_quiz_result(&result, session);
    Ok(())
}

fn print_quiz_result(result: &QuizResult, session: &Session) {
    println!();
    println!("{}Quiz Results", TROPHY);
    println!();

    let quiz = session.quiz();
    for outcome in &result.outcomes {
        let icon = if outcome.is_correct { PASS } else { FAIL };
        let given = outcome.given.as_deref().unwrap_or("-");
        let correct_text = quiz
            .and_then(|q| q.questions.get(outcome.index))
            .and_then(|q| q.option(&outcome.correct_answer))
            .map(|o| o.to_string())
            .unwrap_or_else(|| outcome.correct_answer.clone());

        if outcome.is_correct {
            println!("  {}{}. {}", icon, outcome.index + 1, style(given).green());
        } else {
            println!(
                "  {}{}. {} {} {}",
                icon,
                outcome.index + 1,
                style(given).red(),
                style("→").dim(),
                style(correct_text).green()
            );
        }
    }

    println!();
    println!(
        "  Score: {}/{} ({})",
        style(result.correct_answers).bold(),
        result.total_questions,
        style(format!("{:.1}%", result.percentage)).cyan().bold()
    );
}

async fn answer_analytics(
    client: &LlmClient,
    session: &mut Session,
    input: &mut impl BufRead,
) -> Result<()> {
    let Some(questions) = session.analytics_questions().cloned() else {
        return Ok(());
    };

    println!();
    println!("{}{}", BULB, style("Analytical Questions").bold().underlined());

    for (i, question) in questions.questions.iter().enumerate() {
        println!();
        println!("  {} {}", style(format!("{}.", i + 1)).cyan().bold(), question.question);
        println!(
            "     {} {}",
            style("Criteria:").dim(),
            question.evaluation_criteria.join(", ")
        );

        let Some(answer) = prompt_paragraph(input)? else {
            break;
        };
        if answer.is_empty() {
            continue;
        }
        session.answer_analytics(i, answer.clone());

        let spinner = spinner(SCALE, "Evaluating answer...");
        let evaluation =
            evaluate_answer(client, &question.question, &question.evaluation_criteria, &answer)
                .await;
        spinner.finish_and_clear();

        match evaluation {
            Ok(evaluation) => {
                print_evaluation(&evaluation);
                session.record_evaluation(i, evaluation);
            }
            Err(e) => {
                tracing::warn!("Evaluation of answer {} failed: {}", i + 1, e);
                println!("  {}{}", WARN, style(e).yellow());
            }
        }
    }

    Ok(())
}

fn print_evaluation(evaluation: &AnswerEvaluation) {
    let score = match evaluation.score {
        80..=100 => style(format!("{}/100", evaluation.score)).green().bold(),
        50..=79 => style(format!("{}/100", evaluation.score)).yellow().bold(),
        _ => style(format!("{}/100", evaluation.score)).red().bold(),
    };

    println!();
    println!("  {}Score: {}", SCALE, score);
    println!();
    println!("  {}", style("Feedback").bold());
    println!("  {}", evaluation.feedback);
    if !evaluation.suggestions.is_empty() {
        println!();
        println!("  {}", style("Suggestions").bold());
        for suggestion in &evaluation.suggestions {
            println!("  {} {}", style("•").cyan(), suggestion);
        }
    }
    println!();
    println!("  {}", style("Model answer").bold());
    println!("  {}", style(&evaluation.model_answer).dim());
}

/// One line of input, or `None` at end of input.
fn prompt_line(prompt: &str, input: &mut impl BufRead) -> Result<Option<String>> {
    print!("  {} {}: ", style("?").green().bold(), prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        println!();
        return Ok(None);
    }
    Ok(Some(line))
}

/// Lines up to the first blank one, joined. `None` at end of input with
/// nothing typed.
fn prompt_paragraph(input: &mut impl BufRead) -> Result<Option<String>> {
    println!(
        "  {} {}",
        style("?").green().bold(),
        style("Your answer (finish with an empty line, empty to skip):").dim()
    );
    io::stdout().flush()?;

    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            if lines.is_empty() {
                return Ok(None);
            }
            break;
        }
        let line = line.trim_end();
        if line.trim().is_empty() {
            break;
        }
        lines.push(line.to_string());
    }

    Ok(Some(lines.join("\n").trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedBackend;
    use crate::study::{
        AnalyticsQuestion, AnalyticsQuestions, ContentMetadata, GeneratedContent, Quiz,
        QuizOption, QuizQuestion,
    };

    fn session_with_quiz(key: &[&str]) -> Session {
        let mut session = Session::new("notes.pdf", "1", Provider::OpenAI);
        session.record(GeneratedContent::Quiz {
            content: Quiz {
                questions: key
                    .iter()
                    .map(|correct| QuizQuestion {
                        question: "Q?".into(),
                        options: ["A", "B", "C", "D"]
                            .iter()
                            .map(|l| QuizOption {
                                label: l.to_string(),
                                text: format!("opt {l}"),
                            })
                            .collect(),
                        correct_answer: correct.to_string(),
                    })
                    .collect(),
            },
            metadata: ContentMetadata::new(Provider::OpenAI),
        });
        session
    }

    #[test]
    fn test_take_quiz_reads_answers() {
        let mut session = session_with_quiz(&["A", "B", "C"]);
        let mut input = io::Cursor::new("a\n\nc\n");

        take_quiz(&mut session, &mut input).unwrap();

        assert_eq!(session.quiz_answers.get(&0).map(String::as_str), Some("A"));
        assert!(!session.quiz_answers.contains_key(&1));
        let result = session.quiz_result.as_ref().unwrap();
        assert_eq!(result.correct_answers, 2);
        assert_eq!(result.total_questions, 3);
    }

    #[test]
    fn test_take_quiz_stops_at_end_of_input() {
        let mut session = session_with_quiz(&["A", "B"]);
        let mut input = io::Cursor::new("B\n");

        take_quiz(&mut session, &mut input).unwrap();
        let result = session.quiz_result.as_ref().unwrap();
        assert_eq!(result.correct_answers, 0);
        assert_eq!(result.outcomes[1].given, None);
    }

    #[test]
    fn test_prompt_paragraph_joins_lines() {
        let mut input = io::Cursor::new("first line\nsecond line\n\nnext answer\n");
        assert_eq!(
            prompt_paragraph(&mut input).unwrap().as_deref(),
            Some("first line\nsecond line")
        );
        assert_eq!(prompt_paragraph(&mut input).unwrap().as_deref(), Some("next answer"));
        assert_eq!(prompt_paragraph(&mut input).unwrap(), None);
    }

    #[tokio::test]
    async fn test_answer_analytics_skips_blank_answers() {
        let mut session = Session::new("notes.pdf", "1", Provider::Groq);
        session.record(GeneratedContent::AnalyticsQuestions {
            content: AnalyticsQuestions {
                questions: vec![
                    AnalyticsQuestion {
                        question: "Why?".into(),
                        evaluation_criteria: vec!["depth".into()],
                    },
                    AnalyticsQuestion {
                        question: "How?".into(),
                        evaluation_criteria: vec!["clarity".into()],
                    },
                ],
            },
            metadata: ContentMetadata::new(Provider::Groq),
        });

        let reply = r#"{"score": 70, "feedback": "ok", "suggestions": [], "model_answer": "m"}"#;
        let backend = ScriptedBackend::replying(&[reply]);
        let client = backend.client(Provider::Groq);
        let mut input = io::Cursor::new("\nBecause of clarity.\n\n");

        answer_analytics(&client, &mut session, &mut input).await.unwrap();

        assert_eq!(backend.request_count(), 1);
        assert!(!session.evaluations.contains_key(&0));
        assert_eq!(session.evaluations[&1].score, 70);
        assert_eq!(session.analytics_answers[&1], "Because of clarity.");
    }
}
