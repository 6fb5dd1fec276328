use anyhow::{Context, Result};
use console::{Emoji, style};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::{read_document, spinner};
use crate::config::Config;
use crate::llm::{LlmClient, Provider};
use crate::parser::{extract_pages, parse_page_spec};
use crate::study::{
    AnalyticsGenerator, AnalyticsQuestions, ContentGenerator, ContentKind, GeneratedContent,
    QuizGenerator, Session, SummaryGenerator, generate,
};

static BRAIN: Emoji<'_, '_> = Emoji("🧠 ", "");
static BOOK: Emoji<'_, '_> = Emoji("📖 ", "");
static QUESTION: Emoji<'_, '_> = Emoji("❓ ", "");
static BULB: Emoji<'_, '_> = Emoji("💡 ", "");
static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");

/// Which content kinds to produce, in generation order.
#[derive(Debug, Clone, Copy)]
pub struct Selection {
    pub summary: bool,
    pub quiz: bool,
    pub analytics: bool,
}

impl Selection {
    pub const ALL: Selection = Selection {
        summary: true,
        quiz: true,
        analytics: true,
    };

    /// Summary alone when nothing was asked for.
    pub fn or_summary(self) -> Self {
        if self.summary || self.quiz || self.analytics {
            self
        } else {
            Selection {
                summary: true,
                ..self
            }
        }
    }
}

pub async fn run(
    file: &Path,
    pages: &str,
    selection: Selection,
    provider: Option<Provider>,
    questions: Option<usize>,
    output: Option<PathBuf>,
) -> Result<()> {
    println!();
    println!("{}", style(" Learnify - Generate ").bold().reverse());
    println!();

    let config = Config::load_or_default()?;
    let provider = resolve_provider(provider, &config)?;
    let questions = questions_per_set(questions, &config)?;

    let (text, mut session) = prepare(file, pages, provider)?;
    let client = LlmClient::new(provider, &config)?;

    generate_selected(&client, &mut session, &text, selection.or_summary(), questions).await?;

    for content in &session.contents {
        print_content(content);
    }

    if let Some(path) = output {
        save_session(&session, &path)?;
    }

    Ok(())
}

pub(crate) fn resolve_provider(provider: Option<Provider>, config: &Config) -> Result<Provider> {
    match provider {
        Some(p) => Ok(p),
        None => Ok(config
            .default_provider()
            .context("Invalid default_provider in configuration")?),
    }
}

pub(crate) fn questions_per_set(questions: Option<usize>, config: &Config) -> Result<usize> {
    let count = questions.unwrap_or(config.questions_per_set);
    if count == 0 {
        anyhow::bail!("Number of questions must be at least 1");
    }
    Ok(count)
}

/// Extract the selected pages and open a session for them.
pub(crate) fn prepare(file: &Path, pages: &str, provider: Provider) -> Result<(String, Session)> {
    let (bytes, name) = read_document(file)?;
    let selection = parse_page_spec(pages)?;

    let text = extract_pages(&bytes, &selection)
        .with_context(|| format!("Failed to extract pages '{}' from {}", pages, name))?;
    tracing::info!(
        "Extracted {} chars from {} page(s) of {}",
        text.len(),
        selection.len(),
        name
    );

    println!(
        "{}{} pages {} with {} ({})",
        BOOK,
        style(&name).cyan().bold(),
        style(&selection).yellow(),
        provider.display_name(),
        style(provider.model_id()).dim()
    );
    println!();

    Ok((text, Session::new(name, selection.to_string(), provider)))
}

/// Generate each selected kind in turn, recording it in the session.
pub(crate) async fn generate_selected(
    client: &LlmClient,
    session: &mut Session,
    text: &str,
    selection: Selection,
    questions: usize,
) -> Result<()> {
    if selection.summary {
        generate_one(client, session, &SummaryGenerator, text).await?;
    }
    if selection.quiz {
        generate_one(client, session, &QuizGenerator { questions }, text).await?;
    }
    if selection.analytics {
        generate_one(client, session, &AnalyticsGenerator { questions }, text).await?;
    }
    Ok(())
}

async fn generate_one<G: ContentGenerator>(
    client: &LlmClient,
    session: &mut Session,
    generator: &G,
    text: &str,
) -> Result<()> {
    let spinner = spinner(BRAIN, format!("Generating {}...", G::KIND));
    let content = generate(client, generator, text).await;
    spinner.finish_and_clear();

    session.record(content?);
    println!("{}Generated {}", CHECK, G::KIND);
    Ok(())
}

pub(crate) fn print_content(content: &GeneratedContent) {
    println!();
    match content {
        GeneratedContent::Summary { content, .. } => {
            println!("{}{}", BOOK, style("Summary").bold().underlined());
            println!();
            println!("{}", content);
        }
        GeneratedContent::Quiz { content, .. } => {
            println!("{}{}", QUESTION, style("Quiz").bold().underlined());
            for (i, question) in content.questions.iter().enumerate() {
                println!();
                println!("  {} {}", style(format!("{}.", i + 1)).cyan().bold(), question.question);
                for option in &question.options {
                    println!("     {}", option);
                }
                println!(
                    "     {} {}",
                    style("Answer:").dim(),
                    style(&question.correct_answer).green()
                );
            }
        }
        GeneratedContent::AnalyticsQuestions { content, .. } => {
            println!("{}{}", BULB, style("Analytical Questions").bold().underlined());
            print_analytics(content);
        }
    }

    let metadata = content.metadata();
    println!();
    println!(
        "  {}",
        style(format!(
            "Generated using {} ({}) at {}",
            metadata.provider.display_name(),
            metadata.model,
            metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ))
        .dim()
    );
    if content.kind() == ContentKind::Summary {
        println!();
    }
}

pub(crate) fn print_analytics(questions: &AnalyticsQuestions) {
    for (i, question) in questions.questions.iter().enumerate() {
        println!();
        println!("  {} {}", style(format!("{}.", i + 1)).cyan().bold(), question.question);
        println!(
            "     {} {}",
            style("Criteria:").dim(),
            question.evaluation_criteria.join(", ")
        );
    }
}

pub(crate) fn save_session(session: &Session, path: &Path) -> Result<()> {
    let json = session.to_json().context("Failed to serialize session")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    println!();
    println!(
        "{}Saved session to {}",
        SAVE,
        style(path.display()).cyan()
    );
    Ok(())
}
