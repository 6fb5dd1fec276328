pub mod commands;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};

use crate::llm::Provider;

#[derive(Parser)]
#[command(name = "learnify")]
#[command(author = "Learnify Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Turn PDF pages into summaries, quizzes and analytical questions using LLMs", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long, default_value = "false")]
        force: bool,
    },

    /// Configure API keys for LLM providers
    #[command(long_about = "Configure API keys for LLM providers.\n\n\
        Supported providers: openai (gpt-4) and groq (mixtral-8x7b-32768).\n\
        Keys stored in the config file take precedence over the\n\
        OPENAI_API_KEY and GROQ_API_KEY environment variables.\n\n\
        Both providers accept a custom base_url in ~/.config/learnify/config.toml,\n\
        so either can be pointed at an OpenAI-compatible proxy or gateway.")]
    Auth {
        /// Provider to configure (openai, groq)
        #[arg(short, long)]
        provider: Option<Provider>,

        /// Set API key directly (alternative to interactive prompt)
        #[arg(short, long)]
        key: Option<String>,

        /// List configured providers and their status
        #[arg(long, default_value = "false")]
        list: bool,
    },

    /// Check configuration and credentials
    Doctor,

    /// Show page, image, text block, line and word counts of a PDF
    Stats {
        /// PDF file to analyze
        file: PathBuf,

        /// Print the statistics as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Print the text of selected pages
    Extract {
        /// PDF file to read
        file: PathBuf,

        /// Pages to extract, 1-indexed (e.g. "1-3,5")
        #[arg(short, long)]
        pages: String,

        /// Write the text to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a summary, quiz or analytical questions from selected pages
    Generate {
        /// PDF file to read
        file: PathBuf,

        /// Pages to use, 1-indexed (e.g. "1-3,5")
        #[arg(short, long)]
        pages: String,

        /// Generate a summary (the default when nothing is selected)
        #[arg(long, default_value = "false")]
        summary: bool,

        /// Generate a multiple-choice quiz
        #[arg(long, default_value = "false")]
        quiz: bool,

        /// Generate open-ended analytical questions
        #[arg(long, default_value = "false")]
        analytics: bool,

        /// LLM provider (openai, groq)
        #[arg(long, env = "LEARNIFY_PROVIDER")]
        provider: Option<Provider>,

        /// Questions per quiz or analytical set (overrides config)
        #[arg(short = 'n', long)]
        questions: Option<usize>,

        /// Save the session as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate content, then answer the quiz and analytical questions interactively
    Study {
        /// PDF file to read
        #[arg(required_unless_present = "session")]
        file: Option<PathBuf>,

        /// Pages to use, 1-indexed (e.g. "1-3,5")
        #[arg(short, long, required_unless_present = "session")]
        pages: Option<String>,

        /// Answer questions from a session saved by `generate --output`
        #[arg(long, conflicts_with_all = ["file", "pages"])]
        session: Option<PathBuf>,

        /// LLM provider (openai, groq)
        #[arg(long, env = "LEARNIFY_PROVIDER")]
        provider: Option<Provider>,

        /// Questions per quiz or analytical set (overrides config)
        #[arg(short = 'n', long)]
        questions: Option<usize>,

        /// Save the finished session as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Read a document and the name to show for it.
pub(crate) fn read_document(path: &Path) -> Result<(Vec<u8>, String)> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((bytes, name))
}

pub(crate) fn spinner(emoji: Emoji<'_, '_>, message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template(&format!("{}{{spinner:.green}} {{msg}}", emoji))
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message.into());
    spinner
}
