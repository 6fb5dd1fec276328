mod cli;
mod config;
mod error;
mod llm;
mod parser;
mod study;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::commands::generate::Selection;
use crate::cli::commands::study::StudyArgs;
use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing - only show warnings by default, use RUST_LOG=info for more detail
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            cli::commands::init::run(force).await?;
        }
        Commands::Auth {
            provider,
            key,
            list,
        } => {
            cli::commands::auth::run(provider, key, list).await?;
        }
        Commands::Doctor => {
            cli::commands::doctor::run().await?;
        }
        Commands::Stats { file, json } => {
            cli::commands::stats::run(&file, json).await?;
        }
        Commands::Extract {
            file,
            pages,
            output,
        } => {
            cli::commands::extract::run(&file, &pages, output).await?;
        }
        Commands::Generate {
            file,
            pages,
            summary,
            quiz,
            analytics,
            provider,
            questions,
            output,
        } => {
            let selection = Selection {
                summary,
                quiz,
                analytics,
            };
            cli::commands::generate::run(&file, &pages, selection, provider, questions, output)
                .await?;
        }
        Commands::Study {
            file,
            pages,
            session,
            provider,
            questions,
            output,
        } => {
            cli::commands::study::run(StudyArgs {
                file,
                pages,
                session,
                provider,
                questions,
                output,
            })
            .await?;
        }
    }

    Ok(())
}
