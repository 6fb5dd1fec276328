use anyhow::{Context, Result};
use console::{Emoji, style};
use std::fs;

use crate::cli::spinner;
use crate::config::{Config, ProviderConfig, ProvidersConfig};

static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "");
static GEAR: Emoji<'_, '_> = Emoji("⚙️  ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
static KEY: Emoji<'_, '_> = Emoji("🔑 ", "");
static BOOK: Emoji<'_, '_> = Emoji("📚 ", "");

pub async fn run(force: bool) -> Result<()> {
    println!();
    println!("{}", style(" Learnify - Initialization ").bold().reverse());
    println!();

    let config_dir = Config::config_dir()?;
    let config_path = config_dir.join("config.toml");

    if config_path.exists() && !force {
        println!(
            "{}Configuration already exists at {}",
            WARN,
            style(config_path.display()).cyan()
        );
        println!("  Use {} to overwrite", style("--force").yellow());
        return Ok(());
    }

    fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

    let spinner = spinner(GEAR, "Creating configuration...");

    let default_config = Config {
        providers: ProvidersConfig {
            openai: Some(ProviderConfig {
                api_key: "${OPENAI_API_KEY}".to_string(),
                base_url: None,
            }),
            groq: Some(ProviderConfig {
                api_key: "${GROQ_API_KEY}".to_string(),
                base_url: None,
            }),
        },
        ..Config::default()
    };

    let config_content = toml::to_string_pretty(&default_config)?;
    fs::write(&config_path, config_content).context("Failed to write config file")?;
    spinner.finish_and_clear();

    println!(
        "{}Created configuration at {}",
        CHECK,
        style(config_path.display()).cyan()
    );

    println!();
    println!("{}", style("━".repeat(50)).dim());
    println!();
    println!("{}Next steps:", ROCKET);
    println!();
    println!("  {}Configure your LLM provider:", KEY);
    println!("    {} learnify auth", style("$").dim());
    println!();
    println!("  {}Study your first document:", BOOK);
    println!(
        "    {} learnify study ./notes.pdf --pages 1-3",
        style("$").dim()
    );
    println!();

    Ok(())
}
