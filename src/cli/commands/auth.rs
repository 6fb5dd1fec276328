use anyhow::{Context, Result};
use console::{Emoji, style};
use std::fs;
use std::io::{self, Write};

use crate::config::Config;
use crate::llm::Provider;

static KEY: Emoji<'_, '_> = Emoji("🔑 ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[X] ");
static ROBOT: Emoji<'_, '_> = Emoji("🤖 ", "");

pub async fn run(provider: Option<Provider>, key: Option<String>, list: bool) -> Result<()> {
    println!();
    println!("{}", style(" Learnify - Authentication ").bold().reverse());
    println!();

    if list {
        return list_providers();
    }

    let provider = match provider {
        Some(p) => p,
        None => select_provider()?,
    };

    let api_key = match key {
        Some(k) => k.trim().to_string(),
        None => prompt_api_key(provider)?,
    };
    if api_key.is_empty() {
        anyhow::bail!("API key cannot be empty");
    }

    save_api_key(provider, &api_key)?;

    println!();
    println!(
        "{}API key for {} configured successfully!",
        CHECK,
        style(provider.display_name()).cyan().bold()
    );

    Ok(())
}

fn list_providers() -> Result<()> {
    println!("{}Configured LLM Providers", ROBOT);
    println!();

    let config = match Config::load() {
        Ok(c) => c,
        Err(_) => {
            println!(
                "{}",
                style("No configuration found. Run 'learnify init' first.").yellow()
            );
            return Ok(());
        }
    };

    for provider in Provider::ALL {
        let source = config.api_key_source(provider);
        let (status_icon, status_text) = match source {
            Some(_) => (CHECK, style("Configured").green()),
            None => (CROSS, style("Not configured").red()),
        };

        println!(
            "  {}{:<8} {:<20} {} {}",
            status_icon,
            provider.display_name(),
            style(provider.model_id()).dim(),
            status_text,
            style(source.unwrap_or_default()).dim()
        );
    }

    println!();
    println!("{}Set API keys with:", KEY);
    println!("  {} learnify auth --provider <name>", style("$").dim());
    println!();
    println!("Or set environment variables:");
    for provider in Provider::ALL {
        println!("  {} export {}=your-key", style("$").dim(), provider.env_var());
    }

    Ok(())
}

fn select_provider() -> Result<Provider> {
    println!("Select LLM Provider:");
    println!();
    println!("  {} OpenAI (GPT-4)", style("1.").cyan());
    println!("  {} Groq (Mixtral)", style("2.").cyan());
    println!();

    print!("{} Enter choice [1-2]: ", style("?").green().bold());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    match input.trim() {
        "1" => Ok(Provider::OpenAI),
        "2" => Ok(Provider::Groq),
        _ => {
            println!(
                "  {}",
                style("Invalid choice, defaulting to OpenAI").yellow()
            );
            Ok(Provider::OpenAI)
        }
    }
}

fn prompt_api_key(provider: Provider) -> Result<String> {
    print!(
        "{} Enter your {} API key: ",
        style("?").green().bold(),
        provider.display_name()
    );
    io::stdout().flush()?;

    let mut api_key = String::new();
    io::stdin().read_line(&mut api_key)?;
    let api_key = api_key.trim().to_string();

    let expected_prefix = match provider {
        Provider::OpenAI => "sk-",
        Provider::Groq => "gsk_",
    };
    if !api_key.is_empty() && !api_key.starts_with(expected_prefix) {
        println!(
            "  {}",
            style(format!(
                "Warning: {} API keys typically start with '{}'",
                provider.display_name(),
                expected_prefix
            ))
            .yellow()
        );
    }

    Ok(api_key)
}

fn save_api_key(provider: Provider, api_key: &str) -> Result<()> {
    let config_path = Config::config_path()?;

    if !config_path.exists() {
        anyhow::bail!("Configuration not found. Run 'learnify init' first.");
    }

    let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
    let new_content = set_api_key(&content, provider, api_key);
    fs::write(&config_path, new_content).context("Failed to write config file")?;

    Ok(())
}

/// Rewrite the `api_key` line of the provider's section, leaving every other
/// line (including `${VAR}` references of other providers) as it was.
fn set_api_key(content: &str, provider: Provider, api_key: &str) -> String {
    let section = format!("[providers.{}]", provider.as_str());
    let key_line = format!("api_key = \"{}\"", api_key);

    let mut lines: Vec<String> = content.lines().map(String::from).collect();
    let mut in_section = false;
    let mut section_at = None;
    let mut key_updated = false;

    for (i, line) in lines.iter_mut().enumerate() {
        if line.trim_start().starts_with('[') {
            in_section = line.trim() == section;
            if in_section {
                section_at = Some(i);
            }
        }

        if in_section && line.trim().starts_with("api_key") {
            *line = key_line.clone();
            key_updated = true;
        }
    }

    if !key_updated {
        match section_at {
            Some(i) => lines.insert(i + 1, key_line),
            None => {
                lines.push(String::new());
                lines.push(section);
                lines.push(key_line);
            }
        }
    }

    let mut new_content = lines.join("\n");
    new_content.push('\n');
    new_content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_api_key_replaces_existing_line() {
        let content = "default_provider = \"openai\"\n\n[providers.openai]\napi_key = \"${OPENAI_API_KEY}\"\n\n[providers.groq]\napi_key = \"${GROQ_API_KEY}\"\n";
        let updated = set_api_key(content, Provider::Groq, "gsk_new");

        assert!(updated.contains("[providers.groq]\napi_key = \"gsk_new\""));
        assert!(updated.contains("api_key = \"${OPENAI_API_KEY}\""));

        let config: Config = toml::from_str(&updated).unwrap();
        assert_eq!(config.providers.groq.unwrap().api_key, "gsk_new");
    }

    #[test]
    fn test_set_api_key_inserts_into_section_without_key() {
        let content = "[providers.openai]\nbase_url = \"http://localhost:8080/v1\"\n";
        let updated = set_api_key(content, Provider::OpenAI, "sk-abc");
        let config: Config = toml::from_str(&updated).unwrap();
        let openai = config.providers.openai.unwrap();
        assert_eq!(openai.api_key, "sk-abc");
        assert_eq!(openai.base_url.as_deref(), Some("http://localhost:8080/v1"));
    }

    #[test]
    fn test_set_api_key_appends_missing_section() {
        let content = "default_provider = \"groq\"\n";
        let updated = set_api_key(content, Provider::Groq, "gsk_x");
        let config: Config = toml::from_str(&updated).unwrap();
        assert_eq!(config.default_provider, "groq");
        assert_eq!(config.providers.groq.unwrap().api_key, "gsk_x");
    }
}
