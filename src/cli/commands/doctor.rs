use anyhow::Result;
use console::{Emoji, style};
use std::time::Duration;

use crate::config::Config;
use crate::llm::Provider;

static DOCTOR: Emoji<'_, '_> = Emoji("🩺 ", "");
static PASS: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static FAIL: Emoji<'_, '_> = Emoji("❌ ", "[!!] ");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[i] ");
static ARROW: Emoji<'_, '_> = Emoji("   → ", "  -> ");

#[derive(Default)]
struct Tally {
    pass: u32,
    fail: u32,
    warn: u32,
}

pub async fn run() -> Result<()> {
    println!();
    println!("{}", style(" Learnify Doctor ").bold().reverse());
    println!();
    println!("{}Running diagnostics...", DOCTOR);
    println!();

    let mut tally = Tally::default();

    // ── 1. Binary version ────────────────────────────────────────────
    print_section("Binary");
    pass(
        &format!("learnify {}", env!("CARGO_PKG_VERSION")),
        &mut tally,
    );

    // ── 2. Config file ───────────────────────────────────────────────
    print_section("Configuration");

    let config_path = Config::config_path().ok();

    let config = match config_path {
        Some(ref path) if path.exists() => {
            pass(
                &format!("Config found at {}", style(path.display()).dim()),
                &mut tally,
            );
            match Config::load() {
                Ok(c) => {
                    pass(
                        &format!("Config is valid TOML (provider: {})", c.default_provider),
                        &mut tally,
                    );
                    Some(c)
                }
                Err(e) => {
                    fail(&format!("Config parse error: {:#}", e), &mut tally);
                    hint("Run: learnify init --force");
                    None
                }
            }
        }
        Some(_) => {
            warn("Config file not found, using defaults", &mut tally);
            hint("Run: learnify init");
            Some(Config::default())
        }
        None => {
            fail("Cannot determine config directory", &mut tally);
            None
        }
    };

    // ── 3. Study settings ────────────────────────────────────────────
    if let Some(ref config) = config {
        print_section("Study settings");

        match config.default_provider() {
            Ok(provider) => pass(
                &format!(
                    "Default provider: {} ({})",
                    provider.display_name(),
                    provider.model_id()
                ),
                &mut tally,
            ),
            Err(e) => {
                fail(&e.to_string(), &mut tally);
                hint("Set default_provider to \"openai\" or \"groq\"");
            }
        }

        info(&format!("Questions per set: {}", config.questions_per_set));
        match config.request_timeout_secs {
            Some(secs) => info(&format!("Request timeout: {}s", secs)),
            None => info("Request timeout: transport default"),
        }
    }

    // ── 4. LLM Providers ─────────────────────────────────────────────
    print_section("LLM Providers");

    if let Some(ref config) = config {
        let default_provider = config.default_provider().ok();

        for provider in Provider::ALL {
            let is_default = default_provider == Some(provider);
            match config.api_key(provider) {
                Some(key) => {
                    let source = config.api_key_source(provider).unwrap_or_default();
                    pass(
                        &format!(
                            "{} API key configured {}",
                            provider.display_name(),
                            style(source).dim()
                        ),
                        &mut tally,
                    );

                    let base_url = config
                        .get_provider(provider)
                        .and_then(|p| p.base_url.as_deref())
                        .unwrap_or(provider.default_base_url());
                    match check_models_endpoint(base_url, &key).await {
                        Ok(200) => pass(
                            &format!("{} API reachable at {}", provider.display_name(), base_url),
                            &mut tally,
                        ),
                        Ok(401) | Ok(403) => {
                            fail(
                                &format!("{} rejected the API key", provider.display_name()),
                                &mut tally,
                            );
                            hint(&format!(
                                "Run: learnify auth --provider {}",
                                provider.as_str()
                            ));
                        }
                        Ok(status) => warn(
                            &format!(
                                "{} responded with status {} at {}",
                                provider.display_name(),
                                status,
                                base_url
                            ),
                            &mut tally,
                        ),
                        Err(_) => warn(
                            &format!("{} not reachable at {}", provider.display_name(), base_url),
                            &mut tally,
                        ),
                    }
                }
                None if is_default => {
                    fail(
                        &format!(
                            "{} is the default provider but has no API key",
                            provider.display_name()
                        ),
                        &mut tally,
                    );
                    hint(&format!(
                        "Set {} or run: learnify auth --provider {}",
                        provider.env_var(),
                        provider.as_str()
                    ));
                }
                None => {
                    // Only the active provider needs a key
                    info(&format!(
                        "{} not configured (set {} or run learnify auth)",
                        provider.display_name(),
                        provider.env_var()
                    ));
                }
            }
        }
    } else {
        warn("Skipping provider checks (no config)", &mut tally);
    }

    // ── 5. System info ───────────────────────────────────────────────
    print_section("System");

    info(&format!(
        "OS: {} {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    ));

    if let Ok(cwd) = std::env::current_dir() {
        info(&format!("Working directory: {}", cwd.display()));
    }

    if let Some(ref path) = config_path {
        info(&format!("Config path: {}", path.display()));
    }

    // ── Summary ──────────────────────────────────────────────────────
    println!();
    println!("{}", style("━".repeat(50)).dim());
    println!();

    let total = tally.pass + tally.fail + tally.warn;
    print!(
        "  {} {} passed",
        style(tally.pass).green().bold(),
        if tally.pass == 1 { "check" } else { "checks" }
    );
    if tally.warn > 0 {
        print!(
            ", {} {}",
            style(tally.warn).yellow().bold(),
            if tally.warn == 1 { "warning" } else { "warnings" }
        );
    }
    if tally.fail > 0 {
        print!(
            ", {} {}",
            style(tally.fail).red().bold(),
            if tally.fail == 1 { "failure" } else { "failures" }
        );
    }
    println!(" ({}  total)", total);
    println!();

    if tally.fail > 0 {
        println!(
            "  {}",
            style("Some checks failed. Fix the issues above and re-run:").red()
        );
        println!("    {} learnify doctor", style("$").dim());
    } else if tally.warn > 0 {
        println!(
            "  {}",
            style("Everything essential works, but there are some warnings.").yellow()
        );
    } else {
        println!(
            "  {}",
            style("All checks passed! You're ready to study.")
                .green()
                .bold()
        );
    }
    println!();

    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────────

fn print_section(name: &str) {
    println!("  {}", style(name).bold().underlined());
}

fn pass(msg: &str, tally: &mut Tally) {
    println!("  {}{}", PASS, msg);
    tally.pass += 1;
}

fn fail(msg: &str, tally: &mut Tally) {
    println!("  {}{}", FAIL, style(msg).red());
    tally.fail += 1;
}

fn warn(msg: &str, tally: &mut Tally) {
    println!("  {}{}", WARN, style(msg).yellow());
    tally.warn += 1;
}

fn info(msg: &str) {
    println!("  {}{}", INFO, style(msg).dim());
}

fn hint(msg: &str) {
    println!("{}{}", ARROW, style(msg).dim());
}

/// Status of `GET {base_url}/models`, which both providers serve.
async fn check_models_endpoint(base_url: &str, api_key: &str) -> Result<u16, ()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .map_err(|_| ())?;

    client
        .get(format!("{}/models", base_url.trim_end_matches('/')))
        .bearer_auth(api_key)
        .send()
        .await
        .map(|r| r.status().as_u16())
        .map_err(|_| ())
}
