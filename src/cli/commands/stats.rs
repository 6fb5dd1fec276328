use anyhow::{Context, Result};
use console::{Emoji, style};
use std::path::Path;

use crate::cli::{read_document, spinner};
use crate::parser::{DocumentStats, analyze_document};

static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
static PAGE: Emoji<'_, '_> = Emoji("📄 ", "");
static TAG: Emoji<'_, '_> = Emoji("🏷️  ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "");

pub async fn run(file: &Path, json: bool) -> Result<()> {
    let (bytes, name) = read_document(file)?;

    if json {
        let stats = analyze_document(&bytes)
            .with_context(|| format!("Failed to analyze {}", name))?;
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!();
    println!(
        "{}",
        style(" Learnify - Document Statistics ").bold().reverse()
    );
    println!();

    let spinner = spinner(SEARCH, format!("Analyzing {}...", name));
    let stats = analyze_document(&bytes);
    spinner.finish_and_clear();
    let stats = stats.with_context(|| format!("Failed to analyze {}", name))?;

    print_overview(&name, &stats);
    print_pages(&stats);
    print_metadata(&stats);
    println!();

    Ok(())
}

fn print_overview(name: &str, stats: &DocumentStats) {
    println!("{}{}", CHART, style(name).bold());
    println!();
    let rows = [
        ("Pages", stats.total_pages),
        ("Images", stats.total_images),
        ("Text blocks", stats.total_text_blocks),
        ("Lines", stats.total_lines),
        ("Words", stats.total_words),
        ("Characters", stats.total_characters),
    ];
    for (label, value) in rows {
        println!(
            "  {} {:<21} {}",
            style("•").cyan(),
            format!("{}:", label),
            style(value).green().bold()
        );
    }
}

fn print_pages(stats: &DocumentStats) {
    if stats.pages.is_empty() {
        return;
    }

    let max_words = stats
        .pages
        .iter()
        .map(|p| p.word_count())
        .max()
        .unwrap_or(0)
        .max(1);

    println!();
    println!("{}Pages", PAGE);
    println!();
    for page in &stats.pages {
        let words = page.word_count();
        let bar = "█".repeat(words * 30 / max_words);
        println!(
            "  {:>4}. {:<30} {} {}",
            page.number,
            style(&bar).green(),
            style(format!("{} words", words)).dim(),
            style(format!(
                "({} blocks, {} lines, {} images)",
                page.blocks.len(),
                page.line_count(),
                page.images
            ))
            .dim(),
        );
    }
}

fn print_metadata(stats: &DocumentStats) {
    let entries: Vec<(&String, &String)> = stats
        .metadata
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect();
    if entries.is_empty() {
        return;
    }

    println!();
    println!("{}Metadata", TAG);
    println!();
    for (key, value) in entries {
        println!("  {:<14} {}", style(key).yellow(), value);
    }
}
