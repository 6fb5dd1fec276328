use anyhow::{Context, Result};
use console::{Emoji, style};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::read_document;
use crate::parser::{extract_text_from_pages, parse_page_spec};

static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");

pub async fn run(file: &Path, pages: &str, output: Option<PathBuf>) -> Result<()> {
    let (bytes, name) = read_document(file)?;

    let text = extract_text_from_pages(&bytes, pages)
        .with_context(|| format!("Failed to extract pages '{}' from {}", pages, name))?;

    match output {
        Some(path) => {
            fs::write(&path, &text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            let selection = parse_page_spec(pages)?;
            println!(
                "{}Extracted {} {} ({}) from {} to {}",
                CHECK,
                style(selection.len()).green().bold(),
                if selection.len() == 1 { "page" } else { "pages" },
                selection,
                style(&name).cyan(),
                style(path.display()).cyan()
            );
        }
        None => println!("{}", text),
    }

    Ok(())
}
