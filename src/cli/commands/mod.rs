pub mod browse;
pub mod dashboard;
pub mod graph;
pub mod init;
pub mod list;
pub mod search;
pub mod show;

use anyhow::{Context, Result};
use console::{Emoji, style};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::EndpointArgs;
use crate::client::Publication;
use crate::config::Config;

static BOOK: Emoji<'_, '_> = Emoji("📄 ", "- ");

/// Load the config file (or defaults) and apply endpoint overrides
pub(crate) fn load_config(endpoints: &EndpointArgs) -> Result<Config> {
    let config = Config::load().context("Failed to load configuration")?;
    Ok(config.with_overrides(endpoints.api_url.clone(), endpoints.summarizer_url.clone()))
}

pub(crate) fn spinner(emoji: &Emoji<'_, '_>, message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner()
        .template(&format!("{}{{spinner:.green}} {{msg}}", emoji))
    {
        spinner.set_style(template);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message);
    spinner
}

pub(crate) fn header(title: &str) {
    println!();
    println!("{}", style(format!(" KnowBiols - {title} ")).bold().reverse());
    println!();
}

/// One-card rendering of a publication used by the list, browse and search
/// views
pub(crate) fn print_publication_card(position: usize, publication: &Publication) {
    println!(
        "{}{} {}",
        BOOK,
        style(format!("{position:>3}.")).dim(),
        style(&publication.title).bold()
    );
    println!(
        "      {} • {} • {}",
        style(publication.authors.join(", ")).cyan(),
        publication.year,
        style(&publication.id).dim()
    );
    println!("      {}", truncate(&publication.abstract_text, 200));
    if !publication.keywords.is_empty() {
        let tags: Vec<String> = publication
            .keywords
            .iter()
            .map(|k| style(format!("#{k}")).magenta().to_string())
            .collect();
        println!("      {}", tags.join(" "));
    }
    println!();
}

/// Shorten text to at most `max` characters, cutting at a char boundary
pub(crate) fn truncate(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}
