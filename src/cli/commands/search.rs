use anyhow::{Context, Result};
use console::{Emoji, style};

use super::{header, load_config, print_publication_card, spinner};
use crate::cli::EndpointArgs;
use crate::client::{PublicationClient, PublicationSource};

static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "");

pub async fn run(endpoints: &EndpointArgs, query: &str) -> Result<()> {
    header("Search");

    let config = load_config(endpoints)?;
    let client = PublicationClient::new(&config.api)?;

    println!("{}Searching for: {}", SEARCH, style(query).cyan().bold());
    println!();

    let progress = spinner(&SEARCH, "Searching the collection...");
    let results = client.search(query).await;
    progress.finish_and_clear();

    let results = results.context("Search failed")?;
    if results.is_empty() {
        println!("{}", style("No publications found matching your search.").yellow());
        println!();
        return Ok(());
    }

    println!(
        "Found {} publication{}",
        style(results.len()).green().bold(),
        if results.len() == 1 { "" } else { "s" }
    );
    println!();
    for (i, publication) in results.iter().enumerate() {
        print_publication_card(i + 1, publication);
    }

    Ok(())
}
