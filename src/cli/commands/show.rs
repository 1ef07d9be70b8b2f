use anyhow::Result;
use console::{Emoji, style};
use std::sync::Arc;

use super::{header, load_config, spinner};
use crate::cli::EndpointArgs;
use crate::client::summarize::Summarizer;
use crate::client::{Publication, PublicationClient, PublicationSource, SummaryClient};
use crate::detail::{DetailState, DetailView, summary_to_text};

static LINK: Emoji<'_, '_> = Emoji("🔗 ", "");
static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");
static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[X] ");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");

pub async fn run(endpoints: &EndpointArgs, id: &str, summarize: bool) -> Result<()> {
    header("Publication");

    let config = load_config(endpoints)?;
    let client = PublicationClient::new(&config.api)?;
    let summarizer = Arc::new(SummaryClient::new(&config.summarizer)?);

    display(&client, summarizer, id, summarize).await
}

/// Load and print one publication, optionally followed by its AI summary
pub(crate) async fn display(
    source: &dyn PublicationSource,
    summarizer: Arc<dyn Summarizer>,
    id: &str,
    summarize: bool,
) -> Result<()> {
    let progress = spinner(&LINK, "Fetching publication...");
    let view = DetailView::load(source, summarizer, id).await;
    progress.finish_and_clear();

    let publication = match view.state() {
        DetailState::Loaded(publication) => publication,
        DetailState::NotFound => {
            println!("{}", style("Publication not found").yellow());
            println!();
            return Ok(());
        }
    };

    print_publication(publication);

    if !summarize {
        println!(
            "  {} knowbiols show {} --summarize",
            style("AI summary:").dim(),
            publication.id
        );
        println!();
        return Ok(());
    }

    let progress = spinner(&SPARKLE, "Generating summary...");
    let result = view.summarize().await;
    progress.finish_and_clear();

    match result {
        Ok(summary) => {
            println!("{}Summary generated", CHECK);
            println!();
            println!("{}{}", SPARKLE, style("AI-Generated Summary").bold().underlined());
            println!();
            let styled = console::colors_enabled();
            for line in summary_to_text(&summary, styled).lines() {
                println!("  {line}");
            }
            println!();
        }
        // Reported, not fatal: the publication itself is already on screen
        Err(e) => {
            println!(
                "{}{}",
                CROSS,
                style(format!("Failed to generate summary. Please try again. ({e})")).red()
            );
            println!();
        }
    }

    Ok(())
}

fn print_publication(publication: &Publication) {
    println!("{}", style(&publication.title).bold());
    println!();
    if !publication.keywords.is_empty() {
        let tags: Vec<String> = publication
            .keywords
            .iter()
            .map(|k| style(format!("#{k}")).magenta().to_string())
            .collect();
        println!("  {}", tags.join(" "));
    }
    println!("  {}", style(publication.authors.join(", ")).cyan());
    println!("  Published: {}", publication.year);
    if let Some(doi) = &publication.doi {
        println!("  DOI: {}", style(doi).dim());
    }
    println!();
    println!("{}", style("Abstract").bold().underlined());
    println!();
    for line in textwrap::wrap(&publication.abstract_text, ABSTRACT_WIDTH) {
        println!("  {line}");
    }
    println!();

    if !publication.urls.is_empty() {
        println!("{}", style("Reference Sources").bold().underlined());
        println!();
        for url in &publication.urls {
            println!("  {}{}", LINK, style(url).blue().underlined());
        }
        println!();
    }
}

const ABSTRACT_WIDTH: usize = 88;
