use anyhow::Result;
use console::{Emoji, style};

use super::{header, load_config, spinner};
use crate::cli::EndpointArgs;
use crate::client::{PublicationClient, PublicationSource};
use crate::graph::GraphData;

static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
static DATABASE: Emoji<'_, '_> = Emoji("💾 ", "");

pub async fn run(endpoints: &EndpointArgs) -> Result<()> {
    header("Space Bioscience Publications");

    let config = load_config(endpoints)?;
    let client = PublicationClient::new(&config.api)?;

    let progress = spinner(&DATABASE, "Counting publications...");
    let total = client.count_or_zero().await;
    progress.finish_and_clear();

    let topics = GraphData::research_topics();

    println!("{}Overview", CHART);
    println!();
    println!(
        "  {} Total publications: {}",
        style("•").cyan(),
        style(total).green().bold()
    );
    println!(
        "  {} Knowledge nodes:    {}",
        style("•").cyan(),
        style(topics.nodes.len()).green().bold()
    );
    println!(
        "  {} Research areas:     {}",
        style("•").cyan(),
        style(topics.group_count()).green().bold()
    );
    println!();
    println!(
        "  Browse with {} or explore topics with {}",
        style("knowbiols browse").yellow(),
        style("knowbiols graph").yellow()
    );
    println!();

    Ok(())
}
