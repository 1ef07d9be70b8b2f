use anyhow::Result;
use console::{Emoji, style};
use std::sync::Arc;

use super::{header, load_config, print_publication_card, spinner};
use crate::browse::{Listing, PageController};
use crate::cli::EndpointArgs;
use crate::client::PublicationClient;

static DATABASE: Emoji<'_, '_> = Emoji("💾 ", "");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

pub async fn run(
    endpoints: &EndpointArgs,
    page: usize,
    page_size: Option<usize>,
    query: Option<String>,
) -> Result<()> {
    header("Publications");

    let config = load_config(endpoints)?;
    let client = Arc::new(PublicationClient::new(&config.api)?);
    let mut controller = PageController::new(client, page_size.unwrap_or(config.page_size));

    let progress = spinner(&DATABASE, "Fetching publications...");
    controller.load_page(page).await;
    progress.finish_and_clear();

    if let Some(query) = query {
        controller.set_query(query);
    }

    print_page(&controller);
    Ok(())
}

/// Print the current page as the list view shows it
pub(crate) fn print_page(controller: &PageController) {
    let state = controller.state();
    let first = state.offset().saturating_add(1);

    match controller.listing() {
        Listing::Failed(error) => {
            println!("{}Could not load publications: {}", WARN, style(error).red());
        }
        Listing::Empty => {
            println!("{}", style("No publications found.").yellow());
        }
        Listing::NoMatchesOnPage => {
            println!(
                "{}",
                style(format!(
                    "No publications on page {} match \"{}\".",
                    state.page_number,
                    controller.query()
                ))
                .yellow()
            );
            println!(
                "  The filter only covers this page; try {} for the whole collection.",
                style("knowbiols search").yellow()
            );
        }
        Listing::Items(items) => {
            for (index, publication) in items {
                print_publication_card(first.saturating_add(index), publication);
            }
        }
    }

    if controller.pagination_visible() {
        println!(
            "{} Page {}{}{}",
            style("—").dim(),
            style(state.page_number).cyan().bold(),
            if state.page_number > 1 { "  ‹ previous" } else { "" },
            if state.has_more { "  next ›" } else { "" },
        );
    } else {
        println!(
            "{} Filtering page {} by \"{}\"",
            style("—").dim(),
            state.page_number,
            controller.query()
        );
    }
}
