use anyhow::Result;
use console::{Emoji, style};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use super::list::print_page;
use super::{header, load_config, show, spinner};
use crate::browse::PageController;
use crate::cli::EndpointArgs;
use crate::client::{PublicationClient, SummaryClient};

static DATABASE: Emoji<'_, '_> = Emoji("💾 ", "");

/// A single line of pager input
#[derive(Debug, PartialEq)]
enum PagerInput {
    Next,
    Previous,
    Reload,
    Filter(String),
    Open(usize),
    Help,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> PagerInput {
    let line = line.trim();
    if let Some(query) = line.strip_prefix('/') {
        return PagerInput::Filter(query.to_string());
    }
    match line {
        "n" | "next" => PagerInput::Next,
        "p" | "prev" => PagerInput::Previous,
        "r" | "reload" => PagerInput::Reload,
        "q" | "quit" | "exit" => PagerInput::Quit,
        "?" | "h" | "help" | "" => PagerInput::Help,
        other => match other.parse::<usize>() {
            Ok(n) => PagerInput::Open(n),
            Err(_) => PagerInput::Unknown(other.to_string()),
        },
    }
}

fn print_help() {
    println!(
        "  {} next page   {} previous page   {} filter this page   {} clear filter",
        style("n").cyan(),
        style("p").cyan(),
        style("/text").cyan(),
        style("/").cyan()
    );
    println!(
        "  {} open publication   {} reload   {} quit",
        style("<number>").cyan(),
        style("r").cyan(),
        style("q").cyan()
    );
}

pub async fn run(endpoints: &EndpointArgs, page_size: Option<usize>) -> Result<()> {
    header("Browse Publications");

    let config = load_config(endpoints)?;
    let client = Arc::new(PublicationClient::new(&config.api)?);
    let summarizer = Arc::new(SummaryClient::new(&config.summarizer)?);
    let mut controller =
        PageController::new(client.clone(), page_size.unwrap_or(config.page_size));

    let progress = spinner(&DATABASE, "Fetching publications...");
    controller.load_page(1).await;
    progress.finish_and_clear();
    print_page(&controller);
    print_help();

    let stdin = io::stdin();
    loop {
        print!("{} ", style("›").green().bold());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match parse_input(&line) {
            PagerInput::Quit => break,
            PagerInput::Help => print_help(),
            PagerInput::Unknown(other) => {
                println!("  {}", style(format!("Unknown command '{other}'")).yellow());
                print_help();
            }
            PagerInput::Filter(query) => {
                controller.set_query(query);
                println!();
                print_page(&controller);
            }
            PagerInput::Next | PagerInput::Previous if !controller.pagination_visible() => {
                println!(
                    "  {}",
                    style("Paging is off while a filter is active; clear it with '/'").yellow()
                );
            }
            PagerInput::Next => {
                if controller.next_page().await {
                    println!();
                    print_page(&controller);
                } else {
                    println!("  {}", style("Already on the last page").dim());
                }
            }
            PagerInput::Previous => {
                if controller.prev_page().await {
                    println!();
                    print_page(&controller);
                } else {
                    println!("  {}", style("Already on the first page").dim());
                }
            }
            PagerInput::Reload => {
                let page = controller.state().page_number;
                controller.load_page(page).await;
                println!();
                print_page(&controller);
            }
            PagerInput::Open(position) => {
                let state = controller.state();
                let first = state.offset().saturating_add(1);
                let Some(publication) = position
                    .checked_sub(first)
                    .and_then(|offset| state.items.get(offset))
                else {
                    println!("  {}", style(format!("No publication #{position} on this page")).yellow());
                    continue;
                };
                show::display(client.as_ref(), summarizer.clone(), &publication.id, false).await?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigation() {
        assert_eq!(parse_input("n\n"), PagerInput::Next);
        assert_eq!(parse_input(" prev "), PagerInput::Previous);
        assert_eq!(parse_input("q"), PagerInput::Quit);
        assert_eq!(parse_input(""), PagerInput::Help);
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_input("/Bone Density\n"),
            PagerInput::Filter("Bone Density".into())
        );
        assert_eq!(parse_input("/"), PagerInput::Filter(String::new()));
    }

    #[test]
    fn test_parse_open_and_unknown() {
        assert_eq!(parse_input("12"), PagerInput::Open(12));
        assert_eq!(parse_input("zoom"), PagerInput::Unknown("zoom".into()));
    }
}
