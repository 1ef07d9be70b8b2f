use anyhow::{Context, Result};
use console::{Emoji, style};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{header, spinner};
use crate::config::Config;
use crate::graph::render::write_svg;
use crate::graph::{ForceSimulation, GraphData, SimulationParams, SimulationRunner, TopicGraph};

static GRAPH: Emoji<'_, '_> = Emoji("🔗 ", "");
static BROWSER: Emoji<'_, '_> = Emoji("🌐 ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

pub async fn run(
    output: PathBuf,
    width: Option<f64>,
    height: Option<f64>,
    focus: Option<String>,
    open: bool,
) -> Result<()> {
    header("Knowledge Graph");

    let config = Config::load().context("Failed to load configuration")?;
    let width = width.unwrap_or(config.graph.width);
    let height = height.unwrap_or(config.graph.height);
    if !(width > 0.0 && height > 0.0) {
        anyhow::bail!("Viewport must have a positive width and height");
    }

    let topics = TopicGraph::build(GraphData::research_topics())?;
    println!(
        "{}Research topic network: {} topics, {} connections",
        GRAPH,
        style(topics.data().nodes.len()).green().bold(),
        style(topics.data().edges.len()).green().bold()
    );

    let simulation = ForceSimulation::new(topics.data(), SimulationParams::for_viewport(width, height))?;
    let runner = SimulationRunner::spawn(simulation, Duration::ZERO);

    let progress = spinner(&SPARKLE, "Running force layout...");
    let snapshot = runner.settled().await?;
    runner.stop();
    progress.finish_and_clear();

    tracing::info!(ticks = snapshot.tick, alpha = snapshot.alpha, "layout settled");
    println!("{}Layout settled after {} ticks", CHECK, snapshot.tick);

    write_svg(topics.data(), &snapshot, width, height, &output)?;
    println!(
        "{}Wrote {}",
        CHECK,
        style(output.display()).cyan().underlined()
    );

    if let Some(query) = focus {
        println!();
        match topics.find(&query) {
            Some(node) => {
                println!(
                    "{}{} ({})",
                    GRAPH,
                    style(&node.name).bold(),
                    style(node.group).dim()
                );
                for neighbor in topics.neighbors(&node.id) {
                    let name = topics
                        .node(neighbor)
                        .map(|n| n.name.as_str())
                        .unwrap_or(neighbor);
                    println!("  {} {} ({})", style("→").cyan(), name, style(neighbor).dim());
                }
            }
            None => {
                println!("{}No topic matches \"{}\"", WARN, query);
            }
        }
    }

    if open {
        open_in_browser(&output);
        println!();
        println!("{}Visualization opened in browser", BROWSER);
    }
    println!();

    Ok(())
}

fn open_in_browser(path: &Path) {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn().ok();
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn().ok();
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", path.to_str().unwrap_or("")])
            .spawn()
            .ok();
    }
}
