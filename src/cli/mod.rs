pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "knowbiols")]
#[command(author = "KnowBiols Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Explore space bioscience publications and their research-topic graph", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub endpoints: EndpointArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Backend locations; override the config file
#[derive(Args, Debug, Clone, Default)]
pub struct EndpointArgs {
    /// Base URL of the publications API
    #[arg(long, global = true, env = "KNOWBIOLS_API_URL")]
    pub api_url: Option<String>,

    /// Base URL of the summarization service
    #[arg(long, global = true, env = "KNOWBIOLS_SUMMARIZER_URL")]
    pub summarizer_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long, default_value = "false")]
        force: bool,
    },

    /// Show collection totals
    Dashboard,

    /// Print one page of publications
    #[command(long_about = "Print one page of publications.\n\n\
        The --query filter only narrows the page that was fetched; it does not\n\
        search the whole collection. Use the 'search' command for that.")]
    List {
        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Publications per page (defaults to the configured page size)
        #[arg(short = 'n', long)]
        page_size: Option<usize>,

        /// Only show publications on this page whose title, abstract,
        /// authors or keywords contain this text
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Page through publications interactively
    Browse {
        /// Publications per page (defaults to the configured page size)
        #[arg(short = 'n', long)]
        page_size: Option<usize>,
    },

    /// Search the whole collection on the server
    Search {
        /// Search text
        query: String,
    },

    /// Show a single publication
    Show {
        /// Publication id
        id: String,

        /// Ask the summarization service for an AI summary
        #[arg(short, long, default_value = "false")]
        summarize: bool,
    },

    /// Lay out the research-topic graph and write it as SVG
    Graph {
        /// Output SVG file
        #[arg(short, long, default_value = "knowledge-graph.svg")]
        output: PathBuf,

        /// Viewport width (defaults to the configured width)
        #[arg(long)]
        width: Option<f64>,

        /// Viewport height (defaults to the configured height)
        #[arg(long)]
        height: Option<f64>,

        /// Print the connections of a topic (id or name)
        #[arg(short, long)]
        focus: Option<String>,

        /// Open the SVG in the default browser
        #[arg(long, default_value = "false")]
        open: bool,
    },
}
