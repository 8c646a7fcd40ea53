//! vidsearch - Hybrid search over a directory of video documents
//!
//! Loads the corpus, builds the catalog once, then answers a single
//! command against it.

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod output;

use cli::{Cli, Commands};
use output::ResultPrinter;
use vidsearch::{loader, Catalog, Config, SearchRequest};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let docs_dir = cli
        .docs
        .clone()
        .or_else(|| config.docs_dir.clone())
        .context("No corpus directory: pass --docs or set docs_dir in the config file")?;

    let corpus = loader::load_dir(&docs_dir)?;
    let start = Instant::now();
    let catalog = Catalog::build(corpus.videos, config.boosts).context("Failed to build catalog")?;
    let build_secs = start.elapsed().as_secs_f64();

    let printer = ResultPrinter::new();

    match cli.command {
        Commands::Search {
            query,
            filters,
            sort,
            page,
            per_page,
            max_hits,
            json,
        } => {
            let mut request = SearchRequest::new(sort.unwrap_or(config.sort_property)).with_page(
                page,
                per_page.unwrap_or(config.hits_per_page),
                max_hits.unwrap_or(config.max_hits_per_query),
            );
            if let Some(query) = query {
                tracing::info!("Searching for: {}", query);
                request = request.with_query(query);
            }
            request = request.with_refinement(cli::parse_filters(&filters)?);

            let results = catalog.search(&request)?;
            if json {
                printer.print_json(&results)?;
            } else {
                printer.print_videos(&results, &request.sort_property);
            }
        }
        Commands::Tags { json } => {
            let tags = catalog.search_tags();
            if json {
                printer.print_json(&tags)?;
            } else {
                printer.print_tags(&tags);
            }
        }
        Commands::Speakers { json } => {
            let speakers = catalog.search_speakers();
            if json {
                printer.print_json(&speakers)?;
            } else {
                printer.print_speakers(&speakers);
            }
        }
        Commands::Channels { json } => {
            let channels = catalog.search_channels();
            if json {
                printer.print_json(&channels)?;
            } else {
                printer.print_channels(&channels);
            }
        }
        Commands::Status => {
            printer.print_status(&docs_dir, &corpus.stats, &catalog.stats(), build_secs);
        }
    }

    Ok(())
}
