//! CLI definitions using clap derive macros
//!
//! Every command loads the corpus, builds the catalog, then runs:
//! - search: Free-text and/or filtered video search
//! - tags, speakers, channels: List a side index
//! - status: Show corpus and catalog counts

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vidsearch::catalog::Refinement;
use vidsearch::model::FieldValue;

/// vidsearch - Hybrid search over a directory of video documents
#[derive(Parser, Debug)]
#[command(name = "vidsearch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory of .json video documents (overrides the config file)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub docs: Option<PathBuf>,

    /// Config file (defaults to <config dir>/vidsearch/config.json)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search videos; without a query, filter and sort only
    Search {
        /// Free-text query (e.g. `rust`, `title:intro`, `+async -tokio`)
        #[arg(value_name = "QUERY")]
        query: Option<String>,

        /// Equality filter, repeatable (e.g. `channelId=c1`, `tags=rust`);
        /// only applied when no query is given
        #[arg(short, long = "filter", value_name = "FIELD=VALUE")]
        filters: Vec<String>,

        /// Property to sort on, highest first
        #[arg(short, long)]
        sort: Option<String>,

        /// Zero-based page number
        #[arg(short, long, default_value = "0")]
        page: usize,

        /// Results per page
        #[arg(long)]
        per_page: Option<usize>,

        /// Maximum results returned by one query
        #[arg(long)]
        max_hits: Option<usize>,

        /// Output results as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// List all tags
    Tags {
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// List all speakers
    Speakers {
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// List all channels
    Channels {
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Show corpus and catalog statistics
    Status,
}

/// Turn `FIELD=VALUE` arguments into a refinement
///
/// Values that read as JSON scalars (`3`, `true`, `"quoted"`) keep their
/// type; anything else is taken as a plain string.
pub fn parse_filters(filters: &[String]) -> Result<Refinement> {
    let mut refinement = Refinement::new();
    for filter in filters {
        let (field, raw) = filter
            .split_once('=')
            .with_context(|| format!("Filter {:?} is not FIELD=VALUE", filter))?;
        let value = serde_json::from_str::<serde_json::Value>(raw)
            .ok()
            .and_then(|v| FieldValue::from_json(&v))
            .unwrap_or_else(|| FieldValue::from(raw));
        refinement = refinement.with(field.trim(), value);
    }
    Ok(refinement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidsearch::catalog::FilterField;

    #[test]
    fn test_parse_filters_keeps_scalar_types() {
        let refinement = parse_filters(&[
            "channelId=c1".to_string(),
            "satisfaction=3".to_string(),
            "title=Intro = Rust".to_string(),
        ])
        .unwrap();

        assert_eq!(
            refinement.conditions(),
            &[
                (FilterField::ChannelId, FieldValue::from("c1")),
                (
                    FilterField::Attribute("satisfaction".to_string()),
                    FieldValue::from(3i64)
                ),
                (FilterField::Title, FieldValue::from("Intro = Rust")),
            ]
        );
    }

    #[test]
    fn test_parse_filters_rejects_missing_equals() {
        assert!(parse_filters(&["channelId".to_string()]).is_err());
    }

    #[test]
    fn test_cli_parses_search() {
        let cli = Cli::parse_from([
            "vidsearch",
            "--docs",
            "corpus",
            "search",
            "intro",
            "-f",
            "channelId=c1",
            "--sort",
            "satisfaction",
            "--page",
            "2",
        ]);

        match cli.command {
            Commands::Search {
                query,
                filters,
                sort,
                page,
                ..
            } => {
                assert_eq!(query.as_deref(), Some("intro"));
                assert_eq!(filters, vec!["channelId=c1"]);
                assert_eq!(sort.as_deref(), Some("satisfaction"));
                assert_eq!(page, 2);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.docs, Some(PathBuf::from("corpus")));
    }
}
