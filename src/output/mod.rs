//! Terminal output for catalog results
//!
//! Plain listings use `colored`; `--json` output is pretty-printed and
//! highlighted with syntect.

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::path::Path;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

use vidsearch::catalog::CatalogStats;
use vidsearch::loader::LoadStats;
use vidsearch::model::{Channel, Speaker, Video};

const THEME: &str = "base16-ocean.dark";

/// Handles formatting and printing catalog results
pub struct ResultPrinter {
    ps: SyntaxSet,
    ts: ThemeSet,
}

impl ResultPrinter {
    pub fn new() -> Self {
        Self {
            ps: SyntaxSet::load_defaults_newlines(),
            ts: ThemeSet::load_defaults(),
        }
    }

    /// Print any serializable result as highlighted JSON
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;

        let syntax = self
            .ps
            .find_syntax_by_extension("json")
            .unwrap_or_else(|| self.ps.find_syntax_plain_text());
        let theme = self
            .ts
            .themes
            .get(THEME)
            .with_context(|| format!("Missing theme {}", THEME))?;
        let mut highlighter = HighlightLines::new(syntax, theme);

        for line in LinesWithEndings::from(&json) {
            let ranges = highlighter.highlight_line(line, &self.ps)?;
            print!("{}", as_24_bit_terminal_escaped(&ranges[..], false));
        }
        println!("\x1b[0m");
        Ok(())
    }

    /// Print videos with the value they were sorted on
    pub fn print_videos(&self, videos: &[&Video], sort_property: &str) {
        if videos.is_empty() {
            println!("\n{}", "No results found.".yellow());
            return;
        }

        println!(
            "\n{} {}",
            "Found".green().bold(),
            format!("{} results:", videos.len()).green()
        );
        println!();

        for (i, video) in videos.iter().enumerate() {
            println!(
                "{} {} {} {}",
                format!("[{}]", i + 1).cyan().bold(),
                video.title.blue().bold(),
                "·".dimmed(),
                video.object_id.dimmed()
            );
            println!(
                "    {} {} ({})",
                "channel:".dimmed(),
                video.channel_title.magenta(),
                video.channel_id
            );
            if let Some(speaker) = &video.speaker {
                println!(
                    "    {} {} {}",
                    "speaker:".dimmed(),
                    speaker.name,
                    speaker.twitter.dimmed()
                );
            }
            if let Some(tags) = &video.tags {
                println!("    {} {}", "tags:".dimmed(), tags.join(", "));
            }
            let sort_value = video
                .field(sort_property)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("    {} {}", format!("{}:", sort_property).dimmed(), sort_value.yellow());
            println!();
        }
    }

    pub fn print_channels(&self, channels: &[&Channel]) {
        println!("\n{}", format!("{} channels", channels.len()).green().bold());
        for channel in channels {
            println!("  {} {}", channel.title.blue(), channel.id.dimmed());
        }
    }

    pub fn print_speakers(&self, speakers: &[&Speaker]) {
        println!("\n{}", format!("{} speakers", speakers.len()).green().bold());
        for speaker in speakers {
            println!("  {} {}", speaker.name.blue(), speaker.twitter.dimmed());
        }
    }

    pub fn print_tags(&self, tags: &[&str]) {
        println!("\n{}", format!("{} tags", tags.len()).green().bold());
        for tag in tags {
            println!("  {}", tag.magenta());
        }
    }

    pub fn print_status(
        &self,
        docs_dir: &Path,
        load: &LoadStats,
        catalog: &CatalogStats,
        build_secs: f64,
    ) {
        println!("\n📊 Catalog Status");
        println!("   Corpus: {:?}", docs_dir);
        println!("   Files loaded: {}", load.files_loaded);
        println!("   Files skipped: {}", load.files_skipped);
        println!("   Videos: {}", catalog.videos);
        println!("   Channels: {}", catalog.channels);
        println!("   Speakers: {}", catalog.speakers);
        println!("   Tags: {}", catalog.tags);
        println!("   Load time: {:.2}s", load.duration_secs);
        println!("   Build time: {:.2}s", build_secs);
    }
}

impl Default for ResultPrinter {
    fn default() -> Self {
        Self::new()
    }
}
