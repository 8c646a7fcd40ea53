//! Corpus loader: one `.json` file per video, anywhere under a root directory
//!
//! Files that cannot be read or parsed are logged and skipped so a single
//! bad document never blocks the rest of the corpus.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::time::Instant;
use walkdir::WalkDir;

use crate::model::Video;

const DOC_EXTENSION: &str = ".json";

/// Statistics from a load
#[derive(Debug, Default)]
pub struct LoadStats {
    pub files_loaded: usize,
    pub files_skipped: usize,
    pub duration_secs: f64,
}

/// Documents read from disk, in walk order
#[derive(Debug, Default)]
pub struct Corpus {
    pub videos: Vec<Video>,
    pub stats: LoadStats,
}

/// Read every `.json` document under `root`
///
/// Walk order is sorted by file name, so the same tree always yields the
/// same sequence.
pub fn load_dir(root: &Path) -> Result<Corpus> {
    let start = Instant::now();
    tracing::info!("Loading .json docs from {}", root.display());

    if !root.is_dir() {
        anyhow::bail!("Corpus directory {} does not exist", root.display());
    }

    let mut corpus = Corpus::default();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_document(entry.path()) {
            continue;
        }

        match read_document(entry.path()) {
            Ok(video) => {
                corpus.videos.push(video);
                corpus.stats.files_loaded += 1;
            }
            Err(err) => {
                tracing::warn!("Skipping {}: {:#}", entry.path().display(), err);
                corpus.stats.files_skipped += 1;
            }
        }
    }

    corpus.stats.duration_secs = start.elapsed().as_secs_f64();
    tracing::info!(
        "{} docs loaded, {} skipped",
        corpus.stats.files_loaded,
        corpus.stats.files_skipped
    );

    Ok(corpus)
}

fn is_document(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(DOC_EXTENSION))
}

/// Parse a single document file
pub fn read_document(path: &Path) -> Result<Video> {
    let content = fs::read_to_string(path).context("Failed to read document")?;
    let video: Video = serde_json::from_str(&content).context("Failed to parse document")?;
    Ok(video)
}
