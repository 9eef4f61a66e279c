//! Command-line interface wiring for lyric-topics.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use crate::config::{latest_csv, Settings};

pub mod classify;
pub mod compare;
pub mod dedup;
pub mod excerpt_topics;
pub mod refine;
pub mod segment;
pub mod themes;

/// Prefix of excerpt tables written by `segment` (cleaned ones add `limpo_`).
pub const EXCERPTS_STEM: &str = "musicas_por_trechos";
pub const CLEAN_EXCERPTS_STEM: &str = "musicas_por_trechos_limpo";
pub const THEMES_FILE: &str = "temas_gerados_llmusic.csv";

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Lyric excerpt and topic pipeline", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Segment(args) => segment::run(args, settings).await,
            Commands::Dedup(args) => dedup::run(args, settings).await,
            Commands::Classify(args) => classify::run(args, settings).await,
            Commands::Themes(args) => themes::run(args, settings).await,
            Commands::Refine(args) => refine::run(args, settings).await,
            Commands::ExcerptTopics(args) => excerpt_topics::run(args, settings).await,
            Commands::Compare(args) => compare::run(args).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Split each song's lyric into numbered excerpts.
    Segment(segment::Args),
    /// Remove repeated excerpts within each song and renumber.
    Dedup(dedup::Args),
    /// Score sampled excerpts against the macro-topics with self-consistency.
    Classify(classify::Args),
    /// Ask the model for free-form themes over batches of excerpts.
    Themes(themes::Args),
    /// Clean generated themes and cluster them into a topic table.
    Refine(refine::Args),
    /// Cluster the cleaned excerpts into a topic table.
    ExcerptTopics(excerpt_topics::Args),
    /// Compare two topic tables.
    Compare(compare::Args),
}

/// The explicit path, or the newest matching table in `dir`.
pub(crate) fn resolve_input<F>(explicit: Option<PathBuf>, dir: &Path, prefix: &str, keep: F) -> Result<PathBuf>
where
    F: Fn(&str) -> bool,
{
    if let Some(path) = explicit {
        return Ok(path);
    }
    latest_csv(dir, prefix, keep).ok_or_else(|| {
        anyhow!(
            "no `{prefix}*.csv` table found in {}; pass --input",
            dir.display()
        )
    })
}

/// Newest cleaned excerpt table, the default input of the model stages.
pub(crate) fn clean_excerpts_input(explicit: Option<PathBuf>, settings: &Settings) -> Result<PathBuf> {
    resolve_input(
        explicit,
        &settings.outputs_dir,
        &format!("{CLEAN_EXCERPTS_STEM}_"),
        |_| true,
    )
}
