//! CLI entry-point for splitting lyrics into excerpts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use super::{resolve_input, EXCERPTS_STEM};
use crate::{
    config::Settings,
    data::segment::{self, SegmentJob},
};

/// Args for the `segment` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Scraped song table; defaults to the newest CSV in the data dir.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Excerpt table to write; defaults to a timestamped file in the outputs dir.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let job = SegmentJob {
        input: resolve_input(args.input, &settings.data_dir, "", |_| true)?,
        output: args
            .output
            .unwrap_or_else(|| settings.stamped_output(EXCERPTS_STEM)),
    };
    segment::run(&job).with_context(|| format!("segment songs from {}", job.input.display()))?;
    Ok(())
}
