//! CLI entry-point for removing duplicate excerpts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use super::{resolve_input, CLEAN_EXCERPTS_STEM, EXCERPTS_STEM};
use crate::{
    config::Settings,
    data::dedup::{self, DedupJob},
};

/// Args for the `dedup` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Excerpt table; defaults to the newest uncleaned one in the outputs dir.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Cleaned table to write; defaults to a timestamped file in the outputs dir.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let input = resolve_input(
        args.input,
        &settings.outputs_dir,
        &format!("{EXCERPTS_STEM}_2"),
        |name| !name.contains("limpo"),
    )?;
    let job = DedupJob {
        input,
        output: args
            .output
            .unwrap_or_else(|| settings.stamped_output(CLEAN_EXCERPTS_STEM)),
    };
    dedup::run(&job).with_context(|| format!("deduplicate {}", job.input.display()))?;
    Ok(())
}
