//! CLI entry-point for theme refinement and clustering.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use super::THEMES_FILE;
use crate::{
    config::Settings,
    topics::refine::{self, RefineJob},
};

/// Args for the `refine` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Theme table written by `themes`.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Topic table to write.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Clusters smaller than this fold into topic -1.
    #[arg(long, default_value_t = 15)]
    pub min_topic_size: usize,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let job = RefineJob {
        input: args.input.unwrap_or_else(|| settings.join_output(THEMES_FILE)),
        output: args
            .output
            .unwrap_or_else(|| settings.join_output("resultados_llmusic_refinado.csv")),
        min_topic_size: args.min_topic_size,
    };
    refine::run(&job).with_context(|| format!("refine themes from {}", job.input.display()))?;
    Ok(())
}
