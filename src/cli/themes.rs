//! CLI entry-point for model-generated themes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use super::{clean_excerpts_input, THEMES_FILE};
use crate::{
    config::Settings,
    llm::{
        themes::{self, ThemeJob, ThemePlan},
        OllamaClient,
    },
};

/// Args for the `themes` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Cleaned excerpt table; defaults to the newest one in the outputs dir.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Theme table to write.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Full passes over the shuffled excerpts.
    #[arg(long, default_value_t = 10)]
    pub iterations: usize,
    /// Excerpts per prompt.
    #[arg(long, default_value_t = 20)]
    pub batch_size: usize,
    /// Themes requested per prompt.
    #[arg(long, default_value_t = 5)]
    pub themes_per_batch: usize,
    /// Shuffle seed for reproducible batches.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Args {
    /// Batch plan for these flags, paced by the configured request delay.
    pub fn plan(&self, settings: &Settings) -> ThemePlan {
        ThemePlan {
            iterations: self.iterations,
            batch_size: self.batch_size,
            themes_per_batch: self.themes_per_batch,
            delay: settings.request_delay(),
            seed: self.seed,
            ..ThemePlan::default()
        }
    }
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let client = OllamaClient::from_settings(&settings)?;
    let job = ThemeJob {
        plan: args.plan(&settings),
        input: clean_excerpts_input(args.input, &settings)?,
        output: args.output.unwrap_or_else(|| settings.join_output(THEMES_FILE)),
    };
    themes::run(&job, &client)
        .await
        .with_context(|| format!("generate themes from {}", job.input.display()))?;
    Ok(())
}
