//! CLI entry-point for comparing two topic tables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::topics::compare::{self, CompareJob};

/// Args for the `compare` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Reference topic table.
    #[arg(long)]
    pub baseline: PathBuf,
    /// Topic table compared against the baseline.
    #[arg(long)]
    pub variant: PathBuf,
}

#[instrument]
pub async fn run(args: Args) -> Result<()> {
    let job = CompareJob {
        baseline: args.baseline,
        variant: args.variant,
    };
    compare::run(&job).context("compare topic tables")?;
    Ok(())
}
