//! CLI entry-point for self-consistency topic classification.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use super::clean_excerpts_input;
use crate::{
    config::Settings,
    llm::{
        consistency::{self, ClassifyJob, ClassifyPlan},
        OllamaClient,
    },
};

/// Args for the `classify` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Cleaned excerpt table; defaults to the newest one in the outputs dir.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Result table to write.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Number of excerpts to sample.
    #[arg(long, default_value_t = 50)]
    pub sample: usize,
    /// Sampling seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    /// Model calls per (excerpt, topic) pair.
    #[arg(long, default_value_t = 5)]
    pub inferences: usize,
}

impl Args {
    pub fn plan(&self, settings: &Settings) -> ClassifyPlan {
        ClassifyPlan {
            inferences: self.inferences,
            delay: settings.request_delay(),
            ..ClassifyPlan::default()
        }
    }
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let client = OllamaClient::from_settings(&settings)?;
    info!(model = client.model(), "using inference server");
    let job = ClassifyJob {
        plan: args.plan(&settings),
        sample: args.sample,
        seed: args.seed,
        input: clean_excerpts_input(args.input, &settings)?,
        output: args
            .output
            .unwrap_or_else(|| settings.join_output("resultado_classificacao_autoconsistencia.csv")),
    };
    consistency::run(&job, &client)
        .await
        .with_context(|| format!("classify excerpts from {}", job.input.display()))?;
    Ok(())
}
