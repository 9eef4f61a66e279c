//! CLI entry-point for topic modeling over the cleaned excerpts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use super::clean_excerpts_input;
use crate::{
    config::Settings,
    topics::excerpts::{self, ExcerptTopicJob},
};

const BASELINE_FILE: &str = "resultados_trechos_topicos.csv";
const STOPWORDS_FILE: &str = "resultados_trechos_topicos_com_stopwords.csv";

/// Args for the `excerpt-topics` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Cleaned excerpt table; defaults to the newest one in the outputs dir.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Topic table to write.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Clusters smaller than this fold into topic -1.
    #[arg(long, default_value_t = 10)]
    pub min_topic_size: usize,
    /// Drop stopwords, interjections and single-excerpt words from topic names.
    #[arg(long)]
    pub stopwords: bool,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let default_name = if args.stopwords { STOPWORDS_FILE } else { BASELINE_FILE };
    let job = ExcerptTopicJob {
        input: clean_excerpts_input(args.input, &settings)?,
        output: args
            .output
            .unwrap_or_else(|| settings.join_output(default_name)),
        min_topic_size: args.min_topic_size,
        stopwords: args.stopwords,
    };
    excerpts::run(&job).with_context(|| format!("model topics of {}", job.input.display()))?;
    Ok(())
}
