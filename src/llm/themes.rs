//! Free-form theme generation over shuffled batches of excerpts.

use std::{path::PathBuf, time::Duration};

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use super::client::{GenerateRequest, TextGenerator};
use crate::{
    data::{excerpts::load_excerpts, write_table, Table},
    error::{LlmError, PipelineError},
};

const PROGRESS_EVERY: usize = 50;

#[derive(Debug, Clone)]
pub struct ThemePlan {
    pub iterations: usize,
    pub batch_size: usize,
    pub themes_per_batch: usize,
    pub temperature: f32,
    pub delay: Duration,
    /// Shuffle seed; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for ThemePlan {
    fn default() -> Self {
        Self {
            iterations: 10,
            batch_size: 20,
            themes_per_batch: 5,
            temperature: 0.7,
            delay: Duration::ZERO,
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThemeJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub plan: ThemePlan,
}

/// A raw theme line as returned by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeRow {
    pub tema: String,
}

impl Table for ThemeRow {
    const COLUMNS: &'static [&'static str] = &["tema"];
    const REQUIRED: &'static [&'static str] = &["tema"];
}

pub fn theme_prompt(batch: &[String], themes_per_batch: usize) -> String {
    let listed = batch
        .iter()
        .enumerate()
        .map(|(idx, excerpt)| format!("{}. {excerpt}", idx + 1))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "dado os seguintes trechos de música, \
         sugira {themes_per_batch} tópicos que descrevem os assuntos abordados:\n\n\
         {listed}\n\n\
         REGRAS:\n\
         - Responda APENAS com os tópicos, um por linha.\n\
         - Não inclua números na sua resposta.\n\
         - Gere temas curtos e conceituais (ex: 'Sofrimento por amor', 'Festa e bebida')."
    )
}

#[derive(Debug, Clone, Default)]
pub struct ThemeOutcome {
    pub themes: Vec<String>,
    pub batches: usize,
    pub failed_batches: usize,
}

/// Ask the model for themes, `plan.iterations` passes over freshly shuffled
/// batches. An unreachable server aborts; any other batch failure is skipped.
pub async fn generate_themes<G>(
    generator: &G,
    excerpts: &[String],
    plan: &ThemePlan,
) -> Result<ThemeOutcome, LlmError>
where
    G: TextGenerator + ?Sized,
{
    let mut rng = match plan.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut texts = excerpts.to_vec();
    let mut outcome = ThemeOutcome::default();
    let batch_size = plan.batch_size.max(1);

    for iteration in 0..plan.iterations {
        texts.shuffle(&mut rng);
        let batches: Vec<&[String]> = texts.chunks(batch_size).collect();
        info!(iteration = iteration + 1, batches = batches.len(), "generating themes");

        for (idx, batch) in batches.iter().enumerate() {
            let request = GenerateRequest {
                prompt: theme_prompt(batch, plan.themes_per_batch),
                temperature: plan.temperature,
                num_predict: None,
            };
            outcome.batches += 1;
            match generator.generate(&request).await {
                Ok(reply) => outcome.themes.extend(
                    reply
                        .lines()
                        .map(str::trim)
                        .filter(|line| !line.is_empty())
                        .map(str::to_string),
                ),
                Err(err @ LlmError::Unreachable { .. }) => return Err(err),
                Err(err) => {
                    warn!(batch = idx + 1, %err, "theme batch failed, skipping");
                    outcome.failed_batches += 1;
                }
            }
            if (idx + 1) % PROGRESS_EVERY == 0 {
                info!(batch = idx + 1, total = batches.len(), "theme batches processed");
            }
            if !plan.delay.is_zero() {
                sleep(plan.delay).await;
            }
        }
    }
    Ok(outcome)
}

#[instrument(skip_all, fields(input = %job.input.display()))]
pub async fn run<G>(job: &ThemeJob, generator: &G) -> Result<ThemeOutcome, PipelineError>
where
    G: TextGenerator + ?Sized,
{
    let excerpts: Vec<String> = load_excerpts(&job.input)?
        .into_iter()
        .map(|e| e.letra)
        .filter(|text| !text.trim().is_empty())
        .collect();
    info!(excerpts = excerpts.len(), "loaded excerpts for theme generation");

    let outcome = generate_themes(generator, &excerpts, &job.plan).await?;
    let rows: Vec<ThemeRow> = outcome
        .themes
        .iter()
        .map(|tema| ThemeRow { tema: tema.clone() })
        .collect();
    write_table(&job.output, &rows)?;
    info!(
        themes = rows.len(),
        batches = outcome.batches,
        failed_batches = outcome.failed_batches,
        path = %job.output.display(),
        "wrote generated themes"
    );
    Ok(outcome)
}
