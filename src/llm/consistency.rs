//! Self-consistency topic scoring.
//!
//! Every (excerpt, topic) pair is scored several times on a 1-5 relevance
//! scale at varying temperatures. The samples are then reduced to mean, mode
//! and spread. A pair counts as positive when the mode is at least 4 and the
//! samples agree closely enough.

use std::{path::PathBuf, time::Duration};

use indexmap::IndexMap;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use super::client::{GenerateRequest, TextGenerator};
use crate::{
    data::{
        excerpts::{load_excerpts, ExcerptRecord},
        write_table, Table,
    },
    error::PipelineError,
};

/// Macro-topics scored against every excerpt.
pub const MACRO_TOPICS: &[(u8, &str)] = &[
    (1, "Romance e Relacionamentos"),
    (2, "Vida no Crime e Violência"),
    (3, "Festa, Dança e Diversão"),
    (4, "Ostentação e Luxo"),
    (5, "Sofrimento, Saudade e Melancolia"),
    (6, "Sexualidade e Sedução"),
    (7, "Família e Maternidade"),
    (8, "Superação e Fé"),
];

/// Sampling temperatures, cycled across the inferences of one pair.
pub const TEMPERATURES: &[f32] = &[0.1, 0.4, 0.7, 0.9, 1.0];

const POSITIVE_MODE: u8 = 4;
const MAX_POSITIVE_STD: f64 = 1.5;
const PREVIEW_CHARS: usize = 50;

/// How each (excerpt, topic) pair is sampled.
#[derive(Debug, Clone)]
pub struct ClassifyPlan {
    pub inferences: usize,
    pub temperatures: Vec<f32>,
    pub num_predict: u32,
    pub delay: Duration,
}

impl Default for ClassifyPlan {
    fn default() -> Self {
        Self {
            inferences: 5,
            temperatures: TEMPERATURES.to_vec(),
            num_predict: 5,
            delay: Duration::from_millis(100),
        }
    }
}

impl ClassifyPlan {
    fn temperature(&self, k: usize) -> f32 {
        if self.temperatures.is_empty() {
            0.7
        } else {
            self.temperatures[k % self.temperatures.len()]
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassifyJob {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Excerpts drawn from the input; all of them when larger than the table.
    pub sample: usize,
    pub seed: u64,
    pub plan: ClassifyPlan,
}

/// Agreement level of the sampled scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn from_std_dev(std_dev: f64) -> Self {
        if std_dev <= 0.5 {
            Self::High
        } else if std_dev <= 1.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "alta",
            Self::Medium => "media",
            Self::Low => "baixa",
        }
    }
}

/// Reduction of the valid scores of one pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyStats {
    pub mean: f64,
    pub mode: u8,
    pub std_dev: f64,
    pub positive: bool,
    pub confidence: Confidence,
}

impl ConsistencyStats {
    /// `None` when there is nothing to aggregate.
    pub fn from_scores(scores: &[u8]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let n = scores.len() as f64;
        let mean = scores.iter().map(|&s| f64::from(s)).sum::<f64>() / n;
        let variance = scores
            .iter()
            .map(|&s| {
                let diff = f64::from(s) - mean;
                diff * diff
            })
            .sum::<f64>()
            / n;
        let std_dev = variance.sqrt();
        let mode = first_mode(scores)?;
        Some(Self {
            mean,
            mode,
            std_dev,
            positive: mode >= POSITIVE_MODE && std_dev <= MAX_POSITIVE_STD,
            confidence: Confidence::from_std_dev(std_dev),
        })
    }
}

/// Most frequent score. On a tie the score sampled first wins.
fn first_mode(scores: &[u8]) -> Option<u8> {
    let mut counts: IndexMap<u8, usize> = IndexMap::new();
    for &score in scores {
        *counts.entry(score).or_insert(0) += 1;
    }
    let best = counts.values().copied().max()?;
    counts
        .into_iter()
        .find(|(_, count)| *count == best)
        .map(|(score, _)| score)
}

/// First digit in `1..=5` found in a model reply.
pub fn parse_score(reply: &str) -> Option<u8> {
    reply
        .chars()
        .find(|c| ('1'..='5').contains(c))
        .and_then(|c| c.to_digit(10))
        .map(|d| d as u8)
}

/// Zero-shot relevance prompt on the 1-5 scale.
pub fn score_prompt(excerpt: &str, topic: &str) -> String {
    format!(
        "Avaliação da Relação Semântica.\n\
         Tópico: {topic}\n\
         Trecho: \"{excerpt}\"\n\n\
         Classifique a relação entre o trecho e o tópico na escala:\n\
         1: Nenhuma relação.\n\
         2: Relação fraca.\n\
         3: Relação moderada.\n\
         4: Relação forte.\n\
         5: Relação muito forte.\n\n\
         Responda EXCLUSIVAMENTE com um único número (1, 2, 3, 4 ou 5)."
    )
}

/// Valid scores of one pair and how many samples failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicScores {
    pub scores: Vec<u8>,
    pub failures: usize,
}

/// Sample the model `plan.inferences` times for one pair.
pub async fn score_topic<G>(
    generator: &G,
    excerpt: &str,
    topic: &str,
    plan: &ClassifyPlan,
) -> TopicScores
where
    G: TextGenerator + ?Sized,
{
    let prompt = score_prompt(excerpt, topic);
    let mut out = TopicScores::default();
    for k in 0..plan.inferences {
        let request = GenerateRequest {
            prompt: prompt.clone(),
            temperature: plan.temperature(k),
            num_predict: Some(plan.num_predict),
        };
        match generator.generate(&request).await {
            Ok(reply) => match parse_score(&reply) {
                Some(score) => out.scores.push(score),
                None => {
                    warn!(%topic, reply = %reply, "reply carried no score");
                    out.failures += 1;
                }
            },
            Err(err) => {
                warn!(%topic, %err, "scoring call failed");
                out.failures += 1;
            }
        }
        if !plan.delay.is_zero() {
            sleep(plan.delay).await;
        }
    }
    out
}

/// One output row per (excerpt, topic) pair with at least one valid score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRow {
    pub trecho_id: String,
    pub trecho_texto: String,
    pub topico_id: u8,
    pub topico_nome: String,
    pub scores_raw: String,
    pub n_validos: usize,
    pub media_score: f64,
    pub moda_score: u8,
    pub desvio_padrao: f64,
    pub classificado_positivo: u8,
    pub confianca: String,
}

impl Table for ClassificationRow {
    const COLUMNS: &'static [&'static str] = &[
        "trecho_id",
        "trecho_texto",
        "topico_id",
        "topico_nome",
        "scores_raw",
        "n_validos",
        "media_score",
        "moda_score",
        "desvio_padrao",
        "classificado_positivo",
        "confianca",
    ];
    const REQUIRED: &'static [&'static str] = &["trecho_id", "topico_id", "classificado_positivo"];
}

impl ClassificationRow {
    pub fn new(excerpt: &ExcerptRecord, topic_id: u8, topic: &str, scores: &[u8]) -> Option<Self> {
        let stats = ConsistencyStats::from_scores(scores)?;
        Some(Self {
            trecho_id: excerpt.tag_trecho.clone(),
            trecho_texto: preview(&excerpt.letra),
            topico_id: topic_id,
            topico_nome: topic.to_string(),
            scores_raw: format_scores(scores),
            n_validos: scores.len(),
            media_score: round2(stats.mean),
            moda_score: stats.mode,
            desvio_padrao: round2(stats.std_dev),
            classificado_positivo: u8::from(stats.positive),
            confianca: stats.confidence.as_str().to_string(),
        })
    }
}

fn preview(text: &str) -> String {
    let head: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}

fn format_scores(scores: &[u8]) -> String {
    let joined = scores
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{joined}]")
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Deterministic sample of at most `n` excerpts.
pub fn sample_excerpts(excerpts: &[ExcerptRecord], n: usize, seed: u64) -> Vec<ExcerptRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    excerpts
        .choose_multiple(&mut rng, n.min(excerpts.len()))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct ClassifyOutcome {
    pub rows: Vec<ClassificationRow>,
    pub calls: usize,
    pub failed_calls: usize,
    /// Pairs for which every sample failed.
    pub failed_pairs: usize,
}

/// Score every excerpt against every macro-topic, one call at a time.
pub async fn classify_excerpts<G>(
    generator: &G,
    excerpts: &[ExcerptRecord],
    plan: &ClassifyPlan,
) -> ClassifyOutcome
where
    G: TextGenerator + ?Sized,
{
    let mut outcome = ClassifyOutcome::default();
    for (idx, excerpt) in excerpts.iter().enumerate() {
        info!(excerpt = idx + 1, total = excerpts.len(), id = %excerpt.tag_trecho, "classifying excerpt");
        for &(topic_id, topic) in MACRO_TOPICS {
            let TopicScores { scores, failures } =
                score_topic(generator, &excerpt.letra, topic, plan).await;
            outcome.calls += plan.inferences;
            outcome.failed_calls += failures;
            match ClassificationRow::new(excerpt, topic_id, topic, &scores) {
                Some(row) => outcome.rows.push(row),
                None => {
                    warn!(id = %excerpt.tag_trecho, %topic, "no valid score for topic");
                    outcome.failed_pairs += 1;
                }
            }
        }
    }
    outcome
}

/// Sample excerpts from `job.input`, classify them, write the result table.
#[instrument(skip_all, fields(input = %job.input.display()))]
pub async fn run<G>(job: &ClassifyJob, generator: &G) -> Result<ClassifyOutcome, PipelineError>
where
    G: TextGenerator + ?Sized,
{
    let excerpts = load_excerpts(&job.input)?;
    let sample = sample_excerpts(&excerpts, job.sample, job.seed);
    info!(
        excerpts = sample.len(),
        topics = MACRO_TOPICS.len(),
        estimated_calls = sample.len() * MACRO_TOPICS.len() * job.plan.inferences,
        "starting self-consistency classification"
    );

    let outcome = classify_excerpts(generator, &sample, &job.plan).await;
    write_table(&job.output, &outcome.rows)?;
    let positives = outcome
        .rows
        .iter()
        .filter(|row| row.classificado_positivo == 1)
        .count();
    info!(
        rows = outcome.rows.len(),
        positives,
        calls = outcome.calls,
        failed_calls = outcome.failed_calls,
        failed_pairs = outcome.failed_pairs,
        path = %job.output.display(),
        "wrote classification table"
    );
    Ok(outcome)
}
