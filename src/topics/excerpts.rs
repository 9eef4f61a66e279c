//! Topic modeling directly over the cleaned excerpts.
//!
//! The baseline run names topics from every word. The stopword run drops
//! Portuguese function words and sung interjections, and only names a topic
//! with words that occur in at least two excerpts.

use std::path::PathBuf;

use tracing::{info, instrument};

use super::cluster::{cluster_documents, TopicRow, Vocabulary, OUTLIER_TOPIC};
use crate::{
    data::{excerpts::load_excerpts, write_table},
    error::PipelineError,
};

pub const MIN_DOCUMENT_FREQUENCY: usize = 2;
const TOP_TOPICS_LOGGED: usize = 5;

/// Vocal fillers that dominate choruses.
pub const INTERJECTIONS: &[&str] = &[
    "oh", "uou", "ah", "ooh", "uô", "oi", "iê", "ha", "eh", "uôu", "nanana", "ererê", "uh",
    "hmm", "hey", "laia",
];

pub const PORTUGUESE_STOPWORDS: &[&str] = &[
    "ser", "sou", "é", "era", "foi", "estou", "tô", "ta", "tá", "tava", "estar", "vamos", "vou",
    "ia", "ir", "ver", "vi", "vendo", "tipo", "dizer", "disse", "fala", "falar", "falou", "diz",
    "quer", "querer", "quero", "pode", "poder", "podia", "deve", "dever", "qual", "está", "tem",
    "têm", "tenho", "tinha", "ter", "ficar", "fica", "ficou", "ficando", "deixar", "deixa",
    "deixou", "nóis", "eu", "demais", "alguém", "pra", "pro", "pros", "q", "pq", "porque", "que",
    "se", "me", "te", "lhe", "ela", "ele", "elas", "eles", "cê", "você", "vocês", "tb", "oi", "iê",
    "ê", "ô", "ah", "oh", "ei", "uai", "oxe", "porra", "pá", "opa", "oba", "aê", "ae", "yeah",
    "la", "lá", "aí", "ai", "não", "todo", "a", "o", "as", "os", "de", "do", "da", "dos", "das",
    "em", "no", "na", "nos", "nas", "por", "para", "com", "sem", "sobre", "entre",
];

#[derive(Debug, Clone)]
pub struct ExcerptTopicJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub min_topic_size: usize,
    /// Filter stopwords and rare words out of topic names.
    pub stopwords: bool,
}

/// Naming vocabulary for `documents`.
pub fn vocabulary(documents: &[String], stopwords: bool) -> Vocabulary {
    if !stopwords {
        return Vocabulary::unrestricted();
    }
    let filtered: Vec<&str> = INTERJECTIONS
        .iter()
        .chain(PORTUGUESE_STOPWORDS)
        .copied()
        .collect();
    Vocabulary::build(documents, &filtered, MIN_DOCUMENT_FREQUENCY)
}

pub fn model_topics(documents: &[String], min_topic_size: usize, stopwords: bool) -> Vec<TopicRow> {
    cluster_documents(documents, min_topic_size, &vocabulary(documents, stopwords))
}

/// Cluster the excerpt texts of `job.input` and write the topic table.
#[instrument(skip_all, fields(input = %job.input.display(), stopwords = job.stopwords))]
pub fn run(job: &ExcerptTopicJob) -> Result<Vec<TopicRow>, PipelineError> {
    let documents: Vec<String> = load_excerpts(&job.input)?
        .into_iter()
        .map(|e| e.letra)
        .filter(|text| !text.trim().is_empty())
        .collect();
    info!(excerpts = documents.len(), "loaded excerpts for topic modeling");

    let topics = model_topics(&documents, job.min_topic_size, job.stopwords);
    write_table(&job.output, &topics)?;

    let outliers: usize = topics
        .iter()
        .filter(|t| t.topic == OUTLIER_TOPIC)
        .map(|t| t.count)
        .sum();
    info!(
        topics = topics.iter().filter(|t| t.topic != OUTLIER_TOPIC).count(),
        outliers,
        path = %job.output.display(),
        "wrote excerpt topic table"
    );
    for row in topics
        .iter()
        .filter(|t| t.topic != OUTLIER_TOPIC)
        .take(TOP_TOPICS_LOGGED)
    {
        info!(topic = row.topic, count = row.count, name = %row.name, "top topic");
    }
    Ok(topics)
}
