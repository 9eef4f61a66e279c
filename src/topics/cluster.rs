//! Groups short documents (refined themes or lyric excerpts) into a topic
//! table.
//!
//! With the `embeddings` feature, documents are embedded with fastembed and
//! clustered greedily by cosine similarity. Without it, identical documents
//! form a cluster. Clusters below the minimum size fold into topic `-1`.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::data::Table;

pub const OUTLIER_TOPIC: i64 = -1;
pub const SIMILARITY_THRESHOLD: f32 = 0.85;
const NAME_WORDS: usize = 4;

/// One row of a topic table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRow {
    #[serde(rename = "Topic")]
    pub topic: i64,
    #[serde(rename = "Count")]
    pub count: usize,
    #[serde(rename = "Name")]
    pub name: String,
}

impl Table for TopicRow {
    const COLUMNS: &'static [&'static str] = &["Topic", "Count", "Name"];
    const REQUIRED: &'static [&'static str] = &["Topic", "Count", "Name"];
}

/// Words allowed into topic names.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    stopwords: HashSet<String>,
    document_frequency: HashMap<String, usize>,
    min_document_frequency: usize,
}

impl Vocabulary {
    /// Every word qualifies.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Drops `stopwords` and words found in fewer than
    /// `min_document_frequency` of `documents`.
    pub fn build(documents: &[String], stopwords: &[&str], min_document_frequency: usize) -> Self {
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for document in documents {
            let distinct: HashSet<String> = words(document).collect();
            for word in distinct {
                *document_frequency.entry(word).or_insert(0) += 1;
            }
        }
        Self {
            stopwords: stopwords.iter().map(|w| w.to_lowercase()).collect(),
            document_frequency,
            min_document_frequency,
        }
    }

    pub fn admits(&self, word: &str) -> bool {
        if self.stopwords.contains(word) {
            return false;
        }
        self.min_document_frequency <= 1
            || self.document_frequency.get(word).copied().unwrap_or(0) >= self.min_document_frequency
    }
}

/// Lowercased alphanumeric tokens longer than one character.
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 1)
        .map(str::to_lowercase)
}

/// Cluster themes and build the topic table.
pub fn cluster_themes(themes: &[String], min_topic_size: usize) -> Vec<TopicRow> {
    cluster_documents(themes, min_topic_size, &Vocabulary::unrestricted())
}

/// Cluster documents and build the topic table, naming topics from `vocabulary`.
pub fn cluster_documents(
    documents: &[String],
    min_topic_size: usize,
    vocabulary: &Vocabulary,
) -> Vec<TopicRow> {
    let assignments = assign_clusters(documents);
    topic_table_with(documents, &assignments, min_topic_size, vocabulary)
}

#[cfg(feature = "embeddings")]
pub fn assign_clusters(documents: &[String]) -> Vec<usize> {
    match embed(documents) {
        Ok(embeddings) => cluster_embeddings(&embeddings, SIMILARITY_THRESHOLD),
        Err(err) => {
            warn!(%err, "embedding failed; grouping identical documents");
            exact_clusters(documents)
        }
    }
}

#[cfg(not(feature = "embeddings"))]
pub fn assign_clusters(documents: &[String]) -> Vec<usize> {
    if !documents.is_empty() {
        warn!("built without `embeddings`; grouping identical documents");
    }
    exact_clusters(documents)
}

#[cfg(feature = "embeddings")]
fn embed(documents: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
    use fastembed::TextEmbedding;

    if documents.is_empty() {
        return Ok(Vec::new());
    }
    let mut embedder = TextEmbedding::try_new(Default::default())?;
    let texts: Vec<&str> = documents.iter().map(String::as_str).collect();
    Ok(embedder.embed(texts, None)?)
}

/// Identical strings share a cluster; ids follow first appearance.
pub fn exact_clusters(themes: &[String]) -> Vec<usize> {
    let mut ids: HashMap<&str, usize> = HashMap::new();
    themes
        .iter()
        .map(|theme| {
            let next = ids.len();
            *ids.entry(theme.as_str()).or_insert(next)
        })
        .collect()
}

/// Greedy single pass: join the first cluster whose seed vector is similar
/// enough, otherwise open a new one.
pub fn cluster_embeddings(embeddings: &[Vec<f32>], threshold: f32) -> Vec<usize> {
    let mut seeds: Vec<&Vec<f32>> = Vec::new();
    let mut assignments = Vec::with_capacity(embeddings.len());
    for vector in embeddings {
        if let Some(idx) = seeds.iter().position(|seed| cosine(vector, seed) >= threshold) {
            assignments.push(idx);
        } else {
            seeds.push(vector);
            assignments.push(seeds.len() - 1);
        }
    }
    assignments
}

pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot = a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
    let norm_a = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Build the table from cluster assignments. The outlier row comes first,
/// then topics numbered from 0 by descending size.
pub fn topic_table(themes: &[String], assignments: &[usize], min_topic_size: usize) -> Vec<TopicRow> {
    topic_table_with(themes, assignments, min_topic_size, &Vocabulary::unrestricted())
}

pub fn topic_table_with(
    themes: &[String],
    assignments: &[usize],
    min_topic_size: usize,
    vocabulary: &Vocabulary,
) -> Vec<TopicRow> {
    let mut members: IndexMap<usize, Vec<&str>> = IndexMap::new();
    for (theme, &cluster) in themes.iter().zip(assignments) {
        members.entry(cluster).or_default().push(theme.as_str());
    }

    let mut outliers: Vec<&str> = Vec::new();
    let mut clusters: Vec<Vec<&str>> = Vec::new();
    for (_, group) in members {
        if group.len() < min_topic_size {
            outliers.extend(group);
        } else {
            clusters.push(group);
        }
    }
    // stable: equal sizes keep first-appearance order
    clusters.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut rows = Vec::with_capacity(clusters.len() + 1);
    if !outliers.is_empty() {
        rows.push(TopicRow {
            topic: OUTLIER_TOPIC,
            count: outliers.len(),
            name: topic_name_with(OUTLIER_TOPIC, &outliers, vocabulary),
        });
    }
    for (idx, group) in clusters.iter().enumerate() {
        let topic = idx as i64;
        rows.push(TopicRow {
            topic,
            count: group.len(),
            name: topic_name_with(topic, group, vocabulary),
        });
    }
    rows
}

/// `<topic>_<w1>_<w2>_...` from the most frequent words of the members.
pub fn topic_name(topic: i64, members: &[&str]) -> String {
    topic_name_with(topic, members, &Vocabulary::unrestricted())
}

pub fn topic_name_with(topic: i64, members: &[&str], vocabulary: &Vocabulary) -> String {
    let mut freq: IndexMap<String, usize> = IndexMap::new();
    for member in members {
        for word in words(member).filter(|w| vocabulary.admits(w)) {
            *freq.entry(word).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(String, usize)> = freq.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    let top: Vec<String> = ranked
        .into_iter()
        .take(NAME_WORDS)
        .map(|(word, _)| word)
        .collect();
    if top.is_empty() {
        topic.to_string()
    } else {
        format!("{topic}_{}", top.join("_"))
    }
}
