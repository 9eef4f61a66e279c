//! Cleans model-generated theme lines and drops chatbot filler.

use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, instrument};

use super::cluster::{cluster_themes, TopicRow, OUTLIER_TOPIC};
use crate::{
    data::{read_table, write_table},
    error::PipelineError,
    llm::themes::ThemeRow,
};

const MIN_THEME_CHARS: usize = 5;
const REMOVED_EXAMPLES: usize = 10;

/// Phrases that mark a line as conversation rather than a theme.
pub const JUNK_PHRASES: &[&str] = &[
    "aqui estao",
    "aqui están",
    "here are",
    "sugiro",
    "topicos sugeridos",
    "temas abordados",
    "seguintes topicos",
    "describe the subjects",
    "topic suggestions",
    "lista de topicos",
    "assuntos abordados",
    "descrevem os assuntos",
    "tópicos que descrevem",
    "cinco tópicos",
    "5 tópicos",
    "futebol",
];

static LEADING_ENUMERATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[.\-)]\s*").expect("valid enumerator regex"));
static LEADING_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[•*\->]\s*").expect("valid bullet regex"));

#[derive(Debug, Clone)]
pub struct RefineJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub min_topic_size: usize,
}

/// Strip list markers and edge punctuation, then lowercase.
pub fn clean_theme(raw: &str) -> String {
    let text = LEADING_ENUMERATOR.replace(raw, "");
    let text = LEADING_BULLET.replace(&text, "");
    text.trim_matches(|c: char| ".,:;!?'\" ".contains(c))
        .to_lowercase()
}

/// A cleaned theme is kept when it is long enough and carries no filler phrase.
pub fn is_usable(theme: &str) -> bool {
    theme.trim().chars().count() > MIN_THEME_CHARS
        && !JUNK_PHRASES.iter().any(|junk| theme.contains(junk))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Refined {
    pub kept: Vec<String>,
    pub removed: Vec<String>,
}

pub fn refine<'a>(raw: impl IntoIterator<Item = &'a str>) -> Refined {
    let mut out = Refined::default();
    for theme in raw.into_iter().map(clean_theme) {
        if is_usable(&theme) {
            out.kept.push(theme);
        } else {
            out.removed.push(theme);
        }
    }
    out
}

/// Clean the theme table at `job.input`, cluster it, write the topic table.
#[instrument(skip_all, fields(input = %job.input.display()))]
pub fn run(job: &RefineJob) -> Result<Vec<TopicRow>, PipelineError> {
    let rows: Vec<ThemeRow> = read_table(&job.input)?;
    let raw: Vec<&str> = rows
        .iter()
        .map(|row| row.tema.as_str())
        .filter(|tema| !tema.trim().is_empty())
        .collect();
    info!(themes = raw.len(), "loaded raw themes");

    let refined = refine(raw.iter().copied());
    info!(
        kept = refined.kept.len(),
        removed = refined.removed.len(),
        "filtered themes"
    );
    for example in refined.removed.iter().take(REMOVED_EXAMPLES) {
        info!(theme = %example, "removed as filler");
    }

    let topics = cluster_themes(&refined.kept, job.min_topic_size);
    write_table(&job.output, &topics)?;

    let outliers: usize = topics
        .iter()
        .filter(|t| t.topic == OUTLIER_TOPIC)
        .map(|t| t.count)
        .sum();
    info!(
        topics = topics.len(),
        outliers,
        clustered = refined.kept.len() - outliers,
        path = %job.output.display(),
        "wrote topic table"
    );
    Ok(topics)
}
