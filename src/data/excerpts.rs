//! Excerpt rows and the identifiers that tie them to their song.

use std::{cmp::Ordering, path::Path};

use serde::{Deserialize, Serialize};

use super::{lenient, read_table, write_table, Table};
use crate::error::PipelineError;

const EXCERPT_MARKER: &str = "_excerpt";

/// One excerpt of one song, as written by the segmenter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcerptRecord {
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub ranking_posicao: Option<u32>,
    #[serde(default)]
    pub titulo: String,
    pub tag_musica: String,
    pub tag_trecho: String,
    /// Excerpt text.
    #[serde(default)]
    pub letra: String,
    #[serde(default)]
    pub artista: String,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub ano: Option<i32>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub contagem_palavras: usize,
}

impl ExcerptRecord {
    /// Position encoded in `tag_trecho`, if it ends in digits.
    pub fn position(&self) -> Option<usize> {
        parse_position(&self.tag_trecho)
    }
}

impl Table for ExcerptRecord {
    const COLUMNS: &'static [&'static str] = &[
        "ranking_posicao",
        "titulo",
        "tag_musica",
        "tag_trecho",
        "letra",
        "artista",
        "ano",
        "contagem_palavras",
    ];
    const REQUIRED: &'static [&'static str] = &["tag_musica", "tag_trecho", "letra"];
}

/// `<song>_excerpt<position>`.
pub fn excerpt_tag(song_tag: &str, position: usize) -> String {
    format!("{song_tag}{EXCERPT_MARKER}{position}")
}

/// Trailing integer of an excerpt tag. Accepts tags from older runs that used
/// a different marker, e.g. `musica3_trecho12`.
pub fn parse_position(tag: &str) -> Option<usize> {
    let digits_start = tag
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(idx, _)| idx)?;
    tag[digits_start..].parse().ok()
}

/// Number of whitespace-delimited tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Order song tags so that `musica2` sorts before `musica10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    fn split(tag: &str) -> (&str, Option<u64>) {
        let cut = tag.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        (&tag[..cut], tag[cut..].parse().ok())
    }
    let (prefix_a, num_a) = split(a);
    let (prefix_b, num_b) = split(b);
    prefix_a
        .cmp(prefix_b)
        .then_with(|| num_a.cmp(&num_b))
        .then_with(|| a.cmp(b))
}

pub fn load_excerpts(path: &Path) -> Result<Vec<ExcerptRecord>, PipelineError> {
    read_table(path)
}

pub fn save_excerpts(path: &Path, rows: &[ExcerptRecord]) -> Result<(), PipelineError> {
    write_table(path, rows)
}
