//! Splits full lyrics into ordered excerpts.

use std::{collections::BTreeMap, path::PathBuf};

use indexmap::IndexSet;
use tracing::{info, instrument};

use super::{
    excerpts::{excerpt_tag, save_excerpts, word_count, ExcerptRecord},
    songs::{load_songs, song_tag, SongRecord},
};
use crate::error::PipelineError;

const PROGRESS_EVERY: usize = 50;

/// Input and output locations of one segmentation run.
#[derive(Debug, Clone)]
pub struct SegmentJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Figures describing a segmentation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentReport {
    pub songs: usize,
    pub excerpts: usize,
    pub artists: usize,
    pub mean_per_song: f64,
    pub min_per_song: usize,
    pub max_per_song: usize,
    pub median_per_song: f64,
    /// Excerpt count per release year, for excerpts whose song has one.
    pub per_year: BTreeMap<i32, usize>,
}

/// Split lyric text into verses.
///
/// Explicit line breaks win. Without them, a new verse starts wherever a
/// whitespace character is followed by an uppercase letter. When neither
/// finds anything, the whole text is the only verse.
pub fn split_verses(text: &str) -> Vec<String> {
    let verses: Vec<String> = if text.contains('\n') {
        non_empty_trimmed(text.split('\n'))
    } else {
        non_empty_trimmed(split_at_capitals(text).into_iter())
    };
    if verses.is_empty() {
        vec![text.to_string()]
    } else {
        verses
    }
}

fn non_empty_trimmed<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<String> {
    parts
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Cut before every uppercase letter that directly follows whitespace.
/// The whitespace stays with the previous piece.
fn split_at_capitals(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut prev_ws = false;
    for (idx, ch) in text.char_indices() {
        if prev_ws && ch.is_uppercase() {
            pieces.push(&text[start..idx]);
            start = idx;
        }
        prev_ws = ch.is_whitespace();
    }
    pieces.push(&text[start..]);
    pieces
}

/// Excerpts of a single song, positions starting at 1.
pub fn segment_song(tag_musica: &str, song: &SongRecord) -> Vec<ExcerptRecord> {
    split_verses(song.lyric())
        .into_iter()
        .enumerate()
        .map(|(idx, verse)| ExcerptRecord {
            ranking_posicao: song.ranking_posicao,
            titulo: song.titulo.clone(),
            tag_musica: tag_musica.to_string(),
            tag_trecho: excerpt_tag(tag_musica, idx + 1),
            contagem_palavras: word_count(&verse),
            letra: verse,
            artista: song.artista.clone(),
            ano: song.ano,
        })
        .collect()
}

/// Excerpts of every song, songs tagged by their 1-based row order.
pub fn segment_songs(songs: &[SongRecord]) -> Vec<ExcerptRecord> {
    let mut out = Vec::new();
    for (idx, song) in songs.iter().enumerate() {
        out.extend(segment_song(&song_tag(idx + 1), song));
        if (idx + 1) % PROGRESS_EVERY == 0 {
            info!(
                processed = idx + 1,
                total = songs.len(),
                excerpts = out.len(),
                "segmenting songs"
            );
        }
    }
    out
}

impl SegmentReport {
    pub fn from_excerpts(songs: usize, excerpts: &[ExcerptRecord]) -> Self {
        let mut per_song: Vec<usize> = Vec::new();
        let mut last_tag: Option<&str> = None;
        let mut artists = IndexSet::new();
        let mut per_year = BTreeMap::new();
        for excerpt in excerpts {
            if last_tag != Some(excerpt.tag_musica.as_str()) {
                per_song.push(0);
                last_tag = Some(excerpt.tag_musica.as_str());
            }
            if let Some(count) = per_song.last_mut() {
                *count += 1;
            }
            artists.insert(excerpt.artista.as_str());
            if let Some(year) = excerpt.ano {
                *per_year.entry(year).or_insert(0) += 1;
            }
        }
        per_song.sort_unstable();

        let median_per_song = match per_song.len() {
            0 => 0.0,
            n if n % 2 == 1 => per_song[n / 2] as f64,
            n => (per_song[n / 2 - 1] + per_song[n / 2]) as f64 / 2.0,
        };
        Self {
            songs,
            excerpts: excerpts.len(),
            artists: artists.len(),
            mean_per_song: if songs == 0 {
                0.0
            } else {
                excerpts.len() as f64 / songs as f64
            },
            min_per_song: per_song.first().copied().unwrap_or(0),
            max_per_song: per_song.last().copied().unwrap_or(0),
            median_per_song,
            per_year,
        }
    }
}

/// Read songs from `job.input`, segment them, and write the excerpt table.
#[instrument(skip_all, fields(input = %job.input.display()))]
pub fn run(job: &SegmentJob) -> Result<SegmentReport, PipelineError> {
    let songs = load_songs(&job.input)?;
    info!(songs = songs.len(), "loaded songs");

    let excerpts = segment_songs(&songs);
    save_excerpts(&job.output, &excerpts)?;

    let report = SegmentReport::from_excerpts(songs.len(), &excerpts);
    info!(
        songs = report.songs,
        excerpts = report.excerpts,
        artists = report.artists,
        mean = report.mean_per_song,
        min = report.min_per_song,
        max = report.max_per_song,
        median = report.median_per_song,
        path = %job.output.display(),
        "wrote excerpt table"
    );
    for (year, count) in &report.per_year {
        info!(year, excerpts = count, "excerpts per year");
    }
    Ok(report)
}
