//! Removes repeated excerpts inside a song and closes the numbering gaps.

use std::{collections::HashSet, path::PathBuf};

use indexmap::{IndexMap, IndexSet};
use tracing::{info, instrument};

use super::excerpts::{excerpt_tag, load_excerpts, natural_cmp, save_excerpts, ExcerptRecord};
use crate::error::PipelineError;

const TOP_SONGS_LOGGED: usize = 10;

/// Input and output locations of one dedup run.
#[derive(Debug, Clone)]
pub struct DedupJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Duplicates removed from a single song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRemoval {
    pub tag_musica: String,
    pub titulo: String,
    pub artista: String,
    pub before: usize,
    pub after: usize,
    pub removed: usize,
}

/// Totals of a dedup pass. `before - removed == after` always holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupSummary {
    pub before: usize,
    pub after: usize,
    pub removed: usize,
    pub removed_pct: f64,
    pub songs: usize,
    pub songs_with_duplicates: usize,
    /// Songs that lost at least one excerpt, most removals first.
    pub per_song: Vec<SongRemoval>,
}

/// Cleaned excerpts plus the summary of what was dropped.
#[derive(Debug, Clone, Default)]
pub struct DedupOutcome {
    pub excerpts: Vec<ExcerptRecord>,
    pub summary: DedupSummary,
}

/// Drop later excerpts whose text repeats an earlier one of the same song,
/// then renumber each song's survivors `1..=n` in their original order.
///
/// Songs come out ordered by tag. Text is compared byte for byte and never
/// across songs.
pub fn deduplicate(excerpts: &[ExcerptRecord]) -> DedupOutcome {
    let mut by_song: IndexMap<&str, Vec<(usize, &ExcerptRecord)>> = IndexMap::new();
    for (row, excerpt) in excerpts.iter().enumerate() {
        by_song
            .entry(excerpt.tag_musica.as_str())
            .or_default()
            .push((row, excerpt));
    }
    by_song.sort_by(|a, _, b, _| natural_cmp(a, b));

    let mut kept = Vec::with_capacity(excerpts.len());
    let mut per_song = Vec::new();
    for (tag_musica, mut rows) in by_song {
        rows.sort_by_key(|(row, excerpt)| (excerpt.position().unwrap_or(usize::MAX), *row));

        let mut seen: HashSet<&str> = HashSet::new();
        let survivors: Vec<&ExcerptRecord> = rows
            .iter()
            .map(|(_, excerpt)| *excerpt)
            .filter(|excerpt| {
                let excerpt: &ExcerptRecord = *excerpt;
                seen.insert(excerpt.letra.as_str())
            })
            .collect();

        let removed = rows.len() - survivors.len();
        if removed > 0 {
            let first = rows[0].1;
            per_song.push(SongRemoval {
                tag_musica: tag_musica.to_string(),
                titulo: first.titulo.clone(),
                artista: first.artista.clone(),
                before: rows.len(),
                after: survivors.len(),
                removed,
            });
        }

        kept.extend(survivors.into_iter().enumerate().map(|(idx, excerpt)| ExcerptRecord {
            tag_trecho: excerpt_tag(tag_musica, idx + 1),
            ..excerpt.clone()
        }));
    }
    per_song.sort_by(|a, b| {
        b.removed
            .cmp(&a.removed)
            .then_with(|| natural_cmp(&a.tag_musica, &b.tag_musica))
    });

    let before = excerpts.len();
    let after = kept.len();
    let removed = before - after;
    let songs = kept
        .iter()
        .map(|e| e.tag_musica.as_str())
        .collect::<IndexSet<_>>()
        .len();
    DedupOutcome {
        summary: DedupSummary {
            before,
            after,
            removed,
            removed_pct: if before == 0 {
                0.0
            } else {
                removed as f64 * 100.0 / before as f64
            },
            songs,
            songs_with_duplicates: per_song.len(),
            per_song,
        },
        excerpts: kept,
    }
}

/// Read the excerpt table at `job.input`, deduplicate it, write the result.
#[instrument(skip_all, fields(input = %job.input.display()))]
pub fn run(job: &DedupJob) -> Result<DedupSummary, PipelineError> {
    let excerpts = load_excerpts(&job.input)?;
    info!(excerpts = excerpts.len(), "loaded excerpts");

    let DedupOutcome { excerpts, summary } = deduplicate(&excerpts);
    save_excerpts(&job.output, &excerpts)?;

    info!(
        before = summary.before,
        after = summary.after,
        removed = summary.removed,
        removed_pct = summary.removed_pct,
        "removed duplicate excerpts"
    );
    if summary.per_song.is_empty() {
        info!("no duplicate excerpts found");
    } else {
        info!(
            with_duplicates = summary.songs_with_duplicates,
            without_duplicates = summary.songs - summary.songs_with_duplicates,
            "songs affected"
        );
        for (rank, song) in summary.per_song.iter().take(TOP_SONGS_LOGGED).enumerate() {
            info!(
                rank = rank + 1,
                song = %song.tag_musica,
                title = %song.titulo,
                artist = %song.artista,
                before = song.before,
                after = song.after,
                "duplicates removed"
            );
        }
    }

    let artists = excerpts
        .iter()
        .map(|e| e.artista.as_str())
        .collect::<IndexSet<_>>()
        .len();
    let mean_per_song = if summary.songs == 0 {
        0.0
    } else {
        summary.after as f64 / summary.songs as f64
    };
    info!(
        excerpts = summary.after,
        songs = summary.songs,
        artists,
        mean_per_song,
        path = %job.output.display(),
        "wrote cleaned excerpt table"
    );
    Ok(summary)
}
