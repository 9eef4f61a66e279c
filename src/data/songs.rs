//! Scraped song records, one row per song.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{lenient, read_table, Table};
use crate::error::PipelineError;

/// A song as persisted by the scraper. The row order is the song identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRecord {
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub ranking_posicao: Option<u32>,
    pub titulo: String,
    pub artista: String,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub ano: Option<i32>,
    /// Full lyric text. An empty cell reads as an empty lyric.
    #[serde(default)]
    pub letra: Option<String>,
}

impl SongRecord {
    pub fn lyric(&self) -> &str {
        self.letra.as_deref().unwrap_or_default()
    }
}

impl Table for SongRecord {
    const COLUMNS: &'static [&'static str] = &["ranking_posicao", "titulo", "artista", "ano", "letra"];
    const REQUIRED: &'static [&'static str] = &["titulo", "artista", "letra"];
}

/// Song identifier for the 1-based row `index`.
pub fn song_tag(index: usize) -> String {
    format!("musica{index}")
}

pub fn load_songs(path: &Path) -> Result<Vec<SongRecord>, PipelineError> {
    read_table(path)
}
