//! Lyric tables and the excerpt preprocessing stages.

pub mod dedup;
pub mod excerpts;
pub mod segment;
pub mod songs;

use std::{fs::File, path::Path};

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::error::PipelineError;

/// A persisted tabular row type with a fixed column schema.
pub trait Table: Serialize + DeserializeOwned {
    /// Column order used when writing.
    const COLUMNS: &'static [&'static str];
    /// Columns a reader refuses to work without.
    const REQUIRED: &'static [&'static str];
}

/// Read every row of `path`, checking the header against `T::REQUIRED` first.
pub fn read_table<T: Table>(path: &Path) -> Result<Vec<T>, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::MissingInput {
            path: path.to_path_buf(),
        });
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_path(path)
        .map_err(|e| PipelineError::csv(path, e))?;
    let headers = reader
        .headers()
        .map_err(|e| PipelineError::csv(path, e))?
        .clone();
    require_columns(&headers, T::REQUIRED)?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<T>() {
        rows.push(result.map_err(|e| PipelineError::csv(path, e))?);
    }
    debug!(path = %path.display(), rows = rows.len(), "read table");
    Ok(rows)
}

/// Write `rows` under a `T::COLUMNS` header, even when there are no rows.
pub fn write_table<T: Table>(path: &Path, rows: &[T]) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer
        .write_record(T::COLUMNS)
        .map_err(|e| PipelineError::csv(path, e))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| PipelineError::csv(path, e))?;
    }
    writer.flush().map_err(|e| PipelineError::io(path, e))?;
    debug!(path = %path.display(), rows = rows.len(), "wrote table");
    Ok(())
}

/// Fail with the available column list when any of `required` is absent.
pub fn require_columns(headers: &csv::StringRecord, required: &[&str]) -> Result<(), PipelineError> {
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(PipelineError::MissingColumn {
                column: (*column).to_string(),
                available: headers.iter().map(str::to_string).collect(),
            });
        }
    }
    Ok(())
}

/// Serde helpers for integer cells that other tools may write as `2023.0`.
pub(crate) mod lenient {
    use serde::{de, Deserialize, Deserializer};

    fn parse(raw: &str) -> Option<Result<i64, String>> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
            return None;
        }
        if let Ok(value) = raw.parse::<i64>() {
            return Some(Ok(value));
        }
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() && value.fract() == 0.0 => Some(Ok(value as i64)),
            _ => Some(Err(format!("not an integer: {raw:?}"))),
        }
    }

    pub fn opt_int<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<i64>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().and_then(parse) {
            None => Ok(None),
            Some(Ok(value)) => T::try_from(value)
                .map(Some)
                .map_err(|_| de::Error::custom(format!("integer out of range: {value}"))),
            Some(Err(msg)) => Err(de::Error::custom(msg)),
        }
    }

    pub fn count<'de, D>(deserializer: D) -> Result<usize, D::Error>
    where
        D: Deserializer<'de>,
    {
        opt_int::<D, usize>(deserializer).map(Option::unwrap_or_default)
    }
}
