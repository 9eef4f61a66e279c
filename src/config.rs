//! Runtime configuration utilities for lyric-topics.

use std::{
    env,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use anyhow::Context;
use chrono::Local;
use walkdir::WalkDir;

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root folder for scraped song tables.
    pub data_dir: PathBuf,
    /// Root folder for derived tables (excerpts, classifications, topics).
    pub outputs_dir: PathBuf,
    /// Base URL of the Ollama-compatible inference server.
    pub llm_base_url: String,
    /// Model name sent with each generation request.
    pub llm_model: String,
    /// Pause between consecutive generation requests.
    pub llm_request_delay_ms: u64,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));
        let outputs_dir = env::var("OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./outputs"));
        let llm_base_url =
            env::var("LLM_BASE_URL").unwrap_or_else(|_| "http://localhost:11434".to_string());
        let llm_model = env::var("LLM_MODEL").unwrap_or_else(|_| "llama3:8b".to_string());
        let llm_request_delay_ms = env::var("LLM_REQUEST_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);

        std::fs::create_dir_all(&data_dir).context("creating data dir")?;
        std::fs::create_dir_all(&outputs_dir).context("creating outputs dir")?;

        Ok(Self {
            data_dir,
            outputs_dir,
            llm_base_url,
            llm_model,
            llm_request_delay_ms,
        })
    }

    /// Convenience helper for derived output path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }

    /// Timestamped output path, e.g. `musicas_por_trechos_20251116_112423.csv`.
    pub fn stamped_output(&self, stem: &str) -> PathBuf {
        self.join_output(stamped_file_name(stem))
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.llm_request_delay_ms)
    }
}

/// `<stem>_<YYYYmmdd_HHMMSS>.csv` using local time.
pub fn stamped_file_name(stem: &str) -> String {
    format!("{stem}_{}.csv", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Most recently modified `.csv` directly under `dir` whose name starts with
/// `prefix` and passes `keep`.
pub fn latest_csv<F>(dir: &Path, prefix: &str, keep: F) -> Option<PathBuf>
where
    F: Fn(&str) -> bool,
{
    WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            if !name.starts_with(prefix) || !name.ends_with(".csv") || !keep(&name) {
                return None;
            }
            let modified = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            Some((modified, entry.into_path()))
        })
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, path)| path)
}
