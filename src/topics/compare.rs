//! Side-by-side summary of two topic tables, e.g. a baseline run against a
//! run with stopwords removed.

use std::path::PathBuf;

use tracing::{info, instrument};

use super::cluster::{TopicRow, OUTLIER_TOPIC};
use crate::{data::read_table, error::PipelineError};

const TOP_TOPICS: usize = 5;

#[derive(Debug, Clone)]
pub struct CompareJob {
    pub baseline: PathBuf,
    pub variant: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSummary {
    pub topics: usize,
    pub documents: usize,
    pub outliers: usize,
    /// Largest non-outlier topics in table order.
    pub top: Vec<TopicRow>,
}

impl TableSummary {
    pub fn from_rows(rows: &[TopicRow]) -> Self {
        Self {
            topics: rows.len(),
            documents: rows.iter().map(|r| r.count).sum(),
            outliers: rows
                .iter()
                .filter(|r| r.topic == OUTLIER_TOPIC)
                .map(|r| r.count)
                .sum(),
            top: rows
                .iter()
                .filter(|r| r.topic != OUTLIER_TOPIC)
                .take(TOP_TOPICS)
                .cloned()
                .collect(),
        }
    }

    /// Outlier documents as a percentage of all documents.
    pub fn outlier_pct(&self) -> f64 {
        if self.documents == 0 {
            0.0
        } else {
            self.outliers as f64 * 100.0 / self.documents as f64
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comparison {
    pub baseline: TableSummary,
    pub variant: TableSummary,
    pub topic_delta: i64,
    pub outlier_delta: i64,
}

pub fn compare(baseline: &[TopicRow], variant: &[TopicRow]) -> Comparison {
    let baseline = TableSummary::from_rows(baseline);
    let variant = TableSummary::from_rows(variant);
    Comparison {
        topic_delta: variant.topics as i64 - baseline.topics as i64,
        outlier_delta: variant.outliers as i64 - baseline.outliers as i64,
        baseline,
        variant,
    }
}

#[instrument(skip_all)]
pub fn run(job: &CompareJob) -> Result<Comparison, PipelineError> {
    let baseline: Vec<TopicRow> = read_table(&job.baseline)?;
    let variant: Vec<TopicRow> = read_table(&job.variant)?;
    let comparison = compare(&baseline, &variant);

    for (label, summary) in [("baseline", &comparison.baseline), ("variant", &comparison.variant)] {
        info!(
            table = label,
            topics = summary.topics,
            documents = summary.documents,
            outliers = summary.outliers,
            outlier_pct = summary.outlier_pct(),
            "topic table"
        );
        for row in &summary.top {
            info!(table = label, topic = row.topic, count = row.count, name = %row.name, "top topic");
        }
    }
    info!(
        topic_delta = comparison.topic_delta,
        outlier_delta = comparison.outlier_delta,
        "variant minus baseline"
    );
    Ok(comparison)
}
