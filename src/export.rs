use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use crate::models::{MoodEntry, ProcessedPoint};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub date: NaiveDate,
    pub score: u8,
    pub rolling: Option<f64>,
    pub is_anomaly: Option<bool>,
    pub note: String,
}

/// Pairs each processed point with the entry it was computed from.
///
/// `sources` must be the entries behind `points`, in the same order; for
/// `process_entries` output that is `range.filter_entries(entries)`.
pub fn export_rows(points: &[ProcessedPoint], sources: &[MoodEntry]) -> Vec<ExportRow> {
    points
        .iter()
        .zip(sources)
        .map(|(point, entry)| ExportRow {
            date: point.date,
            score: point.score,
            rolling: point.rolling,
            is_anomaly: point.is_anomaly,
            note: entry.note.clone().unwrap_or_default(),
        })
        .collect()
}

pub fn timestamped_filename(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}.csv", prefix, now.format("%Y%m%d-%H%M%S"))
}

pub fn write_csv(path: &Path, rows: &[ExportRow]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_to_dir(
    dir: &Path,
    prefix: &str,
    rows: &[ExportRow],
    now: DateTime<Utc>,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(timestamped_filename(prefix, now));
    write_csv(&path, rows)?;
    info!(rows = rows.len(), path = %path.display(), "export written");
    Ok(path)
}
