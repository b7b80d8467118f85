use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use chrono::{Days, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{MoodError, Result};
use crate::models::MoodEntry;

pub const DEFAULT_DAYS: u32 = 180;
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(400);

const MIN_SCORE: u8 = 1;
const MAX_SCORE: u8 = 5;
const OUTLIER_CHANCE: f64 = 0.02;

pub fn note_for_score(score: u8) -> &'static str {
    if score >= 4 {
        "Feeling good"
    } else if score >= 3 {
        "Neutral mood"
    } else {
        "Feeling low"
    }
}

/// Synthetic history of `days` entries ending on `end`, oldest first.
///
/// Scores follow a slow weekly wave with uniform noise, and about one day in
/// fifty is replaced by an extreme 1 or 5.
pub fn generate_entries(days: u32, end: NaiveDate, seed: u64) -> Vec<MoodEntry> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut entries = Vec::with_capacity(days as usize);

    for i in 0..days {
        let Some(date) = end.checked_sub_days(Days::new(u64::from(i))) else {
            break;
        };
        let wave = (f64::from(i) / 7.0).sin() * 0.6;
        let noise: f64 = rng.gen_range(-0.9..0.9);
        let mut score = (3.0 + wave + noise)
            .clamp(f64::from(MIN_SCORE), f64::from(MAX_SCORE))
            .round() as u8;

        if rng.gen_bool(OUTLIER_CHANCE) {
            score = if rng.gen_bool(0.5) { MIN_SCORE } else { MAX_SCORE };
        }

        entries.push(MoodEntry {
            id: date.to_string(),
            date,
            score,
            note: Some(note_for_score(score).to_string()),
        });
    }

    entries.reverse();
    entries
}

/// Mock remote fetch: waits `latency`, then returns a generated history ending today.
pub async fn fetch_mock_entries(days: u32, latency: Duration, seed: u64) -> Vec<MoodEntry> {
    debug!(days, latency_ms = latency.as_millis() as u64, seed, "fetching mock entries");
    tokio::time::sleep(latency).await;
    generate_entries(days, Utc::now().date_naive(), seed)
}

/// Boundary check for imported data: scores in range and dates never going backward.
pub fn validate_entries(entries: &[MoodEntry]) -> Result<()> {
    let mut previous: Option<NaiveDate> = None;

    for entry in entries {
        if !(MIN_SCORE..=MAX_SCORE).contains(&entry.score) {
            return Err(MoodError::ScoreOutOfRange {
                id: entry.id.clone(),
                score: entry.score,
            });
        }
        if let Some(prev) = previous {
            if entry.date < prev {
                return Err(MoodError::UnorderedDates {
                    previous: prev,
                    next: entry.date,
                });
            }
        }
        previous = Some(entry.date);
    }

    Ok(())
}

#[derive(Deserialize)]
struct CsvRow {
    id: Option<String>,
    date: NaiveDate,
    score: u8,
    note: Option<String>,
}

impl CsvRow {
    fn into_entry(self) -> MoodEntry {
        MoodEntry {
            id: self
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("entry-{}", Uuid::new_v4())),
            date: self.date,
            score: self.score,
            note: self.note.filter(|note| !note.is_empty()),
        }
    }
}

pub fn read_csv(path: &Path) -> anyhow::Result<Vec<MoodEntry>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut entries = Vec::new();

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("bad row {} in {}", line + 1, path.display()))?;
        entries.push(row.into_entry());
    }

    Ok(entries)
}

pub fn read_json(path: &Path) -> anyhow::Result<Vec<MoodEntry>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let entries = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(entries)
}

pub fn load_entries(path: &Path) -> anyhow::Result<Vec<MoodEntry>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let entries = match extension.as_deref() {
        Some("csv") => read_csv(path)?,
        Some("json") => read_json(path)?,
        other => {
            return Err(MoodError::UnsupportedFormat(other.unwrap_or("none").to_string()).into())
        }
    };

    validate_entries(&entries).with_context(|| format!("invalid data in {}", path.display()))?;
    info!(count = entries.len(), path = %path.display(), "loaded entries");
    Ok(entries)
}

pub fn write_csv(path: &Path, entries: &[MoodEntry]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(["id", "date", "score", "note"])?;
    for entry in entries {
        writer.write_record([
            entry.id.clone(),
            entry.date.to_string(),
            entry.score.to_string(),
            entry.note.clone().unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
