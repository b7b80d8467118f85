use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: String,
    pub date: NaiveDate,
    pub score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedPoint {
    pub date: NaiveDate,
    pub score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_anomaly: Option<bool>,
}

impl ProcessedPoint {
    pub fn flagged(&self) -> bool {
        self.is_anomaly.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyBucket {
    pub week_end: NaiveDate,
    pub avg: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub length: usize,
}

/// Coarse label for an average score, used in summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodBand {
    Good,
    Neutral,
    Low,
}

impl MoodBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 4.0 {
            MoodBand::Good
        } else if score >= 3.0 {
            MoodBand::Neutral
        } else {
            MoodBand::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MoodBand::Good => "good",
            MoodBand::Neutral => "neutral",
            MoodBand::Low => "low",
        }
    }
}

/// Everything a presentation layer needs from one pipeline run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub points: Vec<ProcessedPoint>,
    pub weekly: Vec<WeeklyBucket>,
    pub streaks: Vec<Streak>,
    pub anomaly_count: usize,
    pub trend_delta: Option<f64>,
}
