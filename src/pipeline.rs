use chrono::NaiveDate;
use tracing::debug;

use crate::analysis::{
    compute_rolling_average, detect_streaks, flag_anomalies, round2, weekly_averages,
};
use crate::config::{AnalysisConfig, ComputeOn};
use crate::models::{MoodEntry, ProcessedPoint, Summary, WeeklyBucket};

/// Inclusive date bounds; an open side keeps everything on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }

    pub fn filter_entries(&self, entries: &[MoodEntry]) -> Vec<MoodEntry> {
        entries
            .iter()
            .filter(|e| self.contains(e.date))
            .cloned()
            .collect()
    }
}

/// Rolling average plus anomaly flags, restricted to `range`.
///
/// `config.compute_on` decides whether the anomaly statistics see the whole
/// history or only the entries inside the range.
pub fn process_entries(
    entries: &[MoodEntry],
    config: &AnalysisConfig,
    range: &DateRange,
) -> Vec<ProcessedPoint> {
    match config.compute_on {
        ComputeOn::Full => {
            let rolled = compute_rolling_average(entries, config.window);
            let flagged = flag_anomalies(&rolled, config.z_thresh);
            flagged
                .into_iter()
                .filter(|p| range.contains(p.date))
                .collect()
        }
        ComputeOn::Filtered => {
            let subset = range.filter_entries(entries);
            let rolled = compute_rolling_average(&subset, config.window);
            flag_anomalies(&rolled, config.z_thresh)
        }
    }
}

/// Change between the two most recent weekly averages.
pub fn trend_delta(weekly: &[WeeklyBucket]) -> Option<f64> {
    match weekly {
        [.., previous, latest] => Some(round2(latest.avg - previous.avg)),
        _ => None,
    }
}

pub fn summarize(entries: &[MoodEntry], config: &AnalysisConfig, range: &DateRange) -> Summary {
    let points = process_entries(entries, config, range);
    let weekly = weekly_averages(entries, config.weeks);
    let streaks = detect_streaks(&range.filter_entries(entries), config.streak_threshold);
    let anomaly_count = points.iter().filter(|p| p.flagged()).count();
    let trend_delta = trend_delta(&weekly);

    debug!(
        entries = entries.len(),
        points = points.len(),
        anomalies = anomaly_count,
        streaks = streaks.len(),
        compute_on = ?config.compute_on,
        "pipeline complete"
    );

    Summary {
        points,
        weekly,
        streaks,
        anomaly_count,
        trend_delta,
    }
}
