use std::fmt::Write;

use crate::models::{MoodBand, MoodEntry, Summary};
use crate::pipeline::DateRange;

const RECENT_NOTES: usize = 5;

fn range_label(range: &DateRange) -> String {
    match (range.from, range.to) {
        (None, None) => "full history".to_string(),
        (Some(from), None) => format!("entries from {}", from),
        (None, Some(to)) => format!("entries through {}", to),
        (Some(from), Some(to)) => format!("entries from {} to {}", from, to),
    }
}

pub fn build_report(entries: &[MoodEntry], range: &DateRange, summary: &Summary) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Mood Trend Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} points)",
        range_label(range),
        summary.points.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Weekly Averages");

    if summary.weekly.is_empty() {
        let _ = writeln!(output, "No entries recorded.");
    } else {
        for bucket in summary.weekly.iter() {
            let _ = writeln!(
                output,
                "- week ending {}: {:.2} ({})",
                bucket.week_end,
                bucket.avg,
                MoodBand::from_score(bucket.avg).label()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Trend");
    match summary.trend_delta {
        Some(delta) => {
            let _ = writeln!(output, "Week over week: {:+.2}", delta);
        }
        None => {
            let _ = writeln!(output, "Not enough data for a trend.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Anomalies");
    let _ = writeln!(output, "{} flagged", summary.anomaly_count);
    for point in summary.points.iter().filter(|p| p.flagged()) {
        let _ = writeln!(output, "- {}: score {}", point.date, point.score);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Good Streaks");

    if summary.streaks.is_empty() {
        let _ = writeln!(output, "No streaks in this window.");
    } else {
        for streak in summary.streaks.iter() {
            let _ = writeln!(
                output,
                "- {} to {}: {} days",
                streak.start, streak.end, streak.length
            );
        }
    }

    let mut recent: Vec<&MoodEntry> = entries
        .iter()
        .filter(|e| e.note.is_some() && range.contains(e.date))
        .collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Notes");

    if recent.is_empty() {
        let _ = writeln!(output, "No notes recorded in this window.");
    } else {
        for entry in recent.iter().take(RECENT_NOTES) {
            let _ = writeln!(
                output,
                "- {} (score {}): {}",
                entry.date,
                entry.score,
                entry.note.as_deref().unwrap_or_default()
            );
        }
    }

    output
}
