use std::collections::VecDeque;

use crate::models::{MoodEntry, ProcessedPoint, Streak, WeeklyBucket};

pub const DEFAULT_WINDOW: usize = 7;
pub const DEFAULT_Z_THRESH: f64 = 2.0;
pub const DEFAULT_WEEKS: usize = 4;
pub const DEFAULT_STREAK_THRESHOLD: f64 = 4.0;

const DAYS_PER_WEEK: usize = 7;

/// Rounds half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Trailing mean over the last `window` scores, inclusive of the current one.
///
/// The window shrinks at the start of the series instead of leaving gaps, so the
/// output always has one point per entry.
pub fn compute_rolling_average(entries: &[MoodEntry], window: usize) -> Vec<ProcessedPoint> {
    let window = window.max(1);
    let mut recent: VecDeque<u8> = VecDeque::with_capacity(window.min(entries.len()));
    let mut sum: u32 = 0;
    let mut points = Vec::with_capacity(entries.len());

    for entry in entries {
        if recent.len() == window {
            if let Some(oldest) = recent.pop_front() {
                sum -= u32::from(oldest);
            }
        }
        recent.push_back(entry.score);
        sum += u32::from(entry.score);

        points.push(ProcessedPoint {
            date: entry.date,
            score: entry.score,
            rolling: Some(round2(f64::from(sum) / recent.len() as f64)),
            is_anomaly: None,
        });
    }

    points
}

/// A zero standard deviation is reported as 1.
pub fn score_stats(points: &[ProcessedPoint]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as f64;
    let mean = points.iter().map(|p| f64::from(p.score)).sum::<f64>() / n;
    let variance = points
        .iter()
        .map(|p| (f64::from(p.score) - mean).powi(2))
        .sum::<f64>()
        / n;
    let sd = variance.sqrt();

    Some((mean, if sd == 0.0 { 1.0 } else { sd }))
}

/// Flags every point whose global z-score magnitude reaches `z_thresh`.
///
/// Statistics are taken over exactly the slice passed in, so flagging a filtered
/// subset can mark different points than flagging the whole history.
pub fn flag_anomalies(points: &[ProcessedPoint], z_thresh: f64) -> Vec<ProcessedPoint> {
    let Some((mean, sd)) = score_stats(points) else {
        return Vec::new();
    };

    points
        .iter()
        .map(|point| {
            let z = (f64::from(point.score) - mean) / sd;
            ProcessedPoint {
                is_anomaly: Some(z.abs() >= z_thresh),
                ..point.clone()
            }
        })
        .collect()
}

/// Averages of up to `weeks` trailing 7-entry blocks, oldest first.
///
/// Blocks are counted backward from the last entry; the earliest block may be
/// short when the series does not divide evenly.
pub fn weekly_averages(entries: &[MoodEntry], weeks: usize) -> Vec<WeeklyBucket> {
    let n = entries.len();
    let mut buckets = Vec::with_capacity(weeks.min(n / DAYS_PER_WEEK + 1));

    for w in 0..weeks {
        let end = match n.checked_sub(w * DAYS_PER_WEEK) {
            Some(end) if end > 0 => end,
            _ => break,
        };
        let start = end.saturating_sub(DAYS_PER_WEEK);
        let slice = &entries[start..end];

        let total: u32 = slice.iter().map(|e| u32::from(e.score)).sum();
        let last = &slice[slice.len() - 1];
        buckets.push(WeeklyBucket {
            week_end: last.date,
            avg: round2(f64::from(total) / slice.len() as f64),
        });
    }

    buckets.reverse();
    buckets
}

/// A run broken by a low entry ends on that entry's date; a run still open at
/// the end of input ends on the last entry's date.
pub fn detect_streaks(entries: &[MoodEntry], threshold: f64) -> Vec<Streak> {
    let mut streaks = Vec::new();
    let mut current: Option<(chrono::NaiveDate, usize)> = None;

    for entry in entries {
        if f64::from(entry.score) >= threshold {
            let run = current.get_or_insert((entry.date, 0));
            run.1 += 1;
        } else if let Some((start, length)) = current.take() {
            streaks.push(Streak {
                start,
                end: entry.date,
                length,
            });
        }
    }

    if let (Some((start, length)), Some(last)) = (current, entries.last()) {
        streaks.push(Streak {
            start,
            end: last.date,
            length,
        });
    }

    streaks
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    pub(crate) fn entries_from_scores(scores: &[u8]) -> Vec<MoodEntry> {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        scores
            .iter()
            .enumerate()
            .map(|(i, &score)| {
                let date = start + Duration::days(i as i64);
                MoodEntry {
                    id: date.to_string(),
                    date,
                    score,
                    note: None,
                }
            })
            .collect()
    }

    fn naive_rolling(scores: &[u8], window: usize) -> Vec<f64> {
        (0..scores.len())
            .map(|i| {
                let start = (i + 1).saturating_sub(window);
                let slice = &scores[start..=i];
                let sum: u32 = slice.iter().map(|&s| u32::from(s)).sum();
                round2(f64::from(sum) / slice.len() as f64)
            })
            .collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn rolling_constant_series_stays_constant() {
        let entries = entries_from_scores(&[3; 20]);
        let points = compute_rolling_average(&entries, DEFAULT_WINDOW);
        assert_eq!(points.len(), 20);
        assert!(points.iter().all(|p| p.rolling == Some(3.0)));
    }

    #[test]
    fn rolling_window_shrinks_at_start() {
        let entries = entries_from_scores(&[1, 2, 3, 4, 5]);
        let rolling: Vec<f64> = compute_rolling_average(&entries, 3)
            .iter()
            .map(|p| p.rolling.unwrap())
            .collect();
        assert_eq!(rolling, vec![1.0, 1.5, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn rolling_matches_naive_resummation() {
        let scores = [3, 5, 1, 2, 4, 4, 5, 1, 1, 3, 2, 5, 4, 3, 2, 1, 5, 5];
        let entries = entries_from_scores(&scores);
        for window in [1, 2, 3, 7, 30] {
            let rolling: Vec<f64> = compute_rolling_average(&entries, window)
                .iter()
                .map(|p| p.rolling.unwrap())
                .collect();
            assert_eq!(rolling, naive_rolling(&scores, window), "window {window}");
        }
    }

    #[test]
    fn rolling_rounds_to_two_decimals_and_passes_fields_through() {
        let entries = entries_from_scores(&[1, 1, 2]);
        let points = compute_rolling_average(&entries, 7);
        assert_eq!(points[2].rolling, Some(1.33));
        assert_eq!(points[2].date, entries[2].date);
        assert_eq!(points[2].score, 2);
        assert_eq!(points[2].is_anomaly, None);
    }

    #[test]
    fn rolling_handles_empty_and_zero_window() {
        assert!(compute_rolling_average(&[], 7).is_empty());
        let entries = entries_from_scores(&[2, 4]);
        let points = compute_rolling_average(&entries, 0);
        assert_eq!(points[1].rolling, Some(4.0));
    }

    #[test]
    fn identical_scores_are_never_anomalous() {
        let points = compute_rolling_average(&entries_from_scores(&[4; 10]), 7);
        let (mean, sd) = score_stats(&points).unwrap();
        assert!(approx(mean, 4.0));
        assert!(approx(sd, 1.0));
        assert!(flag_anomalies(&points, 2.0).iter().all(|p| p.is_anomaly == Some(false)));
    }

    #[test]
    fn single_spike_is_flagged() {
        let points = compute_rolling_average(&entries_from_scores(&[1, 1, 1, 1, 1, 5]), 7);
        let (mean, _) = score_stats(&points).unwrap();
        assert!(approx(round2(mean), 1.67));

        let flagged = flag_anomalies(&points, DEFAULT_Z_THRESH);
        let flags: Vec<bool> = flagged.iter().map(|p| p.flagged()).collect();
        assert_eq!(flags, vec![false, false, false, false, false, true]);
        assert_eq!(flagged[5].rolling, points[5].rolling);
    }

    #[test]
    fn flagging_is_idempotent() {
        let points = compute_rolling_average(&entries_from_scores(&[3, 3, 4, 1, 3, 5, 3, 3]), 7);
        let once = flag_anomalies(&points, 1.5);
        let twice = flag_anomalies(&once, 1.5);
        assert_eq!(once, twice);
    }

    #[test]
    fn flagging_empty_input_returns_empty() {
        assert!(flag_anomalies(&[], 2.0).is_empty());
    }

    #[test]
    fn four_full_weeks_give_four_disjoint_buckets() {
        let scores: Vec<u8> = (0..28).map(|i| (i / 7 + 1) as u8).collect();
        let entries = entries_from_scores(&scores);
        let buckets = weekly_averages(&entries, 4);
        assert_eq!(buckets.len(), 4);
        let avgs: Vec<f64> = buckets.iter().map(|b| b.avg).collect();
        assert_eq!(avgs, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(buckets[0].week_end, entries[6].date);
        assert_eq!(buckets[3].week_end, entries[27].date);
    }

    #[test]
    fn short_series_stops_early_with_partial_first_bucket() {
        let entries = entries_from_scores(&[1, 2, 3, 5, 5, 5, 5, 5, 5, 5]);
        let buckets = weekly_averages(&entries, 4);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].week_end, entries[2].date);
        assert!(approx(buckets[0].avg, 2.0));
        assert_eq!(buckets[1].week_end, entries[9].date);
        assert!(approx(buckets[1].avg, 5.0));
    }

    #[test]
    fn weekly_averages_round_and_handle_edges() {
        let entries = entries_from_scores(&[1, 1, 2]);
        assert_eq!(weekly_averages(&entries, 4)[0].avg, 1.33);
        assert!(weekly_averages(&[], 4).is_empty());
        assert!(weekly_averages(&entries, 0).is_empty());
        assert_eq!(weekly_averages(&entries_from_scores(&[3; 14]), 4).len(), 2);
    }

    #[test]
    fn streaks_close_on_break_and_at_end() {
        let entries = entries_from_scores(&[3, 4, 5, 4, 2, 5, 5]);
        let streaks = detect_streaks(&entries, DEFAULT_STREAK_THRESHOLD);
        assert_eq!(
            streaks,
            vec![
                Streak {
                    start: entries[1].date,
                    end: entries[4].date,
                    length: 3,
                },
                Streak {
                    start: entries[5].date,
                    end: entries[6].date,
                    length: 2,
                },
            ]
        );
    }

    #[test]
    fn no_streaks_without_qualifying_entries() {
        assert!(detect_streaks(&entries_from_scores(&[1, 2, 3]), 4.0).is_empty());
        assert!(detect_streaks(&[], 4.0).is_empty());
    }

    #[test]
    fn single_trailing_entry_streak_ends_on_itself() {
        let entries = entries_from_scores(&[2, 5]);
        let streaks = detect_streaks(&entries, 4.0);
        assert_eq!(streaks.len(), 1);
        assert_eq!(streaks[0].start, streaks[0].end);
        assert_eq!(streaks[0].length, 1);
    }

    #[test]
    fn fractional_threshold_compares_numerically() {
        let entries = entries_from_scores(&[3, 4, 3]);
        let streaks = detect_streaks(&entries, 3.5);
        assert_eq!(streaks.len(), 1);
        assert_eq!(streaks[0].length, 1);
    }

    #[test]
    fn round2_breaks_ties_away_from_zero() {
        assert_eq!(round2(1.125), 1.13);
        assert_eq!(round2(-1.125), -1.13);
        assert_eq!(round2(2.5), 2.5);
        assert_eq!(round2(4.0 / 3.0), 1.33);
    }
}
