//! Analysis pipeline for daily mood scores: rolling averages, anomaly flags,
//! weekly aggregates and streaks, plus the data sources and outputs around it.

pub mod analysis;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod source;

pub use analysis::{compute_rolling_average, detect_streaks, flag_anomalies, weekly_averages};
pub use config::{AnalysisConfig, ComputeOn};
pub use error::MoodError;
pub use models::{MoodEntry, ProcessedPoint, Streak, Summary, WeeklyBucket};
pub use pipeline::{process_entries, summarize, DateRange};
