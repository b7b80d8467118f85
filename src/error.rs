use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MoodError>;

/// Errors raised at the edges of the pipeline: configuration and incoming data.
#[derive(Error, Debug, PartialEq)]
pub enum MoodError {
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Entry '{id}' has score {score}, expected 1 to 5")]
    ScoreOutOfRange { id: String, score: u8 },

    #[error("Entries must be in ascending date order: {next} follows {previous}")]
    UnorderedDates { previous: NaiveDate, next: NaiveDate },

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),
}

impl MoodError {
    pub fn invalid_parameter(name: &str, reason: &str) -> Self {
        MoodError::InvalidParameter {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}
