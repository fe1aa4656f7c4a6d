//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for foliostat.
#[derive(Debug, thiserror::Error)]
pub enum FoliostatError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for instrument {id}")]
    NoData { id: String },

    #[error("no positive price in {id}: returns cannot be computed")]
    NonPositivePrice { id: String },

    #[error("empty date range: {start} is after {end}")]
    EmptyRange { start: NaiveDate, end: NaiveDate },

    #[error("no two instruments share a return date: correlation is impossible")]
    EmptyIntersection,

    #[error("combo has no enabled constituent with a non-zero weight")]
    NoActiveConstituents,

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&FoliostatError> for std::process::ExitCode {
    fn from(err: &FoliostatError) -> Self {
        let code: u8 = match err {
            FoliostatError::Io(_) | FoliostatError::Csv(_) => 1,
            FoliostatError::ConfigParse { .. }
            | FoliostatError::ConfigMissing { .. }
            | FoliostatError::ConfigInvalid { .. } => 2,
            FoliostatError::Data { .. } | FoliostatError::NoData { .. } => 3,
            FoliostatError::NonPositivePrice { .. } | FoliostatError::EmptyRange { .. } => 4,
            FoliostatError::EmptyIntersection | FoliostatError::NoActiveConstituents => 5,
        };
        std::process::ExitCode::from(code)
    }
}
