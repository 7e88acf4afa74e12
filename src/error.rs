use std::path::PathBuf;

use thiserror::Error;

pub type StatsResult<T> = std::result::Result<T, StatsError>;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("missing input file {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("malformed schedule: {0}")]
    MalformedSchedule(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("ambiguous join: {0}")]
    JoinAmbiguity(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("csv error in {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
}

impl StatsError {
    pub(crate) fn schema(msg: impl Into<String>) -> Self {
        StatsError::Schema(msg.into())
    }
}
