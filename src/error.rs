//! Error types for the stage-tracking engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Query against the student database failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed snapshot file
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid caller-supplied parameter (e.g. an unparsable semester label)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
