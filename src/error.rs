// Fatal errors surfaced to the caller
// Per-file load failures never reach this type: they are logged and skipped.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PortfolioError {
    #[error("cannot write portfolio to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode portfolio CSV for {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid pipeline config {}: {source:#}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("portfolio file not found at {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("cannot read portfolio file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, PortfolioError>;
