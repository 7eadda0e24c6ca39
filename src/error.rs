use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while seeding, reading or querying the university database.
#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Failed to open database at {}: {}", .path.display(), .source)]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("SQL statement failed: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Failed to close database connection: {0}")]
    Close(#[source] rusqlite::Error),

    #[error("Query file not found: {}", .0.display())]
    QueryFileNotFound(PathBuf),

    #[error("Failed to read query file {}: {}", .path.display(), .source)]
    QueryFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{record} #{position} references unknown {entity} #{index}")]
    UnresolvedReference {
        record: &'static str,
        position: usize,
        entity: &'static str,
        index: usize,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SeedError>;
