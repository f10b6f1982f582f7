use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// A raw record without a URL can never be deduplicated.
    #[error("job from source '{source_name}' has no url")]
    MissingIdentifier { source_name: String },

    /// The store failed mid-batch; nothing from the batch was committed.
    #[error("persistence failed after {processed} records (batch rolled back): {source}")]
    Persistence {
        processed: usize,
        #[source]
        source: rusqlite::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to read {path:?}: {source}")]
    SourceIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed job file {path:?}: {source}")]
    SourceFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<config::ConfigError> for IngestError {
    fn from(e: config::ConfigError) -> Self {
        IngestError::Config(e.to_string())
    }
}
