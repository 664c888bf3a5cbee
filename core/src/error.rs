use std::path::PathBuf;
use thiserror::Error;

/// Failures at the edges of the engine: loading configuration and histories.
///
/// Graph construction and layout never fail; unresolvable links are dropped
/// and missing selections degrade to the head of the history.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid history JSON: {0}")]
    HistoryParse(#[from] serde_json::Error),

    #[error("Invalid configuration value: {0}")]
    InvalidConfig(String),
}

impl GraphError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GraphError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type GraphResult<T> = Result<T, GraphError>;
