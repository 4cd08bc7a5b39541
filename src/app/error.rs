use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Not a valid directory: {0}")]
    InvalidRoot(PathBuf),

    #[error("Invalid search parameters: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid regular expression: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid output target: {0}")]
    OutputTarget(String),

    #[error("Error walking directory tree: {0}")]
    Walk(#[from] ignore::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file error: {0}")]
    ConfigFile(String),
}

impl SearchError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Errors raised while building the search, before any directory is read.
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRoot(_)
                | Self::InvalidConfiguration(_)
                | Self::InvalidPattern(_)
                | Self::OutputTarget(_)
        )
    }
}

pub type SearchResult<T> = Result<T, SearchError>;
