//! Error type shared by the data, query, and upload layers.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to the dashboard as load failures or flash messages.
#[derive(Debug, Error)]
pub enum Error {
    #[error("No {kind} found for {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid fixture {name}: {source}")]
    Fixture {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a UTF-8 text file", path.display())]
    NotText { path: PathBuf },

    #[error("Invalid hex color: {0}")]
    InvalidColor(String),

    #[error("Invalid theme: {0}")]
    Theme(#[source] serde_json::Error),
}

impl Error {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_missing_id() {
        let err = Error::not_found("diff", "file-42");
        assert_eq!(err.to_string(), "No diff found for file-42");
    }

    #[test]
    fn io_error_includes_path() {
        let err = Error::io(
            "/tmp/missing.rs",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/tmp/missing.rs"));
    }
}
