//! Common error types.

/// A shortcut type equivalent to `Result<T, itemshot::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error that occurs within the crate.
///
/// Startup errors (config, job table, font) are fatal for the whole batch;
/// the remaining variants are raised while rendering a single row and are
/// isolated by the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read config `{path}`: {reason}")]
    ConfigOpen { path: String, reason: String },

    #[error("failed to open job table `{path}`: {reason}")]
    SourceOpen { path: String, reason: String },

    #[error("failed to read job table record: {0}")]
    RecordRead(String),

    #[error("job table has no `{0}` column")]
    MissingColumn(String),

    #[error("failed to load font: {0}")]
    FontLoad(String),

    #[error("failed to open image `{path}`: {reason}")]
    AssetOpen { path: String, reason: String },

    #[error("unsupported output extension: `{0}`")]
    UnsupportedOutput(String),

    #[error("vips error: {0}")]
    Vips(String),

    #[error("cairo error: {0}")]
    Cairo(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn config_open(path: impl AsRef<std::path::Path>, e: impl std::fmt::Display) -> Self {
        Self::ConfigOpen {
            path: path.as_ref().display().to_string(),
            reason: e.to_string(),
        }
    }

    pub fn source_open(path: impl AsRef<std::path::Path>, e: impl std::fmt::Display) -> Self {
        Self::SourceOpen {
            path: path.as_ref().display().to_string(),
            reason: e.to_string(),
        }
    }

    pub fn record_read(e: csv::Error) -> Self {
        Self::RecordRead(e.to_string())
    }

    pub fn asset_open(path: impl AsRef<std::path::Path>, e: impl std::fmt::Display) -> Self {
        Self::AssetOpen {
            path: path.as_ref().display().to_string(),
            reason: e.to_string(),
        }
    }

    pub fn cairo(e: cairo::Error) -> Self {
        Self::Cairo(e.to_string())
    }
}
