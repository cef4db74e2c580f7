use thiserror::Error;

/// Error returned by user-supplied override resolvers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Core error type shared across pgtyper crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Catalog query failed or the connection could not be used.
    #[error("database error: {0}")]
    Db(String),
    /// Writing to or closing the output sink failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// An override resolver returned an error.
    #[error("override `{key}` failed: {message}")]
    Override { key: String, message: String },
    /// Options could not be turned into a generation request.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub(crate) fn override_failed(key: &str, err: BoxError) -> Self {
        Error::Override {
            key: key.to_string(),
            message: err.to_string(),
        }
    }
}

/// Convenience alias for results returned by pgtyper crates.
pub type Result<T> = std::result::Result<T, Error>;
