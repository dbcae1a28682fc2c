use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CodePdfError>;

/// Errors surfaced by the renderer. All of them are terminal for the
/// current run; nothing is retried or skipped.
#[derive(Debug, Error)]
pub enum CodePdfError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("render error: {0}")]
    Render(String),
}

impl From<walkdir::Error> for CodePdfError {
    fn from(err: walkdir::Error) -> Self {
        CodePdfError::Io(err.into())
    }
}
