use crate::utils::output::OutputStyle;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// A required flag is neither provided nor saved. Reported the way the
    /// argument parser reports its own errors, exit code 2.
    #[error("{0}")]
    Usage(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Bibtex error: {0}")]
    Bibtex(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("System error: {0}")]
    System(String),
}

/// Result type alias for consistent error handling across the application
pub type AppResult<T> = Result<T, AppError>;

pub fn report_error(err: &AppError) {
    match err {
        AppError::Usage(msg) => {
            eprintln!("error: {msg}");
        }
        AppError::Network(msg) => {
            eprintln!("🌐 {}", OutputStyle::error(&format!("Network: {msg}")));
        }
        AppError::Bibtex(msg) => {
            eprintln!("📚 {}", OutputStyle::error(&format!("Bibtex: {msg}")));
        }
        AppError::Io(msg) | AppError::System(msg) => {
            eprintln!("❌ {}", OutputStyle::error(msg));
        }
    }
}
