/// Simplified error system - no over-engineering!
#[derive(Debug, Clone)]
pub enum AppError {
    NetworkError(String),
    ParseError(String),
    StorageError(String),
    RenderingError(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NetworkError(msg) => write!(f, "Network Error: {}", msg),
            AppError::ParseError(msg) => write!(f, "Parse Error: {}", msg),
            AppError::StorageError(msg) => write!(f, "Storage Error: {}", msg),
            AppError::RenderingError(msg) => write!(f, "Rendering Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Simple convenience type aliases
pub type NetworkResult<T> = Result<T, AppError>;
pub type StorageResult<T> = Result<T, AppError>;
pub type RenderingResult<T> = Result<T, AppError>;
