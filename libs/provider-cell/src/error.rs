use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Store query failed: {0}")]
    Repository(#[from] anyhow::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;

impl From<DiscoveryError> for AppError {
    fn from(err: DiscoveryError) -> Self {
        match err {
            DiscoveryError::Repository(e) => AppError::Database(e.to_string()),
            DiscoveryError::Validation(msg) => AppError::ValidationError(msg),
        }
    }
}
