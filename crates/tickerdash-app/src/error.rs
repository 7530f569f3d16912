//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(#[from] tickerdash_api::ApiError),

    #[error("Push error: {0}")]
    Push(#[from] tickerdash_push::PushError),

    #[error("Layout error: {0}")]
    Layout(#[from] tickerdash_layout::LayoutError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] tickerdash_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
