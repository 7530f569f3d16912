//! Layout error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Unknown widget: {0}")]
    UnknownWidget(String),

    #[error("Template {template} for widget {widget} not found")]
    TemplateMissing { widget: String, template: String },

    #[error("Widget already on the dashboard: {0}")]
    AlreadyActive(String),

    #[error("Widget not on the dashboard: {0}")]
    NotActive(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type LayoutResult<T> = Result<T, LayoutError>;
