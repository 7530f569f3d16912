//! Widget error types.

use thiserror::Error;
use tickerdash_api::ApiError;
use tickerdash_core::CoreError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WidgetError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error("Widget {0} is not mounted")]
    NotMounted(&'static str),
}

impl WidgetError {
    /// Text for the widget's inline error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::Invalid(CoreError::InvalidValue { reason, .. }) => reason.clone(),
            Self::Invalid(e) => e.to_string(),
            Self::NotMounted(_) => self.to_string(),
        }
    }
}

pub type WidgetResult<T> = Result<T, WidgetError>;
