//! Widget capability trait and shared manager context.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tickerdash_api::ApiClient;
use tickerdash_core::Element;
use tickerdash_push::PushHub;

use crate::error::WidgetResult;
use crate::surface::Surface;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A dashboard widget manager.
pub trait Widget: Send + Sync {
    fn id(&self) -> &'static str;

    /// Bind to a freshly mounted container: look up slots, subscribe to push
    /// events, and load data.
    ///
    /// Idempotent; a second call replaces the first mount. A `None`
    /// container is logged and ignored. Load failures end up in the
    /// widget's error banner, never in a panic.
    fn initialize(&self, container: Option<Element>) -> BoxFuture<'_, ()>;

    /// Cancel push subscriptions and tear down the table.
    fn dispose(&self);

    /// Reload the data set.
    fn refresh(&self) -> BoxFuture<'_, WidgetResult<()>>;
}

fn default_news_limit() -> usize {
    10
}

fn default_log_lines() -> usize {
    200
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct WidgetSettings {
    /// Maximum news items shown.
    #[serde(default = "default_news_limit")]
    pub news_limit: usize,
    /// Log lines fetched by the logs page.
    #[serde(default = "default_log_lines")]
    pub log_lines: usize,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            news_limit: default_news_limit(),
            log_lines: default_log_lines(),
        }
    }
}

/// Everything a manager needs from the application. Cheap to clone.
#[derive(Clone)]
pub struct WidgetContext {
    pub api: ApiClient,
    pub surface: Arc<dyn Surface>,
    pub push: PushHub,
    pub settings: WidgetSettings,
}

impl WidgetContext {
    pub fn new(api: ApiClient, surface: Arc<dyn Surface>, push: PushHub) -> Self {
        Self {
            api,
            surface,
            push,
            settings: WidgetSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: WidgetSettings) -> Self {
        self.settings = settings;
        self
    }
}
