//! Shared application context, built once at startup.

use std::sync::Arc;

use tickerdash_api::ApiClient;
use tickerdash_layout::{
    DashboardLayout, FileStorage, MemoryGrid, MemoryStorage, Storage, TemplateRegistry,
};
use tickerdash_push::{PushClient, PushHub};
use tickerdash_widgets::{Surface, WidgetContext, WidgetRegistry, WidgetSet};
use tracing::info;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::updater::{AutoUpdater, RefreshFn};

/// Every component the shell wires together.
pub struct AppContext {
    pub config: AppConfig,
    pub api: ApiClient,
    pub push: Arc<PushClient>,
    pub hub: PushHub,
    /// Survives restarts (layout, theme).
    pub local: Arc<dyn Storage>,
    /// Lives for one run (auto-update interval).
    pub session: Arc<dyn Storage>,
    pub surface: Arc<dyn Surface>,
    pub templates: Arc<TemplateRegistry>,
    pub widgets: WidgetSet,
    pub registry: Arc<WidgetRegistry>,
    pub layout: Arc<DashboardLayout>,
    pub updater: Arc<AutoUpdater>,
}

impl AppContext {
    /// Build with local state in the configured storage directory.
    pub fn new(config: AppConfig, surface: Arc<dyn Surface>) -> AppResult<Self> {
        let local = Arc::new(FileStorage::open(config.storage.local_file())?);
        Self::with_storage(config, surface, local)
    }

    pub fn with_storage(
        config: AppConfig,
        surface: Arc<dyn Surface>,
        local: Arc<dyn Storage>,
    ) -> AppResult<Self> {
        let api = ApiClient::new(&config.api.base_url)?.with_timeout(config.api.timeout());
        let hub = PushHub::default();
        let push = Arc::new(PushClient::new(config.push.clone(), hub.clone()));
        let session: Arc<dyn Storage> = Arc::new(MemoryStorage::new());

        let widget_ctx = WidgetContext::new(api.clone(), surface.clone(), hub.clone())
            .with_settings(config.widgets.clone());
        let widgets = WidgetSet::new(&widget_ctx);
        let registry = Arc::new(widgets.registry());

        let templates = Arc::new(TemplateRegistry::builtin());
        let layout = Arc::new(DashboardLayout::new(
            Box::new(MemoryGrid::new()),
            templates.clone(),
            local.clone(),
        ));

        let refresh_registry = registry.clone();
        let refresh: RefreshFn = Arc::new(move || {
            let registry = refresh_registry.clone();
            Box::pin(async move {
                let (ok, failed) = registry.refresh_mounted().await;
                info!(ok, failed, "Auto-update refreshed widgets");
            })
        });
        let updater = Arc::new(AutoUpdater::new(
            session.clone(),
            config.updater.gate(),
            refresh,
        ));

        info!(
            base_url = %config.api.base_url,
            push_url = %config.push.url,
            "Application context built"
        );

        Ok(Self {
            config,
            api,
            push,
            hub,
            local,
            session,
            surface,
            templates,
            widgets,
            registry,
            layout,
            updater,
        })
    }
}
