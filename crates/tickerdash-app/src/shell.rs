//! Page dispatch and component wiring.
//!
//! The shell owns the long-running tasks:
//! - Push channel connection
//! - Layout event loop (dashboard only), mounting and unmounting widgets
//! - Auto-updater (dashboard only)

use std::sync::Arc;

use parking_lot::Mutex;
use tickerdash_layout::{load_theme, LayoutEvent, TemplateSource};
use tickerdash_push::PushEvent;
use tickerdash_telemetry::Metrics;
use tickerdash_widgets::{Surface, WidgetRegistry};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Page;
use crate::context::AppContext;
use crate::error::AppResult;

/// Log the panic and ask the user to restart, then defer to the previous hook.
pub fn install_panic_hook(surface: Arc<dyn Surface>) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        error!(panic = %info, "Unhandled panic");
        surface.show_reload_prompt(&info.to_string());
        previous(info);
    }));
}

/// Everything recorded so far, in the Prometheus text format.
pub fn metrics_report() -> AppResult<String> {
    Ok(Metrics::render()?)
}

pub struct Shell {
    ctx: Arc<AppContext>,
    token: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Shell {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            ctx,
            token: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.ctx
    }

    /// Cancelling this token makes [`Shell::run`] return.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Start the page and block until Ctrl+C or shutdown.
    pub async fn run(&self, page: Page) -> AppResult<()> {
        self.start(page).await?;

        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("Received shutdown signal"),
            _ = self.token.cancelled() => info!("Shutdown requested"),
        }

        self.stop().await;
        Ok(())
    }

    /// Connect the push channel and run page-specific initialization.
    pub async fn start(&self, page: Page) -> AppResult<()> {
        let theme = load_theme(self.ctx.local.as_ref());
        info!(%page, %theme, "Starting page");
        self.spawn_push();

        match page.widget() {
            Some(widget_id) => self.mount_page_widget(widget_id).await,
            None => self.start_dashboard()?,
        }
        Ok(())
    }

    /// Tear everything down. Safe to call more than once.
    pub async fn stop(&self) {
        self.token.cancel();
        self.ctx.updater.stop();
        self.ctx.push.shutdown();

        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Shell task ended abnormally");
            }
        }
        // After the layout loop has exited so no mount lands afterwards.
        self.ctx.registry.unmount_all();
        info!("Shell stopped");
    }

    fn spawn_push(&self) {
        let push = self.ctx.push.clone();
        let connection = tokio::spawn(async move {
            if let Err(e) = push.run().await {
                error!(error = %e, "Push channel stopped");
            }
        });

        let status = self
            .ctx
            .hub
            .spawn_listener("shell", self.token.child_token(), |event| async move {
                match event {
                    PushEvent::Connected => info!("Push channel connected"),
                    PushEvent::Disconnected { reason } => {
                        warn!(%reason, "Push channel disconnected")
                    }
                    PushEvent::Error { message } => warn!(%message, "Backend reported error"),
                    _ => {}
                }
            });

        self.tasks.lock().extend([connection, status]);
    }

    async fn mount_page_widget(&self, widget_id: &str) {
        let template_id = format!("{widget_id}Template");
        let Some(element) = self.ctx.templates.template(&template_id) else {
            warn!(widget = widget_id, template = %template_id, "Page template missing");
            return;
        };
        self.ctx.registry.mount(widget_id, element).await;
    }

    fn start_dashboard(&self) -> AppResult<()> {
        // Subscribe before the layout restores so no WidgetAdded is missed.
        let events = self.ctx.layout.subscribe();
        let task = tokio::spawn(run_layout_events(
            events,
            self.ctx.registry.clone(),
            self.token.child_token(),
        ));
        self.tasks.lock().push(task);

        let placed = self.ctx.layout.initialize()?;
        debug!(placed, "Dashboard widgets placed");

        self.ctx.updater.start(self.ctx.config.updater.interval);
        Ok(())
    }
}

/// Mount and unmount widget managers as the layout changes.
async fn run_layout_events(
    mut events: broadcast::Receiver<LayoutEvent>,
    registry: Arc<WidgetRegistry>,
    token: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            event = events.recv() => event,
        };

        match event {
            Ok(LayoutEvent::WidgetAdded { id, element }) => {
                registry.mount(&id, element).await;
            }
            Ok(LayoutEvent::WidgetRemoved { id }) => {
                registry.unmount(&id);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Layout event loop lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    debug!("Layout event loop stopped");
}
