//! Drainer analysis events and the analysis job trigger.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tickerdash_core::{slot, DrainerEvent, Element};
use tickerdash_push::event::JOB_DRAINER;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::job::{job_update, JobUpdate};
use crate::error::WidgetResult;
use crate::surface::{Cell, TableModel};
use crate::ui;
use crate::view::WidgetView;
use crate::widget::{BoxFuture, Widget, WidgetContext};

const WIDGET_ID: &str = "drainer";

#[derive(Clone)]
pub struct DrainerManager {
    ctx: WidgetContext,
    view: Arc<WidgetView>,
    events: Arc<RwLock<Vec<DrainerEvent>>>,
    running: Arc<AtomicBool>,
}

impl DrainerManager {
    pub fn new(ctx: WidgetContext) -> Self {
        let view = Arc::new(WidgetView::new(WIDGET_ID, ctx.surface.clone()));
        Self {
            ctx,
            view,
            events: Arc::new(RwLock::new(Vec::new())),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn events(&self) -> Vec<DrainerEvent> {
        self.events.read().clone()
    }

    /// True between a successful `run_analysis` and its completion event.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start the analysis job. Completion arrives on the push channel.
    pub async fn run_analysis(&self) -> WidgetResult<()> {
        let result = self.ctx.api.run_drainer_analysis().await;
        let accepted = self.view.settle(result.map_err(Into::into))?;
        info!(job = %accepted.job, "Drainer analysis started");
        self.running.store(true, Ordering::SeqCst);
        let text = accepted
            .message
            .unwrap_or_else(|| "Analysis started".to_string());
        self.view.text(slot::PROGRESS, &text);
        Ok(())
    }

    async fn load(&self) -> WidgetResult<()> {
        self.view.loading(true);
        let result = self.ctx.api.drainer_events().await;
        self.view.loading(false);

        let events = self.view.settle(result.map_err(Into::into))?;
        debug!(count = events.len(), "Drainer events loaded");

        let mut table = TableModel::new(ui::columns(&[
            "detected_at",
            "symbol",
            "event_type",
            "magnitude",
            "description",
        ]));
        for e in &events {
            table.push_row(vec![
                ui::timestamp(e.detected_at),
                Cell::text(&e.symbol),
                Cell::text(&e.event_type),
                ui::optional(e.magnitude, ui::percent),
                Cell::text(e.description.clone().unwrap_or_default()),
            ]);
        }
        self.view.table(table);
        *self.events.write() = events;
        Ok(())
    }

    fn subscribe(&self, token: CancellationToken) {
        let this = self.clone();
        self.ctx.push.spawn_listener(WIDGET_ID, token, move |event| {
            let this = this.clone();
            async move {
                match job_update(&event, JOB_DRAINER) {
                    Some(JobUpdate::Progress(text)) => this.view.text(slot::PROGRESS, &text),
                    Some(JobUpdate::Finished { text, success }) => {
                        info!(success, "Drainer analysis finished");
                        this.running.store(false, Ordering::SeqCst);
                        this.view.text(slot::PROGRESS, &text);
                        let _ = this.load().await;
                    }
                    None => {}
                }
            }
        });
    }
}

impl Widget for DrainerManager {
    fn id(&self) -> &'static str {
        WIDGET_ID
    }

    fn initialize(&self, container: Option<Element>) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            let slots = [slot::TABLE, slot::ACTION, slot::PROGRESS];
            let Some(token) = self.view.bind(container, &slots) else {
                return;
            };
            self.subscribe(token);
            let _ = self.load().await;
        })
    }

    /// Completion of a running job can no longer be observed once the
    /// listener is gone, so the running flag is dropped with it.
    fn dispose(&self) {
        self.view.unbind();
        if self.running.swap(false, Ordering::SeqCst) {
            debug!("Drainer disposed while analysis was running");
        }
    }

    fn refresh(&self) -> BoxFuture<'_, WidgetResult<()>> {
        Box::pin(self.load())
    }
}
