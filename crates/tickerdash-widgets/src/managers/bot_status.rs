//! Data-collection bot status and manual update trigger.

use std::sync::Arc;

use parking_lot::RwLock;
use tickerdash_core::{slot, BotStatus, Element};
use tickerdash_push::event::JOB_BOT_UPDATE;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::job::{job_update, JobUpdate};
use crate::error::WidgetResult;
use crate::surface::{Cell, TableModel};
use crate::ui;
use crate::view::WidgetView;
use crate::widget::{BoxFuture, Widget, WidgetContext};

const WIDGET_ID: &str = "botStatus";

#[derive(Clone)]
pub struct BotStatusManager {
    ctx: WidgetContext,
    view: Arc<WidgetView>,
    status: Arc<RwLock<Option<BotStatus>>>,
}

impl BotStatusManager {
    pub fn new(ctx: WidgetContext) -> Self {
        let view = Arc::new(WidgetView::new(WIDGET_ID, ctx.surface.clone()));
        Self {
            ctx,
            view,
            status: Arc::new(RwLock::new(None)),
        }
    }

    pub fn status(&self) -> Option<BotStatus> {
        self.status.read().clone()
    }

    /// Ask the bot to refresh its data now.
    pub async fn trigger_update(&self) -> WidgetResult<()> {
        let result = self.ctx.api.trigger_bot_update().await;
        let accepted = self.view.settle(result.map_err(Into::into))?;
        info!(job = %accepted.job, "Bot update triggered");
        let text = accepted
            .message
            .unwrap_or_else(|| "Update started".to_string());
        self.view.text(slot::PROGRESS, &text);
        Ok(())
    }

    async fn load(&self) -> WidgetResult<()> {
        let result = self.ctx.api.bot_status().await;
        let status = self.view.settle(result.map_err(Into::into))?;
        self.view.table(build_table(&status));
        *self.status.write() = Some(status);
        Ok(())
    }

    fn subscribe(&self, token: CancellationToken) {
        let this = self.clone();
        self.ctx.push.spawn_listener(WIDGET_ID, token, move |event| {
            let this = this.clone();
            async move {
                match job_update(&event, JOB_BOT_UPDATE) {
                    Some(JobUpdate::Progress(text)) => this.view.text(slot::PROGRESS, &text),
                    Some(JobUpdate::Finished { text, .. }) => {
                        this.view.text(slot::PROGRESS, &text);
                        let _ = this.load().await;
                    }
                    None => {}
                }
            }
        });
    }
}

impl Widget for BotStatusManager {
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

    fn dispose(&self) {
        self.view.unbind();
    }

    fn refresh(&self) -> BoxFuture<'_, WidgetResult<()>> {
        Box::pin(self.load())
    }
}

fn build_table(status: &BotStatus) -> TableModel {
    let mut table = TableModel::new(ui::columns(&["field", "value"]));
    let state = if status.running {
        Cell::styled("Running", "positive")
    } else {
        Cell::styled("Stopped", "neutral")
    };
    table.push_row(vec![Cell::text("Status"), state]);
    table.push_row(vec![
        Cell::text("Last update"),
        ui::optional(status.last_update, ui::timestamp),
    ]);
    table.push_row(vec![
        Cell::text("Next update"),
        ui::optional(status.next_update, ui::timestamp),
    ]);
    if let Some(message) = &status.message {
        table.push_row(vec![Cell::text("Message"), Cell::text(message)]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_table() {
        let table = build_table(&BotStatus {
            running: true,
            message: Some("idle".to_string()),
            ..BotStatus::default()
        });
        assert_eq!(table.len(), 4);
        assert_eq!(table.cell(0, "value"), Some("Running"));
        assert_eq!(table.cell(1, "value"), Some(""));
        assert_eq!(table.cell(3, "value"), Some("idle"));
    }
}
