//! Price alerts: list, add, delete.

use std::sync::Arc;

use parking_lot::RwLock;
use tickerdash_core::{slot, Alert, Element, NewAlert};
use tracing::{debug, info};

use crate::error::WidgetResult;
use crate::surface::{Cell, TableModel};
use crate::ui;
use crate::view::WidgetView;
use crate::widget::{BoxFuture, Widget, WidgetContext};

const WIDGET_ID: &str = "alerts";

#[derive(Clone)]
pub struct AlertManager {
    ctx: WidgetContext,
    view: Arc<WidgetView>,
    alerts: Arc<RwLock<Vec<Alert>>>,
}

impl AlertManager {
    pub fn new(ctx: WidgetContext) -> Self {
        let view = Arc::new(WidgetView::new(WIDGET_ID, ctx.surface.clone()));
        Self {
            ctx,
            view,
            alerts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Alerts as of the last load.
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.read().clone()
    }

    /// Validate, create, then reload the full list.
    pub async fn add_alert(&self, alert: NewAlert) -> WidgetResult<()> {
        let alert = self.view.settle(alert.validated().map_err(Into::into))?;
        let result = self.ctx.api.add_alert(&alert).await;
        let created = self.view.settle(result.map_err(Into::into))?;
        info!(id = created.id, symbol = %created.symbol, "Alert added");
        self.load().await
    }

    pub async fn delete_alert(&self, id: i64) -> WidgetResult<()> {
        let result = self.ctx.api.delete_alert(id).await;
        self.view.settle(result.map_err(Into::into))?;
        info!(id, "Alert deleted");
        self.load().await
    }

    async fn load(&self) -> WidgetResult<()> {
        self.view.loading(true);
        let result = self.ctx.api.alerts().await;
        self.view.loading(false);

        let alerts = self.view.settle(result.map_err(Into::into))?;
        debug!(count = alerts.len(), "Alerts loaded");

        let mut table = TableModel::new(ui::columns(&["symbol", "condition", "target_price"]));
        for a in &alerts {
            table.push_row(vec![
                Cell::text(&a.symbol),
                Cell::text(a.condition.to_string()),
                ui::currency(a.target_price),
            ]);
        }
        self.view.table(table);
        *self.alerts.write() = alerts;
        Ok(())
    }
}

impl Widget for AlertManager {
    fn id(&self) -> &'static str {
        WIDGET_ID
    }

    fn initialize(&self, container: Option<Element>) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if self.view.bind(container, &[slot::TABLE, slot::FORM]).is_some() {
                let _ = self.load().await;
            }
        })
    }

    fn dispose(&self) {
        self.view.unbind();
    }

    fn refresh(&self) -> BoxFuture<'_, WidgetResult<()>> {
        Box::pin(self.load())
    }
}
