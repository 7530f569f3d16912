//! Maintenance page: scheduled backend tasks.

use std::sync::Arc;

use parking_lot::RwLock;
use tickerdash_core::{slot, CoreError, Element, MaintenanceTask, NewMaintenanceTask};
use tracing::info;

use crate::error::{WidgetError, WidgetResult};
use crate::surface::{Cell, TableModel};
use crate::ui;
use crate::view::WidgetView;
use crate::widget::{BoxFuture, Widget, WidgetContext};

const WIDGET_ID: &str = "maintenance";

#[derive(Clone)]
pub struct MaintenanceManager {
    ctx: WidgetContext,
    view: Arc<WidgetView>,
    tasks: Arc<RwLock<Vec<MaintenanceTask>>>,
}

impl MaintenanceManager {
    pub fn new(ctx: WidgetContext) -> Self {
        let view = Arc::new(WidgetView::new(WIDGET_ID, ctx.surface.clone()));
        Self {
            ctx,
            view,
            tasks: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn tasks(&self) -> Vec<MaintenanceTask> {
        self.tasks.read().clone()
    }

    pub async fn add_task(&self, mut task: NewMaintenanceTask) -> WidgetResult<()> {
        task.description = task.description.trim().to_string();
        if task.description.is_empty() {
            let err = WidgetError::Invalid(CoreError::InvalidValue {
                field: "description",
                reason: "description is required".to_string(),
            });
            return self.view.settle(Err(err));
        }
        let result = self.ctx.api.add_maintenance_task(&task).await;
        let created = self.view.settle(result.map_err(Into::into))?;
        info!(id = created.id, "Maintenance task added");
        self.load().await
    }

    pub async fn delete_task(&self, id: i64) -> WidgetResult<()> {
        let result = self.ctx.api.delete_maintenance_task(id).await;
        self.view.settle(result.map_err(Into::into))?;
        info!(id, "Maintenance task deleted");
        self.load().await
    }

    async fn load(&self) -> WidgetResult<()> {
        self.view.loading(true);
        let result = self.ctx.api.maintenance_tasks().await;
        self.view.loading(false);

        let tasks = self.view.settle(result.map_err(Into::into))?;
        let mut table =
            TableModel::new(ui::columns(&["id", "description", "scheduled_for", "status"]));
        for t in &tasks {
            table.push_row(vec![
                Cell::text(t.id.to_string()),
                Cell::text(&t.description),
                ui::optional(t.scheduled_for, ui::timestamp),
                Cell::text(t.status.clone().unwrap_or_else(|| "pending".to_string())),
            ]);
        }
        self.view.table(table);
        *self.tasks.write() = tasks;
        Ok(())
    }
}

impl Widget for MaintenanceManager {
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
