//! Logs page: tail of the backend log.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tickerdash_core::{slot, Element, LogLine};

use crate::error::WidgetResult;
use crate::surface::{Cell, TableModel};
use crate::ui;
use crate::view::WidgetView;
use crate::widget::{BoxFuture, Widget, WidgetContext};

const WIDGET_ID: &str = "logs";

fn level_class(level: &str) -> Option<&'static str> {
    match level.to_ascii_uppercase().as_str() {
        "ERROR" | "CRITICAL" => Some("negative"),
        "WARN" | "WARNING" => Some("warning"),
        _ => None,
    }
}

#[derive(Clone)]
pub struct LogsManager {
    ctx: WidgetContext,
    view: Arc<WidgetView>,
    lines: Arc<RwLock<Vec<LogLine>>>,
    limit: Arc<AtomicUsize>,
}

impl LogsManager {
    pub fn new(ctx: WidgetContext) -> Self {
        let view = Arc::new(WidgetView::new(WIDGET_ID, ctx.surface.clone()));
        let limit = Arc::new(AtomicUsize::new(ctx.settings.log_lines));
        Self {
            ctx,
            view,
            lines: Arc::new(RwLock::new(Vec::new())),
            limit,
        }
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.read().clone()
    }

    /// Change how many lines are fetched, then reload.
    pub async fn set_line_count(&self, lines: usize) -> WidgetResult<()> {
        self.limit.store(lines.max(1), Ordering::SeqCst);
        self.load().await
    }

    async fn load(&self) -> WidgetResult<()> {
        let limit = self.limit.load(Ordering::SeqCst);
        self.view.loading(true);
        let result = self.ctx.api.logs(limit).await;
        self.view.loading(false);

        let lines = self.view.settle(result.map_err(Into::into))?;
        let mut table = TableModel::new(ui::columns(&["timestamp", "level", "message"]));
        for line in &lines {
            let level = match level_class(&line.level) {
                Some(class) => Cell::styled(&line.level, class),
                None => Cell::text(&line.level),
            };
            table.push_row(vec![
                Cell::text(line.timestamp.clone().unwrap_or_default()),
                level,
                Cell::text(&line.message),
            ]);
        }
        self.view.table(table);
        *self.lines.write() = lines;
        Ok(())
    }
}

impl Widget for LogsManager {
    fn id(&self) -> &'static str {
        WIDGET_ID
    }

    fn initialize(&self, container: Option<Element>) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if self.view.bind(container, &[slot::TABLE]).is_some() {
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
