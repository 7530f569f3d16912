//! Latest news headlines, capped at the configured count.

use std::sync::Arc;

use parking_lot::RwLock;
use tickerdash_core::{slot, Element, NewsItem};
use tracing::debug;

use crate::error::WidgetResult;
use crate::surface::{Cell, TableModel};
use crate::ui;
use crate::view::WidgetView;
use crate::widget::{BoxFuture, Widget, WidgetContext};

const WIDGET_ID: &str = "news";

#[derive(Clone)]
pub struct NewsManager {
    ctx: WidgetContext,
    view: Arc<WidgetView>,
    items: Arc<RwLock<Vec<NewsItem>>>,
}

impl NewsManager {
    pub fn new(ctx: WidgetContext) -> Self {
        let view = Arc::new(WidgetView::new(WIDGET_ID, ctx.surface.clone()));
        Self {
            ctx,
            view,
            items: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn items(&self) -> Vec<NewsItem> {
        self.items.read().clone()
    }

    async fn load(&self) -> WidgetResult<()> {
        self.view.loading(true);
        let result = self.ctx.api.news().await;
        self.view.loading(false);

        let mut items = self.view.settle(result.map_err(Into::into))?;
        items.truncate(self.ctx.settings.news_limit);
        debug!(count = items.len(), "News loaded");

        let mut table = TableModel::new(ui::columns(&["published_at", "symbol", "title", "source"]));
        for item in &items {
            table.push_row(vec![
                ui::optional(item.published_at, ui::timestamp),
                Cell::text(item.symbol.clone().unwrap_or_default()),
                Cell::text(&item.title),
                Cell::text(item.source.clone().unwrap_or_default()),
            ]);
        }
        self.view.table(table);
        *self.items.write() = items;
        Ok(())
    }
}

impl Widget for NewsManager {
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
