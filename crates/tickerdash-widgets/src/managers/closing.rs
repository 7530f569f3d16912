//! Daily closing prices, reloaded when the backend publishes new closes.

use std::sync::Arc;

use parking_lot::RwLock;
use tickerdash_core::{slot, ClosingPrice, Element};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::WidgetResult;
use crate::surface::{Cell, TableModel};
use crate::ui;
use crate::view::WidgetView;
use crate::widget::{BoxFuture, Widget, WidgetContext};

const WIDGET_ID: &str = "closing";
const TOPIC: &str = "closing";

#[derive(Clone)]
pub struct ClosingManager {
    ctx: WidgetContext,
    view: Arc<WidgetView>,
    prices: Arc<RwLock<Vec<ClosingPrice>>>,
}

impl ClosingManager {
    pub fn new(ctx: WidgetContext) -> Self {
        let view = Arc::new(WidgetView::new(WIDGET_ID, ctx.surface.clone()));
        Self {
            ctx,
            view,
            prices: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn prices(&self) -> Vec<ClosingPrice> {
        self.prices.read().clone()
    }

    async fn load(&self) -> WidgetResult<()> {
        self.view.loading(true);
        let result = self.ctx.api.closing_prices().await;
        self.view.loading(false);

        let prices = self.view.settle(result.map_err(Into::into))?;
        debug!(count = prices.len(), "Closing prices loaded");

        let mut table = TableModel::new(ui::columns(&["date", "symbol", "close", "change_percent"]));
        for p in &prices {
            table.push_row(vec![
                ui::date(p.date),
                Cell::text(&p.symbol),
                ui::currency(p.close),
                ui::optional(p.change_percent, ui::percent),
            ]);
        }
        self.view.table(table);
        *self.prices.write() = prices;
        Ok(())
    }

    fn subscribe(&self, token: CancellationToken) {
        let this = self.clone();
        self.ctx.push.spawn_listener(WIDGET_ID, token, move |event| {
            let this = this.clone();
            async move {
                if event.is_refresh_of(TOPIC) {
                    let _ = this.load().await;
                }
            }
        });
    }
}

impl Widget for ClosingManager {
    fn id(&self) -> &'static str {
        WIDGET_ID
    }

    fn initialize(&self, container: Option<Element>) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            let Some(token) = self.view.bind(container, &[slot::TABLE]) else {
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
