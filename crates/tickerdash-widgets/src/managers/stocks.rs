//! Stock price table with filter and column selection.

use std::sync::Arc;

use parking_lot::RwLock;
use tickerdash_core::{slot, ColumnPreference, Element, StockPrice};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::WidgetResult;
use crate::surface::{Cell, TableModel};
use crate::ui;
use crate::view::WidgetView;
use crate::widget::{BoxFuture, Widget, WidgetContext};

const WIDGET_ID: &str = "stocks";
/// Push topic and column-preference table name.
const TOPIC: &str = "stocks";

/// Columns shown when the backend has no preference stored.
pub const DEFAULT_COLUMNS: &[&str] = &["symbol", "name", "price", "change", "change_percent"];

#[derive(Debug, Default)]
struct State {
    filter: Option<String>,
    filters: Vec<String>,
    columns: ColumnPreference,
    prices: Vec<StockPrice>,
}

#[derive(Clone)]
pub struct StockPriceManager {
    ctx: WidgetContext,
    view: Arc<WidgetView>,
    state: Arc<RwLock<State>>,
}

impl StockPriceManager {
    pub fn new(ctx: WidgetContext) -> Self {
        let view = Arc::new(WidgetView::new(WIDGET_ID, ctx.surface.clone()));
        Self {
            ctx,
            view,
            state: Arc::new(RwLock::new(State::default())),
        }
    }

    pub fn prices(&self) -> Vec<StockPrice> {
        self.state.read().prices.clone()
    }

    pub fn filter(&self) -> Option<String> {
        self.state.read().filter.clone()
    }

    /// Filter names offered by the backend, as last loaded.
    pub fn filters(&self) -> Vec<String> {
        self.state.read().filters.clone()
    }

    /// Columns currently rendered, in order.
    pub fn visible_columns(&self) -> Vec<String> {
        effective_columns(&self.state.read().columns)
    }

    /// Switch the filter (`None` = all stocks) and reload.
    pub async fn set_filter(&self, filter: Option<String>) -> WidgetResult<()> {
        let filter = filter.filter(|f| !f.trim().is_empty());
        info!(filter = ?filter, "Stock filter changed");
        self.state.write().filter = filter;
        self.load_prices().await
    }

    /// Persist a new visible column list and re-render.
    pub async fn set_visible_columns(&self, visible: Vec<String>) -> WidgetResult<()> {
        let requested = self.state.read().columns.with_visible(visible);
        let result = self
            .ctx
            .api
            .save_visible_columns(TOPIC, &requested.visible)
            .await
            .map_err(Into::into);
        let saved = self.view.settle(result)?;
        self.state.write().columns = saved;
        self.render();
        Ok(())
    }

    async fn load(&self) -> WidgetResult<()> {
        self.load_filters().await;
        self.load_columns().await;
        self.load_prices().await
    }

    /// Filter options are optional; failure leaves the selector empty.
    async fn load_filters(&self) {
        match self.ctx.api.stock_filters().await {
            Ok(filters) => {
                let label = std::iter::once("All".to_string())
                    .chain(filters.iter().cloned())
                    .collect::<Vec<_>>()
                    .join(" | ");
                self.view.text(slot::FILTER, &label);
                self.state.write().filters = filters;
            }
            Err(e) => warn!(error = %e, "Failed to load stock filters"),
        }
    }

    /// Missing preferences fall back to the default column set.
    async fn load_columns(&self) {
        match self.ctx.api.column_preferences(TOPIC).await {
            Ok(pref) => self.state.write().columns = pref,
            Err(e) => {
                warn!(error = %e, "Failed to load column preferences, using defaults");
                self.state.write().columns = default_preference();
            }
        }
    }

    async fn load_prices(&self) -> WidgetResult<()> {
        let filter = self.filter();
        self.view.loading(true);
        let result = self.ctx.api.stock_prices(filter.as_deref()).await;
        self.view.loading(false);

        let prices = self.view.settle(result.map_err(Into::into))?;
        debug!(count = prices.len(), filter = ?filter, "Stock prices loaded");
        self.state.write().prices = prices;
        self.render();
        Ok(())
    }

    fn render(&self) {
        let table = {
            let state = self.state.read();
            build_table(&effective_columns(&state.columns), &state.prices)
        };
        self.view.table(table);
    }

    fn subscribe(&self, token: CancellationToken) {
        let this = self.clone();
        self.ctx.push.spawn_listener(WIDGET_ID, token, move |event| {
            let this = this.clone();
            async move {
                if event.is_refresh_of(TOPIC) {
                    debug!("Stock data refreshed on backend");
                    let _ = this.load_prices().await;
                }
            }
        });
    }
}

impl Widget for StockPriceManager {
    fn id(&self) -> &'static str {
        WIDGET_ID
    }

    fn initialize(&self, container: Option<Element>) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            let Some(token) = self.view.bind(container, &[slot::TABLE, slot::FILTER]) else {
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
        Box::pin(self.load_prices())
    }
}

fn default_preference() -> ColumnPreference {
    let all: Vec<String> = DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect();
    ColumnPreference::new(all.clone(), all)
}

fn effective_columns(pref: &ColumnPreference) -> Vec<String> {
    let columns = pref.effective_columns();
    if columns.is_empty() {
        DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect()
    } else {
        columns
    }
}

fn stock_cell(price: &StockPrice, field: &str) -> Cell {
    match field {
        "symbol" => Cell::text(&price.symbol),
        "name" => Cell::text(price.name.clone().unwrap_or_default()),
        "price" => ui::currency(price.price),
        "change" => ui::optional(price.change, ui::currency_change),
        "change_percent" => ui::optional(price.change_percent, ui::percent),
        "volume" => ui::optional(price.volume, |v| ui::number(v.into(), 0)),
        "updated_at" => ui::optional(price.updated_at, ui::timestamp),
        _ => Cell::empty(),
    }
}

fn build_table(columns: &[String], prices: &[StockPrice]) -> TableModel {
    let fields: Vec<&str> = columns.iter().map(String::as_str).collect();
    let mut table = TableModel::new(ui::columns(&fields));
    for price in prices {
        table.push_row(fields.iter().map(|f| stock_cell(price, f)).collect());
    }
    table
}
