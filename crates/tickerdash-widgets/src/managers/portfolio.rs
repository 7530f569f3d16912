//! Portfolio positions with add/update/delete and a value summary.

use std::sync::Arc;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use tickerdash_core::{
    format_currency, format_percent, slot, CoreError, Element, NewPosition, PortfolioPosition,
    PositionUpdate,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{WidgetError, WidgetResult};
use crate::surface::{Cell, TableModel};
use crate::ui;
use crate::view::WidgetView;
use crate::widget::{BoxFuture, Widget, WidgetContext};

const WIDGET_ID: &str = "portfolio";
const TOPIC: &str = "portfolio";

const COLUMNS: &[&str] = &[
    "symbol",
    "quantity",
    "purchase_price",
    "current_price",
    "market_value",
    "gain",
    "gain_percent",
];

/// Totals across all positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortfolioSummary {
    pub total_value: Decimal,
    pub total_cost: Decimal,
    pub total_gain: Decimal,
    pub gain_percent: Option<Decimal>,
}

impl PortfolioSummary {
    pub fn from_positions(positions: &[PortfolioPosition]) -> Self {
        let total_value: Decimal = positions.iter().map(PortfolioPosition::market_value).sum();
        let total_cost: Decimal = positions.iter().map(PortfolioPosition::cost_basis).sum();
        let total_gain = total_value - total_cost;
        let gain_percent =
            (!total_cost.is_zero()).then(|| total_gain / total_cost * Decimal::ONE_HUNDRED);
        Self {
            total_value,
            total_cost,
            total_gain,
            gain_percent,
        }
    }

    pub fn text(&self) -> String {
        let pct = self
            .gain_percent
            .map(|p| format!(" ({})", format_percent(p)))
            .unwrap_or_default();
        format!(
            "Total value: {} | Gain: {}{}",
            format_currency(self.total_value),
            format_currency(self.total_gain),
            pct
        )
    }
}

#[derive(Clone)]
pub struct PortfolioManager {
    ctx: WidgetContext,
    view: Arc<WidgetView>,
    positions: Arc<RwLock<Vec<PortfolioPosition>>>,
}

impl PortfolioManager {
    pub fn new(ctx: WidgetContext) -> Self {
        let view = Arc::new(WidgetView::new(WIDGET_ID, ctx.surface.clone()));
        Self {
            ctx,
            view,
            positions: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn positions(&self) -> Vec<PortfolioPosition> {
        self.positions.read().clone()
    }

    pub fn summary(&self) -> PortfolioSummary {
        PortfolioSummary::from_positions(&self.positions.read())
    }

    pub async fn add_position(&self, position: NewPosition) -> WidgetResult<()> {
        let position = self.view.settle(validate(position))?;
        let result = self.ctx.api.add_position(&position).await;
        let created = self.view.settle(result.map_err(Into::into))?;
        info!(id = created.id, symbol = %created.symbol, "Position added");
        self.load().await
    }

    pub async fn update_position(&self, id: i64, update: PositionUpdate) -> WidgetResult<()> {
        let result = self.ctx.api.update_position(id, &update).await;
        self.view.settle(result.map_err(Into::into))?;
        info!(id, "Position updated");
        self.load().await
    }

    pub async fn delete_position(&self, id: i64) -> WidgetResult<()> {
        let result = self.ctx.api.delete_position(id).await;
        self.view.settle(result.map_err(Into::into))?;
        info!(id, "Position deleted");
        self.load().await
    }

    async fn load(&self) -> WidgetResult<()> {
        self.view.loading(true);
        let result = self.ctx.api.portfolio().await;
        self.view.loading(false);

        let positions = self.view.settle(result.map_err(Into::into))?;
        debug!(count = positions.len(), "Portfolio loaded");
        let summary = PortfolioSummary::from_positions(&positions);
        let table = build_table(&positions);
        *self.positions.write() = positions;

        self.view.table(table);
        self.view.text(slot::SUMMARY, &summary.text());
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

impl Widget for PortfolioManager {
    fn id(&self) -> &'static str {
        WIDGET_ID
    }

    fn initialize(&self, container: Option<Element>) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            let slots = [slot::TABLE, slot::SUMMARY, slot::FORM];
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

fn validate(mut position: NewPosition) -> WidgetResult<NewPosition> {
    position.symbol = position.symbol.trim().to_ascii_uppercase();
    let invalid = |field, reason: &str| {
        WidgetError::Invalid(CoreError::InvalidValue {
            field,
            reason: reason.to_string(),
        })
    };
    if position.symbol.is_empty() {
        return Err(invalid("symbol", "symbol is required"));
    }
    if position.quantity <= Decimal::ZERO {
        return Err(invalid("quantity", "quantity must be greater than zero"));
    }
    if position.purchase_price <= Decimal::ZERO {
        return Err(invalid("purchase_price", "purchase price must be greater than zero"));
    }
    Ok(position)
}

fn build_table(positions: &[PortfolioPosition]) -> TableModel {
    let mut table = TableModel::new(ui::columns(COLUMNS));
    for p in positions {
        table.push_row(vec![
            Cell::text(&p.symbol),
            ui::number(p.quantity, 2),
            ui::currency(p.purchase_price),
            ui::optional(p.current_price, ui::currency),
            ui::currency(p.market_value()),
            ui::currency_change(p.gain()),
            ui::optional(p.gain_percent(), ui::percent),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn position(id: i64, qty: Decimal, cost: Decimal, px: Decimal) -> PortfolioPosition {
        PortfolioPosition {
            id,
            symbol: "MSFT".to_string(),
            quantity: qty,
            purchase_price: cost,
            current_price: Some(px),
            purchase_date: None,
        }
    }

    #[test]
    fn test_summary_totals() {
        let summary = PortfolioSummary::from_positions(&[
            position(1, dec!(10), dec!(100), dec!(120)),
            position(2, dec!(5), dec!(200), dec!(180)),
        ]);
        assert_eq!(summary.total_cost, dec!(2000));
        assert_eq!(summary.total_value, dec!(2100));
        assert_eq!(summary.total_gain, dec!(100));
        assert_eq!(summary.gain_percent, Some(dec!(5)));
        assert_eq!(
            summary.text(),
            "Total value: $2,100.00 | Gain: $100.00 (+5.00%)"
        );
    }

    #[test]
    fn test_empty_summary() {
        let summary = PortfolioSummary::from_positions(&[]);
        assert_eq!(summary.gain_percent, None);
        assert_eq!(summary.text(), "Total value: $0.00 | Gain: $0.00");
    }

    #[test]
    fn test_validate_position() {
        let ok = validate(NewPosition {
            symbol: " nvda".to_string(),
            quantity: dec!(3),
            purchase_price: dec!(410),
            purchase_date: None,
        })
        .unwrap();
        assert_eq!(ok.symbol, "NVDA");

        let err = validate(NewPosition {
            symbol: "NVDA".to_string(),
            quantity: dec!(0),
            purchase_price: dec!(410),
            purchase_date: None,
        })
        .unwrap_err();
        assert_eq!(err.user_message(), "quantity must be greater than zero");
    }

    #[test]
    fn test_table_row() {
        let table = build_table(&[position(1, dec!(10), dec!(100), dec!(90))]);
        assert_eq!(table.cell(0, "market_value"), Some("$900.00"));
        assert_eq!(table.cell(0, "gain"), Some("-$100.00"));
        assert_eq!(table.cell(0, "gain_percent"), Some("-10.00%"));
    }
}
