//! Dividend payments with an annual total.

use std::sync::Arc;

use chrono::{Datelike, Local};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tickerdash_core::{format_currency, slot, Dividend, Element};
use tracing::debug;

use crate::error::WidgetResult;
use crate::surface::{Cell, TableModel};
use crate::ui;
use crate::view::WidgetView;
use crate::widget::{BoxFuture, Widget, WidgetContext};

const WIDGET_ID: &str = "dividends";

#[derive(Clone)]
pub struct DividendManager {
    ctx: WidgetContext,
    view: Arc<WidgetView>,
    dividends: Arc<RwLock<Vec<Dividend>>>,
}

impl DividendManager {
    pub fn new(ctx: WidgetContext) -> Self {
        let view = Arc::new(WidgetView::new(WIDGET_ID, ctx.surface.clone()));
        Self {
            ctx,
            view,
            dividends: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn dividends(&self) -> Vec<Dividend> {
        self.dividends.read().clone()
    }

    async fn load(&self) -> WidgetResult<()> {
        self.view.loading(true);
        let result = self.ctx.api.dividends().await;
        self.view.loading(false);

        let dividends = self.view.settle(result.map_err(Into::into))?;
        let year = Local::now().year();
        let total = annual_total(&dividends, year);
        debug!(count = dividends.len(), year, %total, "Dividends loaded");

        self.view.table(build_table(&dividends));
        self.view
            .text(slot::SUMMARY, &format!("{year} total: {}", format_currency(total)));
        *self.dividends.write() = dividends;
        Ok(())
    }
}

impl Widget for DividendManager {
    fn id(&self) -> &'static str {
        WIDGET_ID
    }

    fn initialize(&self, container: Option<Element>) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if self.view.bind(container, &[slot::TABLE, slot::SUMMARY]).is_some() {
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

/// Sum of known payouts dated (pay date, else ex date) in `year`.
pub fn annual_total(dividends: &[Dividend], year: i32) -> Decimal {
    dividends
        .iter()
        .filter(|d| d.pay_date.or(d.ex_date).is_some_and(|date| date.year() == year))
        .filter_map(Dividend::total)
        .sum()
}

fn build_table(dividends: &[Dividend]) -> TableModel {
    let mut table = TableModel::new(ui::columns(&[
        "symbol", "ex_date", "pay_date", "amount", "shares", "total",
    ]));
    for d in dividends {
        table.push_row(vec![
            Cell::text(&d.symbol),
            ui::optional(d.ex_date, ui::date),
            ui::optional(d.pay_date, ui::date),
            ui::currency(d.amount),
            ui::optional(d.shares, |s| ui::number(s, 2)),
            ui::optional(d.total(), ui::currency),
        ]);
    }
    table
}
