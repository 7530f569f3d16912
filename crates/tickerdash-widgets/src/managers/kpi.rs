//! Key figures: a table plus one-line cards.

use std::sync::Arc;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use tickerdash_core::{format_currency, format_number, format_percent, slot, Element, Kpi, KpiUnit};
use tracing::debug;

use crate::error::WidgetResult;
use crate::surface::{Cell, TableModel};
use crate::ui;
use crate::view::WidgetView;
use crate::widget::{BoxFuture, Widget, WidgetContext};

const WIDGET_ID: &str = "kpis";

#[derive(Clone)]
pub struct KpiManager {
    ctx: WidgetContext,
    view: Arc<WidgetView>,
    kpis: Arc<RwLock<Vec<Kpi>>>,
}

impl KpiManager {
    pub fn new(ctx: WidgetContext) -> Self {
        let view = Arc::new(WidgetView::new(WIDGET_ID, ctx.surface.clone()));
        Self {
            ctx,
            view,
            kpis: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn kpis(&self) -> Vec<Kpi> {
        self.kpis.read().clone()
    }

    async fn load(&self) -> WidgetResult<()> {
        self.view.loading(true);
        let result = self.ctx.api.kpis().await;
        self.view.loading(false);

        let kpis = self.view.settle(result.map_err(Into::into))?;
        debug!(count = kpis.len(), "KPIs loaded");
        self.view.table(build_table(&kpis));
        self.view.text(slot::CARDS, &cards_text(&kpis));
        *self.kpis.write() = kpis;
        Ok(())
    }
}

impl Widget for KpiManager {
    fn id(&self) -> &'static str {
        WIDGET_ID
    }

    fn initialize(&self, container: Option<Element>) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if self.view.bind(container, &[slot::TABLE, slot::CARDS]).is_some() {
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

fn format_value(value: Decimal, unit: KpiUnit) -> String {
    match unit {
        KpiUnit::Currency => format_currency(value),
        KpiUnit::Percent => format_percent(value),
        KpiUnit::Number => format_number(value, 2),
    }
}

fn cards_text(kpis: &[Kpi]) -> String {
    kpis.iter()
        .map(|k| format!("{}: {}", k.name, format_value(k.value, k.unit)))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn build_table(kpis: &[Kpi]) -> TableModel {
    let mut table = TableModel::new(ui::columns(&["name", "value", "change"]));
    for kpi in kpis {
        table.push_row(vec![
            Cell::text(&kpi.name),
            Cell::text(format_value(kpi.value, kpi.unit)),
            ui::optional(kpi.change, ui::percent),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn kpi(name: &str, value: Decimal, unit: KpiUnit) -> Kpi {
        Kpi {
            name: name.to_string(),
            value,
            unit,
            change: None,
        }
    }

    #[test]
    fn test_value_formatted_by_unit() {
        assert_eq!(format_value(dec!(1500), KpiUnit::Currency), "$1,500.00");
        assert_eq!(format_value(dec!(3.5), KpiUnit::Percent), "+3.50%");
        assert_eq!(format_value(dec!(12), KpiUnit::Number), "12.00");
    }

    #[test]
    fn test_cards_text() {
        let text = cards_text(&[
            kpi("Net worth", dec!(52000), KpiUnit::Currency),
            kpi("YTD", dec!(-1.2), KpiUnit::Percent),
        ]);
        assert_eq!(text, "Net worth: $52,000.00 | YTD: -1.20%");
    }
}
