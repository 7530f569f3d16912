//! One manager per widget.

mod alert;
mod bot_status;
mod closing;
mod dividend;
mod drainer;
mod job;
mod kpi;
mod logs;
mod maintenance;
mod news;
mod portfolio;
mod stocks;

use std::sync::Arc;

pub use alert::AlertManager;
pub use bot_status::BotStatusManager;
pub use closing::ClosingManager;
pub use dividend::{annual_total, DividendManager};
pub use drainer::DrainerManager;
pub use kpi::KpiManager;
pub use logs::LogsManager;
pub use maintenance::MaintenanceManager;
pub use news::NewsManager;
pub use portfolio::{PortfolioManager, PortfolioSummary};
pub use stocks::StockPriceManager;

use crate::registry::WidgetRegistry;
use crate::widget::WidgetContext;

/// Every manager, built once from the shared context.
#[derive(Clone)]
pub struct WidgetSet {
    pub stocks: StockPriceManager,
    pub portfolio: PortfolioManager,
    pub kpis: KpiManager,
    pub dividends: DividendManager,
    pub drainer: DrainerManager,
    pub alerts: AlertManager,
    pub news: NewsManager,
    pub bot_status: BotStatusManager,
    pub closing: ClosingManager,
    pub maintenance: MaintenanceManager,
    pub logs: LogsManager,
}

impl WidgetSet {
    pub fn new(ctx: &WidgetContext) -> Self {
        Self {
            stocks: StockPriceManager::new(ctx.clone()),
            portfolio: PortfolioManager::new(ctx.clone()),
            kpis: KpiManager::new(ctx.clone()),
            dividends: DividendManager::new(ctx.clone()),
            drainer: DrainerManager::new(ctx.clone()),
            alerts: AlertManager::new(ctx.clone()),
            news: NewsManager::new(ctx.clone()),
            bot_status: BotStatusManager::new(ctx.clone()),
            closing: ClosingManager::new(ctx.clone()),
            maintenance: MaintenanceManager::new(ctx.clone()),
            logs: LogsManager::new(ctx.clone()),
        }
    }

    /// A registry dispatching to these managers by widget id.
    ///
    /// Managers are cheap handles; the registry shares their state.
    pub fn registry(&self) -> WidgetRegistry {
        let mut registry = WidgetRegistry::new();
        registry.register(Arc::new(self.stocks.clone()));
        registry.register(Arc::new(self.portfolio.clone()));
        registry.register(Arc::new(self.kpis.clone()));
        registry.register(Arc::new(self.dividends.clone()));
        registry.register(Arc::new(self.drainer.clone()));
        registry.register(Arc::new(self.alerts.clone()));
        registry.register(Arc::new(self.news.clone()));
        registry.register(Arc::new(self.bot_status.clone()));
        registry.register(Arc::new(self.closing.clone()));
        registry.register(Arc::new(self.maintenance.clone()));
        registry.register(Arc::new(self.logs.clone()));
        registry
    }
}
