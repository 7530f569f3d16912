//! Typed wrappers for the backend's REST endpoints.

use reqwest::Method;
use serde::Serialize;
use tickerdash_core::{
    Alert, BotStatus, ClosingPrice, ColumnPreference, Dividend, DrainerEvent, JobAccepted, Kpi,
    LogLine, MaintenanceTask, NewAlert, NewMaintenanceTask, NewPosition, NewsItem,
    PortfolioPosition, PositionUpdate, StockPrice,
};

use crate::client::ApiClient;
use crate::error::ApiResult;

#[derive(Serialize)]
struct VisibleColumns<'a> {
    visible: &'a [String],
}

impl ApiClient {
    // --- Stocks ---

    /// Latest prices, optionally restricted to a named filter.
    pub async fn stock_prices(&self, filter: Option<&str>) -> ApiResult<Vec<StockPrice>> {
        match filter {
            Some(f) if !f.is_empty() => {
                self.get_json_with_query("/api/stocks", &[("filter", f)])
                    .await
            }
            _ => self.get_json("/api/stocks").await,
        }
    }

    /// Names of the filters the backend offers for the stock table.
    pub async fn stock_filters(&self) -> ApiResult<Vec<String>> {
        self.get_json("/api/stocks/filters").await
    }

    pub async fn column_preferences(&self, table: &str) -> ApiResult<ColumnPreference> {
        self.get_json(&format!("/api/columns/{table}")).await
    }

    /// Persist the visible column list; returns the stored preference.
    pub async fn save_visible_columns(
        &self,
        table: &str,
        visible: &[String],
    ) -> ApiResult<ColumnPreference> {
        self.send_json(
            Method::POST,
            &format!("/api/columns/{table}"),
            &VisibleColumns { visible },
        )
        .await
    }

    // --- Portfolio ---

    pub async fn portfolio(&self) -> ApiResult<Vec<PortfolioPosition>> {
        self.get_json("/api/portfolio").await
    }

    pub async fn add_position(&self, position: &NewPosition) -> ApiResult<PortfolioPosition> {
        self.send_json(Method::POST, "/api/portfolio", position)
            .await
    }

    pub async fn update_position(
        &self,
        id: i64,
        update: &PositionUpdate,
    ) -> ApiResult<PortfolioPosition> {
        self.send_json(Method::PUT, &format!("/api/portfolio/{id}"), update)
            .await
    }

    pub async fn delete_position(&self, id: i64) -> ApiResult<()> {
        self.send_empty(Method::DELETE, &format!("/api/portfolio/{id}"))
            .await
    }

    // --- Read-only tables ---

    pub async fn dividends(&self) -> ApiResult<Vec<Dividend>> {
        self.get_json("/api/dividends").await
    }

    pub async fn kpis(&self) -> ApiResult<Vec<Kpi>> {
        self.get_json("/api/kpis").await
    }

    pub async fn news(&self) -> ApiResult<Vec<NewsItem>> {
        self.get_json("/api/news").await
    }

    pub async fn closing_prices(&self) -> ApiResult<Vec<ClosingPrice>> {
        self.get_json("/api/closing").await
    }

    // --- Drainer ---

    pub async fn drainer_events(&self) -> ApiResult<Vec<DrainerEvent>> {
        self.get_json("/api/drainer/events").await
    }

    /// Start the drainer analysis job. Completion is reported on the push channel.
    pub async fn run_drainer_analysis(&self) -> ApiResult<JobAccepted> {
        self.send_json(Method::POST, "/api/drainer/analyze", &serde_json::json!({}))
            .await
    }

    // --- Alerts ---

    pub async fn alerts(&self) -> ApiResult<Vec<Alert>> {
        self.get_json("/api/alerts").await
    }

    pub async fn add_alert(&self, alert: &NewAlert) -> ApiResult<Alert> {
        self.send_json(Method::POST, "/api/alerts", alert).await
    }

    pub async fn delete_alert(&self, id: i64) -> ApiResult<()> {
        self.send_empty(Method::DELETE, &format!("/api/alerts/{id}"))
            .await
    }

    // --- Bot ---

    pub async fn bot_status(&self) -> ApiResult<BotStatus> {
        self.get_json("/api/bot/status").await
    }

    /// Ask the bot to refresh its data. Completion is reported on the push channel.
    pub async fn trigger_bot_update(&self) -> ApiResult<JobAccepted> {
        self.send_json(Method::POST, "/api/bot/update", &serde_json::json!({}))
            .await
    }

    // --- Maintenance ---

    pub async fn maintenance_tasks(&self) -> ApiResult<Vec<MaintenanceTask>> {
        self.get_json("/api/maintenance").await
    }

    pub async fn add_maintenance_task(
        &self,
        task: &NewMaintenanceTask,
    ) -> ApiResult<MaintenanceTask> {
        self.send_json(Method::POST, "/api/maintenance", task)
            .await
    }

    pub async fn delete_maintenance_task(&self, id: i64) -> ApiResult<()> {
        self.send_empty(Method::DELETE, &format!("/api/maintenance/{id}"))
            .await
    }

    // --- Logs ---

    /// The last `lines` lines of the backend log.
    pub async fn logs(&self, lines: usize) -> ApiResult<Vec<LogLine>> {
        self.get_json_with_query("/api/logs", &[("lines", lines)])
            .await
    }
}
