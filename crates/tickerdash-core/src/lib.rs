//! Core domain types for the tickerdash stock dashboard.
//!
//! This crate provides the types shared by every other crate:
//! - Backend payload records (`StockPrice`, `PortfolioPosition`, `Alert`, ...)
//! - `ColumnPreference`: per-table column selection
//! - `Element`: cloned widget template content
//! - `MarketHours`: trading-hours window used to gate auto-refresh
//! - Currency/percent formatting helpers

pub mod dom;
pub mod error;
pub mod format;
pub mod market_hours;
pub mod types;

pub use dom::{slot, slot_id, Element};
pub use error::{CoreError, Result};
pub use format::{format_currency, format_number, format_percent, Trend};
pub use market_hours::MarketHours;
pub use types::{
    Alert, AlertCondition, BotStatus, ClosingPrice, ColumnPreference, Dividend, DrainerEvent,
    JobAccepted, Kpi, KpiUnit, LogLine, MaintenanceTask, NewAlert, NewMaintenanceTask,
    NewPosition, NewsItem, PortfolioPosition, PositionUpdate, StockPrice,
};
