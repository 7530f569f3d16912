//! tickerdash console client.
//!
//! Wires the dashboard components together:
//! - Configuration loading
//! - One shared `AppContext` (API client, push hub, storage, widgets, layout)
//! - Page dispatch and the layout event loop
//! - Auto-update scheduling

pub mod config;
pub mod console;
pub mod context;
pub mod error;
pub mod shell;
pub mod updater;

pub use config::{AppConfig, Page};
pub use console::ConsoleSurface;
pub use context::AppContext;
pub use error::{AppError, AppResult};
pub use shell::{install_panic_hook, metrics_report, Shell};
pub use updater::{AutoUpdater, UpdateInterval};
