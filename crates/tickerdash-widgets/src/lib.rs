//! Widget managers for the tickerdash dashboard.
//!
//! Each manager owns one widget container: it fetches its data set from the
//! backend, renders it through the [`Surface`] table adapter, refetches after
//! every write, and listens on the push channel while mounted.
//!
//! Managers are dispatched by widget id through the [`WidgetRegistry`].

pub mod error;
pub mod managers;
pub mod registry;
pub mod surface;
pub mod ui;
pub mod view;
pub mod widget;

pub use error::{WidgetError, WidgetResult};
pub use managers::{
    AlertManager, BotStatusManager, ClosingManager, DividendManager, DrainerManager, KpiManager,
    LogsManager, MaintenanceManager, NewsManager, PortfolioManager, PortfolioSummary,
    StockPriceManager, WidgetSet,
};
pub use registry::WidgetRegistry;
pub use surface::{Cell, Column, RecordingSurface, Surface, TableModel};
pub use view::WidgetView;
pub use widget::{BoxFuture, Widget, WidgetContext, WidgetSettings};
