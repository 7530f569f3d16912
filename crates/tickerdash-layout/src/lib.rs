//! Dashboard grid layout for tickerdash.
//!
//! Keeps the set of visible widgets and their grid positions, persists them
//! across restarts, and announces added/removed widgets so their managers
//! can mount and unmount.
//!
//! The grid library, widget templates, and browser-style key/value storage
//! sit behind the [`GridEngine`], [`TemplateSource`], and [`Storage`] traits.

pub mod catalog;
pub mod error;
pub mod grid;
pub mod layout;
pub mod storage;
pub mod template;
pub mod theme;

pub use catalog::{definition, WidgetDefinition, CATALOG, DEFAULT_LAYOUT};
pub use error::{LayoutError, LayoutResult};
pub use grid::{
    GridEngine, GridEvent, GridNode, GridOptions, MemoryGrid, NodeOptions, NodeSpec, MAX_ROWS,
};
pub use layout::{DashboardLayout, LayoutEntry, LayoutEvent};
pub use storage::{
    FileStorage, MemoryStorage, Storage, AUTO_UPDATE_INTERVAL_KEY, LAYOUT_KEY, THEME_KEY,
};
pub use template::{TemplateRegistry, TemplateSource};
pub use theme::{load_theme, save_theme, Theme};
