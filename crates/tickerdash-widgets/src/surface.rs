//! Rendering adapter.
//!
//! Managers never draw anything themselves; they hand finished table models
//! and text to a [`Surface`] addressed by slot id. The console binary prints,
//! tests record.

use std::collections::HashMap;

use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub field: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    /// Style class, e.g. `positive` / `negative`.
    pub class: Option<&'static str>,
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            class: None,
        }
    }

    pub fn styled(text: impl Into<String>, class: &'static str) -> Self {
        Self {
            text: text.into(),
            class: Some(class),
        }
    }

    pub fn empty() -> Self {
        Self::text("")
    }
}

/// A fully built table, ready to render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableModel {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

impl TableModel {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_fields(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.field.as_str()).collect()
    }

    /// Cell text by row index and column field.
    pub fn cell(&self, row: usize, field: &str) -> Option<&str> {
        let col = self.columns.iter().position(|c| c.field == field)?;
        self.rows.get(row)?.get(col).map(|c| c.text.as_str())
    }
}

pub trait Surface: Send + Sync {
    /// Build a table in `slot`. Any previous table there is replaced.
    fn render_table(&self, slot: &str, table: TableModel);
    fn destroy_table(&self, slot: &str);
    fn set_text(&self, slot: &str, text: &str);
    /// Show an inline error banner.
    fn show_error(&self, slot: &str, message: &str);
    fn clear_error(&self, slot: &str);
    fn set_loading(&self, slot: &str, loading: bool);
    /// Full-page prompt asking the user to reload after a fatal error.
    fn show_reload_prompt(&self, message: &str);
}

#[derive(Debug, Default)]
struct Recorded {
    tables: HashMap<String, TableModel>,
    texts: HashMap<String, String>,
    errors: HashMap<String, String>,
    loading: HashMap<String, bool>,
    destroyed: HashMap<String, usize>,
    renders: HashMap<String, usize>,
    reload_prompt: Option<String>,
}

/// Surface that records the latest state of every slot.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    inner: Mutex<Recorded>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, slot: &str) -> Option<TableModel> {
        self.inner.lock().tables.get(slot).cloned()
    }

    pub fn text(&self, slot: &str) -> Option<String> {
        self.inner.lock().texts.get(slot).cloned()
    }

    pub fn error(&self, slot: &str) -> Option<String> {
        self.inner.lock().errors.get(slot).cloned()
    }

    pub fn is_loading(&self, slot: &str) -> bool {
        self.inner.lock().loading.get(slot).copied().unwrap_or(false)
    }

    pub fn render_count(&self, slot: &str) -> usize {
        self.inner.lock().renders.get(slot).copied().unwrap_or(0)
    }

    pub fn destroy_count(&self, slot: &str) -> usize {
        self.inner.lock().destroyed.get(slot).copied().unwrap_or(0)
    }

    pub fn reload_prompt(&self) -> Option<String> {
        self.inner.lock().reload_prompt.clone()
    }
}

impl Surface for RecordingSurface {
    fn render_table(&self, slot: &str, table: TableModel) {
        let mut inner = self.inner.lock();
        inner.tables.insert(slot.to_string(), table);
        *inner.renders.entry(slot.to_string()).or_default() += 1;
    }

    fn destroy_table(&self, slot: &str) {
        let mut inner = self.inner.lock();
        if inner.tables.remove(slot).is_some() {
            *inner.destroyed.entry(slot.to_string()).or_default() += 1;
        }
    }

    fn set_text(&self, slot: &str, text: &str) {
        self.inner
            .lock()
            .texts
            .insert(slot.to_string(), text.to_string());
    }

    fn show_error(&self, slot: &str, message: &str) {
        self.inner
            .lock()
            .errors
            .insert(slot.to_string(), message.to_string());
    }

    fn clear_error(&self, slot: &str) {
        self.inner.lock().errors.remove(slot);
    }

    fn set_loading(&self, slot: &str, loading: bool) {
        self.inner.lock().loading.insert(slot.to_string(), loading);
    }

    fn show_reload_prompt(&self, message: &str) {
        self.inner.lock().reload_prompt = Some(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> TableModel {
        let mut table = TableModel::new(vec![
            Column {
                field: "symbol".to_string(),
                title: "Symbol".to_string(),
            },
            Column {
                field: "price".to_string(),
                title: "Price".to_string(),
            },
        ]);
        table.push_row(vec![Cell::text("AAPL"), Cell::styled("$1.00", "positive")]);
        table
    }

    #[test]
    fn test_cell_lookup() {
        let table = model();
        assert_eq!(table.cell(0, "price"), Some("$1.00"));
        assert_eq!(table.cell(0, "volume"), None);
        assert_eq!(table.cell(1, "symbol"), None);
        assert_eq!(table.column_fields(), vec!["symbol", "price"]);
    }

    #[test]
    fn test_recording_surface_tracks_rebuilds() {
        let surface = RecordingSurface::new();
        surface.destroy_table("t");
        surface.render_table("t", model());
        surface.destroy_table("t");
        surface.render_table("t", model());

        assert_eq!(surface.render_count("t"), 2);
        assert_eq!(surface.destroy_count("t"), 1);
        assert_eq!(surface.table("t").unwrap().len(), 1);
    }

    #[test]
    fn test_recording_surface_errors_and_loading() {
        let surface = RecordingSurface::new();
        surface.set_loading("t", true);
        surface.show_error("m", "boom");
        assert!(surface.is_loading("t"));
        assert_eq!(surface.error("m").as_deref(), Some("boom"));
        surface.clear_error("m");
        surface.set_loading("t", false);
        assert!(surface.error("m").is_none());
        assert!(!surface.is_loading("t"));
    }
}
