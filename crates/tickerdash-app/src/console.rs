//! Text rendering of widget output.

use std::io::Write;

use parking_lot::Mutex;
use tickerdash_widgets::{Surface, TableModel};
use tracing::{debug, error};

/// Writes tables, texts and banners to a terminal-like sink.
pub struct ConsoleSurface {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSurface {
    pub fn stdout() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn write(&self, text: &str) {
        let mut out = self.out.lock();
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
            error!(error = %e, "Failed to write console output");
        }
    }
}

impl Surface for ConsoleSurface {
    fn render_table(&self, slot: &str, table: TableModel) {
        self.write(&format_table(slot, &table));
    }

    fn destroy_table(&self, slot: &str) {
        debug!(slot, "Table destroyed");
    }

    fn set_text(&self, slot: &str, text: &str) {
        self.write(&format!("[{slot}] {text}\n"));
    }

    fn show_error(&self, slot: &str, message: &str) {
        self.write(&format!("[{slot}] ERROR: {message}\n"));
    }

    fn clear_error(&self, _slot: &str) {}

    fn set_loading(&self, slot: &str, loading: bool) {
        if loading {
            self.write(&format!("[{slot}] loading...\n"));
        }
    }

    fn show_reload_prompt(&self, message: &str) {
        self.write(&format!(
            "\n!! {message}\n!! Something went wrong. Please restart tickerdash.\n"
        ));
    }
}

/// Render a table as left-aligned columns under a slot heading.
pub fn format_table(slot: &str, table: &TableModel) -> String {
    let headers: Vec<&str> = table.columns.iter().map(|c| c.title.as_str()).collect();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.text.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(text, w)| format!("{text:<w$}"))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = format!("== {slot} ({} rows)\n", table.len());
    out.push_str(&line(headers));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for row in &table.rows {
        out.push_str(&line(row.iter().map(|c| c.text.as_str()).collect()));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tickerdash_widgets::{Cell, Column};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    fn table() -> TableModel {
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
        table.push_row(vec![Cell::text("AAPL"), Cell::text("$190.50")]);
        table.push_row(vec![Cell::text("KO"), Cell::text("$61.00")]);
        table
    }

    #[test]
    fn test_format_table_aligns_columns() {
        let text = format_table("stocksTable", &table());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "== stocksTable (2 rows)");
        assert_eq!(lines[1], "Symbol  Price");
        assert_eq!(lines[2], "------  -------");
        assert_eq!(lines[3], "AAPL    $190.50");
        assert_eq!(lines[4], "KO      $61.00");
    }

    #[test]
    fn test_surface_writes_banners() {
        let buffer = Buffer::default();
        let surface = ConsoleSurface::with_writer(Box::new(buffer.clone()));

        surface.show_error("alertsMessage", "Server error (500): boom");
        surface.set_text("portfolioSummary", "Total value: $0.00");
        surface.show_reload_prompt("panic in widget");

        let out = buffer.contents();
        assert!(out.contains("[alertsMessage] ERROR: Server error (500): boom"));
        assert!(out.contains("[portfolioSummary] Total value: $0.00"));
        assert!(out.contains("!! panic in widget"));
    }
}
