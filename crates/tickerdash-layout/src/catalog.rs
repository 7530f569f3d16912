//! Static widget catalog.

/// One entry of the "add widget" catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub w: u32,
    pub h: u32,
    pub min_w: u32,
    pub min_h: u32,
}

impl WidgetDefinition {
    /// Id of the template whose content is cloned into the grid.
    pub fn template_id(&self) -> String {
        format!("{}Template", self.id)
    }
}

const fn def(
    id: &'static str,
    title: &'static str,
    w: u32,
    h: u32,
    min_w: u32,
    min_h: u32,
) -> WidgetDefinition {
    WidgetDefinition {
        id,
        title,
        w,
        h,
        min_w,
        min_h,
    }
}

/// Every widget the dashboard knows, in menu order.
pub const CATALOG: &[WidgetDefinition] = &[
    def("stocks", "Stock Prices", 12, 6, 6, 4),
    def("portfolio", "Portfolio", 8, 5, 4, 3),
    def("kpis", "Key Figures", 4, 3, 3, 2),
    def("dividends", "Dividends", 6, 4, 4, 3),
    def("drainer", "Drainer Events", 6, 4, 4, 3),
    def("alerts", "Price Alerts", 4, 4, 3, 3),
    def("news", "News", 6, 4, 3, 3),
    def("botStatus", "Bot Status", 3, 2, 2, 2),
    def("closing", "Closing Prices", 6, 4, 4, 3),
];

/// Widgets shown when nothing usable is stored.
pub const DEFAULT_LAYOUT: &[&str] = &["portfolio", "kpis", "alerts", "news", "botStatus", "closing"];

pub fn definition(id: &str) -> Option<&'static WidgetDefinition> {
    CATALOG.iter().find(|d| d.id == id)
}
