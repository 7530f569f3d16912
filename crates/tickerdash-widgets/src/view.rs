//! A manager's handle on its mounted container.
//!
//! Tracks the bound element and the cancellation token of the current
//! mount, and routes rendering to the surface only for slots the container
//! actually has.

use std::sync::Arc;

use parking_lot::Mutex;
use tickerdash_core::{slot, slot_id, Element};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{WidgetError, WidgetResult};
use crate::surface::{Surface, TableModel};

struct Bound {
    container: Element,
    token: CancellationToken,
}

pub struct WidgetView {
    widget_id: &'static str,
    surface: Arc<dyn Surface>,
    bound: Mutex<Option<Bound>>,
}

impl WidgetView {
    pub fn new(widget_id: &'static str, surface: Arc<dyn Surface>) -> Self {
        Self {
            widget_id,
            surface,
            bound: Mutex::new(None),
        }
    }

    pub fn widget_id(&self) -> &'static str {
        self.widget_id
    }

    /// Bind to a container, replacing any previous mount.
    ///
    /// Returns the token for the new mount, or `None` (logged) when there is
    /// no container. Missing slots are logged and later writes to them skipped.
    pub fn bind(&self, container: Option<Element>, slots: &[&str]) -> Option<CancellationToken> {
        let Some(container) = container else {
            warn!(widget = self.widget_id, "No container to initialize widget in");
            return None;
        };

        for suffix in slots {
            let id = slot_id(self.widget_id, suffix);
            if !container.contains(&id) {
                warn!(widget = self.widget_id, slot = %id, "Widget container is missing a slot");
            }
        }

        let token = CancellationToken::new();
        let previous = self.bound.lock().replace(Bound {
            container,
            token: token.clone(),
        });
        if let Some(previous) = previous {
            debug!(widget = self.widget_id, "Rebinding widget, cancelling previous mount");
            previous.token.cancel();
        }
        Some(token)
    }

    /// Cancel the current mount and tear down its table.
    pub fn unbind(&self) -> bool {
        let Some(previous) = self.bound.lock().take() else {
            return false;
        };
        previous.token.cancel();
        let table = slot_id(self.widget_id, slot::TABLE);
        if previous.container.contains(&table) {
            self.surface.destroy_table(&table);
        }
        true
    }

    pub fn is_bound(&self) -> bool {
        self.bound.lock().is_some()
    }

    pub fn ensure_bound(&self) -> WidgetResult<()> {
        if self.is_bound() {
            Ok(())
        } else {
            Err(WidgetError::NotMounted(self.widget_id))
        }
    }

    /// Full slot id if the bound container has it.
    fn slot(&self, suffix: &str) -> Option<String> {
        let id = slot_id(self.widget_id, suffix);
        let guard = self.bound.lock();
        let bound = guard.as_ref()?;
        if bound.container.contains(&id) {
            Some(id)
        } else {
            debug!(widget = self.widget_id, slot = %id, "Skipping write to missing slot");
            None
        }
    }

    /// Destroy and rebuild the widget's table.
    pub fn table(&self, table: TableModel) {
        if let Some(slot) = self.slot(slot::TABLE) {
            self.surface.destroy_table(&slot);
            self.surface.render_table(&slot, table);
        }
    }

    pub fn text(&self, suffix: &str, text: &str) {
        if let Some(slot) = self.slot(suffix) {
            self.surface.set_text(&slot, text);
        }
    }

    pub fn loading(&self, loading: bool) {
        if let Some(slot) = self.slot(slot::TABLE) {
            self.surface.set_loading(&slot, loading);
        }
    }

    pub fn error(&self, err: &WidgetError) {
        warn!(widget = self.widget_id, error = %err, "Widget operation failed");
        if let Some(slot) = self.slot(slot::MESSAGE) {
            self.surface.show_error(&slot, &err.user_message());
        }
    }

    pub fn clear_error(&self) {
        if let Some(slot) = self.slot(slot::MESSAGE) {
            self.surface.clear_error(&slot);
        }
    }

    /// Show the banner on failure, clear it on success.
    pub fn settle<T>(&self, result: WidgetResult<T>) -> WidgetResult<T> {
        match &result {
            Ok(_) => self.clear_error(),
            Err(e) => self.error(e),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;
    use tickerdash_api::ApiError;

    fn container() -> Element {
        Element::div("newsWidget")
            .child(Element::new("table").with_id("newsTable"))
            .child(Element::div("newsMessage"))
    }

    #[test]
    fn test_bind_none_is_ignored() {
        let view = WidgetView::new("news", Arc::new(RecordingSurface::new()));
        assert!(view.bind(None, &[slot::TABLE]).is_none());
        assert!(!view.is_bound());
        assert_eq!(view.ensure_bound(), Err(WidgetError::NotMounted("news")));
    }

    #[test]
    fn test_rebind_cancels_previous_token() {
        let view = WidgetView::new("news", Arc::new(RecordingSurface::new()));
        let first = view.bind(Some(container()), &[]).unwrap();
        let second = view.bind(Some(container()), &[]).unwrap();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());

        assert!(view.unbind());
        assert!(second.is_cancelled());
        assert!(!view.unbind());
    }

    #[test]
    fn test_writes_to_missing_slots_are_skipped() {
        let surface = Arc::new(RecordingSurface::new());
        let view = WidgetView::new("news", surface.clone());
        view.bind(Some(container()), &[slot::PROGRESS]).unwrap();

        view.text(slot::PROGRESS, "50%");
        view.table(TableModel::default());
        assert_eq!(surface.text("newsProgress"), None);
        assert!(surface.table("newsTable").is_some());
    }

    #[test]
    fn test_settle_shows_and_clears_banner() {
        let surface = Arc::new(RecordingSurface::new());
        let view = WidgetView::new("news", surface.clone());
        view.bind(Some(container()), &[]).unwrap();

        let failed: WidgetResult<()> = Err(ApiError::Network("refused".to_string()).into());
        assert!(view.settle(failed).is_err());
        assert!(surface.error("newsMessage").unwrap().contains("Could not reach"));

        view.settle(Ok(())).unwrap();
        assert!(surface.error("newsMessage").is_none());
    }

    #[test]
    fn test_unbind_destroys_table() {
        let surface = Arc::new(RecordingSurface::new());
        let view = WidgetView::new("news", surface.clone());
        view.bind(Some(container()), &[]).unwrap();
        view.table(TableModel::default());
        view.unbind();
        assert!(surface.table("newsTable").is_none());
    }
}
