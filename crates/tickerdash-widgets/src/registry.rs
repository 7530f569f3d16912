//! Widget dispatch by id.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use tickerdash_core::Element;
use tickerdash_telemetry::Metrics;
use tracing::{debug, info, warn};

use crate::widget::Widget;

#[derive(Default)]
pub struct WidgetRegistry {
    widgets: HashMap<&'static str, Arc<dyn Widget>>,
    mounted: Mutex<BTreeSet<&'static str>>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a manager under its own id, replacing any previous one.
    pub fn register(&mut self, widget: Arc<dyn Widget>) {
        let id = widget.id();
        if self.widgets.insert(id, widget).is_some() {
            warn!(widget = id, "Replacing registered widget manager");
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Widget>> {
        self.widgets.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.widgets.contains_key(id)
    }

    /// Ids of currently mounted widgets, sorted.
    pub fn mounted(&self) -> Vec<&'static str> {
        self.mounted.lock().iter().copied().collect()
    }

    pub fn is_mounted(&self, id: &str) -> bool {
        self.mounted.lock().contains(id)
    }

    /// Initialize the manager for `id` in `element`. Unknown ids are logged.
    pub async fn mount(&self, id: &str, element: Element) -> bool {
        let Some(widget) = self.get(id) else {
            warn!(widget = %id, "No manager registered for widget");
            return false;
        };

        if self.mounted.lock().insert(widget.id()) {
            Metrics::widget_mounted();
        } else {
            debug!(widget = %id, "Widget remounted");
        }
        info!(widget = %id, "Mounting widget");
        widget.initialize(Some(element)).await;
        true
    }

    /// Dispose the manager for `id`. Returns false if it was not mounted.
    pub fn unmount(&self, id: &str) -> bool {
        let Some(widget) = self.get(id) else {
            warn!(widget = %id, "No manager registered for widget");
            return false;
        };
        if !self.mounted.lock().remove(widget.id()) {
            debug!(widget = %id, "Widget was not mounted");
            return false;
        }
        widget.dispose();
        Metrics::widget_unmounted();
        info!(widget = %id, "Widget unmounted");
        true
    }

    /// Dispose every mounted widget.
    pub fn unmount_all(&self) {
        for id in self.mounted() {
            self.unmount(id);
        }
    }

    /// Reload every mounted widget. Returns (succeeded, failed).
    pub async fn refresh_mounted(&self) -> (usize, usize) {
        let mut ok = 0;
        let mut failed = 0;
        for id in self.mounted() {
            let Some(widget) = self.get(id) else { continue };
            match widget.refresh().await {
                Ok(()) => ok += 1,
                Err(e) => {
                    warn!(widget = id, error = %e, "Widget refresh failed");
                    failed += 1;
                }
            }
        }
        debug!(ok, failed, "Mounted widgets refreshed");
        (ok, failed)
    }
}
