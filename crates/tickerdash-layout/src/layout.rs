//! Dashboard layout: restore, mutate, persist.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tickerdash_core::Element;
use tickerdash_telemetry::Metrics;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::catalog::{definition, WidgetDefinition, CATALOG, DEFAULT_LAYOUT};
use crate::error::{LayoutError, LayoutResult};
use crate::grid::{
    GridEngine, GridEvent, GridNode, GridOptions, NodeOptions, NodeSpec, MAX_ROWS,
};
use crate::storage::{Storage, LAYOUT_KEY};
use crate::template::TemplateSource;

/// Persisted position of one widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub id: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl From<&GridNode> for LayoutEntry {
    fn from(node: &GridNode) -> Self {
        Self {
            id: node.id.clone(),
            x: node.x,
            y: node.y,
            w: node.w,
            h: node.h,
        }
    }
}

/// Mount/unmount notifications for widget managers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutEvent {
    WidgetAdded { id: String, element: Element },
    WidgetRemoved { id: String },
}

/// Grid arrangement of dashboard widgets.
pub struct DashboardLayout {
    grid: Mutex<Box<dyn GridEngine>>,
    templates: Arc<dyn TemplateSource>,
    storage: Arc<dyn Storage>,
    events: broadcast::Sender<LayoutEvent>,
}

impl DashboardLayout {
    pub fn new(
        grid: Box<dyn GridEngine>,
        templates: Arc<dyn TemplateSource>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            grid: Mutex::new(grid),
            templates,
            storage,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LayoutEvent> {
        self.events.subscribe()
    }

    /// Set up the grid and rebuild it from the stored layout.
    ///
    /// Returns the number of widgets placed. Widgets that fail to add are
    /// logged and skipped.
    pub fn initialize(&self) -> LayoutResult<usize> {
        let entries = self.load_entries();

        let placed = {
            let mut grid = self.grid.lock();
            grid.init(GridOptions::default());
            grid.remove_all();

            let mut placed = 0;
            for (id, options) in &entries {
                match self.insert(&mut **grid, id, *options) {
                    Ok(_) => placed += 1,
                    Err(e) => error!(widget = %id, error = %e, "Failed to restore widget"),
                }
            }
            placed
        };

        self.process_events(false);
        self.save()?;
        info!(placed, requested = entries.len(), "Dashboard layout initialized");
        Ok(placed)
    }

    /// Add a catalog widget, merging `options` over its default geometry.
    ///
    /// Failures are logged and returned; the rest of the grid is untouched.
    pub fn add_widget(&self, id: &str, options: Option<NodeOptions>) -> LayoutResult<GridNode> {
        let result = {
            let mut grid = self.grid.lock();
            self.insert(&mut **grid, id, options.unwrap_or_default())
        };
        match result {
            Ok(node) => {
                self.process_events(true);
                Ok(node)
            }
            Err(e) => {
                error!(widget = %id, error = %e, "Failed to add widget");
                Err(e)
            }
        }
    }

    pub fn remove_widget(&self, id: &str) -> LayoutResult<()> {
        if !self.grid.lock().remove_node(id) {
            return Err(LayoutError::NotActive(id.to_string()));
        }
        self.process_events(true);
        Ok(())
    }

    pub fn move_widget(&self, id: &str, x: u32, y: u32) -> LayoutResult<()> {
        self.update(id, NodeOptions::at(x, y))
    }

    pub fn resize_widget(&self, id: &str, w: u32, h: u32) -> LayoutResult<()> {
        self.update(id, NodeOptions::sized(w, h))
    }

    /// Drop the stored layout and rebuild from the default widget list.
    pub fn reset_to_default(&self) -> LayoutResult<usize> {
        self.storage.remove(LAYOUT_KEY)?;
        self.initialize()
    }

    /// Serialize the current positions to storage.
    pub fn save(&self) -> LayoutResult<()> {
        let entries: Vec<LayoutEntry> = self.grid.lock().nodes().iter().map(Into::into).collect();
        let json = serde_json::to_string(&entries)?;
        self.storage.set(LAYOUT_KEY, &json)?;
        Metrics::layout_saved();
        debug!(widgets = entries.len(), "Layout saved");
        Ok(())
    }

    /// Catalog entries not currently on the grid, in catalog order.
    pub fn available_widgets(&self) -> Vec<&'static WidgetDefinition> {
        let active: HashSet<String> = self.active_widgets().into_iter().collect();
        CATALOG.iter().filter(|d| !active.contains(d.id)).collect()
    }

    pub fn active_widgets(&self) -> Vec<String> {
        self.grid.lock().nodes().into_iter().map(|n| n.id).collect()
    }

    pub fn nodes(&self) -> Vec<GridNode> {
        self.grid.lock().nodes()
    }

    fn update(&self, id: &str, update: NodeOptions) -> LayoutResult<()> {
        if !self.grid.lock().update_node(id, update) {
            return Err(LayoutError::NotActive(id.to_string()));
        }
        self.process_events(true);
        Ok(())
    }

    fn insert(
        &self,
        grid: &mut dyn GridEngine,
        id: &str,
        options: NodeOptions,
    ) -> LayoutResult<GridNode> {
        let def = definition(id).ok_or_else(|| LayoutError::UnknownWidget(id.to_string()))?;
        if grid.nodes().iter().any(|n| n.id == id) {
            return Err(LayoutError::AlreadyActive(id.to_string()));
        }
        let template_id = def.template_id();
        let element = self
            .templates
            .template(&template_id)
            .ok_or_else(|| LayoutError::TemplateMissing {
                widget: id.to_string(),
                template: template_id,
            })?;

        let spec = NodeSpec {
            id: id.to_string(),
            x: options.x,
            y: options.y,
            w: options.w.unwrap_or(def.w),
            h: options.h.unwrap_or(def.h),
            min_w: def.min_w,
            min_h: def.min_h,
        };
        Ok(grid.add_node(spec, element))
    }

    /// Forward grid events to subscribers and persist if anything moved.
    fn process_events(&self, persist: bool) {
        let events = self.grid.lock().drain_events();
        let mut dirty = false;

        for event in events {
            match event {
                GridEvent::Added { id, element } => {
                    dirty = true;
                    let _ = self.events.send(LayoutEvent::WidgetAdded { id, element });
                }
                GridEvent::Removed { id } => {
                    dirty = true;
                    let _ = self.events.send(LayoutEvent::WidgetRemoved { id });
                }
                GridEvent::Change { ids } => {
                    dirty = true;
                    debug!(?ids, "Grid changed");
                }
            }
        }

        if persist && dirty {
            if let Err(e) = self.save() {
                error!(error = %e, "Failed to save layout");
            }
        }
    }

    /// Stored layout, or the default list if nothing usable is stored.
    fn load_entries(&self) -> Vec<(String, NodeOptions)> {
        let Some(raw) = self.storage.get(LAYOUT_KEY) else {
            debug!("No stored layout, using default");
            return default_entries();
        };

        let stored: Vec<LayoutEntry> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Corrupt stored layout, falling back to default");
                if let Err(e) = self.storage.remove(LAYOUT_KEY) {
                    error!(error = %e, "Failed to clear corrupt layout");
                }
                return default_entries();
            }
        };

        let mut seen = HashSet::new();
        stored
            .into_iter()
            .filter(|e| {
                if definition(&e.id).is_none() {
                    warn!(widget = %e.id, "Skipping unknown widget in stored layout");
                    return false;
                }
                if !seen.insert(e.id.clone()) {
                    warn!(widget = %e.id, "Skipping duplicate widget in stored layout");
                    return false;
                }
                true
            })
            .map(|e| {
                if e.y > MAX_ROWS || e.h > MAX_ROWS {
                    warn!(
                        widget = %e.id,
                        y = e.y,
                        h = e.h,
                        max_rows = MAX_ROWS,
                        "Clamping oversized widget in stored layout"
                    );
                }
                let options = NodeOptions {
                    x: Some(e.x),
                    y: Some(e.y.min(MAX_ROWS)),
                    w: Some(e.w),
                    h: Some(e.h.min(MAX_ROWS)),
                };
                (e.id, options)
            })
            .collect()
    }
}

fn default_entries() -> Vec<(String, NodeOptions)> {
    DEFAULT_LAYOUT
        .iter()
        .map(|id| ((*id).to_string(), NodeOptions::default()))
        .collect()
}
