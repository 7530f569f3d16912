//! Grid engine adapter.
//!
//! The engine owns node geometry and queues `added` / `removed` / `change`
//! events; the dashboard layout drains and reacts to them after every
//! mutation.

use serde::{Deserialize, Serialize};
use tickerdash_core::Element;

/// Rows a node may start at or span. Geometry beyond this is clamped.
pub const MAX_ROWS: u32 = 1000;

/// Fixed visual parameters of the dashboard grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridOptions {
    pub cell_height: u32,
    pub margin: u32,
    pub resize_handles: &'static str,
    pub columns: u32,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            cell_height: 80,
            margin: 10,
            resize_handles: "se",
            columns: 12,
        }
    }
}

/// Caller-supplied geometry, merged over catalog defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeOptions {
    #[serde(default)]
    pub x: Option<u32>,
    #[serde(default)]
    pub y: Option<u32>,
    #[serde(default)]
    pub w: Option<u32>,
    #[serde(default)]
    pub h: Option<u32>,
}

impl NodeOptions {
    pub fn at(x: u32, y: u32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn sized(w: u32, h: u32) -> Self {
        Self {
            w: Some(w),
            h: Some(h),
            ..Self::default()
        }
    }
}

/// A placed widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridNode {
    pub id: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub min_w: u32,
    pub min_h: u32,
}

impl GridNode {
    fn overlaps(&self, x: u32, y: u32, w: u32, h: u32) -> bool {
        self.x < x.saturating_add(w)
            && x < self.x.saturating_add(self.w)
            && self.y < y.saturating_add(h)
            && y < self.bottom()
    }

    /// First row below the node.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }
}

/// Node to insert. Missing coordinates mean "first free slot".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub id: String,
    pub x: Option<u32>,
    pub y: Option<u32>,
    pub w: u32,
    pub h: u32,
    pub min_w: u32,
    pub min_h: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    Added { id: String, element: Element },
    Removed { id: String },
    Change { ids: Vec<String> },
}

pub trait GridEngine: Send {
    fn init(&mut self, options: GridOptions);
    fn options(&self) -> &GridOptions;
    fn add_node(&mut self, spec: NodeSpec, element: Element) -> GridNode;
    fn remove_node(&mut self, id: &str) -> bool;
    fn remove_all(&mut self);
    /// Apply the given fields to a node. Returns false for unknown ids.
    fn update_node(&mut self, id: &str, update: NodeOptions) -> bool;
    /// Current nodes in insertion order.
    fn nodes(&self) -> Vec<GridNode>;
    fn drain_events(&mut self) -> Vec<GridEvent>;
}

/// Headless grid engine.
#[derive(Debug, Default)]
pub struct MemoryGrid {
    options: GridOptions,
    nodes: Vec<(GridNode, Element)>,
    events: Vec<GridEvent>,
}

impl MemoryGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content element of a placed node.
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.nodes.iter().find(|(n, _)| n.id == id).map(|(_, e)| e)
    }

    fn clamp_size(&self, w: u32, h: u32, min_w: u32, min_h: u32) -> (u32, u32) {
        let columns = self.options.columns.max(1);
        (w.max(min_w).clamp(1, columns), h.max(min_h).clamp(1, MAX_ROWS))
    }

    fn is_free(&self, skip: &str, x: u32, y: u32, w: u32, h: u32) -> bool {
        self.nodes
            .iter()
            .all(|(n, _)| n.id == skip || !n.overlaps(x, y, w, h))
    }

    /// First slot that fits, scanning rows top to bottom, then left to right.
    ///
    /// Only row 0 and the bottom edges of existing nodes can be the topmost
    /// free row, so those are the only rows tried. Everything below the
    /// deepest node is free.
    fn first_free_slot(&self, w: u32, h: u32) -> (u32, u32) {
        let columns = self.options.columns.max(1);
        let mut rows: Vec<u32> = std::iter::once(0)
            .chain(self.nodes.iter().map(|(n, _)| n.bottom()))
            .collect();
        rows.sort_unstable();
        rows.dedup();

        for &y in &rows {
            for x in 0..=columns.saturating_sub(w) {
                if self.is_free("", x, y, w, h) {
                    return (x, y);
                }
            }
        }
        (0, rows.last().copied().unwrap_or(0))
    }
}

impl GridEngine for MemoryGrid {
    fn init(&mut self, options: GridOptions) {
        self.options = options;
    }

    fn options(&self) -> &GridOptions {
        &self.options
    }

    fn add_node(&mut self, spec: NodeSpec, element: Element) -> GridNode {
        let (w, h) = self.clamp_size(spec.w, spec.h, spec.min_w, spec.min_h);
        let (x, y) = match (spec.x, spec.y) {
            (Some(x), Some(y)) => (
                x.min(self.options.columns.saturating_sub(w)),
                y.min(MAX_ROWS),
            ),
            _ => self.first_free_slot(w, h),
        };
        let node = GridNode {
            id: spec.id,
            x,
            y,
            w,
            h,
            min_w: spec.min_w,
            min_h: spec.min_h,
        };
        self.events.push(GridEvent::Added {
            id: node.id.clone(),
            element: element.clone(),
        });
        self.nodes.push((node.clone(), element));
        node
    }

    fn remove_node(&mut self, id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|(n, _)| n.id != id);
        let removed = self.nodes.len() != before;
        if removed {
            self.events.push(GridEvent::Removed { id: id.to_string() });
        }
        removed
    }

    fn remove_all(&mut self) {
        for (node, _) in self.nodes.drain(..) {
            self.events.push(GridEvent::Removed { id: node.id });
        }
    }

    fn update_node(&mut self, id: &str, update: NodeOptions) -> bool {
        let Some(current) = self.nodes.iter().find(|(n, _)| n.id == id).map(|(n, _)| n.clone())
        else {
            return false;
        };

        let (w, h) = self.clamp_size(
            update.w.unwrap_or(current.w),
            update.h.unwrap_or(current.h),
            current.min_w,
            current.min_h,
        );
        let x = update
            .x
            .unwrap_or(current.x)
            .min(self.options.columns.saturating_sub(w));
        let y = update.y.unwrap_or(current.y).min(MAX_ROWS);

        if (x, y, w, h) != (current.x, current.y, current.w, current.h) {
            if let Some((node, _)) = self.nodes.iter_mut().find(|(n, _)| n.id == id) {
                node.x = x;
                node.y = y;
                node.w = w;
                node.h = h;
            }
            self.events.push(GridEvent::Change {
                ids: vec![id.to_string()],
            });
        }
        true
    }

    fn nodes(&self) -> Vec<GridNode> {
        self.nodes.iter().map(|(n, _)| n.clone()).collect()
    }

    fn drain_events(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: &str, w: u32, h: u32) -> NodeSpec {
        NodeSpec {
            id: id.to_string(),
            x: None,
            y: None,
            w,
            h,
            min_w: 1,
            min_h: 1,
        }
    }

    fn grid() -> MemoryGrid {
        let mut grid = MemoryGrid::new();
        grid.init(GridOptions::default());
        grid
    }

    #[test]
    fn test_default_options() {
        let options = GridOptions::default();
        assert_eq!(options.cell_height, 80);
        assert_eq!(options.margin, 10);
        assert_eq!(options.resize_handles, "se");
        assert_eq!(options.columns, 12);
    }

    #[test]
    fn test_auto_place_fills_rows() {
        let mut grid = grid();
        let a = grid.add_node(spec("a", 8, 2), Element::div("a"));
        let b = grid.add_node(spec("b", 4, 2), Element::div("b"));
        let c = grid.add_node(spec("c", 6, 1), Element::div("c"));

        assert_eq!((a.x, a.y), (0, 0));
        assert_eq!((b.x, b.y), (8, 0));
        assert_eq!((c.x, c.y), (0, 2));
    }

    #[test]
    fn test_explicit_position_clamped_to_columns() {
        let mut grid = grid();
        let node = grid.add_node(
            NodeSpec {
                x: Some(10),
                y: Some(3),
                ..spec("a", 4, 2)
            },
            Element::div("a"),
        );
        assert_eq!((node.x, node.y), (8, 3));
    }

    #[test]
    fn test_min_size_enforced() {
        let mut grid = grid();
        let node = grid.add_node(
            NodeSpec {
                min_w: 3,
                min_h: 2,
                ..spec("a", 1, 1)
            },
            Element::div("a"),
        );
        assert_eq!((node.w, node.h), (3, 2));

        assert!(grid.update_node("a", NodeOptions::sized(1, 1)));
        let node = &grid.nodes()[0];
        assert_eq!((node.w, node.h), (3, 2));
    }

    #[test]
    fn test_events_queued_and_drained() {
        let mut grid = grid();
        grid.add_node(spec("a", 4, 2), Element::div("a"));
        grid.add_node(spec("b", 4, 2), Element::div("b"));
        assert!(grid.update_node("a", NodeOptions::at(0, 5)));
        assert!(grid.update_node("a", NodeOptions::at(0, 5)));
        assert!(grid.remove_node("b"));
        assert!(!grid.remove_node("b"));
        assert!(!grid.update_node("b", NodeOptions::at(1, 1)));

        let events = grid.drain_events();
        assert_eq!(events.len(), 4);
        assert!(matches!(&events[0], GridEvent::Added { id, .. } if id == "a"));
        assert_eq!(
            events[2],
            GridEvent::Change {
                ids: vec!["a".to_string()]
            }
        );
        assert_eq!(events[3], GridEvent::Removed { id: "b".to_string() });
        assert!(grid.drain_events().is_empty());
    }

    #[test]
    fn test_auto_place_skips_past_tall_nodes() {
        let mut grid = grid();
        grid.add_node(
            NodeSpec {
                x: Some(0),
                y: Some(u32::MAX),
                ..spec("tall", 12, u32::MAX)
            },
            Element::div("tall"),
        );
        let tall = &grid.nodes()[0];
        assert_eq!((tall.y, tall.h), (MAX_ROWS, MAX_ROWS));

        let next = grid.add_node(spec("next", 4, 2), Element::div("next"));
        assert_eq!((next.x, next.y), (0, 0));

        let wide = grid.add_node(spec("wide", 12, 999), Element::div("wide"));
        assert_eq!(wide.y, 2 * MAX_ROWS);
        let thin = grid.add_node(spec("thin", 12, 1), Element::div("thin"));
        assert_eq!(thin.y, 2);
    }

    #[test]
    fn test_update_clamps_rows() {
        let mut grid = grid();
        grid.add_node(spec("a", 4, 2), Element::div("a"));
        assert!(grid.update_node(
            "a",
            NodeOptions {
                x: None,
                y: Some(u32::MAX),
                w: None,
                h: Some(u32::MAX),
            }
        ));
        let node = &grid.nodes()[0];
        assert_eq!((node.y, node.h), (MAX_ROWS, MAX_ROWS));
    }

    #[test]
    fn test_remove_all() {
        let mut grid = grid();
        grid.add_node(spec("a", 4, 2), Element::div("a"));
        grid.add_node(spec("b", 4, 2), Element::div("b"));
        grid.drain_events();

        grid.remove_all();
        assert!(grid.nodes().is_empty());
        assert_eq!(grid.drain_events().len(), 2);
    }
}
