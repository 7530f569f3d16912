//! Widget element trees.
//!
//! A widget's content is described by a template: a small tree of elements,
//! some carrying ids that managers look up to find their table, form, and
//! message slots. Adding a widget to the grid clones the template content
//! into a fresh `Element` that is handed to the widget's manager.

use serde::{Deserialize, Serialize};

/// Slot suffixes shared by templates and the managers that fill them.
pub mod slot {
    pub const TABLE: &str = "Table";
    pub const MESSAGE: &str = "Message";
    pub const FORM: &str = "Form";
    pub const SUMMARY: &str = "Summary";
    pub const PROGRESS: &str = "Progress";
    pub const ACTION: &str = "Action";
    pub const FILTER: &str = "Filter";
    pub const CARDS: &str = "Cards";
}

/// Id of a slot inside a widget: `slot_id("alerts", slot::TABLE)` is `alertsTable`.
pub fn slot_id(widget_id: &str, slot: &str) -> String {
    format!("{widget_id}{slot}")
}

/// A node in a widget's element tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            children: Vec::new(),
        }
    }

    /// Shorthand for `<div id="...">`.
    pub fn div(id: impl Into<String>) -> Self {
        Self::new("div").with_id(id)
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first lookup of a descendant (or self) by id.
    pub fn find(&self, id: &str) -> Option<&Element> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// All ids in the tree, in document order.
    pub fn ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_ids(&mut out);
        out
    }

    fn collect_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(id) = self.id.as_deref() {
            out.push(id);
        }
        for c in &self.children {
            c.collect_ids(out);
        }
    }
}
