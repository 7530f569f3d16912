//! Widget and page templates.

use std::collections::HashMap;

use tickerdash_core::{slot, slot_id, Element};

use crate::catalog::CATALOG;

/// Lookup of template content by template id.
pub trait TemplateSource: Send + Sync {
    /// A fresh copy of the template content, or `None` if no such template.
    fn template(&self, template_id: &str) -> Option<Element>;
}

/// Templates for every catalog widget plus the standalone pages.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Element>,
}

impl TemplateRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding the built-in templates.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for def in CATALOG {
            registry.insert(def.template_id(), widget_template(def.id));
        }
        for page in ["maintenance", "logs"] {
            registry.insert(format!("{page}Template"), widget_template(page));
        }
        registry
    }

    pub fn insert(&mut self, template_id: impl Into<String>, content: Element) {
        self.templates.insert(template_id.into(), content);
    }

    pub fn remove(&mut self, template_id: &str) -> Option<Element> {
        self.templates.remove(template_id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateSource for TemplateRegistry {
    fn template(&self, template_id: &str) -> Option<Element> {
        self.templates.get(template_id).cloned()
    }
}

/// Widget-specific slots, placed before the table.
fn extra_slots(widget_id: &str) -> &'static [&'static str] {
    match widget_id {
        "stocks" => &[slot::FILTER],
        "portfolio" => &[slot::FORM, slot::SUMMARY],
        "alerts" | "maintenance" => &[slot::FORM],
        "kpis" => &[slot::CARDS],
        "dividends" => &[slot::SUMMARY],
        "drainer" | "botStatus" => &[slot::ACTION, slot::PROGRESS],
        _ => &[],
    }
}

fn widget_template(widget_id: &str) -> Element {
    let mut body = Element::new("section");
    for suffix in extra_slots(widget_id) {
        body = body.child(Element::div(slot_id(widget_id, suffix)));
    }
    body = body
        .child(Element::new("table").with_id(slot_id(widget_id, slot::TABLE)))
        .child(Element::div(slot_id(widget_id, slot::MESSAGE)));

    Element::div(format!("{widget_id}Widget"))
        .child(Element::new("header"))
        .child(body)
}
