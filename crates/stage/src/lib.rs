//! In-memory model of the slide subtree the cue runtime governs.
//!
//! This crate is the boundary stand-in for the host page: an element tree
//! with tags, ids, classes, attributes and inline styles, plus the
//! structural query subset the runtime and its authoring tools rely on.
//! The cue engine only ever reads attributes, runs queries, and writes
//! inline styles and class lists through this interface.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use selector::{Selector, SelectorError};
pub use style::StyleDecl;

mod selector;
mod style;

/// Handle to one element in a [`Stage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

#[derive(Clone, Debug, Default)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    attrs: Vec<(String, String)>,
    style: Option<StyleDecl>,
    pub text: Option<String>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Attribute lookup. `id`, `class` and `style` reflect the dedicated
    /// fields, matching how a DOM element exposes them.
    pub fn attr(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "class" => {
                if self.classes.is_empty() {
                    None
                } else {
                    Some(self.classes.join(" "))
                }
            }
            "style" => self.style_text(),
            _ => self
                .attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone()),
        }
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        match name {
            "id" => self.id = Some(value.to_string()),
            "class" => {
                self.classes = value.split_whitespace().map(str::to_string).collect();
            }
            "style" => self.set_style_text(Some(value)),
            _ => {
                if let Some(entry) = self.attrs.iter_mut().find(|(n, _)| n == name) {
                    entry.1 = value.to_string();
                } else {
                    self.attrs.push((name.to_string(), value.to_string()));
                }
            }
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// The inline style attribute as css text, or `None` when the element
    /// carries no style attribute at all. The distinction matters for
    /// snapshot/restore: restoring `None` removes the attribute.
    pub fn style_text(&self) -> Option<String> {
        self.style.as_ref().map(StyleDecl::to_css_text)
    }

    pub fn set_style_text(&mut self, text: Option<&str>) {
        self.style = text.map(StyleDecl::parse);
    }

    pub fn style_property(&self, name: &str) -> Option<&str> {
        self.style.as_ref().and_then(|decl| decl.get(name))
    }

    pub fn set_style_property(&mut self, name: &str, value: &str) {
        self.style
            .get_or_insert_with(StyleDecl::new)
            .set(name, value);
    }
}

struct Node {
    element: Element,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

/// Arena-backed element tree.
#[derive(Default)]
pub struct Stage {
    nodes: Vec<Node>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, parent: Option<ElementId>, element: Element) -> ElementId {
        let id = ElementId(self.nodes.len());
        self.nodes.push(Node {
            element,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.nodes[id.0].element
    }

    pub fn element_mut(&mut self, id: ElementId) -> &mut Element {
        &mut self.nodes[id.0].element
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.nodes[id.0].children
    }

    /// 1-based position of the element among same-tag siblings.
    pub fn nth_of_type(&self, id: ElementId) -> usize {
        let tag = &self.element(id).tag;
        match self.parent(id) {
            Some(parent) => {
                let mut position = 0;
                for &sibling in self.children(parent) {
                    if self.element(sibling).tag.eq_ignore_ascii_case(tag) {
                        position += 1;
                    }
                    if sibling == id {
                        break;
                    }
                }
                position
            }
            None => 1,
        }
    }

    /// All descendants of `root` in document order, excluding `root` itself.
    pub fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut pending: Vec<ElementId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = pending.pop() {
            out.push(id);
            pending.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Structural query scoped to the descendants of `root`, mirroring the
    /// querySelectorAll contract: document order, root excluded, matching
    /// may consider ancestors above `root`.
    pub fn query(&self, root: ElementId, selector: &str) -> Result<Vec<ElementId>, SelectorError> {
        let parsed = Selector::parse(selector)?;
        Ok(self
            .descendants(root)
            .into_iter()
            .filter(|&id| parsed.matches(self, id))
            .collect())
    }

    /// Build a stage from a serialized element tree. Returns the stage and
    /// the id of the tree's root element.
    pub fn from_spec(spec: &ElementSpec) -> (Stage, ElementId) {
        let mut stage = Stage::new();
        let root = stage.insert_spec(None, spec);
        (stage, root)
    }

    pub fn insert_spec(&mut self, parent: Option<ElementId>, spec: &ElementSpec) -> ElementId {
        let mut element = Element::new(spec.tag.clone().unwrap_or_else(|| "div".to_string()));
        element.id = spec.id.clone();
        element.classes = spec.classes.clone();
        for (name, value) in &spec.attrs {
            element.set_attr(name, value);
        }
        if let Some(style) = &spec.style {
            element.set_style_text(Some(style));
        }
        element.text = spec.text.clone();

        let id = self.insert(parent, element);
        for child in &spec.children {
            self.insert_spec(Some(id), child);
        }
        id
    }
}

/// Serialized element tree, used by headless previews and tests.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ElementSpec {
    pub tag: Option<String>,
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    pub style: Option<String>,
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<ElementSpec>,
}
