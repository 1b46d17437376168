//! In-memory document used by the CLI and tests.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use html5ever::tendril::TendrilSink;
use html5ever::{
    LocalName,
    Namespace,
    ParseOpts,
    QualName,
    parse_fragment,
};
use markup5ever_rcdom::{
    Handle,
    NodeData,
    RcDom,
};

use super::{
    Dom,
    ElementId,
};
use crate::text::escape_html;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: [&str; 13] =
    ["area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr"];

/// Element or text payload of a [`Node`].
#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        /// Lowercase tag name
        tag: String,
        /// Sorted so serialization is stable across parse round trips
        attributes: BTreeMap<String, String>,
    },
    Text(String),
}

/// Node of a [`MemoryDom`] arena.
#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    /// Cleared when the node is replaced through `set_inner_html`
    attached: bool,
}

impl Node {
    const fn new(kind: NodeKind, parent: Option<ElementId>) -> Self {
        Self { kind, parent, children: Vec::new(), attached: true }
    }
}

/// Arena-backed document with a `<body>` root.
///
/// Markup assigned through [`Dom::set_inner_html`] is parsed with html5ever
/// into element and text nodes, so highlight spans become elements of their
/// own the way they do in a browser.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<Node>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    #[must_use]
    pub fn new() -> Self {
        let body = NodeKind::Element { tag: "body".to_string(), attributes: BTreeMap::new() };
        Self { nodes: vec![Node::new(body, None)] }
    }

    /// Builds a document with one `<p>` per non-empty line of `text`.
    #[must_use]
    pub fn from_lines(text: &str) -> Self {
        let mut dom = Self::new();
        let root = dom.root();
        for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
            dom.append_text_element(root, "p", line);
        }
        dom
    }

    /// Builds a document from an HTML body fragment.
    #[must_use]
    pub fn from_html(html: &str) -> Self {
        let mut dom = Self::new();
        let root = dom.root();
        dom.set_inner_html(root, html);
        dom
    }

    #[must_use]
    pub const fn root(&self) -> ElementId {
        ElementId(0)
    }

    /// Appends an empty element under `parent`.
    pub fn append_element(&mut self, parent: ElementId, tag: &str) -> ElementId {
        let kind = NodeKind::Element { tag: tag.to_string(), attributes: BTreeMap::new() };
        self.append_node(parent, kind)
    }

    /// Appends an element whose only content is `text`.
    pub fn append_text_element(&mut self, parent: ElementId, tag: &str, text: &str) -> ElementId {
        let id = self.append_element(parent, tag);
        self.append_node(id, NodeKind::Text(text.to_string()));
        id
    }

    /// Serialized document body.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.inner_html(self.root()).unwrap_or_default()
    }

    fn append_node(&mut self, parent: ElementId, kind: NodeKind) -> ElementId {
        let id = ElementId(self.nodes.len());
        self.nodes.push(Node::new(kind, Some(parent)));
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.push(id);
        }
        id
    }

    /// Copies a parsed html5ever node and its subtree under `parent`.
    fn import(&mut self, parent: ElementId, handle: &Handle) {
        match &handle.data {
            NodeData::Text { contents } => {
                self.append_node(parent, NodeKind::Text(contents.borrow().to_string()));
            }
            NodeData::Element { name, attrs, .. } => {
                let attributes = attrs
                    .borrow()
                    .iter()
                    .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                    .collect();
                let id = self.append_node(parent, NodeKind::Element { tag: name.local.to_string(), attributes });
                for child in handle.children.borrow().iter() {
                    self.import(id, child);
                }
            }
            _ => {}
        }
    }

    fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(id.0).filter(|node| node.attached)
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).filter(|node| node.attached)
    }

    fn element(&self, id: ElementId) -> Option<&Node> {
        self.node(id).filter(|node| matches!(node.kind, NodeKind::Element { .. }))
    }

    fn attributes_mut(&mut self, id: ElementId) -> Option<&mut BTreeMap<String, String>> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element { attributes, .. } => Some(attributes),
            NodeKind::Text(_) => None,
        }
    }

    fn detach_subtree(&mut self, id: ElementId) {
        let children = self.nodes.get(id.0).map(|node| node.children.clone()).unwrap_or_default();
        for child in children {
            if let Some(node) = self.nodes.get_mut(child.0) {
                node.attached = false;
            }
            self.detach_subtree(child);
        }
    }

    fn render_node(&self, id: ElementId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => out.push_str(&escape_html(text)),
            NodeKind::Element { tag, attributes } => {
                let _ = write!(out, "<{tag}");
                for (name, value) in attributes {
                    let _ = write!(out, " {name}=\"{}\"", escape_html(value));
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                for child in &node.children {
                    self.render_node(*child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }

    fn collect_text(&self, id: ElementId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for child in &node.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    fn collect_elements(&self, id: ElementId, out: &mut Vec<ElementId>) {
        let Some(node) = self.element(id) else {
            return;
        };
        out.push(id);
        for child in &node.children {
            self.collect_elements(*child, out);
        }
    }
}

/// Parses `html` as the content of a `<body>` element.
fn parse_body_fragment(html: &str) -> Vec<Handle> {
    let context = QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from("body"));
    let fragment = parse_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new()).one(html);

    // The fragment parser wraps its output in a single <html> element.
    let document_children = fragment.document.children.borrow();
    document_children.iter().flat_map(|root| root.children.borrow().clone()).collect()
}

impl Dom for MemoryDom {
    fn inner_html(&self, element: ElementId) -> Option<String> {
        let node = self.element(element)?;
        let mut out = String::new();
        for child in &node.children {
            self.render_node(*child, &mut out);
        }
        Some(out)
    }

    fn set_inner_html(&mut self, element: ElementId, html: &str) {
        if self.element(element).is_none() {
            return;
        }
        self.detach_subtree(element);
        if let Some(node) = self.node_mut(element) {
            node.children.clear();
        }
        for handle in parse_body_fragment(html) {
            self.import(element, &handle);
        }
    }

    fn text_content(&self, element: ElementId) -> Option<String> {
        self.element(element)?;
        let mut out = String::new();
        self.collect_text(element, &mut out);
        Some(out)
    }

    fn child_element_count(&self, element: ElementId) -> usize {
        self.element(element).map_or(0, |node| {
            node.children.iter().filter(|child| self.element(**child).is_some()).count()
        })
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.element(element)?.parent
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        match &self.node(element)?.kind {
            NodeKind::Element { attributes, .. } => attributes.get(name).cloned(),
            NodeKind::Text(_) => None,
        }
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        if let Some(attributes) = self.attributes_mut(element) {
            attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&mut self, element: ElementId, name: &str) {
        if let Some(attributes) = self.attributes_mut(element) {
            attributes.remove(name);
        }
    }

    fn elements(&self) -> Vec<ElementId> {
        let mut out = Vec::new();
        self.collect_elements(self.root(), &mut out);
        out
    }
}
