//! Arena-backed tree of rendered graphical elements.
//!
//! The rendering engine is a black box whose output shape varies by diagram
//! type; this tree is the neutral structure the node resolver walks. Indices
//! are stable for the lifetime of the tree, traversal order is document
//! order (depth-first, children in insertion order), and text content
//! concatenates descendant text fragments the way a DOM `textContent` does.

use std::collections::BTreeMap;

/// Properties of one element, supplied when appending to the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Element kind, e.g. `g`, `text`, `rect`.
    pub tag: String,
    pub id: Option<String>,
    pub attrs: BTreeMap<String, String>,
    /// Direct text fragment owned by this element.
    pub text: Option<String>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Element {
            tag: tag.into(),
            ..Element::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ElementNode {
    element: Element,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// The rendered output of one diagram, as a tree of addressable elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementTree {
    nodes: Vec<ElementNode>,
}

impl ElementTree {
    /// Create a tree with the given root element (typically the `svg` root).
    pub fn new(root: Element) -> Self {
        ElementTree {
            nodes: vec![ElementNode {
                element: root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub const ROOT: usize = 0;

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append `element` as the last child of `parent`, returning its index.
    ///
    /// # Panics
    /// Panics if `parent` is out of bounds.
    pub fn append(&mut self, parent: usize, element: Element) -> usize {
        assert!(parent < self.nodes.len(), "parent index out of bounds");
        let idx = self.nodes.len();
        self.nodes.push(ElementNode {
            element,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(idx);
        idx
    }

    pub fn get(&self, idx: usize) -> Option<&Element> {
        self.nodes.get(idx).map(|n| &n.element)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Element> {
        self.nodes.get_mut(idx).map(|n| &mut n.element)
    }

    pub fn parent(&self, idx: usize) -> Option<usize> {
        self.nodes.get(idx).and_then(|n| n.parent)
    }

    /// All indices in document order (depth-first preorder).
    pub fn preorder(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![Self::ROOT];
        while let Some(idx) = stack.pop() {
            order.push(idx);
            for &child in self.nodes[idx].children.iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// First element in document order satisfying `pred`.
    pub fn find(&self, mut pred: impl FnMut(&Element) -> bool) -> Option<usize> {
        self.preorder()
            .into_iter()
            .find(|&idx| pred(&self.nodes[idx].element))
    }

    /// All elements in document order satisfying `pred`.
    pub fn find_all(&self, mut pred: impl FnMut(&Element) -> bool) -> Vec<usize> {
        self.preorder()
            .into_iter()
            .filter(|&idx| pred(&self.nodes[idx].element))
            .collect()
    }

    /// Concatenated text of this element and its descendants, in document
    /// order, with no separators inserted.
    pub fn text_content(&self, idx: usize) -> String {
        let mut out = String::new();
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            if let Some(text) = &self.nodes[current].element.text {
                out.push_str(text);
            }
            for &child in self.nodes[current].children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Nearest element (self or ancestor) satisfying `pred`.
    pub fn closest(&self, idx: usize, mut pred: impl FnMut(&Element) -> bool) -> Option<usize> {
        let mut current = Some(idx);
        while let Some(i) = current {
            if pred(&self.nodes[i].element) {
                return Some(i);
            }
            current = self.nodes[i].parent;
        }
        None
    }

    /// Nearest enclosing group (`g`) element, including `idx` itself.
    pub fn closest_group(&self, idx: usize) -> Option<usize> {
        self.closest(idx, |el| el.tag == "g")
    }

    /// Append a whitespace-separated class token to the element's `class`
    /// attribute.
    pub fn add_class(&mut self, idx: usize, class: &str) {
        if let Some(element) = self.get_mut(idx) {
            let entry = element.attrs.entry("class".to_string()).or_default();
            if !entry.split_whitespace().any(|c| c == class) {
                if !entry.is_empty() {
                    entry.push(' ');
                }
                entry.push_str(class);
            }
        }
    }
}
