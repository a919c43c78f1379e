//! Render-time diagram state: the rendering-engine seam, node resolution,
//! and popover toggling.
//!
//! The rendering engine is treated strictly as a black box that turns a
//! definition string into an [`ElementTree`], asynchronously, and may fail.
//! [`DiagramView`] owns the per-diagram lifecycle: it awaits the engine,
//! discards stale completions via a cancellation token, resolves node
//! identifiers to rendered elements, and only then exposes the tree with
//! click bindings attached, so a click can never land on a partially
//! resolved diagram.

pub mod element;
pub mod resolver;

use std::collections::BTreeMap;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;

use crate::{
    error::WaymarkError,
    properties::{NodeMap, ParticipantMap, Section, SourceRef},
};

pub use element::{Element, ElementTree};
pub use resolver::find_node_elements;

/// Class token applied to elements that received a click binding.
pub const CLICKABLE_CLASS: &str = "clickable-node";

/// Running counter so repeated renders of the same diagram never collide on
/// engine-assigned IDs.
static RENDER_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn next_render_id(diagram_id: &str) -> String {
    let n = RENDER_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("diagram-{diagram_id}-{n}")
}

/// The rendering engine boundary. Alternate backends only need to produce an
/// element tree; all identity resolution stays in [`resolver`].
#[async_trait]
pub trait DiagramRenderer: Send + Sync {
    /// Render `definition` under the engine-unique `render_id`.
    async fn render(
        &self,
        render_id: &str,
        definition: &str,
    ) -> Result<ElementTree, WaymarkError>;
}

/// Cooperative cancellation flag for an in-flight render.
///
/// A view torn down before its render completes cancels the token; the stale
/// completion then leaves the view untouched.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Lifecycle of one diagram's rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderState {
    Pending,
    Rendered(ElementTree),
    /// The engine rejected the definition. The raw definition is kept for
    /// display so authors can diagnose the failure.
    Failed { message: String, definition: String },
}

/// The popover currently open for a diagram view. At most one exists per
/// view; opening another replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popover {
    pub node_id: String,
    pub source_ref: SourceRef,
    /// Index of the element whose click opened the popover, for positioning.
    pub anchor: usize,
}

/// Render-time state for one diagram section.
#[derive(Debug)]
pub struct DiagramView {
    diagram_id: String,
    definition: String,
    node_map: NodeMap,
    participant_map: Option<ParticipantMap>,
    state: RenderState,
    /// Element index → node identifier, for elements with a click binding.
    bindings: BTreeMap<usize, String>,
    popover: Option<Popover>,
}

impl DiagramView {
    pub fn new(
        diagram_id: impl Into<String>,
        definition: impl Into<String>,
        node_map: NodeMap,
        participant_map: Option<ParticipantMap>,
    ) -> Self {
        DiagramView {
            diagram_id: diagram_id.into(),
            definition: definition.into(),
            node_map,
            participant_map,
            state: RenderState::Pending,
            bindings: BTreeMap::new(),
            popover: None,
        }
    }

    /// Build a view for a diagram section. Returns `None` for prose.
    pub fn for_section(section: &Section) -> Option<Self> {
        match section {
            Section::Diagram {
                id,
                definition,
                node_map,
                participant_map,
            } => Some(DiagramView::new(
                id.clone(),
                definition.clone(),
                node_map.clone(),
                participant_map.clone(),
            )),
            Section::Prose { .. } => None,
        }
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn popover(&self) -> Option<&Popover> {
        self.popover.as_ref()
    }

    /// Elements carrying a click binding, with the node each resolves to.
    pub fn bindings(&self) -> &BTreeMap<usize, String> {
        &self.bindings
    }

    /// Invoke the rendering engine and resolve node bindings.
    ///
    /// A cancelled token makes a late completion a no-op, so a view that was
    /// torn down mid-render never mutates. Engine failure is terminal for
    /// this render and surfaces as [`RenderState::Failed`], not as an `Err`.
    pub async fn render(&mut self, renderer: &dyn DiagramRenderer, cancel: &CancelToken) {
        let render_id = next_render_id(&self.diagram_id);
        let result = renderer.render(&render_id, &self.definition).await;
        if cancel.is_cancelled() {
            tracing::debug!("Discarding stale render completion for {render_id}");
            return;
        }
        match result {
            Ok(mut tree) => {
                let mut bindings = BTreeMap::new();
                for node_id in self.node_map.keys() {
                    let elements =
                        find_node_elements(&tree, node_id, self.participant_map.as_ref());
                    if elements.is_empty() {
                        // Not an error: the node simply gets no affordance.
                        tracing::debug!("No rendered element for node '{node_id}'");
                    }
                    for idx in elements {
                        tree.add_class(idx, CLICKABLE_CLASS);
                        if let Some(el) = tree.get_mut(idx) {
                            el.attrs
                                .insert("cursor".to_string(), "pointer".to_string());
                        }
                        bindings.insert(idx, node_id.clone());
                    }
                }
                // Bindings land together with the tree: clicks can only be
                // dispatched against fully resolved output.
                self.bindings = bindings;
                self.state = RenderState::Rendered(tree);
            }
            Err(err) => {
                tracing::warn!("Diagram render error for {}: {err}", self.diagram_id);
                self.state = RenderState::Failed {
                    message: err.to_string(),
                    definition: self.definition.clone(),
                };
            }
        }
    }

    /// Dispatch a click on a rendered element.
    ///
    /// Clicking the element of the currently open node closes the popover;
    /// clicking a different bound element replaces it. Clicks on unbound
    /// elements change nothing. Returns the popover now open, if any.
    pub fn handle_click(&mut self, element: usize) -> Option<&Popover> {
        let Some(node_id) = self.bindings.get(&element) else {
            return self.popover.as_ref();
        };
        if self
            .popover
            .as_ref()
            .is_some_and(|open| &open.node_id == node_id)
        {
            self.popover = None;
        } else if let Some(source_ref) = self.node_map.get(node_id) {
            self.popover = Some(Popover {
                node_id: node_id.clone(),
                source_ref: source_ref.clone(),
                anchor: element,
            });
        }
        self.popover.as_ref()
    }

    pub fn close_popover(&mut self) {
        self.popover = None;
    }
}
