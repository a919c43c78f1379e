//! Node resolution over rendered diagram output.
//!
//! Different diagram families expose node identity differently: flowcharts
//! embed the node identifier in generated element IDs, some renderers emit
//! raw IDs or data attributes, and sequence diagrams are only addressable
//! through rendered label text. No single strategy is reliable across all of
//! them, so resolution cascades from most specific to least specific and
//! stops at the first strategy that yields any match. The trailing substring
//! strategy is a pragmatic fallback and can false-positive on short node
//! identifiers; see the tests.

use crate::properties::ParticipantMap;
use crate::render::element::ElementTree;

/// Collapse whitespace runs to single spaces and trim.
fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Locate the rendered elements representing `node_id`.
///
/// Returns zero or more element indices; an empty result means the node gets
/// no click affordance (never an error). Strategies, in order:
///
/// 1. Element ID containing `flowchart-<nodeId>-` (flowchart convention).
/// 2. Element ID exactly equal to the node identifier.
/// 3. `data-id` attribute equal to the node identifier.
/// 4. If a participant display name is registered: text elements whose
///    normalized content contains the display name or vice versa, lifted to
///    their nearest enclosing groups (deduplicated).
/// 5. Element ID containing the node identifier as a substring.
pub fn find_node_elements(
    tree: &ElementTree,
    node_id: &str,
    participant_map: Option<&ParticipantMap>,
) -> Vec<usize> {
    let flowchart_pattern = format!("flowchart-{node_id}-");
    if let Some(idx) = tree.find(|el| {
        el.id
            .as_deref()
            .is_some_and(|id| id.contains(&flowchart_pattern))
    }) {
        return vec![idx];
    }

    if let Some(idx) = tree.find(|el| el.id.as_deref() == Some(node_id)) {
        return vec![idx];
    }

    if let Some(idx) = tree.find(|el| el.attrs.get("data-id").map(String::as_str) == Some(node_id))
    {
        return vec![idx];
    }

    if let Some(display_name) = participant_map.and_then(|map| map.get(node_id)) {
        let mut groups = Vec::new();
        for idx in tree.find_all(|el| el.tag == "text") {
            let content = normalize_text(&tree.text_content(idx));
            if content.is_empty() {
                continue;
            }
            // Handles labels split across fragments and labels truncated by
            // the renderer.
            if content.contains(display_name.as_str()) || display_name.contains(&content) {
                if let Some(group) = tree.closest_group(idx) {
                    if !groups.contains(&group) {
                        groups.push(group);
                    }
                }
            }
        }
        if !groups.is_empty() {
            return groups;
        }
    }

    if let Some(idx) = tree.find(|el| el.id.as_deref().is_some_and(|id| id.contains(node_id))) {
        return vec![idx];
    }

    Vec::new()
}
