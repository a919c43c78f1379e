//! Extraction of node-to-source directives from a single diagram definition.
//!
//! Authors annotate Mermaid-style definitions with two directive forms:
//!
//! ```text
//! click <nodeId> href "#" "<file>[:<start>-<end>]"
//! participant <alias> as <displayName>
//! ```
//!
//! `click` lines carry the node → source mapping and are stripped before the
//! definition reaches the rendering engine (the engine would otherwise try to
//! interpret them). `participant` lines stay in the definition; their display
//! names are captured separately so sequence-diagram nodes can later be
//! located by rendered label text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::properties::{NodeMap, ParticipantMap, SourceRef};

static CLICK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r##"click\s+(\S+)\s+href\s+"#"\s+"([^"]+)""##).unwrap());

/// Matches the start of a click directive line after leading whitespace has
/// been trimmed. Deliberately looser than [`CLICK_RE`] so that partially
/// malformed directives are still removed from the rendered definition.
static CLICK_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r##"^click\s+\S+\s+href\s+"#""##).unwrap());

static PARTICIPANT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)participant\s+(\S+)\s+as\s+(.+?)$").unwrap());

/// Inline line-break markup inside participant display names, collapsed to a
/// single space together with any whitespace that follows it.
static LINE_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br/?>\s*").unwrap());

/// `<path>:<start>-<end>` with positive integer line bounds.
static LINE_RANGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+?):(\d+)-(\d+)$").unwrap());

/// The result of scanning one diagram definition block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiagramAnnotations {
    /// The definition with all click directive lines removed. Every other
    /// line is preserved verbatim and in order.
    pub clean_definition: String,
    pub node_map: NodeMap,
    pub participant_map: ParticipantMap,
}

/// Parse a `fileRef` string from a click directive.
///
/// A trailing `:<start>-<end>` with numeric components becomes a line range;
/// anything else (including a partial match with non-numeric components) is
/// treated as a whole-file reference with the entire string as the path.
fn parse_file_ref(file_ref: &str) -> SourceRef {
    if let Some(caps) = LINE_RANGE_RE.captures(file_ref) {
        let start = caps[2].parse::<u32>().ok();
        let end = caps[3].parse::<u32>().ok();
        if let (Some(start), Some(end)) = (start, end) {
            return SourceRef::ranged(&caps[1], start, end);
        }
    }
    SourceRef::whole_file(file_ref)
}

/// Extract all click directives as a [`NodeMap`]. Duplicate directives for
/// the same node identifier resolve last-occurrence-wins.
fn extract_click_directives(definition: &str) -> NodeMap {
    let mut node_map = NodeMap::new();
    for caps in CLICK_RE.captures_iter(definition) {
        let node_id = caps[1].to_string();
        let source_ref = parse_file_ref(&caps[2]);
        tracing::debug!("click directive: {} -> {:?}", node_id, source_ref);
        node_map.insert(node_id, source_ref);
    }
    node_map
}

/// Extract `participant <alias> as <displayName>` declarations, collapsing
/// inline `<br/>` markup in display names to single spaces.
fn extract_participant_map(definition: &str) -> ParticipantMap {
    let mut map = ParticipantMap::new();
    for caps in PARTICIPANT_RE.captures_iter(definition) {
        let alias = caps[1].to_string();
        let display_name = LINE_BREAK_RE.replace_all(caps[2].trim(), " ").into_owned();
        map.insert(alias, display_name);
    }
    map
}

/// Remove click directive lines so the rendering engine never sees them.
fn strip_click_directives(definition: &str) -> String {
    definition
        .split('\n')
        .filter(|line| !CLICK_LINE_RE.is_match(line.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse one raw diagram definition block into its cleaned definition plus
/// the node and participant maps.
pub fn parse_annotations(definition: &str) -> DiagramAnnotations {
    DiagramAnnotations {
        clean_definition: strip_click_directives(definition),
        node_map: extract_click_directives(definition),
        participant_map: extract_participant_map(definition),
    }
}
