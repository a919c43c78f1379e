//! Core data model for parsed pages, sections, and source files.
//!
//! These types define the persisted contract consumed by the rendering layer:
//! field names and nesting here are load-bearing. `pages.json` serializes a
//! route → [`Document`] map plus a [`NavNode`] forest; `source-files.json`
//! serializes a path → [`SourceFile`] map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A pointer to a file (and optional line range) in the documented repository.
///
/// Absent `start_line`/`end_line` means the reference denotes the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
}

impl SourceRef {
    /// A reference to an entire file, no line range.
    pub fn whole_file(file: impl Into<String>) -> Self {
        SourceRef {
            file: file.into(),
            start_line: None,
            end_line: None,
        }
    }

    /// A reference to an inclusive 1-based line range within a file.
    pub fn ranged(file: impl Into<String>, start_line: u32, end_line: u32) -> Self {
        SourceRef {
            file: file.into(),
            start_line: Some(start_line),
            end_line: Some(end_line),
        }
    }
}

/// Mapping from diagram-local node identifier to the source location it
/// documents. Keys with no counterpart in the rendered diagram are inert.
pub type NodeMap = BTreeMap<String, SourceRef>;

/// Mapping from sequence-diagram participant alias to its rendered display
/// label. Only populated for diagrams whose nodes are not addressable by
/// identifier in the rendered output.
pub type ParticipantMap = BTreeMap<String, String>;

/// One ordered slice of a document body: either a prose span or an embedded
/// diagram block. Ordering within [`Document::sections`] is document reading
/// order and must be preserved exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Section {
    #[serde(rename_all = "camelCase")]
    Prose { content: String },
    #[serde(rename_all = "camelCase")]
    Diagram {
        /// Stable identifier derived from the nearest preceding heading,
        /// or `diagram-<N>` when no heading precedes the block.
        id: String,
        /// The diagram definition with annotation directives stripped,
        /// ready for the rendering engine.
        definition: String,
        node_map: NodeMap,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        participant_map: Option<ParticipantMap>,
    },
}

impl Section {
    pub fn is_diagram(&self) -> bool {
        matches!(self, Section::Diagram { .. })
    }
}

/// Frontmatter metadata parsed from the head of a markdown document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// One navigable page. Identity is the route; parent/child relations are
/// derived from route structure, never stored authoritatively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub route: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub is_index: bool,
    pub parent_route: Option<String>,
    /// Repository-relative path of the source file, `None` for synthesized
    /// index pages.
    pub source_path: Option<String>,
    pub sections: Vec<Section>,
}

impl Document {
    /// Node maps of every diagram section, in document order.
    pub fn node_maps(&self) -> impl Iterator<Item = &NodeMap> {
        self.sections.iter().filter_map(|section| match section {
            Section::Diagram { node_map, .. } => Some(node_map),
            Section::Prose { .. } => None,
        })
    }
}

/// One node of the navigation forest. Children mirror document parent/child
/// relations; documents whose parent could not be resolved become roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavNode {
    pub route: String,
    pub title: String,
    pub children: Vec<NavNode>,
}

/// A fetched source file, or an explicit per-file error marker when the
/// fetch layer reported it unavailable. Misses never abort a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceFile {
    #[serde(rename_all = "camelCase")]
    Loaded {
        language: String,
        total_lines: usize,
        content: String,
    },
    Missing { language: String, error: String },
}

impl SourceFile {
    pub fn language(&self) -> &str {
        match self {
            SourceFile::Loaded { language, .. } => language,
            SourceFile::Missing { language, .. } => language,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, SourceFile::Missing { .. })
    }
}
