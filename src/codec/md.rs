//! Markdown document sectionizing.
//!
//! Splits a document body into an ordered list of prose spans and diagram
//! blocks. Diagram blocks are fenced code blocks tagged with
//! [`DIAGRAM_FENCE`]; their raw contents pass through the annotation parser
//! and each block receives a stable identifier derived from the nearest
//! preceding heading line.
//!
//! Section order reproduces document reading order exactly. Markdown-to-HTML
//! conversion is out of scope here: prose spans keep their raw markdown text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    codec::annotation::parse_annotations,
    properties::{Frontmatter, Section},
};

/// Fence language tag marking an embedded diagram block.
pub const DIAGRAM_FENCE: &str = "mermaid";

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?s)```{DIAGRAM_FENCE}\s*\n(.*?)```")).unwrap());

/// Heading lines `#` through `######`. Scanned over the raw body text, so a
/// `#`-prefixed line inside a fenced block counts as a heading too. Matches
/// the authored-document contract; see the sectionizer tests.
static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(#{1,6})\s+(.+)$").unwrap());

static H1_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#\s+(.+)$").unwrap());

/// A fully sectionized document body plus its frontmatter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedDoc {
    pub frontmatter: Frontmatter,
    pub sections: Vec<Section>,
    /// First `# H1` line of the body, used as a title fallback when the
    /// frontmatter declares none.
    pub first_heading: Option<String>,
}

/// Lowercase, collapse runs of non-alphanumeric characters to single
/// hyphens, and strip leading/trailing hyphens.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Split YAML frontmatter (`---` fenced at the very start of the document)
/// from the body. Returns `(yaml, body)`; documents without a complete
/// frontmatter block come back unchanged as the body.
pub fn split_frontmatter(raw: &str) -> (Option<&str>, &str) {
    let rest = match raw.strip_prefix("---") {
        Some(r) if r.starts_with('\n') || r.starts_with("\r\n") => r,
        _ => return (None, raw),
    };
    let yaml_start = raw.len() - rest.len() + if rest.starts_with("\r\n") { 2 } else { 1 };
    let mut search = yaml_start;
    while let Some(pos) = raw[search..].find("\n---") {
        let delim_start = search + pos + 1;
        let after = &raw[delim_start + 3..];
        if after.is_empty() || after.starts_with('\n') || after.starts_with("\r\n") {
            let yaml = &raw[yaml_start..delim_start];
            let body = after
                .strip_prefix("\r\n")
                .or_else(|| after.strip_prefix('\n'))
                .unwrap_or(after);
            return (Some(yaml), body);
        }
        search = delim_start + 3;
    }
    (None, raw)
}

fn parse_frontmatter(yaml: Option<&str>) -> Frontmatter {
    let Some(yaml) = yaml else {
        return Frontmatter::default();
    };
    if yaml.trim().is_empty() {
        return Frontmatter::default();
    }
    match serde_yaml::from_str::<Frontmatter>(yaml) {
        Ok(frontmatter) => frontmatter,
        Err(err) => {
            tracing::warn!("Ignoring malformed frontmatter: {err}");
            Frontmatter::default()
        }
    }
}

/// Identifier for the diagram block starting at `offset` within `body`:
/// the slug of the nearest heading strictly before the block, else
/// `diagram-<N>` with N the zero-based diagram index within the document.
fn generate_diagram_id(headings: &[(usize, &str)], diagram_index: usize, offset: usize) -> String {
    let nearest = headings
        .iter()
        .take_while(|(heading_offset, _)| *heading_offset < offset)
        .last();
    match nearest {
        Some((_, text)) => {
            let slug = slugify(text);
            if slug.is_empty() {
                format!("diagram-{diagram_index}")
            } else {
                slug
            }
        }
        None => format!("diagram-{diagram_index}"),
    }
}

/// Split a document body into ordered prose and diagram sections.
///
/// Text strictly between diagram blocks becomes a prose section when
/// non-empty after trimming; empty spans are dropped, never emitted.
pub fn sectionize(body: &str) -> Vec<Section> {
    let headings: Vec<(usize, &str)> = HEADING_RE
        .captures_iter(body)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some((whole.start(), caps.get(2)?.as_str()))
        })
        .collect();

    let mut sections = Vec::new();
    let mut last_index = 0;
    let mut diagram_index = 0;

    for caps in FENCE_RE.captures_iter(body) {
        let Some((block, code)) = caps.get(0).zip(caps.get(1)) else {
            continue;
        };
        let code = code.as_str();

        let prose_before = body[last_index..block.start()].trim();
        if !prose_before.is_empty() {
            sections.push(Section::Prose {
                content: prose_before.to_string(),
            });
        }

        let id = generate_diagram_id(&headings, diagram_index, block.start());
        let annotations = parse_annotations(code);
        tracing::debug!(
            "diagram '{}': {} node refs, {} participants",
            id,
            annotations.node_map.len(),
            annotations.participant_map.len()
        );
        sections.push(Section::Diagram {
            id,
            definition: annotations.clean_definition.trim().to_string(),
            node_map: annotations.node_map,
            participant_map: if annotations.participant_map.is_empty() {
                None
            } else {
                Some(annotations.participant_map)
            },
        });

        last_index = block.end();
        diagram_index += 1;
    }

    let remaining = body[last_index..].trim();
    if !remaining.is_empty() {
        sections.push(Section::Prose {
            content: remaining.to_string(),
        });
    }

    sections
}

/// Parse a raw markdown document: frontmatter, ordered sections, and the
/// first H1 as a title fallback.
pub fn parse_document(raw: &str) -> ParsedDoc {
    let (yaml, body) = split_frontmatter(raw);
    let frontmatter = parse_frontmatter(yaml);
    let first_heading = H1_RE
        .captures(body)
        .map(|caps| caps[1].trim().to_string());
    ParsedDoc {
        frontmatter,
        sections: sectionize(body),
        first_heading,
    }
}
