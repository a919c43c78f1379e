//! Document parsing: annotation extraction and markdown sectionizing.
//!
//! - [`annotation`] scans one diagram definition block for `click` and
//!   `participant` directives and strips the click syntax before the
//!   definition reaches the rendering engine.
//! - [`md`] splits a markdown body into ordered prose/diagram sections and
//!   assigns each diagram a heading-derived identifier.

pub mod annotation;
pub mod md;

pub use annotation::{parse_annotations, DiagramAnnotations};
pub use md::{parse_document, sectionize, slugify, split_frontmatter, ParsedDoc, DIAGRAM_FENCE};
