//! # waymark
//!
//! A Rust library for turning Markdown trees with embedded Mermaid diagrams
//! into a navigable site data set whose diagram nodes resolve to
//! source-code locations.
//!
//! ## Overview
//!
//! waymark runs as a two-stage pipeline. At build time it discovers the
//! markdown files of a documented repository, splits each into ordered
//! prose and diagram sections, extracts per-node source annotations from
//! the diagram definitions, infers a route hierarchy (synthesizing missing
//! directory-index pages), and fetches every referenced source file on a
//! bounded worker pool. At render time it resolves abstract diagram node
//! identifiers against the rendering engine's output so a click on a node
//! opens a popover showing the exact lines of code that node documents.
//!
//! ### Key properties
//!
//! - **Annotations ride inside the diagram**: `click` directives map node
//!   identifiers to `path:start-end` references and are stripped before
//!   the definition reaches the rendering engine
//! - **Degradation over failure**: a missing source file, an unmatched
//!   node, or a diagram the engine rejects degrades that one popover,
//!   node, or diagram; nothing else
//! - **Deterministic output**: the same file tree always produces the
//!   same page graph, section order, and diagram identifiers
//!
//! ## Architecture
//!
//! - **[`codec`]**: markdown sectionizing and diagram annotation parsing
//! - **[`pages`]**: route derivation, index synthesis, navigation tree
//! - **[`fetch`]**: source discovery and the batched fetch worker pool
//! - **[`compiler`]**: build orchestration and persistence
//! - **[`render`]**: the rendering-engine seam, node resolution, popovers
//! - **[`snippet`]**: line-range extraction for popover display
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use waymark::{compiler::SiteCompiler, config::SiteConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SiteConfig {
//!         local_root: Some("./my-repo".into()),
//!         ..SiteConfig::default()
//!     };
//!     let compiler = SiteCompiler::new(config)?;
//!     let build = compiler.write_to(std::path::Path::new("./out")).await?;
//!     println!("built {} pages", build.graph.pages.len());
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod compiler;
pub mod config;
pub mod error;
pub mod fetch;
pub mod pages;
pub mod properties;
pub mod render;
pub mod snippet;

pub use error::WaymarkError;
