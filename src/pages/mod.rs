//! Page graph construction: routes, parent inference, synthesized index
//! pages, and the navigation tree.
//!
//! Build proceeds in fixed passes:
//!
//! 1. Raw pages from discovered files (frontmatter + sections via the codec).
//! 2. Synthesis of missing directory-index pages for any parent route that a
//!    page references but that no file provides.
//! 3. One more synthesis round for parent gaps the first round introduced.
//! 4. Remaining dangling parent references are nulled, promoting those
//!    documents to navigation roots.
//!
//! The two-round synthesis is deliberate and bounded: a document nested more
//! than two synthesized levels below the nearest real page keeps a dangling
//! gap and its subtree roots itself. See the deep-nesting test.

pub mod navtree;
pub mod routes;

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    codec::parse_document,
    properties::{Document, NavNode},
};

pub use navtree::build_nav_tree;
pub use routes::{
    capitalize_words, normalize_route, parent_route, route_for_file, title_for_route_segment,
};

/// One discovered markdown source file, content already fetched.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Path relative to the documentation root, forward slashes.
    pub rel_path: String,
    pub content: String,
}

/// The resolved document set plus its navigation forest.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGraph {
    pub pages: BTreeMap<String, Document>,
    pub nav_tree: Vec<NavNode>,
}

impl PageGraph {
    /// Look up a document by route, tolerant of trailing slashes.
    pub fn get(&self, route: &str) -> Option<&Document> {
        self.pages.get(&normalize_route(route))
    }
}

fn file_stem(rel_path: &str) -> &str {
    let name = rel_path.rsplit('/').next().unwrap_or(rel_path);
    name.strip_suffix(".md").unwrap_or(name)
}

fn is_index_file(rel_path: &str) -> bool {
    rel_path == "index.md" || rel_path.ends_with("/index.md")
}

fn synthesized_page(route: &str, parent: Option<String>) -> Document {
    Document {
        route: route.to_string(),
        title: title_for_route_segment(route),
        description: String::new(),
        tags: vec![],
        is_index: true,
        parent_route: parent,
        source_path: None,
        sections: vec![],
    }
}

/// Build the full page graph from discovered files.
///
/// `docs_path` is the repository-relative documentation root, recorded on
/// each document as the prefix of its source path.
pub fn build_page_graph(files: &[RawPage], docs_path: &str) -> PageGraph {
    let has_root_index = files.iter().any(|f| f.rel_path == "index.md");
    let mut pages: BTreeMap<String, Document> = BTreeMap::new();

    // Pass 1: raw pages from discovered files.
    for file in files {
        let parsed = parse_document(&file.content);
        let route = route_for_file(&file.rel_path);

        let parent = if route == "/" {
            None
        } else {
            match parent_route(&route) {
                // Without a root index there is nothing at "/" to attach to.
                Some(p) if p == "/" && !has_root_index => None,
                p => p,
            }
        };

        let title = parsed
            .frontmatter
            .title
            .or(parsed.first_heading)
            .unwrap_or_else(|| capitalize_words(&file_stem(&file.rel_path).replace('_', " ")));

        let source_path = if docs_path.is_empty() {
            file.rel_path.clone()
        } else {
            format!("{docs_path}/{}", file.rel_path)
        };

        pages.insert(
            route.clone(),
            Document {
                route,
                title,
                description: parsed.frontmatter.description.unwrap_or_default(),
                tags: parsed.frontmatter.tags,
                is_index: is_index_file(&file.rel_path),
                parent_route: parent,
                source_path: Some(source_path),
                sections: parsed.sections,
            },
        );
    }

    // Pass 2: synthesize index pages for directories that have children but
    // no index file.
    let referenced: BTreeSet<String> = pages
        .values()
        .filter_map(|p| p.parent_route.clone())
        .collect();
    for parent in referenced {
        if !pages.contains_key(&parent) {
            let grandparent = if parent == "/" {
                None
            } else {
                parent_route(&parent)
            };
            let page = synthesized_page(&parent, grandparent);
            tracing::info!("Synthesized index page: {} (\"{}\")", parent, page.title);
            pages.insert(parent.clone(), page);
        }
    }

    // Pass 3: one more round for parent gaps the first synthesis introduced.
    let still_missing: BTreeSet<String> = pages
        .values()
        .filter_map(|p| p.parent_route.clone())
        .filter(|parent| !pages.contains_key(parent))
        .collect();
    for parent in still_missing {
        let page = synthesized_page(&parent, None);
        tracing::info!("Synthesized index page: {} (\"{}\")", parent, page.title);
        pages.insert(parent.clone(), page);
    }

    // Pass 4: null out any remaining dangling parent references.
    let dangling: Vec<String> = pages
        .values()
        .filter(|p| {
            p.parent_route
                .as_deref()
                .is_some_and(|parent| !pages.contains_key(parent))
        })
        .map(|p| p.route.clone())
        .collect();
    for route in dangling {
        tracing::debug!("Promoting {} to navigation root (dangling parent)", route);
        if let Some(page) = pages.get_mut(&route) {
            page.parent_route = None;
        }
    }

    let nav_tree = build_nav_tree(&pages);
    PageGraph { pages, nav_tree }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(rel_path: &str, content: &str) -> RawPage {
        RawPage {
            rel_path: rel_path.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_guide_synthesis_scenario() {
        let graph = build_page_graph(
            &[
                raw("guide/setup.md", "# Setup\n"),
                raw("guide/usage.md", "# Usage\n"),
            ],
            "docs",
        );

        let guide = graph.pages.get("/guide").expect("synthesized /guide");
        assert_eq!(guide.title, "Guide");
        assert!(guide.is_index);
        assert!(guide.source_path.is_none());

        // The synthesized /guide references "/", which the second round
        // fills in as a Home root.
        let home = graph.pages.get("/").expect("synthesized root");
        assert_eq!(home.title, "Home");

        assert_eq!(graph.nav_tree.len(), 1);
        let root = &graph.nav_tree[0];
        assert_eq!(root.route, "/");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].route, "/guide");
        let grandchildren: Vec<&str> = root.children[0]
            .children
            .iter()
            .map(|c| c.route.as_str())
            .collect();
        assert_eq!(grandchildren, vec!["/guide/setup", "/guide/usage"]);
    }

    #[test]
    fn test_root_index_becomes_parent() {
        let graph = build_page_graph(
            &[
                raw("index.md", "---\ntitle: Overview\n---\nWelcome\n"),
                raw("setup.md", "# Setup\n"),
            ],
            "docs",
        );
        assert_eq!(graph.pages.get("/").unwrap().title, "Overview");
        assert_eq!(
            graph.pages.get("/setup").unwrap().parent_route.as_deref(),
            Some("/")
        );
        assert_eq!(graph.nav_tree.len(), 1);
        assert_eq!(graph.nav_tree[0].route, "/");
    }

    #[test]
    fn test_title_fallback_chain() {
        let graph = build_page_graph(
            &[
                raw("a.md", "---\ntitle: From Frontmatter\n---\n# Ignored\n"),
                raw("b.md", "# From Heading\n"),
                raw("payment_flows.md", "no heading here\n"),
            ],
            "",
        );
        assert_eq!(graph.pages.get("/a").unwrap().title, "From Frontmatter");
        assert_eq!(graph.pages.get("/b").unwrap().title, "From Heading");
        assert_eq!(
            graph.pages.get("/payment_flows").unwrap().title,
            "Payment Flows"
        );
    }

    #[test]
    fn test_deep_nesting_leaves_bounded_gap() {
        // Only two synthesis rounds run: /a/b/c and /a/b are synthesized,
        // /a is not, and the round-two page keeps a null parent.
        let graph = build_page_graph(&[raw("a/b/c/d.md", "# D\n")], "docs");
        assert!(graph.pages.contains_key("/a/b/c"));
        let ab = graph.pages.get("/a/b").expect("round-two synthesis");
        assert_eq!(ab.parent_route, None);
        assert!(!graph.pages.contains_key("/a"));
        // The subtree roots itself at the gap.
        assert_eq!(graph.nav_tree.len(), 1);
        assert_eq!(graph.nav_tree[0].route, "/a/b");
    }

    #[test]
    fn test_directory_index_file_maps_to_directory_route() {
        let graph = build_page_graph(
            &[
                raw("guide/index.md", "# Guide Home\n"),
                raw("guide/setup.md", "# Setup\n"),
            ],
            "docs",
        );
        let guide = graph.pages.get("/guide").unwrap();
        assert_eq!(guide.title, "Guide Home");
        assert!(guide.is_index);
        assert_eq!(guide.source_path.as_deref(), Some("docs/guide/index.md"));
    }

    #[test]
    fn test_route_lookup_normalizes_trailing_slash() {
        let graph = build_page_graph(&[raw("guide/setup.md", "# Setup\n")], "docs");
        let a = graph.get("/guide/setup").unwrap();
        let b = graph.get("/guide/setup/").unwrap();
        assert_eq!(a, b);
    }
}
