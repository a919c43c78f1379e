//! Navigation tree assembly.
//!
//! Documents insert in lexicographic route order, which guarantees ancestors
//! insert before descendants (ancestor routes are string prefixes). Parent
//! lookup goes through an explicit route → node index built incrementally
//! during insertion, so attachment is O(n) amortized over all documents.

use std::collections::{BTreeMap, HashMap};

use crate::properties::{Document, NavNode};

struct ArenaNode {
    route: String,
    title: String,
    children: Vec<usize>,
}

/// Build the navigation forest for a resolved page set.
///
/// A document with a resolved parent route attaches exactly once under that
/// parent's node; a document with no (or an unresolved) parent becomes a
/// root.
pub fn build_nav_tree(pages: &BTreeMap<String, Document>) -> Vec<NavNode> {
    let mut arena: Vec<ArenaNode> = Vec::with_capacity(pages.len());
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(pages.len());
    let mut roots: Vec<usize> = Vec::new();

    for (route, page) in pages {
        let node_idx = arena.len();
        arena.push(ArenaNode {
            route: page.route.clone(),
            title: page.title.clone(),
            children: Vec::new(),
        });

        let parent_idx = page
            .parent_route
            .as_deref()
            .filter(|parent| pages.contains_key(*parent))
            .and_then(|parent| index.get(parent).copied());
        match parent_idx {
            Some(parent) => arena[parent].children.push(node_idx),
            None => roots.push(node_idx),
        }
        index.insert(route.as_str(), node_idx);
    }

    roots
        .into_iter()
        .map(|root| materialize(&arena, root))
        .collect()
}

fn materialize(arena: &[ArenaNode], idx: usize) -> NavNode {
    let node = &arena[idx];
    NavNode {
        route: node.route.clone(),
        title: node.title.clone(),
        children: node
            .children
            .iter()
            .map(|&child| materialize(arena, child))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(route: &str, title: &str, parent: Option<&str>) -> Document {
        Document {
            route: route.to_string(),
            title: title.to_string(),
            description: String::new(),
            tags: vec![],
            is_index: false,
            parent_route: parent.map(str::to_string),
            source_path: None,
            sections: vec![],
        }
    }

    fn page_set(docs: Vec<Document>) -> BTreeMap<String, Document> {
        docs.into_iter().map(|d| (d.route.clone(), d)).collect()
    }

    #[test]
    fn test_children_attach_under_parent() {
        let pages = page_set(vec![
            doc("/guide", "Guide", None),
            doc("/guide/setup", "Setup", Some("/guide")),
            doc("/guide/usage", "Usage", Some("/guide")),
        ]);
        let tree = build_nav_tree(&pages);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].route, "/guide");
        let children: Vec<&str> = tree[0].children.iter().map(|c| c.route.as_str()).collect();
        assert_eq!(children, vec!["/guide/setup", "/guide/usage"]);
    }

    #[test]
    fn test_unresolved_parent_promotes_to_root() {
        let pages = page_set(vec![doc("/orphan/page", "Page", Some("/orphan"))]);
        let tree = build_nav_tree(&pages);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].route, "/orphan/page");
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn test_every_document_appears_exactly_once() {
        let pages = page_set(vec![
            doc("/", "Home", None),
            doc("/a", "A", Some("/")),
            doc("/a/x", "X", Some("/a")),
            doc("/b", "B", None),
        ]);
        let tree = build_nav_tree(&pages);

        fn collect<'a>(nodes: &'a [NavNode], out: &mut Vec<&'a str>) {
            for node in nodes {
                out.push(node.route.as_str());
                collect(&node.children, out);
            }
        }
        let mut routes = Vec::new();
        collect(&tree, &mut routes);
        routes.sort_unstable();
        assert_eq!(routes, vec!["/", "/a", "/a/x", "/b"]);
    }
}
