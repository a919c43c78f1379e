//! Full-pipeline build test
//!
//! Exercises the compiler end to end against a repository laid out on disk:
//! discovery, sectionizing, annotation extraction, index synthesis,
//! navigation, the referenced-source fetch batch, and the persisted JSON
//! contract.

use std::fs;
use std::path::Path;

use tempfile::tempdir;
use test_log::test;

use waymark::{
    compiler::SiteCompiler,
    config::SiteConfig,
    properties::{Section, SourceFile},
};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn seed_repo(root: &Path) {
    write(
        root,
        "docs/index.md",
        "---\ntitle: Handbook\ndescription: Developer handbook\n---\n\n# Welcome\n\nStart here.\n",
    );
    write(
        root,
        "docs/guide/setup.md",
        concat!(
            "# Setup\n\n",
            "Install the gems first.\n\n",
            "```mermaid\n",
            "flowchart TD\n",
            "    A[Installer] --> B[Database]\n",
            "    click A href \"#\" \"lib/installer.rb:5-12\"\n",
            "    click B href \"#\" \"config/database.yml\"\n",
            "```\n\n",
            "Then run the migrations.\n",
        ),
    );
    write(
        root,
        "docs/guide/flow.md",
        concat!(
            "# Request Flow\n\n",
            "```mermaid\n",
            "sequenceDiagram\n",
            "    participant GC as Gift<br/>Controller\n",
            "    participant DB as Database\n",
            "    GC->>DB: save\n",
            "    click GC href \"#\" \"app/controllers/gifts_controller.rb:1-30\"\n",
            "    click DB href \"#\" \"lib/missing_adapter.rb\"\n",
            "```\n",
        ),
    );
    write(root, "lib/installer.rb", &ruby_lines(20));
    write(root, "config/database.yml", "adapter: postgresql\n");
    write(root, "app/controllers/gifts_controller.rb", &ruby_lines(40));
    // lib/missing_adapter.rb deliberately absent.
}

fn ruby_lines(n: usize) -> String {
    (1..=n).map(|i| format!("# line {i}\n")).collect()
}

#[test(tokio::test)]
async fn test_full_build_from_local_repo() {
    let repo = tempdir().unwrap();
    seed_repo(repo.path());

    let config = SiteConfig {
        local_root: Some(repo.path().to_path_buf()),
        ..SiteConfig::default()
    };
    let compiler = SiteCompiler::new(config).unwrap();
    let build = compiler.build().await.unwrap();

    // Routes: explicit index, two guide pages, synthesized /guide parent.
    let pages = &build.graph.pages;
    assert_eq!(pages.len(), 4);
    let root = pages.get("/").unwrap();
    assert_eq!(root.title, "Handbook");
    assert!(root.is_index);
    assert_eq!(root.parent_route, None);

    let guide = pages.get("/guide").unwrap();
    assert!(guide.is_index);
    assert_eq!(guide.title, "Guide");
    assert_eq!(guide.source_path, None);
    assert_eq!(guide.parent_route.as_deref(), Some("/"));

    let setup = pages.get("/guide/setup").unwrap();
    assert_eq!(setup.parent_route.as_deref(), Some("/guide"));
    assert_eq!(setup.source_path.as_deref(), Some("docs/guide/setup.md"));

    // Section structure: prose, diagram, prose, in reading order.
    let kinds: Vec<bool> = setup.sections.iter().map(Section::is_diagram).collect();
    assert_eq!(kinds, vec![false, true, false]);
    let Section::Diagram {
        id,
        definition,
        node_map,
        participant_map,
    } = &setup.sections[1]
    else {
        panic!("expected diagram section");
    };
    assert_eq!(id, "setup");
    assert!(!definition.contains("click"));
    assert!(definition.contains("A[Installer] --> B[Database]"));
    assert_eq!(node_map["A"].start_line, Some(5));
    assert_eq!(node_map["A"].end_line, Some(12));
    assert_eq!(node_map["B"].file, "config/database.yml");
    assert_eq!(node_map["B"].start_line, None);
    assert!(participant_map.is_none());

    // Sequence diagram registers display names with br tags collapsed.
    let flow = pages.get("/guide/flow").unwrap();
    let Section::Diagram {
        participant_map, ..
    } = &flow.sections[1]
    else {
        panic!("expected diagram section");
    };
    let participants = participant_map.as_ref().unwrap();
    assert_eq!(participants["GC"], "Gift Controller");
    assert_eq!(participants["DB"], "Database");

    // Navigation: single root with the guide subtree beneath it.
    assert_eq!(build.graph.nav_tree.len(), 1);
    let nav_root = &build.graph.nav_tree[0];
    assert_eq!(nav_root.route, "/");
    assert_eq!(nav_root.children.len(), 1);
    assert_eq!(nav_root.children[0].route, "/guide");
    let guide_children: Vec<&str> = nav_root.children[0]
        .children
        .iter()
        .map(|n| n.route.as_str())
        .collect();
    assert_eq!(guide_children, vec!["/guide/flow", "/guide/setup"]);

    // Source batch: every referenced file present, the absent one as a miss.
    assert_eq!(build.source_files.len(), 4);
    assert!(matches!(
        build.source_files.get("lib/installer.rb"),
        Some(SourceFile::Loaded { language, .. }) if language == "ruby"
    ));
    assert!(build
        .source_files
        .get("lib/missing_adapter.rb")
        .unwrap()
        .is_missing());
}

#[test(tokio::test)]
async fn test_write_to_persists_json_contract() {
    let repo = tempdir().unwrap();
    seed_repo(repo.path());
    let out = tempdir().unwrap();

    let config = SiteConfig {
        local_root: Some(repo.path().to_path_buf()),
        ..SiteConfig::default()
    };
    let compiler = SiteCompiler::new(config).unwrap();
    compiler.write_to(out.path()).await.unwrap();

    let pages: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.path().join("pages.json")).unwrap()).unwrap();
    assert!(pages["navTree"].is_array());
    let setup = &pages["pages"]["/guide/setup"];
    assert_eq!(setup["isIndex"], false);
    assert_eq!(setup["parentRoute"], "/guide");
    let diagram = &setup["sections"][1];
    assert_eq!(diagram["type"], "diagram");
    assert_eq!(diagram["nodeMap"]["A"]["startLine"], 5);
    assert_eq!(diagram["nodeMap"]["A"]["file"], "lib/installer.rb");

    let sources: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.path().join("source-files.json")).unwrap())
            .unwrap();
    assert_eq!(sources["lib/installer.rb"]["language"], "ruby");
    assert_eq!(sources["lib/installer.rb"]["totalLines"], 21);
    assert_eq!(
        sources["lib/missing_adapter.rb"]["error"],
        "File not found"
    );
}

#[test(tokio::test)]
async fn test_build_fails_fast_on_missing_docs_dir() {
    let repo = tempdir().unwrap();
    let config = SiteConfig {
        local_root: Some(repo.path().to_path_buf()),
        ..SiteConfig::default()
    };
    let compiler = SiteCompiler::new(config).unwrap();
    assert!(compiler.build().await.is_err());
}
