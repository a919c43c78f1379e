//! Build orchestration: discover docs, parse them into a page graph, fetch
//! every referenced source file, and persist the result.
//!
//! A build is deliberately forgiving: an unreadable markdown file or a
//! missing referenced source file degrades that one page or popover, never
//! the build. The only fatal error before I/O even starts is an unusable
//! repository configuration.

use std::{
    collections::BTreeSet,
    path::Path,
    sync::Arc,
};

use crate::{
    config::SiteConfig,
    error::WaymarkError,
    fetch::{fetch_source_files, LocalFetcher, SourceFetcher, FETCH_CONCURRENCY},
    pages::{build_page_graph, PageGraph, RawPage},
    properties::SourceFile,
};

/// Everything a build produces, ready for persistence.
#[derive(Debug)]
pub struct SiteBuild {
    pub graph: PageGraph,
    pub source_files: std::collections::BTreeMap<String, SourceFile>,
}

pub struct SiteCompiler {
    config: SiteConfig,
    fetcher: Arc<dyn SourceFetcher>,
}

impl SiteCompiler {
    /// Build a compiler from configuration. Only the local fetcher is
    /// constructed here; remote fetchers are supplied via [`with_fetcher`].
    ///
    /// [`with_fetcher`]: SiteCompiler::with_fetcher
    pub fn new(config: SiteConfig) -> Result<Self, WaymarkError> {
        config.validate()?;
        let Some(local_root) = config.local_root.clone() else {
            return Err(WaymarkError::Config(
                "Remote repositories need a fetcher implementation; construct \
                 the compiler with SiteCompiler::with_fetcher."
                    .to_string(),
            ));
        };
        tracing::info!("Reading repository from local clone {:?}", local_root);
        Ok(SiteCompiler {
            config,
            fetcher: Arc::new(LocalFetcher::new(local_root)),
        })
    }

    pub fn with_fetcher(
        config: SiteConfig,
        fetcher: Arc<dyn SourceFetcher>,
    ) -> Result<Self, WaymarkError> {
        config.validate()?;
        Ok(SiteCompiler { config, fetcher })
    }

    /// Run a full build: discover, parse, link, fetch.
    pub async fn build(&self) -> Result<SiteBuild, WaymarkError> {
        let docs_path = self.config.docs_path();
        let rel_paths = self.fetcher.discover(docs_path).await?;
        tracing::info!("Discovered {} markdown files under {docs_path}/", rel_paths.len());

        let mut files = Vec::with_capacity(rel_paths.len());
        for rel_path in rel_paths {
            let repo_path = format!("{docs_path}/{rel_path}");
            match self.fetcher.fetch(&repo_path).await {
                Ok(Some(content)) => files.push(RawPage { rel_path, content }),
                Ok(None) => {
                    tracing::warn!("Skipping {repo_path}: vanished between discovery and fetch")
                }
                Err(err) => tracing::warn!("Skipping {repo_path}: {err}"),
            }
        }

        let graph = build_page_graph(&files, docs_path);
        tracing::info!(
            "Built page graph: {} pages, {} navigation roots",
            graph.pages.len(),
            graph.nav_tree.len()
        );

        let referenced: BTreeSet<String> = graph
            .pages
            .values()
            .flat_map(|doc| doc.node_maps())
            .flat_map(|map| map.values())
            .map(|source_ref| source_ref.file.clone())
            .collect();
        tracing::info!("Fetching {} referenced source files", referenced.len());
        let source_files = fetch_source_files(
            self.fetcher.clone(),
            referenced.into_iter().collect(),
            FETCH_CONCURRENCY,
        )
        .await?;
        let missing = source_files.values().filter(|f| f.is_missing()).count();
        if missing > 0 {
            tracing::warn!("{missing} referenced source files could not be fetched");
        }

        Ok(SiteBuild {
            graph,
            source_files,
        })
    }

    /// Build and persist `pages.json` and `source-files.json` under
    /// `out_dir`, creating it if needed.
    pub async fn write_to(&self, out_dir: &Path) -> Result<SiteBuild, WaymarkError> {
        let build = self.build().await?;
        tokio::fs::create_dir_all(out_dir).await?;

        let pages = serde_json::json!({
            "pages": build.graph.pages,
            "navTree": build.graph.nav_tree,
        });
        let pages_path = out_dir.join("pages.json");
        tokio::fs::write(&pages_path, serde_json::to_string_pretty(&pages)?).await?;
        tracing::info!("Wrote {:?}", pages_path);

        let sources_path = out_dir.join("source-files.json");
        tokio::fs::write(
            &sources_path,
            serde_json::to_string_pretty(&build.source_files)?,
        )
        .await?;
        tracing::info!("Wrote {:?}", sources_path);

        Ok(build)
    }
}
