//! Source file discovery and retrieval.
//!
//! [`SourceFetcher`] is the seam to the external fetch collaborator: a local
//! clone on disk or a remote repository API. The crate ships the local
//! implementation; remote fetchers plug in behind the same trait. Batch
//! retrieval of referenced source files runs on a bounded worker pool with a
//! single retry per file; a missing file is recorded as an explicit
//! [`SourceFile::Missing`] marker and never aborts the batch.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use walkdir::WalkDir;

use crate::{error::WaymarkError, properties::SourceFile};

/// Number of simultaneous fetches in a batch.
pub const FETCH_CONCURRENCY: usize = 10;

/// Delay before the single retry of a failed fetch.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Directory names never descended into during discovery.
const IGNORED_DIRS: &[&str] = &["node_modules", ".git", ".claude", "dist", "vendor"];

/// Access to the documented repository's files.
///
/// `fetch` returns `Ok(None)` for a file that does not exist (the 404
/// equivalent); errors are reserved for transport or permission failures and
/// trigger the per-file retry.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Retrieve one file's content by repository-relative path.
    async fn fetch(&self, path: &str) -> Result<Option<String>, WaymarkError>;

    /// List markdown files under `root`, as paths relative to `root` with
    /// forward slashes, sorted.
    async fn discover(&self, root: &str) -> Result<Vec<String>, WaymarkError>;
}

/// Fetcher backed by a local clone of the documented repository.
#[derive(Debug, Clone)]
pub struct LocalFetcher {
    repo_root: PathBuf,
}

impl LocalFetcher {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        LocalFetcher {
            repo_root: repo_root.into(),
        }
    }
}

fn is_ignored(entry: &walkdir::DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || (entry.file_type().is_dir() && IGNORED_DIRS.contains(&name.as_ref()))
}

#[async_trait]
impl SourceFetcher for LocalFetcher {
    async fn fetch(&self, path: &str) -> Result<Option<String>, WaymarkError> {
        let abs = self.repo_root.join(path);
        match tokio::fs::read_to_string(&abs).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn discover(&self, root: &str) -> Result<Vec<String>, WaymarkError> {
        let docs_dir = self.repo_root.join(root);
        if !docs_dir.is_dir() {
            return Err(WaymarkError::NotFound(format!(
                "Docs directory not found: {}",
                docs_dir.display()
            )));
        }
        let mut results = Vec::new();
        for entry in WalkDir::new(&docs_dir)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| !is_ignored(e))
        {
            let entry = entry.map_err(|err| WaymarkError::Io(format!("{err}")))?;
            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "md")
            {
                let rel = entry
                    .path()
                    .strip_prefix(&docs_dir)
                    .map_err(|err| WaymarkError::Io(format!("{err}")))?;
                results.push(path_to_forward_slashes(rel));
            }
        }
        results.sort();
        Ok(results)
    }
}

fn path_to_forward_slashes(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Detect the display language for a file from its extension.
pub fn detect_language(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or("");
    match ext {
        "rb" => "ruby",
        "rs" => "rust",
        "js" => "javascript",
        "jsx" => "jsx",
        "ts" => "typescript",
        "tsx" => "tsx",
        "py" => "python",
        "yml" | "yaml" => "yaml",
        "json" => "json",
        "html" => "html",
        "slim" => "slim",
        "erb" => "erb",
        "css" => "css",
        "scss" => "scss",
        _ => "text",
    }
}

async fn fetch_with_retry(
    fetcher: &dyn SourceFetcher,
    path: &str,
) -> Result<Option<String>, WaymarkError> {
    match fetcher.fetch(path).await {
        Ok(content) => Ok(content),
        Err(err) => {
            tracing::warn!("Retrying fetch of {path}: {err}");
            tokio::time::sleep(RETRY_DELAY).await;
            fetcher.fetch(path).await
        }
    }
}

/// Fetch a batch of source files with a bounded worker pool.
///
/// Workers pull the next path from a shared index cursor until the list is
/// exhausted. Each failing fetch is retried once; a file the fetcher reports
/// as absent yields a [`SourceFile::Missing`] marker rather than failing the
/// batch.
pub async fn fetch_source_files(
    fetcher: Arc<dyn SourceFetcher>,
    paths: Vec<String>,
    concurrency: usize,
) -> Result<BTreeMap<String, SourceFile>, WaymarkError> {
    let paths = Arc::new(paths);
    let cursor = Arc::new(AtomicUsize::new(0));
    let results: Arc<Mutex<BTreeMap<String, SourceFile>>> = Arc::new(Mutex::new(BTreeMap::new()));

    let workers = concurrency.min(paths.len());
    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let fetcher = fetcher.clone();
        let paths = paths.clone();
        let cursor = cursor.clone();
        let results = results.clone();
        handles.push(tokio::spawn(async move {
            loop {
                let i = cursor.fetch_add(1, Ordering::SeqCst);
                let Some(path) = paths.get(i) else {
                    return Ok::<(), WaymarkError>(());
                };
                let file = match fetch_with_retry(fetcher.as_ref(), path).await? {
                    Some(content) => {
                        let total_lines = content.split('\n').count();
                        tracing::debug!(
                            "  {path} ({}, {total_lines} lines)",
                            detect_language(path)
                        );
                        SourceFile::Loaded {
                            language: detect_language(path).to_string(),
                            total_lines,
                            content,
                        }
                    }
                    None => {
                        tracing::warn!("  MISSING: {path}");
                        SourceFile::Missing {
                            language: detect_language(path).to_string(),
                            error: "File not found".to_string(),
                        }
                    }
                };
                results
                    .lock()
                    .map_err(|_| {
                        WaymarkError::Io("source file results lock poisoned".to_string())
                    })?
                    .insert(path.clone(), file);
            }
        }));
    }

    for handle in handles {
        handle.await??;
    }

    let results = Arc::try_unwrap(results)
        .map_err(|_| WaymarkError::Io("fetch workers still hold results".to_string()))?
        .into_inner()
        .map_err(|_| WaymarkError::Io("source file results lock poisoned".to_string()))?;
    Ok(results)
}
