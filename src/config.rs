//! Site configuration: where the documented repository lives and where its
//! docs tree sits inside it.
//!
//! Configuration is layered: a TOML file provides the base, environment
//! variables override individual fields. A local clone always wins over a
//! remote repository when both are configured, since local reads are cheap
//! and never rate-limited.

use serde::{Deserialize, Serialize};
use std::{fs::read_to_string, path::PathBuf};

use crate::error::WaymarkError;

/// Default docs tree location inside the documented repository.
pub const DEFAULT_DOCS_PATH: &str = "docs";

/// A remote repository coordinate, for fetcher implementations that read
/// through a hosting API instead of the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepo {
    pub owner: String,
    pub repo: String,
    /// Branch, tag, or commit to read from.
    pub reference: String,
    /// API token. Required for remote reads; anonymous access is too
    /// rate-limited to build a site from.
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Path to a local clone of the documented repository.
    pub local_root: Option<PathBuf>,
    pub remote: Option<RemoteRepo>,
    /// Repository-relative path of the docs tree.
    pub docs_path: Option<String>,
}

impl SiteConfig {
    pub fn from_file(path: &std::path::Path) -> Result<Self, WaymarkError> {
        tracing::debug!("Reading config from {:?}", path);
        let content = read_to_string(path)?;
        let config: SiteConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment variable overrides on top of the file values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(root) = std::env::var("WAYMARK_LOCAL_ROOT") {
            if !root.is_empty() {
                self.local_root = Some(PathBuf::from(root));
            }
        }
        if let Ok(docs) = std::env::var("WAYMARK_DOCS_PATH") {
            if !docs.is_empty() {
                self.docs_path = Some(docs);
            }
        }
        let owner = std::env::var("WAYMARK_GITHUB_OWNER").ok();
        let repo = std::env::var("WAYMARK_GITHUB_REPO").ok();
        if let (Some(owner), Some(repo)) = (owner, repo) {
            let reference = std::env::var("WAYMARK_GITHUB_REF").unwrap_or_else(|_| "main".into());
            let token = std::env::var("WAYMARK_GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
            self.remote = Some(RemoteRepo {
                owner,
                repo,
                reference,
                token,
            });
        } else if let Ok(token) = std::env::var("WAYMARK_GITHUB_TOKEN") {
            if let Some(remote) = self.remote.as_mut() {
                if !token.is_empty() {
                    remote.token = Some(token);
                }
            }
        }
        self
    }

    pub fn docs_path(&self) -> &str {
        self.docs_path.as_deref().unwrap_or(DEFAULT_DOCS_PATH)
    }

    /// Whether a local clone is configured. Local access takes priority over
    /// the remote coordinate when both are present.
    pub fn use_local(&self) -> bool {
        self.local_root.is_some()
    }

    /// The one fatal configuration state: no local clone and no usable
    /// remote credential. Everything else degrades to per-file misses.
    pub fn validate(&self) -> Result<(), WaymarkError> {
        if self.local_root.is_some() {
            return Ok(());
        }
        match &self.remote {
            Some(remote) if remote.token.is_some() => Ok(()),
            Some(_) => Err(WaymarkError::Config(
                "Remote repository configured without an API token. Set \
                 WAYMARK_GITHUB_TOKEN or switch to a local clone via \
                 WAYMARK_LOCAL_ROOT."
                    .to_string(),
            )),
            None => Err(WaymarkError::Config(
                "No repository configured. Set local_root (or WAYMARK_LOCAL_ROOT) \
                 or a [remote] section with an API token."
                    .to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config: SiteConfig = toml::from_str(r#"local_root = "/srv/repo""#).unwrap();
        assert_eq!(config.local_root, Some(PathBuf::from("/srv/repo")));
        assert_eq!(config.docs_path(), "docs");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_remote_config() {
        let config: SiteConfig = toml::from_str(
            r#"
            docs_path = "documentation"

            [remote]
            owner = "acme"
            repo = "widgets"
            reference = "main"
            token = "tok"
            "#,
        )
        .unwrap();
        assert!(!config.use_local());
        assert_eq!(config.docs_path(), "documentation");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_remote_without_token_is_fatal() {
        let config: SiteConfig = toml::from_str(
            r#"
            [remote]
            owner = "acme"
            repo = "widgets"
            reference = "main"
            "#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(WaymarkError::Config(_))));
    }

    #[test]
    fn test_empty_config_is_fatal() {
        let config = SiteConfig::default();
        assert!(matches!(config.validate(), Err(WaymarkError::Config(_))));
    }

    #[test]
    fn test_local_root_beats_remote() {
        let config: SiteConfig = toml::from_str(
            r#"
            local_root = "/srv/repo"

            [remote]
            owner = "acme"
            repo = "widgets"
            reference = "main"
            "#,
        )
        .unwrap();
        assert!(config.use_local());
        assert!(config.validate().is_ok());
    }
}
