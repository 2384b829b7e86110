//! Provenance of the records in an id-set.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::utils::fs::read_text_file;

/// The `(host, namespace, repo)` triple identifying where content came from.
///
/// Two records only collide when they come from the same source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoSource {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub repo: String,
}

impl RepoSource {
    pub fn new(host: impl Into<String>, namespace: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            namespace: namespace.into(),
            repo: repo.into(),
        }
    }

    /// True when none of the three parts is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.host.is_empty() && self.namespace.is_empty() && self.repo.is_empty()
    }

    /// Serialized form stored on records: `[host, namespace, repo]`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Array(vec![
            Value::String(self.host.clone()),
            Value::String(self.namespace.clone()),
            Value::String(self.repo.clone()),
        ])
    }

    /// Parses a git remote URL.
    ///
    /// Accepts `https://host/ns/repo(.git)`, `ssh://git@host/ns/repo` and the
    /// scp-like `git@host:ns/repo(.git)`. Nested namespaces keep their slashes.
    #[must_use]
    pub fn from_remote_url(url: &str) -> Option<Self> {
        let url = url.trim();
        let rest = if let Some((_, after)) = url.split_once("://") {
            let after = after.rsplit_once('@').map_or(after, |(_, host_path)| host_path);
            after.to_string()
        } else {
            let (user_host, path) = url.split_once(':')?;
            let host = user_host.rsplit_once('@').map_or(user_host, |(_, h)| h);
            format!("{host}/{path}")
        };

        let rest = rest.trim_end_matches('/');
        let rest = rest.strip_suffix(".git").unwrap_or(rest);
        let (host, path) = rest.split_once('/')?;
        let (namespace, repo) = path.rsplit_once('/')?;
        let host = host.split_once(':').map_or(host, |(h, _port)| h);
        if host.is_empty() || namespace.is_empty() || repo.is_empty() {
            return None;
        }
        Some(Self::new(host, namespace, repo))
    }

    /// Reads the `origin` remote of the git repository at `repo_root`.
    ///
    /// Returns `None` when there is no readable `.git/config` or no origin URL.
    #[must_use]
    pub fn from_git_config(repo_root: &Path) -> Option<Self> {
        let config = read_text_file(&repo_root.join(".git").join("config")).ok()?;
        let mut in_origin = false;
        for line in config.lines() {
            let line = line.trim();
            if line.starts_with('[') {
                in_origin = line == r#"[remote "origin"]"#;
                continue;
            }
            if in_origin
                && let Some((key, value)) = line.split_once('=')
                && key.trim() == "url"
            {
                return Self::from_remote_url(value);
            }
        }
        None
    }

    /// The configured source when complete, else the git origin, else the empty triple.
    #[must_use]
    pub fn resolve(configured: Option<&RepoSource>, repo_root: &Path) -> Self {
        if let Some(source) = configured.filter(|s| !s.is_empty()) {
            return source.clone();
        }
        Self::from_git_config(repo_root).unwrap_or_else(|| {
            tracing::debug!(target: "id_set::walk", "No git origin found; records carry an empty source");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_from_remote_url() {
        let expected = RepoSource::new("github.com", "demisto", "content");
        assert_eq!(RepoSource::from_remote_url("https://github.com/demisto/content.git"), Some(expected.clone()));
        assert_eq!(RepoSource::from_remote_url("git@github.com:demisto/content.git"), Some(expected.clone()));
        assert_eq!(RepoSource::from_remote_url("ssh://git@github.com/demisto/content"), Some(expected));

        let nested = RepoSource::from_remote_url("https://gitlab.example.com:8443/group/sub/repo/").unwrap();
        assert_eq!(nested, RepoSource::new("gitlab.example.com", "group/sub", "repo"));

        assert_eq!(RepoSource::from_remote_url("not a url"), None);
    }

    #[test]
    fn test_from_git_config() {
        let temp = tempdir().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        std::fs::write(
            temp.path().join(".git/config"),
            "[core]\n\tbare = false\n[remote \"upstream\"]\n\turl = https://github.com/other/fork.git\n[remote \"origin\"]\n\turl = git@github.com:demisto/content.git\n",
        )
        .unwrap();

        let source = RepoSource::from_git_config(temp.path()).unwrap();
        assert_eq!(source, RepoSource::new("github.com", "demisto", "content"));
    }

    #[test]
    fn test_resolve_prefers_configuration() {
        let temp = tempdir().unwrap();
        let configured = RepoSource::new("example.com", "team", "packs");
        assert_eq!(RepoSource::resolve(Some(&configured), temp.path()), configured);
        assert!(RepoSource::resolve(None, temp.path()).is_empty());
        assert_eq!(RepoSource::default().to_value(), serde_json::json!(["", "", ""]));
    }
}
