//! Remote repository access
//!
//! This module handles everything fetched from a hosted repository:
//! - The three-method repository client contract
//! - Bounded, failure-tolerant candidate fetching
//! - Token resolution for authenticated providers

mod github;
mod token;

pub use github::{parse_github_slug, GitHubClient};
pub use token::{host_of, resolve_token, resolve_token_with, TokenStore, TOKEN_ENV_VARS};

use crate::plan::PlanNote;
use crate::source::{markdown, CandidateMap, DocumentItem, DocumentKind, DocumentSource, ItemKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

/// Failure reported by a repository provider
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Transport-level failure
    #[error("network error: {0}")]
    Network(String),

    /// Missing or rejected credentials
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Repository or path does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Call exceeded its time bound
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Payload could not be understood
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// A file listed in a remote directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    pub path: String,
}

impl RemoteEntry {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
        }
    }
}

/// Contract every repository provider implements
#[async_trait::async_trait]
pub trait RepositoryClient: Send + Sync {
    /// Name of the default branch
    async fn default_branch(&self) -> Result<String, RemoteError>;

    /// Content of a file, `None` when it does not exist
    async fn file_content(&self, path: &str, branch: &str) -> Result<Option<String>, RemoteError>;

    /// Files directly inside a directory; an empty path is the repository root
    async fn list_files(&self, path: &str, branch: &str) -> Result<Vec<RemoteEntry>, RemoteError>;

    /// Short provider description used in notes
    fn describe(&self) -> String {
        "remote".to_string()
    }
}

/// Directories searched on a backfill after the regular locations
const BACKFILL_DIRS: &[&str] = &[".github"];

/// Candidates found across several directories, with the directories that failed
#[derive(Debug, Default)]
pub struct Located {
    pub items: Vec<DocumentItem>,
    pub failures: Vec<(String, RemoteError)>,
}

/// Result of fetching remote candidates
#[derive(Debug, Default)]
pub struct RemoteFetch {
    pub branch: Option<String>,
    pub candidates: CandidateMap,
    pub notes: Vec<PlanNote>,
}

/// Fetches remote candidates with a time bound on every call
///
/// Provider errors never escape; they become notes and empty results.
pub struct RemoteFetcher<'a> {
    client: &'a dyn RepositoryClient,
    timeout: Duration,
    secondary: Option<String>,
}

impl<'a> RemoteFetcher<'a> {
    /// Create a fetcher over a client
    pub fn new(client: &'a dyn RepositoryClient, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            secondary: None,
        }
    }

    /// Also search a secondary directory after the repository root
    pub fn with_secondary(mut self, dir: Option<&str>) -> Self {
        self.secondary = dir
            .map(|d| d.trim_matches('/').to_string())
            .filter(|d| !d.is_empty());
        self
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, RemoteError>
    where
        F: Future<Output = Result<T, RemoteError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(self.timeout)),
        }
    }

    /// Branch to read from: the given one or the provider default
    pub async fn branch(&self, preferred: Option<&str>) -> Result<String, RemoteError> {
        match preferred.filter(|b| !b.trim().is_empty()) {
            Some(branch) => Ok(branch.to_string()),
            None => self.bounded(self.client.default_branch()).await,
        }
    }

    /// Best candidate per location for one kind
    ///
    /// A failing location does not discard what the others found.
    pub async fn candidates(&self, kind: DocumentKind, branch: &str) -> Located {
        let mut dirs = vec![String::new()];
        dirs.extend(self.secondary.clone());
        self.candidates_in(kind, branch, &dirs).await
    }

    async fn candidates_in(&self, kind: DocumentKind, branch: &str, dirs: &[String]) -> Located {
        let mut located = Located::default();

        for dir in dirs {
            match self.candidate_in(kind, branch, dir).await {
                Ok(Some(item)) => located.items.push(item),
                Ok(None) => {}
                Err(e) => located.failures.push((dir.clone(), e)),
            }
        }

        located
    }

    async fn candidate_in(
        &self,
        kind: DocumentKind,
        branch: &str,
        dir: &str,
    ) -> Result<Option<DocumentItem>, RemoteError> {
        let entries = self.bounded(self.client.list_files(dir, branch)).await?;
        let best = entries
            .into_iter()
            .filter(|e| kind.matches_file_name(&e.name))
            .min_by(|a, b| {
                a.name
                    .len()
                    .cmp(&b.name.len())
                    .then_with(|| a.name.cmp(&b.name))
            });

        let Some(entry) = best else {
            return Ok(None);
        };

        let content = self.bounded(self.client.file_content(&entry.path, branch)).await?;
        Ok(content
            .map(|content| {
                DocumentItem::for_kind(kind, &content, &entry.name, &entry.path, DocumentSource::Remote)
            })
            .filter(DocumentItem::has_content))
    }

    /// Fetch candidates for every kind, demoting failures to notes
    pub async fn fetch_all(&self, preferred_branch: Option<&str>, kinds: &[DocumentKind]) -> RemoteFetch {
        let mut fetch = RemoteFetch::default();

        let branch = match self.branch(preferred_branch).await {
            Ok(branch) => branch,
            Err(e) => {
                tracing::warn!("Remote unavailable ({}): {}", self.client.describe(), e);
                fetch.notes.push(PlanNote::general(
                    "remote-unavailable",
                    format!("{} unavailable: {}", self.client.describe(), e),
                ));
                return fetch;
            }
        };

        for kind in kinds {
            let located = self.candidates(*kind, &branch).await;

            for (dir, e) in &located.failures {
                tracing::warn!("Failed to fetch remote {} from {}: {}", kind, display_dir(dir), e);
                fetch.notes.push(PlanNote::new(
                    *kind,
                    "remote-error",
                    format!("remote {} not fetched from {}: {}", kind, display_dir(dir), e),
                ));
            }

            if !located.items.is_empty() {
                tracing::debug!("Found {} remote {} candidate(s)", located.items.len(), kind);
                fetch.candidates.insert(*kind, located.items);
            }
        }

        fetch.branch = Some(branch);
        fetch
    }

    /// One extra fetch for a kind that ended without any item
    ///
    /// Searches the regular locations and the conventional backfill ones.
    pub async fn backfill(&self, kind: DocumentKind, branch: &str) -> Option<DocumentItem> {
        let mut dirs = vec![String::new()];
        dirs.extend(self.secondary.clone());
        dirs.extend(BACKFILL_DIRS.iter().map(|d| d.to_string()));

        let located = self.candidates_in(kind, branch, &dirs).await;
        for (dir, e) in &located.failures {
            tracing::debug!("Backfill of {} from {} failed: {}", kind, display_dir(dir), e);
        }
        located.items.into_iter().next()
    }

    /// Every file in a remote folder as items of the given kind
    pub async fn folder_items(&self, folder: &str, branch: &str, kind: ItemKind) -> Vec<DocumentItem> {
        let entries = match self.bounded(self.client.list_files(folder, branch)).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Remote folder {} not listed: {}", folder, e);
                return Vec::new();
            }
        };

        let mut items = Vec::new();
        for entry in entries {
            let content = match self.bounded(self.client.file_content(&entry.path, branch)).await {
                Ok(Some(content)) => content,
                Ok(None) => continue,
                Err(e) => {
                    tracing::debug!("Remote file {} not fetched: {}", entry.path, e);
                    continue;
                }
            };

            let title = match kind {
                ItemKind::SupplementalDoc => markdown::document_title(&entry.name, &content),
                _ => entry.name.clone(),
            };
            let item = DocumentItem::new(
                &title,
                kind,
                &content,
                &entry.name,
                &entry.path,
                DocumentSource::Remote,
            );
            if item.has_content() {
                items.push(item);
            }
        }

        items
    }
}

fn display_dir(dir: &str) -> &str {
    if dir.is_empty() {
        "repository root"
    } else {
        dir
    }
}

/// Repository held in memory, for tests and offline runs
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    branch: String,
    files: HashMap<String, String>,
    failing: bool,
    forbidden: Vec<String>,
}

impl InMemoryRepository {
    /// Create an empty repository with a default branch
    pub fn new(branch: &str) -> Self {
        Self {
            branch: branch.to_string(),
            ..Default::default()
        }
    }

    /// Add a file at a repository path
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(path.to_string(), content.to_string());
        self
    }

    /// Make every call fail with a network error
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Reject every call under a directory with an authentication error
    pub fn forbidding(mut self, dir: &str) -> Self {
        self.forbidden.push(dir.trim_matches('/').to_string());
        self
    }

    fn check(&self) -> Result<(), RemoteError> {
        if self.failing {
            Err(RemoteError::Network("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn check_path(&self, path: &str) -> Result<(), RemoteError> {
        self.check()?;
        let denied = self.forbidden.iter().any(|dir| {
            path == dir || path.strip_prefix(dir.as_str()).is_some_and(|rest| rest.starts_with('/'))
        });
        if denied {
            Err(RemoteError::Auth(format!("403 forbidden: {}", path)))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl RepositoryClient for InMemoryRepository {
    async fn default_branch(&self) -> Result<String, RemoteError> {
        self.check()?;
        Ok(self.branch.clone())
    }

    async fn file_content(&self, path: &str, _branch: &str) -> Result<Option<String>, RemoteError> {
        self.check_path(path)?;
        Ok(self.files.get(path).cloned())
    }

    async fn list_files(&self, path: &str, _branch: &str) -> Result<Vec<RemoteEntry>, RemoteError> {
        self.check_path(path.trim_matches('/'))?;
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path.trim_end_matches('/'))
        };

        let mut entries: Vec<RemoteEntry> = self
            .files
            .keys()
            .filter_map(|p| {
                let rest = p.strip_prefix(&prefix)?;
                (!rest.contains('/')).then(|| RemoteEntry::new(rest, p))
            })
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn describe(&self) -> String {
        "in-memory repository".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> InMemoryRepository {
        InMemoryRepository::new("main")
            .with_file("README.md", "# Remote\n")
            .with_file("README.old.md", "# Old\n")
            .with_file("docs/CHANGELOG.md", "## 1.0\n")
            .with_file(".github/LICENSE", "MIT\n")
            .with_file("docs/articles/guide.md", "# Guide\n")
    }

    #[tokio::test]
    async fn test_fetch_all_picks_shortest_per_location() {
        let client = repo();
        let fetcher = RemoteFetcher::new(&client, Duration::from_secs(5)).with_secondary(Some("docs"));

        let fetch = fetcher.fetch_all(None, &DocumentKind::ALL).await;
        assert_eq!(fetch.branch.as_deref(), Some("main"));
        assert!(fetch.notes.is_empty());

        let readme = &fetch.candidates[&DocumentKind::Readme];
        assert_eq!(readme.len(), 1);
        assert_eq!(readme[0].path(), "README.md");
        assert_eq!(readme[0].source(), DocumentSource::Remote);
        assert_eq!(fetch.candidates[&DocumentKind::Changelog][0].path(), "docs/CHANGELOG.md");
        assert!(!fetch.candidates.contains_key(&DocumentKind::License));
    }

    #[tokio::test]
    async fn test_failures_become_notes() {
        let client = repo().failing();
        let fetcher = RemoteFetcher::new(&client, Duration::from_secs(5));

        let fetch = fetcher.fetch_all(None, &DocumentKind::STANDARD).await;
        assert!(fetch.branch.is_none());
        assert!(fetch.candidates.is_empty());
        assert_eq!(fetch.notes[0].key, "remote-unavailable");
        assert!(fetch.notes[0].message.contains("connection refused"));

        // An explicit branch skips the lookup, so each kind reports its own failure
        let fetch = fetcher.fetch_all(Some("main"), &DocumentKind::STANDARD).await;
        assert_eq!(fetch.notes.len(), 3);
        assert!(fetch.notes[0].message.contains("from repository root"));
        assert!(fetch.notes.iter().all(|n| n.key.ends_with(":remote-error")));
    }

    #[tokio::test]
    async fn test_failing_dir_keeps_other_candidates() {
        let client = repo().forbidding("docs");
        let fetcher = RemoteFetcher::new(&client, Duration::from_secs(5)).with_secondary(Some("docs"));

        let fetch = fetcher.fetch_all(None, &DocumentKind::STANDARD).await;
        assert_eq!(fetch.candidates[&DocumentKind::Readme][0].path(), "README.md");
        assert!(!fetch.candidates.contains_key(&DocumentKind::Changelog));

        let readme_note = fetch
            .notes
            .iter()
            .find(|n| n.key == "readme:remote-error")
            .unwrap();
        assert!(readme_note.message.contains("from docs"));
        assert!(readme_note.message.contains("403"));
        assert_eq!(fetch.notes.len(), 3);
    }

    #[tokio::test]
    async fn test_backfill_survives_failing_dir() {
        let client = repo().forbidding(".github");
        let fetcher = RemoteFetcher::new(&client, Duration::from_secs(5)).with_secondary(Some("docs"));

        let changelog = fetcher.backfill(DocumentKind::Changelog, "main").await.unwrap();
        assert_eq!(changelog.path(), "docs/CHANGELOG.md");
        assert!(fetcher.backfill(DocumentKind::License, "main").await.is_none());
    }

    #[tokio::test]
    async fn test_backfill_searches_conventional_dirs() {
        let client = repo();
        let fetcher = RemoteFetcher::new(&client, Duration::from_secs(5));

        let license = fetcher.backfill(DocumentKind::License, "main").await.unwrap();
        assert_eq!(license.path(), ".github/LICENSE");
        assert!(fetcher.backfill(DocumentKind::Upgrade, "main").await.is_none());
    }

    #[tokio::test]
    async fn test_folder_items() {
        let client = repo();
        let fetcher = RemoteFetcher::new(&client, Duration::from_secs(5));

        let items = fetcher
            .folder_items("docs/articles", "main", ItemKind::SupplementalDoc)
            .await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title(), "Guide");
        assert!(fetcher
            .folder_items("nope", "main", ItemKind::SupplementalDoc)
            .await
            .is_empty());
    }

    struct SlowRepository;

    #[async_trait::async_trait]
    impl RepositoryClient for SlowRepository {
        async fn default_branch(&self) -> Result<String, RemoteError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("main".to_string())
        }

        async fn file_content(&self, _: &str, _: &str) -> Result<Option<String>, RemoteError> {
            Ok(None)
        }

        async fn list_files(&self, _: &str, _: &str) -> Result<Vec<RemoteEntry>, RemoteError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_calls_are_time_bounded() {
        let client = SlowRepository;
        let fetcher = RemoteFetcher::new(&client, Duration::from_millis(20));

        let err = fetcher.branch(None).await.unwrap_err();
        assert!(matches!(err, RemoteError::Timeout(_)));
    }
}
