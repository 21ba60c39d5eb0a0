//! Local document sources
//!
//! This module handles everything read from the local project:
//! - Resolving standard documents (readme, changelog, ...) by file name
//! - Collecting supplemental documents and example scripts from folders
//! - Reading the git origin to locate the remote repository

mod config;
mod document;
pub mod markdown;

pub use config::{DocsConfig, HelpConfig, RemoteConfig, CONFIG_DIR};
pub use document::{
    content_hash, normalize_content, DocumentItem, DocumentKind, DocumentSource, ItemKind,
};

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Candidates grouped by document kind
pub type CandidateMap = BTreeMap<DocumentKind, Vec<DocumentItem>>;

/// Locates standard documents on the local filesystem
pub struct SourceResolver;

impl SourceResolver {
    /// Best matching file for a kind inside one directory
    ///
    /// The shortest file name wins; ties are broken lexicographically.
    /// A missing directory or no match is not an error.
    pub fn resolve_in(kind: DocumentKind, dir: &Path) -> Option<PathBuf> {
        let entries = std::fs::read_dir(dir).ok()?;

        entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                kind.matches_file_name(&name).then_some((name, entry.path()))
            })
            .min_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
            .map(|(_, path)| path)
    }

    /// Best match per location, root first, then the secondary directory
    pub fn resolve(kind: DocumentKind, root: &Path, secondary: Option<&Path>) -> Vec<PathBuf> {
        let mut found = Vec::new();

        if let Some(path) = Self::resolve_in(kind, root) {
            found.push(path);
        }

        if let Some(dir) = secondary.filter(|d| d.is_dir()) {
            if let Some(path) = Self::resolve_in(kind, dir) {
                if !found.contains(&path) {
                    found.push(path);
                }
            }
        }

        found
    }

    /// Read the resolved files of a kind into candidates
    ///
    /// Unreadable or empty files are skipped.
    pub fn candidates(
        kind: DocumentKind,
        root: &Path,
        secondary: Option<&Path>,
    ) -> Vec<DocumentItem> {
        Self::resolve(kind, root, secondary)
            .into_iter()
            .filter_map(|path| match std::fs::read_to_string(&path) {
                Ok(content) => Some(local_item(kind, root, &path, &content)),
                Err(e) => {
                    tracing::debug!("Skipping unreadable {:?}: {}", path, e);
                    None
                }
            })
            .filter(|item| item.has_content())
            .collect()
    }

    /// Local candidates for every kind
    pub fn candidate_map(root: &Path, secondary: Option<&Path>) -> CandidateMap {
        DocumentKind::ALL
            .iter()
            .map(|kind| (*kind, Self::candidates(*kind, root, secondary)))
            .filter(|(_, items)| !items.is_empty())
            .collect()
    }
}

fn local_item(kind: DocumentKind, root: &Path, path: &Path, content: &str) -> DocumentItem {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    DocumentItem::for_kind(
        kind,
        content,
        &file_name,
        &display_path(root, path),
        DocumentSource::Local,
    )
}

fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Collect every file below the given folders as supplemental items
///
/// Folders are relative to `root`; missing folders contribute nothing.
/// Items are ordered by folder, then by path.
pub fn collect_folder_items(root: &Path, folders: &[String], kind: ItemKind) -> Vec<DocumentItem> {
    let mut items = Vec::new();

    for folder in folders {
        let dir = root.join(folder);
        if !dir.is_dir() {
            tracing::debug!("Supplemental folder {:?} not found", dir);
            continue;
        }

        for entry in walkdir::WalkDir::new(&dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                let name = e.file_name().to_str().unwrap_or("");
                e.depth() == 0 || !name.starts_with('.')
            })
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let content = match std::fs::read_to_string(entry.path()) {
                Ok(content) => content,
                Err(e) => {
                    tracing::debug!("Skipping unreadable {:?}: {}", entry.path(), e);
                    continue;
                }
            };

            let file_name = entry.file_name().to_string_lossy().to_string();
            let title = match kind {
                ItemKind::SupplementalDoc => markdown::document_title(&file_name, &content),
                _ => file_name.clone(),
            };
            let item = DocumentItem::new(
                &title,
                kind,
                &content,
                &file_name,
                &display_path(root, entry.path()),
                DocumentSource::Local,
            );

            if item.has_content() {
                items.push(item);
            }
        }
    }

    items
}

/// URL of the `origin` remote of the git repository containing `path`
pub fn origin_url(path: &Path) -> Result<Option<String>> {
    let repo = match git2::Repository::discover(path) {
        Ok(repo) => repo,
        Err(_) => return Ok(None),
    };

    let remote = match repo.find_remote("origin") {
        Ok(remote) => remote,
        Err(_) => return Ok(None),
    };

    let url = remote
        .url()
        .map(|u| u.to_string())
        .filter(|u| !u.is_empty());

    Ok(url)
}

/// Root of the git working tree containing `path`, or `path` itself
pub fn project_root(path: &Path) -> Result<PathBuf> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("Failed to resolve project path {:?}", path))?;

    let root = git2::Repository::discover(&canonical)
        .ok()
        .and_then(|repo| repo.workdir().map(|w| w.to_path_buf()))
        .unwrap_or(canonical);

    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_resolve_prefers_shortest_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "short").unwrap();
        fs::write(dir.path().join("README.long.md"), "long").unwrap();
        fs::write(dir.path().join("readme"), "shortest").unwrap();

        let found = SourceResolver::resolve_in(DocumentKind::Readme, dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "readme");
    }

    #[test]
    fn test_resolve_tie_breaks_lexicographically() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("LICENSE.txt"), "b").unwrap();
        fs::write(dir.path().join("LICENSE.md_"), "a").unwrap();

        let found = SourceResolver::resolve_in(DocumentKind::License, dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "LICENSE.md_");
    }

    #[test]
    fn test_resolve_missing_directory_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(SourceResolver::resolve_in(DocumentKind::Readme, &missing).is_none());
        assert!(SourceResolver::resolve(DocumentKind::Readme, &missing, Some(&missing)).is_empty());
    }

    #[test]
    fn test_resolve_searches_root_then_secondary() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir(&docs).unwrap();
        fs::write(dir.path().join("CHANGELOG.md"), "root").unwrap();
        fs::write(docs.join("CHANGELOG.md"), "docs").unwrap();
        fs::create_dir(dir.path().join("README")).unwrap();

        let found = SourceResolver::resolve(DocumentKind::Changelog, dir.path(), Some(&docs));
        assert_eq!(found.len(), 2);
        assert!(found[0].starts_with(dir.path()));
        assert!(found[1].starts_with(&docs));

        // Directories never match
        assert!(SourceResolver::resolve_in(DocumentKind::Readme, dir.path()).is_none());
    }

    #[test]
    fn test_candidates_skip_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("UPGRADE.md"), "  \n").unwrap();
        fs::write(dir.path().join("README.md"), "# Hello\n").unwrap();

        let map = SourceResolver::candidate_map(dir.path(), None);
        assert!(!map.contains_key(&DocumentKind::Upgrade));
        let readme = &map[&DocumentKind::Readme][0];
        assert_eq!(readme.path(), "README.md");
        assert_eq!(readme.source(), DocumentSource::Local);
        assert_eq!(readme.doc_kind(), Some(DocumentKind::Readme));
    }

    #[test]
    fn test_collect_folder_items() {
        let dir = tempfile::tempdir().unwrap();
        let articles = dir.path().join("docs").join("articles");
        fs::create_dir_all(articles.join("nested")).unwrap();
        fs::write(articles.join("b.md"), "# Second Guide\n").unwrap();
        fs::write(articles.join("a.md"), "no heading").unwrap();
        fs::write(articles.join("nested").join("c.md"), "# Third\n").unwrap();
        fs::write(articles.join(".hidden.md"), "# Hidden\n").unwrap();

        let items = collect_folder_items(
            dir.path(),
            &["docs/articles".to_string(), "missing".to_string()],
            ItemKind::SupplementalDoc,
        );
        let titles: Vec<&str> = items.iter().map(|i| i.title()).collect();
        assert_eq!(titles, vec!["a", "Second Guide", "Third"]);
        assert_eq!(items[2].path(), "docs/articles/nested/c.md");
        assert!(items.iter().all(|i| i.kind() == ItemKind::SupplementalDoc));
    }

    #[test]
    fn test_origin_url_reads_git_remote() {
        let dir = tempfile::tempdir().unwrap();
        let repo = git2::Repository::init(dir.path()).unwrap();
        repo.remote("origin", "https://github.com/owner/name.git")
            .unwrap();

        let url = origin_url(dir.path()).unwrap();
        assert_eq!(url.as_deref(), Some("https://github.com/owner/name.git"));

        let root = project_root(dir.path()).unwrap();
        assert_eq!(root, dir.path().canonicalize().unwrap());
    }
}
