//! Document collection for one site or module build
//!
//! Gathers local and remote candidates, runs the planner and backfills
//! kinds that ended without any item.

use super::{PlanNote, SelectionPlanner, SelectionRequest, SelectionResult};
use crate::remote::{RemoteFetcher, RepositoryClient};
use crate::source::{collect_folder_items, DocumentKind, ItemKind, SourceResolver};
use std::time::Duration;

/// Orchestrates candidate gathering around the pure planner
pub struct DocumentCollector<'a> {
    client: Option<&'a dyn RepositoryClient>,
    timeout: Duration,
    branch: Option<String>,
    remote_secondary: Option<String>,
    doc_folders: Vec<String>,
    script_folders: Vec<String>,
}

impl<'a> DocumentCollector<'a> {
    /// Create a collector without a remote provider
    pub fn new() -> Self {
        Self {
            client: None,
            timeout: Duration::from_secs(15),
            branch: None,
            remote_secondary: None,
            doc_folders: Vec::new(),
            script_folders: Vec::new(),
        }
    }

    /// Use a remote provider bounded by a per-call timeout
    pub fn with_remote(mut self, client: &'a dyn RepositoryClient, timeout: Duration) -> Self {
        self.client = Some(client);
        self.timeout = timeout;
        self
    }

    /// Read remote documents from a fixed branch
    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch;
        self
    }

    /// Secondary directory searched in the remote repository
    pub fn with_remote_secondary(mut self, dir: Option<String>) -> Self {
        self.remote_secondary = dir;
        self
    }

    /// Folders of supplemental documents and scripts, relative to the root
    pub fn with_folders(mut self, docs: Vec<String>, scripts: Vec<String>) -> Self {
        self.doc_folders = docs;
        self.script_folders = scripts;
        self
    }

    /// Gather candidates and plan the document set
    ///
    /// `request.remote_available` is derived from the configured provider;
    /// `request.fetch_remote` decides whether remote candidates are fetched
    /// up front. Remote failures only ever produce notes.
    pub async fn collect(&self, request: &SelectionRequest) -> SelectionResult {
        let mut request = request.clone();
        let local = SourceResolver::candidate_map(&request.root, request.secondary.as_deref());
        tracing::debug!("Found local candidates for {} kind(s)", local.len());

        let mut notes: Vec<PlanNote> = Vec::new();
        let mut remote = Default::default();
        let mut branch: Option<String> = None;

        request.supplemental.extend(collect_folder_items(
            &request.root,
            &self.doc_folders,
            ItemKind::SupplementalDoc,
        ));
        request.supplemental.extend(collect_folder_items(
            &request.root,
            &self.script_folders,
            ItemKind::Script,
        ));

        let fetcher = self.client.map(|client| {
            RemoteFetcher::new(client, self.timeout).with_secondary(self.remote_secondary.as_deref())
        });

        request.remote_available = fetcher.is_some();

        if let Some(ref fetcher) = fetcher {
            if request.fetch_remote {
                let kinds: Vec<DocumentKind> = DocumentKind::ALL
                    .into_iter()
                    .filter(|k| *k != DocumentKind::Introduction)
                    .collect();
                let fetch = fetcher.fetch_all(self.branch.as_deref(), &kinds).await;
                notes.extend(fetch.notes);
                remote = fetch.candidates;
                branch = fetch.branch;

                // Failing to reach the remote at all makes local documents eligible again
                if branch.is_none() {
                    request.remote_available = false;
                }

                if let Some(ref branch) = branch {
                    for folder in &self.doc_folders {
                        request.supplemental.extend(
                            fetcher
                                .folder_items(folder, branch, ItemKind::SupplementalDoc)
                                .await,
                        );
                    }
                }
            }
        }

        let mut result = SelectionPlanner::new().plan(&request, &local, &remote);
        notes.append(&mut result.notes);
        result.notes = notes;

        if let Some(ref fetcher) = fetcher {
            self.backfill(fetcher, branch, &mut result).await;
        }

        for note in &result.notes {
            tracing::debug!("{}", note);
        }

        result
    }

    async fn backfill(
        &self,
        fetcher: &RemoteFetcher<'_>,
        branch: Option<String>,
        result: &mut SelectionResult,
    ) {
        let missing: Vec<DocumentKind> = result
            .missing
            .iter()
            .copied()
            .filter(|k| *k != DocumentKind::Introduction)
            .collect();
        if missing.is_empty() {
            return;
        }

        let branch = match branch {
            Some(branch) => branch,
            None => match fetcher.branch(self.branch.as_deref()).await {
                Ok(branch) => branch,
                Err(e) => {
                    tracing::debug!("Skipping backfill: {}", e);
                    return;
                }
            },
        };

        for kind in missing {
            if let Some(item) = fetcher.backfill(kind, &branch).await {
                result.insert_backfill(item);
            }
        }
    }
}

impl Default for DocumentCollector<'_> {
    fn default() -> Self {
        Self::new()
    }
}
