//! Document selection
//!
//! This module decides which document variants to surface:
//! - Merging local and remote candidates under a merge mode
//! - Collapsing near-identical copies
//! - Reporting every decision as a structured note

mod collect;
mod planner;

pub use collect::DocumentCollector;
pub use planner::SelectionPlanner;

use crate::source::{DocumentItem, DocumentKind, DocumentSource, ItemKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Merge preference between local and remote documents
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum MergeMode {
    /// Local wins; remote only as a fallback or when it differs
    #[default]
    PreferLocal,
    /// Remote wins; local only as a fallback or when it differs
    PreferRemote,
    /// Show both unless they are identical
    All,
}

impl std::fmt::Display for MergeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeMode::PreferLocal => write!(f, "prefer-local"),
            MergeMode::PreferRemote => write!(f, "prefer-remote"),
            MergeMode::All => write!(f, "all"),
        }
    }
}

/// Per-kind inclusion flags; `None` means "not specified by the caller"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFlags {
    pub readme: Option<bool>,
    pub changelog: Option<bool>,
    pub license: Option<bool>,
    pub upgrade: Option<bool>,
    pub introduction: Option<bool>,
}

impl DocumentFlags {
    /// Flag for a kind
    pub fn get(&self, kind: DocumentKind) -> Option<bool> {
        match kind {
            DocumentKind::Readme => self.readme,
            DocumentKind::Changelog => self.changelog,
            DocumentKind::License => self.license,
            DocumentKind::Upgrade => self.upgrade,
            DocumentKind::Introduction => self.introduction,
        }
    }

    /// Set the flag for a kind
    pub fn set(&mut self, kind: DocumentKind, value: bool) {
        let slot = match kind {
            DocumentKind::Readme => &mut self.readme,
            DocumentKind::Changelog => &mut self.changelog,
            DocumentKind::License => &mut self.license,
            DocumentKind::Upgrade => &mut self.upgrade,
            DocumentKind::Introduction => &mut self.introduction,
        };
        *slot = Some(value);
    }

    /// Whether the caller explicitly asked for at least one kind
    pub fn any_requested(&self) -> bool {
        DocumentKind::ALL.iter().any(|k| self.get(*k) == Some(true))
    }
}

/// Input of one selection run
#[derive(Debug, Clone, Default)]
pub struct SelectionRequest {
    /// Project root searched first
    pub root: PathBuf,
    /// Secondary folder searched after the root
    pub secondary: Option<PathBuf>,
    /// A remote provider is configured and reachable
    pub remote_available: bool,
    /// Remote documents are fetched during this run
    pub fetch_remote: bool,
    /// Local documents are wanted even when the remote is available
    pub include_local: bool,
    /// Merge preference
    pub mode: MergeMode,
    /// Keep near-identical copies
    pub show_duplicates: bool,
    /// Per-kind inclusion flags
    pub flags: DocumentFlags,
    /// Configured introduction text
    pub introduction: Option<String>,
    /// Non-standard items appended after the standard kinds
    pub supplemental: Vec<DocumentItem>,
}

impl SelectionRequest {
    /// Create a request for a local project with default settings
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include_local: true,
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: MergeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_show_duplicates(mut self, show: bool) -> Self {
        self.show_duplicates = show;
        self
    }

    /// Mark a remote provider as available and fetched for this run
    pub fn with_remote(mut self, fetch: bool) -> Self {
        self.remote_available = true;
        self.fetch_remote = fetch;
        self
    }

    pub fn with_secondary(mut self, secondary: impl Into<PathBuf>) -> Self {
        self.secondary = Some(secondary.into());
        self
    }

    pub fn with_introduction(mut self, text: &str) -> Self {
        self.introduction = Some(text.to_string());
        self
    }

    /// Configured introduction as a local candidate
    pub fn introduction_item(&self) -> Option<DocumentItem> {
        self.introduction
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .map(|text| {
                DocumentItem::for_kind(
                    DocumentKind::Introduction,
                    text,
                    "",
                    "",
                    DocumentSource::Local,
                )
            })
    }
}

/// A planner decision, reported as data for the caller to display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanNote {
    /// Stable key, e.g. "readme:hidden-remote"
    pub key: String,
    /// Human-readable message
    pub message: String,
}

impl PlanNote {
    /// Create a note scoped to a document kind
    pub fn new(kind: DocumentKind, event: &str, message: impl Into<String>) -> Self {
        Self {
            key: format!("{}:{}", kind, event),
            message: message.into(),
        }
    }

    /// Create a note not tied to a document kind
    pub fn general(event: &str, message: impl Into<String>) -> Self {
        Self {
            key: event.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for PlanNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.key, self.message)
    }
}

/// Output of one selection run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionResult {
    /// Selected items in presentation order
    pub items: Vec<DocumentItem>,
    /// At least one item came from the remote
    pub used_remote: bool,
    /// Decisions taken while planning
    pub notes: Vec<PlanNote>,
    /// Requested kinds that ended without any item
    pub missing: Vec<DocumentKind>,
}

impl SelectionResult {
    /// Items selected for one kind
    pub fn items_of(&self, kind: DocumentKind) -> impl Iterator<Item = &DocumentItem> {
        self.items
            .iter()
            .filter(move |item| item.doc_kind() == Some(kind))
    }

    /// Number of items that belong to standard-kind resolution
    fn standard_len(&self) -> usize {
        self.items
            .iter()
            .take_while(|item| item.kind() == ItemKind::Standard)
            .count()
    }

    /// Add an item fetched after planning for a missing kind
    ///
    /// The item lands after the standard items and before supplemental ones.
    pub fn insert_backfill(&mut self, item: DocumentItem) -> bool {
        let Some(kind) = item.doc_kind() else {
            return false;
        };
        if !item.has_content() || !self.missing.contains(&kind) {
            return false;
        }

        self.missing.retain(|k| *k != kind);
        self.used_remote |= item.source() == DocumentSource::Remote;
        self.notes.push(PlanNote::new(
            kind,
            "backfilled",
            format!("{} not found earlier, backfilled from {}", kind, item.path()),
        ));
        let at = self.standard_len();
        self.items.insert(at, item);
        true
    }
}
