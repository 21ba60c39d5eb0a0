//! Document items and the kinds the planner selects between

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Category of a standard or optional document
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Readme,
    Changelog,
    License,
    Upgrade,
    Introduction,
}

impl DocumentKind {
    /// Kinds that are always requested unless the caller narrows the selection
    pub const STANDARD: [DocumentKind; 3] = [
        DocumentKind::Readme,
        DocumentKind::Changelog,
        DocumentKind::License,
    ];

    /// Every kind, in presentation order
    pub const ALL: [DocumentKind; 5] = [
        DocumentKind::Introduction,
        DocumentKind::Readme,
        DocumentKind::Changelog,
        DocumentKind::Upgrade,
        DocumentKind::License,
    ];

    /// Canonical file name stem used to locate the document
    pub fn stem(&self) -> &'static str {
        match self {
            DocumentKind::Readme => "README",
            DocumentKind::Changelog => "CHANGELOG",
            DocumentKind::License => "LICENSE",
            DocumentKind::Upgrade => "UPGRADE",
            DocumentKind::Introduction => "INTRODUCTION",
        }
    }

    /// Display title for a selected item of this kind
    pub fn title(&self) -> &'static str {
        match self {
            DocumentKind::Readme => "Readme",
            DocumentKind::Changelog => "Changelog",
            DocumentKind::License => "License",
            DocumentKind::Upgrade => "Upgrade",
            DocumentKind::Introduction => "Introduction",
        }
    }

    pub fn is_standard(&self) -> bool {
        Self::STANDARD.contains(self)
    }

    /// Check whether a file name belongs to this kind (case-insensitive stem prefix)
    pub fn matches_file_name(&self, file_name: &str) -> bool {
        let stem = self.stem();
        file_name
            .get(..stem.len())
            .map(|prefix| prefix.eq_ignore_ascii_case(stem))
            .unwrap_or(false)
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Readme => write!(f, "readme"),
            DocumentKind::Changelog => write!(f, "changelog"),
            DocumentKind::License => write!(f, "license"),
            DocumentKind::Upgrade => write!(f, "upgrade"),
            DocumentKind::Introduction => write!(f, "introduction"),
        }
    }
}

/// How an item is presented by rendering sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Standard,
    Script,
    SupplementalDoc,
    File,
}

/// Where an item was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentSource {
    Local,
    Remote,
}

impl std::fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentSource::Local => write!(f, "local"),
            DocumentSource::Remote => write!(f, "remote"),
        }
    }
}

/// A located document, either a candidate or a selected result item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentItem {
    title: String,
    kind: ItemKind,
    content: String,
    file_name: String,
    path: String,
    source: DocumentSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_kind: Option<DocumentKind>,
}

impl DocumentItem {
    /// Create an item of an arbitrary presentation kind
    pub fn new(
        title: &str,
        kind: ItemKind,
        content: &str,
        file_name: &str,
        path: &str,
        source: DocumentSource,
    ) -> Self {
        Self {
            title: title.to_string(),
            kind,
            content: content.to_string(),
            file_name: file_name.to_string(),
            path: path.to_string(),
            source,
            doc_kind: None,
        }
    }

    /// Create a standard item for a document kind
    pub fn for_kind(
        doc_kind: DocumentKind,
        content: &str,
        file_name: &str,
        path: &str,
        source: DocumentSource,
    ) -> Self {
        Self {
            doc_kind: Some(doc_kind),
            ..Self::new(
                doc_kind.title(),
                ItemKind::Standard,
                content,
                file_name,
                path,
                source,
            )
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn source(&self) -> DocumentSource {
        self.source
    }

    pub fn doc_kind(&self) -> Option<DocumentKind> {
        self.doc_kind
    }

    /// Items without visible text never enter a result set
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }

    /// Content after line-ending and trailing-whitespace normalization
    pub fn normalized_content(&self) -> String {
        normalize_content(&self.content)
    }

    /// Hash of the normalized content, equal for copies that differ only
    /// in line endings or trailing whitespace
    pub fn content_key(&self) -> String {
        content_hash(&self.normalized_content())
    }

    /// Check normalized content equality with another item
    pub fn same_content(&self, other: &DocumentItem) -> bool {
        self.normalized_content() == other.normalized_content()
    }
}

/// Unify line endings, trim trailing whitespace per line and drop trailing blank lines
pub fn normalize_content(content: &str) -> String {
    let unified = content.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<&str> = unified.lines().map(str::trim_end).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// Compute a stable hash for content
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
