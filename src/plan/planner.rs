//! Merge and deduplication policy for standard documents

use super::{MergeMode, PlanNote, SelectionRequest, SelectionResult};
use crate::source::{CandidateMap, DocumentItem, DocumentKind, DocumentSource};
use similar::{ChangeTag, TextDiff};
use std::collections::HashSet;

/// Decides which local and remote candidates become result items
///
/// Planning is a pure function of the request and the candidate maps.
#[derive(Debug, Default, Clone, Copy)]
pub struct SelectionPlanner;

impl SelectionPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Plan the document set for one build
    pub fn plan(
        &self,
        request: &SelectionRequest,
        local: &CandidateMap,
        remote: &CandidateMap,
    ) -> SelectionResult {
        let mut result = SelectionResult::default();

        for kind in self.requested_kinds(request, local, remote) {
            let mut locals: Vec<DocumentItem> = Vec::new();
            if kind == DocumentKind::Introduction {
                locals.extend(request.introduction_item());
            }
            locals.extend(local.get(&kind).into_iter().flatten().cloned());
            let remotes: Vec<DocumentItem> =
                remote.get(&kind).into_iter().flatten().cloned().collect();

            let locals = self.dedup(kind, DocumentSource::Local, locals, request, &mut result.notes);
            let remotes =
                self.dedup(kind, DocumentSource::Remote, remotes, request, &mut result.notes);

            let local_pick = (request.include_local || !request.remote_available)
                .then(|| locals.into_iter().next())
                .flatten();
            let remote_pick = request
                .fetch_remote
                .then(|| remotes.into_iter().next())
                .flatten();

            let selected = self.merge(kind, request, local_pick, remote_pick, &mut result.notes);
            if selected.is_empty() {
                result.missing.push(kind);
            }
            result.used_remote |= selected
                .iter()
                .any(|item| item.source() == DocumentSource::Remote);
            result.items.extend(selected);
        }

        for item in &request.supplemental {
            if item.has_content() {
                result.used_remote |= item.source() == DocumentSource::Remote;
                result.items.push(item.clone());
            }
        }

        result
    }

    /// Kinds to resolve, in presentation order
    ///
    /// With no kind explicitly requested, the standard kinds are used plus
    /// introduction and upgrade when content for them exists.
    pub fn requested_kinds(
        &self,
        request: &SelectionRequest,
        local: &CandidateMap,
        remote: &CandidateMap,
    ) -> Vec<DocumentKind> {
        let flags = &request.flags;

        if flags.any_requested() {
            return DocumentKind::ALL
                .into_iter()
                .filter(|kind| flags.get(*kind) == Some(true))
                .collect();
        }

        let has_candidates = |kind: DocumentKind| {
            local.get(&kind).is_some_and(|items| !items.is_empty())
                || remote.get(&kind).is_some_and(|items| !items.is_empty())
        };

        DocumentKind::ALL
            .into_iter()
            .filter(|kind| flags.get(*kind) != Some(false))
            .filter(|kind| match kind {
                DocumentKind::Introduction => {
                    request.introduction_item().is_some() || has_candidates(*kind)
                }
                DocumentKind::Upgrade => has_candidates(*kind),
                _ => true,
            })
            .collect()
    }

    /// Drop empty candidates and collapse identical copies within one source
    fn dedup(
        &self,
        kind: DocumentKind,
        source: DocumentSource,
        candidates: Vec<DocumentItem>,
        request: &SelectionRequest,
        notes: &mut Vec<PlanNote>,
    ) -> Vec<DocumentItem> {
        let candidates: Vec<DocumentItem> =
            candidates.into_iter().filter(|c| c.has_content()).collect();

        if request.show_duplicates || candidates.len() < 2 {
            return candidates;
        }

        let before = candidates.len();
        let mut seen: HashSet<String> = HashSet::with_capacity(before);
        let mut kept = Vec::with_capacity(before);

        for candidate in candidates {
            if seen.insert(candidate.content_key()) {
                kept.push(candidate);
            }
        }

        let removed = before - kept.len();
        if removed > 0 {
            notes.push(PlanNote::new(
                kind,
                &format!("dedup-{}", source),
                format!(
                    "removed {} duplicate {} {} candidate(s)",
                    removed, source, kind
                ),
            ));
        }

        kept
    }

    /// Apply the merge mode to the picks of one kind
    fn merge(
        &self,
        kind: DocumentKind,
        request: &SelectionRequest,
        local: Option<DocumentItem>,
        remote: Option<DocumentItem>,
        notes: &mut Vec<PlanNote>,
    ) -> Vec<DocumentItem> {
        let (local, remote) = match (local, remote) {
            (None, None) => return Vec::new(),
            (Some(local), None) => {
                if request.mode == MergeMode::PreferRemote && request.fetch_remote {
                    notes.push(PlanNote::new(
                        kind,
                        "fallback-local",
                        format!("remote {} missing, using local", kind),
                    ));
                }
                return vec![local];
            }
            (None, Some(remote)) => {
                if request.mode != MergeMode::PreferRemote {
                    notes.push(PlanNote::new(
                        kind,
                        "fallback-remote",
                        format!("local {} missing, using remote", kind),
                    ));
                } else {
                    notes.push(PlanNote::new(
                        kind,
                        "fallback-remote",
                        format!("using remote {} (fallback, no local copy)", kind),
                    ));
                }
                return vec![remote];
            }
            (Some(local), Some(remote)) => (local, remote),
        };

        let collapse = !request.show_duplicates && local.same_content(&remote);

        match request.mode {
            MergeMode::PreferLocal => {
                if collapse {
                    notes.push(PlanNote::new(
                        kind,
                        "hidden-remote",
                        format!("hiding remote {}, identical to local", kind),
                    ));
                    vec![local]
                } else {
                    notes.push(differs_note(kind, &local, &remote));
                    vec![local, remote]
                }
            }
            MergeMode::PreferRemote => {
                if collapse {
                    notes.push(PlanNote::new(
                        kind,
                        "hidden-local",
                        format!("hiding local {}, identical to remote", kind),
                    ));
                    vec![remote]
                } else {
                    notes.push(differs_note(kind, &local, &remote));
                    vec![remote, local]
                }
            }
            MergeMode::All => {
                if collapse {
                    notes.push(PlanNote::new(
                        kind,
                        "collapsed",
                        format!("local and remote {} are identical, keeping local", kind),
                    ));
                    vec![local]
                } else {
                    notes.push(differs_note(kind, &local, &remote));
                    vec![local, remote]
                }
            }
        }
    }
}

fn differs_note(kind: DocumentKind, local: &DocumentItem, remote: &DocumentItem) -> PlanNote {
    let local_text = local.normalized_content();
    let remote_text = remote.normalized_content();
    let changed = TextDiff::from_lines(&local_text, &remote_text)
        .iter_all_changes()
        .filter(|change| change.tag() != ChangeTag::Equal)
        .count();

    PlanNote::new(
        kind,
        "differs",
        format!(
            "local and remote {} differ ({} changed line(s)), showing both",
            kind, changed
        ),
    )
}
