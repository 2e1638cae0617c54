//! `DiffList`: the owned, sorted collection of deltas produced by a single
//! diff run.
//!
//! The original C implementation this engine's design is modeled on
//! refcounted this structure by hand and kept a separate path-interning
//! pool to avoid cloning path strings into every delta. In ordinary Rust,
//! `DiffList` is just an owned struct with normal move semantics and each
//! delta keeps its own `PathBuf` — the interning pool would only earn its
//! complexity back at a scale this crate doesn't operate at, so it's left
//! out (noted in the grounding ledger rather than built and unused).

use super::entry::{Delta, DeltaStatus, SourceKind};
use super::options::{Capabilities, DiffOptions};
use super::sort::CasePolicy;

/// The result of one `tree_to_tree` / `index_to_tree` / `workdir_to_index`
/// / `workdir_to_tree` call: every delta the merge-join driver emitted,
/// in sorted order, plus the options and capabilities it was produced
/// under.
#[derive(Debug, Clone)]
pub struct DiffList {
    deltas: Vec<Delta>,
    options: DiffOptions,
    capabilities: Capabilities,
    case_policy: CasePolicy,
    old_kind: SourceKind,
    new_kind: SourceKind,
}

impl DiffList {
    pub(crate) fn new(
        options: DiffOptions,
        capabilities: Capabilities,
        case_policy: CasePolicy,
        old_kind: SourceKind,
        new_kind: SourceKind,
    ) -> Self {
        DiffList {
            deltas: Vec::new(),
            options,
            capabilities,
            case_policy,
            old_kind,
            new_kind,
        }
    }

    pub(crate) fn push(&mut self, delta: Delta) {
        self.deltas.push(delta);
    }

    /// The last delta pushed, if any. Used by the driver to rewrite a
    /// just-emitted ADDED/DELETED into a TYPECHANGE once it sees the
    /// opposite side's entry falls inside that path's former subtree.
    pub(crate) fn last_mut(&mut self) -> Option<&mut Delta> {
        self.deltas.last_mut()
    }

    pub fn deltas(&self) -> &[Delta] {
        &self.deltas
    }

    pub fn into_deltas(self) -> Vec<Delta> {
        self.deltas
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Delta> {
        self.deltas.iter()
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn case_policy(&self) -> CasePolicy {
        self.case_policy
    }

    pub fn old_kind(&self) -> SourceKind {
        self.old_kind
    }

    pub fn new_kind(&self) -> SourceKind {
        self.new_kind
    }

    /// Finalizes the list: applies the REVERSE option, drops statuses the
    /// caller didn't ask to see (UNMODIFIED/IGNORED/UNTRACKED unless
    /// explicitly included), and re-sorts by `(path, status)`.
    pub(crate) fn finish(mut self) -> Self {
        if self.options.is_reverse() {
            self.deltas = self.deltas.into_iter().map(Delta::reversed).collect();
        }

        let opts = &self.options;
        self.deltas.retain(|d| match d.status {
            DeltaStatus::Unmodified => opts.wants_unmodified(),
            DeltaStatus::Ignored => opts.wants_ignored(),
            DeltaStatus::Untracked => opts.wants_untracked(),
            _ => true,
        });

        self.deltas
            .sort_by(|a, b| a.old.path.cmp(&b.old.path).then(a.status.cmp(&b.status)));

        self
    }
}

impl IntoIterator for DiffList {
    type Item = Delta;
    type IntoIter = std::vec::IntoIter<Delta>;

    fn into_iter(self) -> Self::IntoIter {
        self.deltas.into_iter()
    }
}

impl<'a> IntoIterator for &'a DiffList {
    type Item = &'a Delta;
    type IntoIter = std::slice::Iter<'a, Delta>;

    fn into_iter(self) -> Self::IntoIter {
        self.deltas.iter()
    }
}
