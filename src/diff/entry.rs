//! Canonical entry and delta types produced by the diff engine.
//!
//! `Entry` is what a [`super::cursor::DiffCursor`] hands back for a single
//! path at one version of a tree. `Delta` is what the merge-join driver
//! (`super::driver`) emits once two entries (or the absence of one) have
//! been classified.

use std::path::PathBuf;

use crate::objects::tree::FileMode;
use crate::objects::Oid;

/// Which ordered source an [`Entry`] was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A committed tree, recursed eagerly (already a flat sequence).
    Tree,
    /// The staging area, also a flat sequence.
    Index,
    /// The live filesystem, walked directory by directory.
    Workdir,
}

/// A single path at one version of a tree.
///
/// Mirrors the fields spec'd for the engine's input entry: path, mode,
/// size, content identity (possibly zero, meaning "not yet hashed"), and
/// stat metadata. The two extended flags (`INTENT_TO_ADD`, `SKIP_WORKTREE`)
/// are only ever set by index-backed entries; tree and workdir entries
/// always report them `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Path relative to the repository root, `/`-separated.
    pub path: PathBuf,
    /// The entry's file-mode bits.
    pub mode: FileMode,
    /// Size in bytes. Zero for directories and not-yet-stat'd entries.
    pub size: u64,
    /// Content identity. `Oid::zero()` means "not yet hashed".
    pub oid: Oid,
    pub ctime: u64,
    pub mtime: u64,
    pub dev: u32,
    pub ino: u32,
    pub uid: u32,
    pub gid: u32,
    /// `git add -N`: staged, content not yet captured. Index-only.
    pub intent_to_add: bool,
    /// Worktree content ignored for this entry (sparse checkouts). Index-only.
    pub skip_worktree: bool,
}

impl Entry {
    /// Builds an entry carrying only path/mode/size/oid, the common case
    /// for tree and workdir sources where stat metadata is either absent
    /// (trees) or gathered separately.
    pub fn new(path: PathBuf, mode: FileMode, size: u64, oid: Oid) -> Self {
        Entry {
            path,
            mode,
            size,
            oid,
            ctime: 0,
            mtime: 0,
            dev: 0,
            ino: 0,
            uid: 0,
            gid: 0,
            intent_to_add: false,
            skip_worktree: false,
        }
    }

    /// Returns true if this entry is a gitlink (submodule) record.
    pub fn is_gitlink(&self) -> bool {
        matches!(self.mode, FileMode::Submodule)
    }
}

/// One side of a [`Delta`].
///
/// `valid_oid` records whether `oid` is trustworthy content identity (a
/// real hash) as opposed to a placeholder for "absent" or "not yet known".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSide {
    pub path: PathBuf,
    pub mode: FileMode,
    pub size: u64,
    pub oid: Oid,
    pub valid_oid: bool,
}

impl FileSide {
    /// A side built from a real entry.
    pub fn present(entry: &Entry, valid_oid: bool) -> Self {
        FileSide {
            path: entry.path.clone(),
            mode: entry.mode,
            size: entry.size,
            oid: entry.oid,
            valid_oid,
        }
    }

    /// A side built from a real entry, with its oid overridden (the
    /// hash-on-demand and submodule substitution cases).
    pub fn present_with_oid(entry: &Entry, oid: Oid, valid_oid: bool) -> Self {
        FileSide {
            path: entry.path.clone(),
            mode: entry.mode,
            size: entry.size,
            oid,
            valid_oid,
        }
    }

    /// The side of a one-sided delta that has no counterpart (e.g. the
    /// `new` side of a DELETED delta). Carries the surviving side's path
    /// and mode so `old.path == new.path` holds at construction, per the
    /// data model invariant, but no content identity.
    pub fn absent(path: PathBuf, mode: FileMode) -> Self {
        FileSide {
            path,
            mode,
            size: 0,
            oid: Oid::zero(),
            valid_oid: false,
        }
    }
}

/// The kind of change a [`Delta`] describes.
///
/// Declaration order is the tie-break order spec'd for sorting
/// `(old.path, status)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeltaStatus {
    Unmodified,
    Added,
    Deleted,
    Modified,
    TypeChange,
    Untracked,
    Ignored,
}

/// One record in the diff output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
    pub status: DeltaStatus,
    pub old: FileSide,
    pub new: FileSide,
}

impl Delta {
    pub fn new(status: DeltaStatus, old: FileSide, new: FileSide) -> Self {
        Delta { status, old, new }
    }

    /// A delta for a path present only in `old`.
    pub fn deleted(old: &Entry) -> Self {
        Delta {
            status: DeltaStatus::Deleted,
            old: FileSide::present(old, true),
            new: FileSide::absent(old.path.clone(), old.mode),
        }
    }

    /// A delta for a path present only in `new`, classified as ADDED,
    /// UNTRACKED or IGNORED by the caller.
    pub fn one_sided_new(status: DeltaStatus, new: &Entry, valid_oid: bool) -> Self {
        Delta {
            status,
            old: FileSide::absent(new.path.clone(), new.mode),
            new: FileSide::present(new, valid_oid),
        }
    }

    /// Swaps old/new (the `REVERSE` option), flipping ADDED<->DELETED.
    pub fn reversed(self) -> Self {
        let status = match self.status {
            DeltaStatus::Added => DeltaStatus::Deleted,
            DeltaStatus::Deleted => DeltaStatus::Added,
            other => other,
        };
        Delta {
            status,
            old: self.new,
            new: self.old,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, mode: FileMode) -> Entry {
        Entry::new(PathBuf::from(path), mode, 4, Oid::zero())
    }

    #[test]
    fn test_delta_status_order_matches_table() {
        let mut statuses = vec![
            DeltaStatus::Ignored,
            DeltaStatus::Unmodified,
            DeltaStatus::TypeChange,
            DeltaStatus::Added,
        ];
        statuses.sort();
        assert_eq!(
            statuses,
            vec![
                DeltaStatus::Unmodified,
                DeltaStatus::Added,
                DeltaStatus::TypeChange,
                DeltaStatus::Ignored,
            ]
        );
    }

    #[test]
    fn test_deleted_delta_paths_match() {
        let e = entry("a/b.txt", FileMode::Regular);
        let delta = Delta::deleted(&e);
        assert_eq!(delta.status, DeltaStatus::Deleted);
        assert_eq!(delta.old.path, delta.new.path);
        assert!(!delta.new.valid_oid);
    }

    #[test]
    fn test_reversed_swaps_added_deleted() {
        let e = entry("x.txt", FileMode::Regular);
        let added = Delta::one_sided_new(DeltaStatus::Added, &e, true);
        let reversed = added.reversed();
        assert_eq!(reversed.status, DeltaStatus::Deleted);
        assert_eq!(reversed.old.path, reversed.new.path);
    }
}
