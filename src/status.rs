//! Git status implementation.
//!
//! Status is the diff engine's other demonstrative client (alongside
//! [`crate::stash`]): working-tree status is just `index_to_tree` (staged
//! changes) and `workdir_to_index` (unstaged changes) collapsed into one
//! [`FileStatus`] per path, rather than a bespoke three-way comparison.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::diff::{self, DeltaStatus, DiffOptions};
use crate::error::{Error, Result};
use crate::objects::{LooseObjectStore, ObjectType, Oid, Tree};
use crate::repository::Repository;

/// The status of a file in the working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// File is new and not tracked by Git.
    Untracked,
    /// File has been added to the index (staged for commit).
    Added,
    /// File has been modified in the working tree compared to the index.
    Modified,
    /// File has been deleted from the working tree.
    Deleted,
    /// File has been modified and staged.
    StagedModified,
    /// File has been deleted and staged.
    StagedDeleted,
}

impl FileStatus {
    /// Returns true if the file is staged (in index but different from HEAD).
    pub fn is_staged(&self) -> bool {
        matches!(
            self,
            FileStatus::Added | FileStatus::StagedModified | FileStatus::StagedDeleted
        )
    }

    /// Returns true if the file has unstaged changes.
    pub fn is_unstaged(&self) -> bool {
        matches!(
            self,
            FileStatus::Modified | FileStatus::Deleted | FileStatus::Untracked
        )
    }
}

/// A status entry representing a file and its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// The path of the file relative to the repository root.
    path: PathBuf,
    /// The status of the file.
    status: FileStatus,
}

impl StatusEntry {
    /// Creates a new StatusEntry.
    pub fn new(path: PathBuf, status: FileStatus) -> Self {
        Self { path, status }
    }

    /// Returns the path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the status of the file.
    pub fn status(&self) -> FileStatus {
        self.status
    }
}

/// Flattens a tree into a map of path -> Oid.
///
/// This recursively walks the tree and collects all blob entries
/// with their full paths.
pub fn flatten_tree(
    store: &LooseObjectStore,
    tree_oid: &Oid,
    prefix: &Path,
    result: &mut BTreeMap<PathBuf, Oid>,
) -> Result<()> {
    let raw = store.read(tree_oid)?;

    if raw.object_type != ObjectType::Tree {
        return Err(Error::TypeMismatch {
            expected: "tree",
            actual: raw.object_type.as_str(),
        });
    }

    let tree = Tree::parse(raw)?;

    for entry in tree.iter() {
        let entry_path = prefix.join(entry.name());

        if entry.is_directory() {
            // Recursively flatten subdirectory
            flatten_tree(store, entry.oid(), &entry_path, result)?;
        } else {
            // Add blob entry
            result.insert(entry_path, *entry.oid());
        }
    }

    Ok(())
}

/// Computes the status of the working tree.
///
/// Runs two diffs — `index_to_tree(HEAD, index)` for staged changes and
/// `workdir_to_index(index, workdir)` for unstaged ones, including
/// untracked files recursively — and collapses the two deltas that can
/// exist for a given path into the single [`FileStatus`] git's
/// short-status display would show for it.
///
/// # Arguments
///
/// * `repo` - The repository to compute status for.
///
/// # Returns
///
/// A vector of `StatusEntry` representing all files with changes.
pub fn compute_status(repo: &Repository) -> Result<Vec<StatusEntry>> {
    let head_tree_oid = repo.head().ok().and_then(|head| {
        repo.commit(&head.oid().to_hex())
            .ok()
            .map(|commit| *commit.tree())
    });

    let staged = diff::index_to_tree(repo, head_tree_oid.as_ref(), DiffOptions::new())?;
    let unstaged = diff::workdir_to_index(
        repo,
        DiffOptions::new()
            .include_untracked(true)
            .recurse_untracked_dirs(true),
    )?;

    let staged_by_path: BTreeMap<PathBuf, DeltaStatus> = staged
        .iter()
        .map(|d| (d.new.path.clone(), d.status))
        .collect();
    let unstaged_by_path: BTreeMap<PathBuf, DeltaStatus> = unstaged
        .iter()
        .map(|d| (d.new.path.clone(), d.status))
        .collect();

    let mut all_paths: BTreeSet<PathBuf> = BTreeSet::new();
    all_paths.extend(staged_by_path.keys().cloned());
    all_paths.extend(unstaged_by_path.keys().cloned());

    let mut entries = Vec::new();
    for path in all_paths {
        let staged_status = staged_by_path.get(&path).copied();
        let unstaged_status = unstaged_by_path.get(&path).copied();
        if let Some(status) = classify(staged_status, unstaged_status) {
            entries.push(StatusEntry::new(path, status));
        }
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

/// Collapses a path's staged delta (HEAD vs index) and unstaged delta
/// (index vs workdir) into one [`FileStatus`]. `None` means "no delta of
/// that kind was produced", i.e. the two sides agree.
fn classify(staged: Option<DeltaStatus>, unstaged: Option<DeltaStatus>) -> Option<FileStatus> {
    use DeltaStatus::*;

    match staged {
        // In HEAD, not in the index: staged for removal regardless of what
        // the working tree happens to hold at that path.
        Some(Deleted) => Some(FileStatus::StagedDeleted),

        // Not in HEAD, staged: report Added, unless the working copy was
        // then removed, which takes precedence the same way an ordinary
        // unstaged delete does below.
        Some(Added) => {
            if unstaged == Some(Deleted) {
                Some(FileStatus::Deleted)
            } else {
                Some(FileStatus::Added)
            }
        }

        // Present (and differing) on both sides of the staged diff.
        Some(Modified) | Some(TypeChange) => match unstaged {
            Some(Deleted) => Some(FileStatus::Deleted),
            Some(Modified) | Some(TypeChange) => Some(FileStatus::Modified),
            _ => Some(FileStatus::StagedModified),
        },

        // Index matches HEAD at this path (or the path doesn't appear in
        // the staged diff at all): whatever status applies is purely
        // unstaged.
        _ => match unstaged {
            Some(Untracked) => Some(FileStatus::Untracked),
            Some(Deleted) => Some(FileStatus::Deleted),
            Some(Modified) | Some(TypeChange) => Some(FileStatus::Modified),
            _ => None,
        },
    }
}
