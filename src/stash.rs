//! Stash: a demonstrative client of the diff engine.
//!
//! `Stash::save` walks `workdir_to_index` to see what changed since the
//! last commit, writes the index, untracked, and worktree states as three
//! synthetic trees, wraps them in commit objects, and records the result
//! under the `refs/stash` reflog. It never touches the working tree or
//! the index itself — resetting either back to a clean state afterwards
//! is checkout's job, and checkout is out of scope here (see
//! `repository`'s trimmed surface).

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::diff::{self, DeltaStatus, DiffOptions};
use crate::error::{Error, Result};
use crate::objects::tree::FileMode;
use crate::objects::{ObjectType, Oid};
use crate::reflog::{self, ReflogEntry};
use crate::repository::Repository;

const STASH_REF: &str = "refs/stash";

/// Which additional working-tree content a stash should capture.
#[derive(Debug, Clone, Copy, Default)]
pub struct StashFlags {
    include_untracked: bool,
    include_ignored: bool,
    keep_index: bool,
}

impl StashFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture untracked files in their own synthetic tree/commit.
    pub fn include_untracked(mut self, yes: bool) -> Self {
        self.include_untracked = yes;
        self
    }

    /// Also capture ignored files (implies `include_untracked`'s reach
    /// into untracked territory, per Git's own flag coupling).
    pub fn include_ignored(mut self, yes: bool) -> Self {
        self.include_ignored = yes;
        self
    }

    /// Reserved: real Git resets the index to HEAD after a successful
    /// stash unless this is set. Since this crate's stash never mutates
    /// the working tree or index (that's checkout's job, out of scope
    /// here), the flag is accepted for API parity but has no effect.
    pub fn keep_index(mut self, yes: bool) -> Self {
        self.keep_index = yes;
        self
    }

    fn wants_untracked(&self) -> bool {
        self.include_untracked || self.include_ignored
    }

    fn wants_ignored(&self) -> bool {
        self.include_ignored
    }
}

/// Namespace for the stash operations (`save`/`foreach`/`drop`), kept as
/// a unit struct rather than free functions to mirror how other
/// demonstrative-client surfaces in this crate group their entry points.
pub struct Stash;

fn signature(name: &str, email: &str, timestamp: i64) -> String {
    format!("{} <{}> {} +0000", name, email, timestamp)
}

fn format_commit(tree_oid: &Oid, parents: &[Oid], author: &str, committer: &str, message: &str) -> Vec<u8> {
    let mut content = String::new();
    content.push_str(&format!("tree {}\n", tree_oid.to_hex()));
    for parent in parents {
        content.push_str(&format!("parent {}\n", parent.to_hex()));
    }
    content.push_str(&format!("author {}\n", author));
    content.push_str(&format!("committer {}\n", committer));
    content.push('\n');
    content.push_str(message);
    content.into_bytes()
}

/// Reads, filters, and writes one working-tree file as a blob, returning
/// the mode it should be recorded with and the resulting oid.
fn store_workdir_blob(repo: &Repository, abs_path: &std::path::Path) -> Result<(FileMode, Oid)> {
    let metadata = std::fs::symlink_metadata(abs_path)?;

    if metadata.file_type().is_symlink() {
        let target = std::fs::read_link(abs_path)?;
        let bytes = target.to_string_lossy().into_owned().into_bytes();
        let oid = repo.object_store().write(ObjectType::Blob, &bytes)?;
        return Ok((FileMode::Symlink, oid));
    }

    let content = crate::infra::read_file(abs_path)?;
    let filtered = crate::filter::pipeline_for(abs_path).to_odb(&content)?;

    #[cfg(unix)]
    let mode = {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 != 0 {
            FileMode::Executable
        } else {
            FileMode::Regular
        }
    };
    #[cfg(not(unix))]
    let mode = FileMode::Regular;

    let oid = repo.object_store().write(ObjectType::Blob, &filtered)?;
    Ok((mode, oid))
}

impl Stash {
    /// Builds a synthetic stash commit from the current index and
    /// working-tree state and records it as the new tip of `refs/stash`.
    ///
    /// Returns the new stash commit's oid. Fails with
    /// [`Error::EmptyCommit`] if there is nothing to stash: the index
    /// matches `HEAD` and the working tree has no tracked changes (and,
    /// if requested, no untracked/ignored files either).
    pub fn save(
        repo: &Repository,
        committer_name: &str,
        committer_email: &str,
        message: &str,
        flags: StashFlags,
    ) -> Result<Oid> {
        let head = repo.head()?;
        let head_oid = *head.oid();
        let head_commit = repo.commit(&head_oid.to_hex())?;
        let head_tree_oid = *head_commit.tree();
        let branch = head.branch_name().unwrap_or("HEAD (detached)").to_string();

        let index = repo.read_index_for_diff()?;
        let mut worktree_entries: BTreeMap<PathBuf, (FileMode, Oid)> = index
            .entries()
            .iter()
            .map(|e| (e.path().to_path_buf(), (e.mode(), *e.oid())))
            .collect();
        let index_tree_oid = repo.build_tree_from_entries(&worktree_entries)?;

        let wd_diff = diff::workdir_to_index(
            repo,
            DiffOptions::new()
                .include_untracked(flags.wants_untracked())
                .include_ignored(flags.wants_ignored())
                .recurse_untracked_dirs(true),
        )?;

        let mut untracked_entries: BTreeMap<PathBuf, (FileMode, Oid)> = BTreeMap::new();

        for delta in wd_diff.iter() {
            match delta.status {
                DeltaStatus::Deleted => {
                    worktree_entries.remove(&delta.old.path);
                }
                DeltaStatus::Modified | DeltaStatus::TypeChange => {
                    let abs_path = repo.path().join(&delta.new.path);
                    let (mode, oid) = store_workdir_blob(repo, &abs_path)?;
                    worktree_entries.insert(delta.new.path.clone(), (mode, oid));
                }
                DeltaStatus::Untracked | DeltaStatus::Ignored => {
                    let abs_path = repo.path().join(&delta.new.path);
                    let (mode, oid) = store_workdir_blob(repo, &abs_path)?;
                    worktree_entries.insert(delta.new.path.clone(), (mode, oid));
                    untracked_entries.insert(delta.new.path.clone(), (mode, oid));
                }
                DeltaStatus::Added | DeltaStatus::Unmodified => {}
            }
        }

        if wd_diff.is_empty() && index_tree_oid == head_tree_oid {
            return Err(Error::EmptyCommit);
        }

        let worktree_tree_oid = repo.build_tree_from_entries(&worktree_entries)?;

        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        let sig = signature(committer_name, committer_email, timestamp);

        let store = repo.object_store();

        let index_commit_content = format_commit(
            &index_tree_oid,
            &[head_oid],
            &sig,
            &sig,
            &format!("index on {}: {}", branch, message),
        );
        let index_commit_oid = store.write(ObjectType::Commit, &index_commit_content)?;

        let mut stash_parents = vec![head_oid, index_commit_oid];

        if !untracked_entries.is_empty() {
            let untracked_tree_oid = repo.build_tree_from_entries(&untracked_entries)?;
            let untracked_commit_content = format_commit(
                &untracked_tree_oid,
                &[],
                &sig,
                &sig,
                &format!("untracked files on {}: {}", branch, message),
            );
            let untracked_commit_oid = store.write(ObjectType::Commit, &untracked_commit_content)?;
            stash_parents.push(untracked_commit_oid);
        }

        let stash_message = format!("WIP on {}: {} {}", branch, head_oid.short(), message);
        let stash_content = format_commit(&worktree_tree_oid, &stash_parents, &sig, &sig, &stash_message);
        let stash_oid = store.write(ObjectType::Commit, &stash_content)?;

        let previous_oid = read_stash_ref(repo)?.unwrap_or_else(Oid::zero);
        crate::infra::write_file_atomic(
            repo.git_dir().join("refs").join("stash"),
            format!("{}\n", stash_oid.to_hex()).as_bytes(),
        )?;

        reflog::append(
            repo.git_dir(),
            STASH_REF,
            &ReflogEntry {
                old_oid: previous_oid,
                new_oid: stash_oid,
                committer_name: committer_name.to_string(),
                committer_email: committer_email.to_string(),
                timestamp,
                action: "stash".to_string(),
                message: stash_message,
            },
        )?;

        tracing::debug!(oid = %stash_oid.to_hex(), parents = stash_parents.len(), "saved stash");
        Ok(stash_oid)
    }

    /// Iterates the stash reflog newest-first, calling `callback(index,
    /// &entry)` for each. A callback returning `Ok(true)` stops the
    /// iteration early with [`Error::UserAbort`]; `Ok(false)` continues.
    pub fn foreach(
        repo: &Repository,
        mut callback: impl FnMut(usize, &ReflogEntry) -> Result<bool>,
    ) -> Result<()> {
        let mut entries = reflog::read_all(repo.git_dir(), STASH_REF)?;
        entries.reverse();
        for (index, entry) in entries.iter().enumerate() {
            if callback(index, entry)? {
                return Err(Error::UserAbort);
            }
        }
        Ok(())
    }

    /// Removes the stash entry at `index` (0 = most recent), deleting
    /// `refs/stash` entirely if it was the last remaining entry.
    pub fn drop(repo: &Repository, index: usize) -> Result<()> {
        let deleted_all = reflog::remove_at(repo.git_dir(), STASH_REF, index)?;
        let ref_path = repo.git_dir().join("refs").join("stash");

        if deleted_all {
            if ref_path.exists() {
                std::fs::remove_file(&ref_path)?;
            }
            return Ok(());
        }

        let remaining = reflog::read_all(repo.git_dir(), STASH_REF)?;
        if let Some(last) = remaining.last() {
            crate::infra::write_file_atomic(&ref_path, format!("{}\n", last.new_oid.to_hex()).as_bytes())?;
        }
        Ok(())
    }
}

fn read_stash_ref(repo: &Repository) -> Result<Option<Oid>> {
    let path = repo.git_dir().join("refs").join("stash");
    if !path.exists() {
        return Ok(None);
    }
    let content = String::from_utf8_lossy(&crate::infra::read_file(&path)?).into_owned();
    let hex = content.trim();
    if hex.is_empty() {
        return Ok(None);
    }
    Ok(Some(Oid::from_hex(hex)?))
}
