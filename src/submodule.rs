//! Submodule (gitlink) handling for the diff engine.
//!
//! A gitlink entry in a tree or the index doesn't point at a blob; it
//! points at a commit inside a nested repository. Diffing one requires a
//! side channel: `.gitmodules` (parsed with the same INI-style grammar as
//! repo config, since it's the same grammar) to learn the submodule's
//! ignore policy, and the gitlink directory's own `.git/HEAD` to learn
//! what commit is actually checked out there.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Result;
use crate::objects::Oid;
use crate::refs::RefStore;
use crate::repository::Repository;

/// How much of a submodule's own dirtiness should be surfaced as a
/// change in the parent repository's diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IgnorePolicy {
    /// Never report submodule changes; always treat as unmodified.
    All,
    /// Report only a changed HEAD commit, not dirty working trees.
    CommittedOnly,
    /// Report a changed HEAD commit or untracked files, but not modified
    /// tracked files.
    Untracked,
    /// Report any difference at all (default).
    #[default]
    None,
}

impl IgnorePolicy {
    fn from_str(s: &str) -> Self {
        match s {
            "all" => IgnorePolicy::All,
            "dirty" => IgnorePolicy::CommittedOnly,
            "untracked" => IgnorePolicy::Untracked,
            _ => IgnorePolicy::None,
        }
    }
}

/// What's known about a submodule's working-tree state, relative to the
/// gitlink oid recorded in its parent's tree/index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmoduleStatus {
    /// The commit actually checked out in the submodule's own worktree,
    /// or `Oid::zero()` if it couldn't be determined (uninitialized,
    /// missing, or a lookup failure).
    pub workdir_oid: Oid,
    pub ignore_policy: IgnorePolicy,
}

/// Reads the ignore policy for `path` out of `.gitmodules` at the
/// repository root. Defaults to [`IgnorePolicy::None`] if `.gitmodules`
/// is absent or the submodule isn't listed there.
pub fn ignore_policy(repo: &Repository, path: &Path) -> IgnorePolicy {
    let gitmodules_path = repo.path().join(".gitmodules");
    let Ok(content) = std::fs::read_to_string(&gitmodules_path) else {
        return IgnorePolicy::None;
    };
    let Ok(config) = Config::from_str(&content) else {
        return IgnorePolicy::None;
    };

    for subsection in config.subsections("submodule") {
        let configured_path = config.get_subsection("submodule", subsection, "path");
        if configured_path == Some(path.to_string_lossy().as_ref()) {
            if let Some(policy) = config.get_subsection("submodule", subsection, "ignore") {
                return IgnorePolicy::from_str(policy);
            }
            return IgnorePolicy::None;
        }
    }
    IgnorePolicy::None
}

/// Resolves the commit checked out inside the gitlink directory at
/// `path` (relative to the repo root), by reading that directory's own
/// `.git/HEAD`. Returns `Oid::zero()` (never an error) if the directory
/// isn't a usable git checkout — uninitialized submodules are common and
/// not a failure of the parent diff.
pub fn lookup(repo: &Repository, path: &Path) -> Result<SubmoduleStatus> {
    let ignore_policy = self::ignore_policy(repo, path);

    let sub_git_dir = repo.path().join(path).join(".git");
    if !sub_git_dir.exists() {
        tracing::debug!(path = %path.display(), "submodule not initialized, substituting zero oid");
        return Ok(SubmoduleStatus {
            workdir_oid: Oid::zero(),
            ignore_policy,
        });
    }

    let sub_git_dir = resolve_gitdir_pointer(&sub_git_dir).unwrap_or(sub_git_dir);
    let store = RefStore::new(&sub_git_dir);
    let workdir_oid = store.head().map(|r| r.oid).unwrap_or_else(|_| {
        tracing::debug!(path = %path.display(), "submodule HEAD unreadable, substituting zero oid");
        Oid::zero()
    });

    Ok(SubmoduleStatus {
        workdir_oid,
        ignore_policy,
    })
}

/// A submodule's `.git` entry is sometimes a plain file containing
/// `gitdir: <path>` rather than a directory (when the real git dir lives
/// under the superproject's `.git/modules/`). Follows that indirection if
/// present.
fn resolve_gitdir_pointer(git_entry: &Path) -> Option<PathBuf> {
    if git_entry.is_dir() {
        return Some(git_entry.to_path_buf());
    }
    let content = std::fs::read_to_string(git_entry).ok()?;
    let target = content.strip_prefix("gitdir:")?.trim();
    let parent = git_entry.parent()?;
    Some(parent.join(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignore_policy_parses_gitmodules() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".gitmodules"),
            "[submodule \"vendor/lib\"]\n\tpath = vendor/lib\n\tignore = all\n",
        )
        .unwrap();
        std::fs::create_dir_all(dir.path().join(".git/objects")).unwrap();
        std::fs::create_dir_all(dir.path().join(".git/refs")).unwrap();
        std::fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
        let repo = Repository::open(dir.path()).unwrap();

        let policy = ignore_policy(&repo, Path::new("vendor/lib"));
        assert_eq!(policy, IgnorePolicy::All);

        let policy = ignore_policy(&repo, Path::new("other"));
        assert_eq!(policy, IgnorePolicy::None);
    }

    #[test]
    fn test_lookup_missing_submodule_returns_zero_oid() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".git/objects")).unwrap();
        std::fs::create_dir_all(dir.path().join(".git/refs")).unwrap();
        std::fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
        let repo = Repository::open(dir.path()).unwrap();

        let status = lookup(&repo, Path::new("never-initialized")).unwrap();
        assert!(status.workdir_oid.is_zero());
    }
}
