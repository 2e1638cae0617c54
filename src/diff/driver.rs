//! The merge-join driver: walks two ordered sources in lockstep and emits
//! a sorted [`DiffList`].
//!
//! At each step the driver looks at both cursors' current paths. Three
//! things can happen: the old side is ahead (a deletion), the new side is
//! ahead (an addition, which might be untracked, ignored, or a directory
//! worth recursing into), or they match (send to the classifier). The loop
//! ends when both cursors are exhausted.

use crate::error::Result;
use crate::objects::tree::FileMode;
use crate::objects::Oid;
use crate::repository::Repository;

use super::classifier::{self, ClassifyContext, ClassifyOutcome};
use super::cursor::{spool, DiffCursor, IndexCursor, TreeCursor, WorkdirCursor};
use super::entry::{Delta, DeltaStatus, Entry, FileSide, SourceKind};
use super::options::{Capabilities, DiffOptions};
use super::pathspec::Pathspec;
use super::sort::{self, CasePolicy, Comparators};
use super::store::DiffList;

/// Runs the merge-join loop to completion and returns the finished
/// (filtered, sorted) [`DiffList`].
pub fn run(
    repo: &Repository,
    old_kind: SourceKind,
    mut o: Box<dyn DiffCursor>,
    new_kind: SourceKind,
    mut n: Box<dyn DiffCursor>,
    opts: DiffOptions,
    caps: Capabilities,
) -> Result<DiffList> {
    tracing::debug!(?old_kind, ?new_kind, "starting diff merge-join");

    let decision = sort::decide(o.ignore_case(), n.ignore_case());
    let comparators = Comparators::new(decision.policy);

    if decision.spool_old {
        o = spool(o, matches!(decision.policy, CasePolicy::Insensitive))?;
    }
    if decision.spool_new {
        n = spool(n, matches!(decision.policy, CasePolicy::Insensitive))?;
    }

    let icase = matches!(decision.policy, CasePolicy::Insensitive) || opts.icase();
    let pathspec = Pathspec::new(opts.patterns(), opts.pathspec_disabled(), icase)?;

    let mut list = DiffList::new(opts.clone(), caps, decision.policy, old_kind, new_kind);

    loop {
        let oc = o.current();
        let nc = n.current();

        match (oc, nc) {
            (None, None) => break,
            (Some(oe), None) => {
                handle_deletion(&mut list, &comparators, &opts, &mut o, &oe, None)?;
            }
            (None, Some(ne)) => {
                handle_addition(
                    repo, &mut list, &comparators, &pathspec, &opts, &caps, &mut o, &mut n, &ne, None,
                )?;
            }
            (Some(oe), Some(ne)) => match comparators.entrycmp(&oe.path, &ne.path) {
                std::cmp::Ordering::Less => {
                    handle_deletion(&mut list, &comparators, &opts, &mut o, &oe, Some(&ne))?;
                }
                std::cmp::Ordering::Greater => {
                    handle_addition(
                        repo, &mut list, &comparators, &pathspec, &opts, &caps, &mut o, &mut n, &ne,
                        Some(&oe),
                    )?;
                }
                std::cmp::Ordering::Equal => {
                    handle_coincident(repo, &mut list, &pathspec, &opts, &caps, &oe, &ne, new_kind)?;
                    o.advance()?;
                    n.advance()?;
                }
            },
        }
    }

    let list = list.finish();
    tracing::debug!(delta_count = list.len(), "diff merge-join finished");
    Ok(list)
}

/// Handles the branch where the old side is ahead of the new side: `oe`
/// has no matching path on the new side (yet). Pushes a DELETED delta for
/// `oe` and, when `INCLUDE_TYPECHANGE_TREES` is set, checks whether the new
/// side's current (un-advanced) entry `peek_new` falls inside the former
/// path `oe` used to occupy — meaning a file became a directory (or vice
/// versa) and this deletion is really one side of a type change. Only the
/// delta just pushed is ever rewritten; every other entry in the subtree is
/// still classified and emitted independently by later loop iterations.
fn handle_deletion(
    list: &mut DiffList,
    comparators: &Comparators,
    opts: &DiffOptions,
    o: &mut Box<dyn DiffCursor>,
    oe: &Entry,
    peek_new: Option<&Entry>,
) -> Result<()> {
    list.push(Delta::deleted(oe));

    if opts.wants_typechange_trees() && peek_new.is_some_and(|ne| comparators.subtree_of(&oe.path, &ne.path)) {
        rewrite_last_as_typechange(list, &oe.path, TypechangeSide::New);
    }

    o.advance()
}

/// Which `FileSide` of the just-pushed one-sided delta gets overwritten
/// with the TREE sentinel when it's rewritten into a TYPECHANGE.
enum TypechangeSide {
    Old,
    New,
}

/// Rewrites the most recently pushed delta (the one just emitted for a
/// deletion or addition) into a TYPECHANGE, replacing the side that had no
/// real counterpart with a TREE sentinel for `collapsed_path`.
fn rewrite_last_as_typechange(list: &mut DiffList, collapsed_path: &std::path::Path, side: TypechangeSide) {
    if let Some(delta) = list.last_mut() {
        delta.status = DeltaStatus::TypeChange;
        let sentinel = FileSide::absent(collapsed_path.to_path_buf(), FileMode::Directory);
        match side {
            TypechangeSide::Old => delta.old = sentinel,
            TypechangeSide::New => delta.new = sentinel,
        }
    }
}

/// Handles the branch where the new side is ahead of the old side: `ne`
/// has no matching path on the old side (yet). This covers plain
/// additions, untracked/ignored workdir entries, and directories worth
/// recursing into. Once the delta for a non-directory `ne` is pushed, and
/// `INCLUDE_TYPECHANGE_TREES` is set, checks whether the old side's current
/// (un-advanced) entry `peek_old` falls inside the path `ne` now occupies —
/// meaning a directory became a file (or vice versa) — and rewrites just
/// that pushed delta into a TYPECHANGE. Every other entry in the subtree is
/// still classified and emitted independently by later loop iterations.
#[allow(clippy::too_many_arguments)]
fn handle_addition(
    repo: &Repository,
    list: &mut DiffList,
    comparators: &Comparators,
    pathspec: &Pathspec,
    opts: &DiffOptions,
    _caps: &Capabilities,
    o: &mut Box<dyn DiffCursor>,
    n: &mut Box<dyn DiffCursor>,
    ne: &Entry,
    peek_old: Option<&Entry>,
) -> Result<()> {
    if !pathspec.is_match(&ne.path, ne.mode == FileMode::Directory) {
        return n.advance();
    }

    let is_workdir = n.kind() == SourceKind::Workdir;
    let is_ignored = is_workdir && n.current_is_ignored();

    if ne.mode == FileMode::Directory {
        let contains_tracked = match o.current() {
            Some(oe) => comparators.subtree_of(&ne.path, &oe.path),
            None => false,
        };
        if contains_tracked {
            return n.advance_into_directory();
        }

        if is_ignored {
            if opts.wants_ignored() {
                list.push(Delta::one_sided_new(DeltaStatus::Ignored, ne, false));
            }
            return n.advance();
        }

        if !opts.wants_untracked() {
            return n.advance();
        }
        if opts.wants_recurse_untracked_dirs() {
            return n.advance_into_directory();
        }
        list.push(Delta::one_sided_new(DeltaStatus::Untracked, ne, false));
        return n.advance();
    }

    let status = if is_ignored {
        if !opts.wants_ignored() {
            return n.advance();
        }
        DeltaStatus::Ignored
    } else if is_workdir {
        if !opts.wants_untracked() {
            return n.advance();
        }
        DeltaStatus::Untracked
    } else {
        DeltaStatus::Added
    };

    let valid_oid = if ne.oid.is_zero() && is_workdir {
        let new_oid = repo.oid_for_file(
            &n.current_workdir_path().unwrap_or_else(|| ne.path.clone()),
            ne.mode,
            ne.size,
        )?;
        list.push(Delta::one_sided_new(status, &with_oid(ne, new_oid), true));
        true
    } else {
        list.push(Delta::one_sided_new(status, ne, !ne.oid.is_zero()));
        !ne.oid.is_zero()
    };

    if opts.wants_typechange_trees() && peek_old.is_some_and(|oe| comparators.subtree_of(&ne.path, &oe.path)) {
        rewrite_last_as_typechange(list, &ne.path, TypechangeSide::Old);
    }

    let _ = valid_oid;
    n.advance()
}

fn with_oid(entry: &Entry, oid: Oid) -> Entry {
    let mut e = entry.clone();
    e.oid = oid;
    e
}

#[allow(clippy::too_many_arguments)]
fn handle_coincident(
    repo: &Repository,
    list: &mut DiffList,
    pathspec: &Pathspec,
    opts: &DiffOptions,
    caps: &Capabilities,
    oe: &Entry,
    ne: &Entry,
    new_kind: SourceKind,
) -> Result<()> {
    let new_workdir_path = if new_kind == SourceKind::Workdir {
        Some(repo.path().join(&ne.path))
    } else {
        None
    };
    let ctx = ClassifyContext {
        repo,
        new_kind,
        new_workdir_path,
    };

    match classifier::classify_coincident(&ctx, oe, ne, opts, caps, pathspec)? {
        ClassifyOutcome::Filtered => {}
        ClassifyOutcome::Single(delta) => list.push(delta),
        ClassifyOutcome::Split(deleted, added) => {
            list.push(deleted);
            list.push(added);
        }
    }
    Ok(())
}

/// Builds the tree-backed cursor for `tree_oid`, using the repo-root
/// empty tree equivalent (`Oid::zero()`) to represent "no tree" (used for
/// the root-commit case of a comparison against nothing).
fn tree_cursor(repo: &Repository, tree_oid: Option<&Oid>, icase: bool) -> Result<Box<dyn DiffCursor>> {
    match tree_oid {
        Some(oid) => Ok(Box::new(TreeCursor::new(repo, oid, icase)?)),
        None => Ok(Box::new(super::cursor::MemoryCursor::new(SourceKind::Tree, icase, Vec::new()))),
    }
}

fn repo_icase(repo: &Repository) -> bool {
    repo.config().map(|c| c.get_bool("core", "ignorecase").unwrap_or(false)).unwrap_or(false)
}

/// Diffs one tree against another.
pub fn tree_to_tree(repo: &Repository, old_tree: Option<&Oid>, new_tree: Option<&Oid>, opts: DiffOptions) -> Result<DiffList> {
    let config = repo.config()?;
    let caps = Capabilities::resolve(&config, &opts);
    let icase = repo_icase(repo);
    let o = tree_cursor(repo, old_tree, icase)?;
    let n = tree_cursor(repo, new_tree, icase)?;
    run(repo, SourceKind::Tree, o, SourceKind::Tree, n, opts, caps)
}

/// Diffs the index against a tree.
pub fn index_to_tree(repo: &Repository, tree_oid: Option<&Oid>, opts: DiffOptions) -> Result<DiffList> {
    let config = repo.config()?;
    let caps = Capabilities::resolve(&config, &opts);
    let icase = repo_icase(repo);
    let index = repo.read_index_for_diff()?;
    let o = tree_cursor(repo, tree_oid, icase)?;
    let n: Box<dyn DiffCursor> = Box::new(IndexCursor::new(&index, icase));
    run(repo, SourceKind::Tree, o, SourceKind::Index, n, opts, caps)
}

/// Diffs the working tree against the index.
pub fn workdir_to_index(repo: &Repository, opts: DiffOptions) -> Result<DiffList> {
    let config = repo.config()?;
    let caps = Capabilities::resolve(&config, &opts);
    let icase = repo_icase(repo);
    let index = repo.read_index_for_diff()?;
    let o: Box<dyn DiffCursor> = Box::new(IndexCursor::new(&index, icase));
    let n: Box<dyn DiffCursor> = Box::new(WorkdirCursor::new(repo.path(), icase)?);
    run(repo, SourceKind::Index, o, SourceKind::Workdir, n, opts, caps)
}

/// Diffs the working tree against a tree.
pub fn workdir_to_tree(repo: &Repository, tree_oid: Option<&Oid>, opts: DiffOptions) -> Result<DiffList> {
    let config = repo.config()?;
    let caps = Capabilities::resolve(&config, &opts);
    let icase = repo_icase(repo);
    let o = tree_cursor(repo, tree_oid, icase)?;
    let n: Box<dyn DiffCursor> = Box::new(WorkdirCursor::new(repo.path(), icase)?);
    run(repo, SourceKind::Tree, o, SourceKind::Workdir, n, opts, caps)
}
