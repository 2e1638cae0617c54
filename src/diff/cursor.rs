//! Ordered path-entry sources for the merge-join driver.
//!
//! A [`DiffCursor`] delivers entries from one side of a comparison in path
//! order. Tree and index sources are "leaf iterators": they already know
//! their full flat entry list up front, so `advance_into_directory` behaves
//! exactly like `advance`. The workdir source descends on demand, since
//! walking the whole tree eagerly would defeat the point of letting the
//! driver skip directories it already knows are unmodified or ignored.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::Result;
use crate::objects::tree::FileMode;
use crate::objects::Oid;
use crate::repository::Repository;

use super::entry::{Entry, SourceKind};

/// An ordered source of [`Entry`] values, consumed by the merge-join
/// driver one step at a time.
pub trait DiffCursor {
    fn kind(&self) -> SourceKind;

    /// Whether this source's own ordering folds ASCII case (e.g. a
    /// case-insensitive filesystem).
    fn ignore_case(&self) -> bool;

    /// The entry the cursor is currently positioned on, or `None` if
    /// exhausted.
    fn current(&self) -> Option<Entry>;

    /// Moves past the current entry without descending into it, even if
    /// it's a directory. For leaf iterators (tree, index) this is the only
    /// kind of advance there is.
    fn advance(&mut self) -> Result<()>;

    /// If the current entry is a directory, descends into it and
    /// positions the cursor on its first child (or the next sibling if
    /// empty). For non-directory entries, behaves like `advance`.
    fn advance_into_directory(&mut self) -> Result<()> {
        self.advance()
    }

    /// The absolute filesystem path backing the current entry, when the
    /// source is workdir-backed. Used for on-demand hashing.
    fn current_workdir_path(&self) -> Option<PathBuf> {
        None
    }

    /// Whether the current entry matches an applicable `.gitignore` rule.
    fn current_is_ignored(&self) -> bool {
        false
    }
}

/// A cursor over an in-memory, pre-sorted list of entries. Used directly
/// by [`IndexCursor`] and [`TreeCursor`], and as the landing spot for
/// spooled (re-sorted) cursors (see [`super::sort`]).
pub struct MemoryCursor {
    kind: SourceKind,
    icase: bool,
    entries: Vec<Entry>,
    pos: usize,
}

impl MemoryCursor {
    pub fn new(kind: SourceKind, icase: bool, mut entries: Vec<Entry>) -> Self {
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        MemoryCursor {
            kind,
            icase,
            entries,
            pos: 0,
        }
    }
}

impl DiffCursor for MemoryCursor {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn ignore_case(&self) -> bool {
        self.icase
    }

    fn current(&self) -> Option<Entry> {
        self.entries.get(self.pos).cloned()
    }

    fn advance(&mut self) -> Result<()> {
        if self.pos < self.entries.len() {
            self.pos += 1;
        }
        Ok(())
    }
}

/// Materializes the remainder of `cursor` into memory and re-sorts it
/// under `icase`, per the case-folding bridge in `super::sort`.
pub fn spool(mut cursor: Box<dyn DiffCursor>, icase: bool) -> Result<Box<dyn DiffCursor>> {
    let kind = cursor.kind();
    let mut entries = Vec::new();
    while let Some(entry) = cursor.current() {
        entries.push(entry);
        cursor.advance_into_directory()?;
    }
    Ok(Box::new(MemoryCursor::new(kind, icase, entries)))
}

/// A cursor over a committed tree, recursed eagerly into a flat,
/// depth-first entry list. Trees don't support partial descent — there's
/// no stat-based shortcut to skip a subtree, since every entry in a tree
/// is already known — so there's no benefit to lazy recursion here.
pub struct TreeCursor {
    inner: MemoryCursor,
}

impl TreeCursor {
    pub fn new(repo: &Repository, root_tree_oid: &Oid, icase: bool) -> Result<Self> {
        let mut entries = Vec::new();
        Self::flatten(repo, root_tree_oid, Path::new(""), &mut entries)?;
        Ok(TreeCursor {
            inner: MemoryCursor::new(SourceKind::Tree, icase, entries),
        })
    }

    fn flatten(
        repo: &Repository,
        tree_oid: &Oid,
        prefix: &Path,
        out: &mut Vec<Entry>,
    ) -> Result<()> {
        let tree = repo.tree(&tree_oid.to_hex())?;
        for te in tree.iter() {
            let path = prefix.join(te.name());
            if te.is_directory() {
                Self::flatten(repo, te.oid(), &path, out)?;
            } else {
                out.push(Entry::new(path, te.mode(), 0, *te.oid()));
            }
        }
        Ok(())
    }
}

impl DiffCursor for TreeCursor {
    fn kind(&self) -> SourceKind {
        SourceKind::Tree
    }

    fn ignore_case(&self) -> bool {
        self.inner.ignore_case()
    }

    fn current(&self) -> Option<Entry> {
        self.inner.current()
    }

    fn advance(&mut self) -> Result<()> {
        self.inner.advance()
    }
}

/// A cursor over the staging area. The index is always stored flat and
/// pre-sorted, so this is a thin wrapper.
pub struct IndexCursor {
    inner: MemoryCursor,
}

impl IndexCursor {
    pub fn new(index: &crate::index::Index, icase: bool) -> Self {
        let entries = index
            .iter()
            .filter(|e| !e.is_conflicted())
            .map(|e| {
                let mut entry = Entry::new(e.path().to_path_buf(), e.mode(), e.size() as u64, *e.oid());
                entry.ctime = e.ctime();
                entry.mtime = e.mtime();
                entry.dev = e.dev();
                entry.ino = e.ino();
                entry.uid = e.uid();
                entry.gid = e.gid();
                entry.intent_to_add = e.intent_to_add();
                entry.skip_worktree = e.skip_worktree();
                entry
            })
            .collect();
        IndexCursor {
            inner: MemoryCursor::new(SourceKind::Index, icase, entries),
        }
    }
}

impl DiffCursor for IndexCursor {
    fn kind(&self) -> SourceKind {
        SourceKind::Index
    }

    fn ignore_case(&self) -> bool {
        self.inner.ignore_case()
    }

    fn current(&self) -> Option<Entry> {
        self.inner.current()
    }

    fn advance(&mut self) -> Result<()> {
        self.inner.advance()
    }
}

/// One directory's worth of not-yet-visited children, sorted by name.
struct Frame {
    rel_dir: PathBuf,
    children: Vec<Child>,
    idx: usize,
}

#[derive(Clone)]
struct Child {
    name: String,
    rel_path: PathBuf,
    abs_path: PathBuf,
    mode: FileMode,
    size: u64,
}

/// A cursor over the live filesystem, walked directory by directory so the
/// driver can decide whether to descend into a given directory (e.g. an
/// untracked one that's entirely ignored) without stat-ing its contents.
pub struct WorkdirCursor {
    icase: bool,
    stack: Vec<Frame>,
    ignore_matcher: Gitignore,
    current: Option<Child>,
}

impl WorkdirCursor {
    pub fn new(work_dir: &Path, icase: bool) -> Result<Self> {
        let ignore_matcher = build_ignore_matcher(work_dir)?;
        let children = read_dir_sorted(work_dir, Path::new(""), icase)?;
        let mut stack = vec![Frame {
            rel_dir: PathBuf::new(),
            children,
            idx: 0,
        }];
        let current = Self::pop_to_valid(&mut stack);
        Ok(WorkdirCursor {
            icase,
            stack,
            ignore_matcher,
            current,
        })
    }

    /// Advances `stack` until it is positioned on an unvisited child (or
    /// empty), popping exhausted frames as it goes.
    fn pop_to_valid(stack: &mut Vec<Frame>) -> Option<Child> {
        loop {
            let top = stack.last_mut()?;
            if top.idx < top.children.len() {
                return Some(top.children[top.idx].clone());
            }
            stack.pop();
            if let Some(parent) = stack.last_mut() {
                parent.idx += 1;
            }
        }
    }
}

impl DiffCursor for WorkdirCursor {
    fn kind(&self) -> SourceKind {
        SourceKind::Workdir
    }

    fn ignore_case(&self) -> bool {
        self.icase
    }

    fn current(&self) -> Option<Entry> {
        self.current
            .as_ref()
            .map(|c| Entry::new(c.rel_path.clone(), c.mode, c.size, Oid::zero()))
    }

    fn advance(&mut self) -> Result<()> {
        if let Some(top) = self.stack.last_mut() {
            top.idx += 1;
        }
        self.current = Self::pop_to_valid(&mut self.stack);
        Ok(())
    }

    fn advance_into_directory(&mut self) -> Result<()> {
        let Some(child) = self.current.clone() else {
            return Ok(());
        };
        if child.mode != FileMode::Directory {
            return self.advance();
        }
        let children = read_dir_sorted(&child.abs_path, &child.rel_path, self.icase)?;
        self.stack.push(Frame {
            rel_dir: child.rel_path,
            children,
            idx: 0,
        });
        self.current = Self::pop_to_valid(&mut self.stack);
        Ok(())
    }

    fn current_workdir_path(&self) -> Option<PathBuf> {
        self.current.as_ref().map(|c| c.abs_path.clone())
    }

    fn current_is_ignored(&self) -> bool {
        match &self.current {
            Some(c) => self
                .ignore_matcher
                .matched_path_or_any_parents(&c.rel_path, c.mode == FileMode::Directory)
                .is_ignore(),
            None => false,
        }
    }
}

fn read_dir_sorted(abs_dir: &Path, rel_dir: &Path, icase: bool) -> Result<Vec<Child>> {
    let mut children = Vec::new();
    let read_dir = match fs::read_dir(abs_dir) {
        Ok(rd) => rd,
        Err(_) => return Ok(children),
    };
    for entry in read_dir {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == ".git" {
            continue;
        }
        let abs_path = entry.path();
        let rel_path = rel_dir.join(&name);
        let meta = match fs::symlink_metadata(&abs_path) {
            Ok(m) => m,
            Err(_) => continue,
        };

        let mode = if meta.file_type().is_symlink() {
            FileMode::Symlink
        } else if meta.is_dir() {
            if abs_path.join(".git").exists() {
                FileMode::Submodule
            } else {
                FileMode::Directory
            }
        } else if is_executable(&meta) {
            FileMode::Executable
        } else {
            FileMode::Regular
        };

        let size = if mode == FileMode::Directory || mode == FileMode::Submodule {
            0
        } else {
            meta.len()
        };

        children.push(Child {
            name,
            rel_path,
            abs_path,
            mode,
            size,
        });
    }

    children.sort_by(|a, b| {
        if icase {
            a.name.to_ascii_lowercase().cmp(&b.name.to_ascii_lowercase())
        } else {
            a.name.cmp(&b.name)
        }
    });

    Ok(children)
}

#[cfg(unix)]
fn is_executable(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &fs::Metadata) -> bool {
    false
}

/// Builds a single combined `.gitignore` matcher by walking the whole
/// worktree up front collecting every `.gitignore` file. This trades a
/// second filesystem pass for correct deep-over-shallow precedence, which
/// `ignore::gitignore::GitignoreBuilder` gives for free when every file is
/// added to one builder.
fn build_ignore_matcher(work_dir: &Path) -> Result<Gitignore> {
    let mut builder = GitignoreBuilder::new(work_dir);
    let mut stack = vec![work_dir.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(read_dir) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in read_dir.flatten() {
            let path = entry.path();
            if path.file_name().map(|n| n == ".git").unwrap_or(false) {
                continue;
            }
            if path.is_dir() {
                stack.push(path);
            } else if path.file_name().map(|n| n == ".gitignore").unwrap_or(false) {
                if let Some(err) = builder.add(&path) {
                    return Err(crate::error::Error::InvalidRepo(err.to_string()));
                }
            }
        }
    }
    builder
        .build()
        .map_err(|e| crate::error::Error::InvalidRepo(e.to_string()))
}

/// Flattens an [`crate::index::Index`] into a path -> entry map, used by
/// `Repository::oid_for_file`'s mode fallback and by tests.
pub fn index_entry_map(index: &crate::index::Index) -> BTreeMap<PathBuf, Entry> {
    index
        .iter()
        .map(|e| {
            (
                e.path().to_path_buf(),
                Entry::new(e.path().to_path_buf(), e.mode(), e.size() as u64, *e.oid()),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_cursor_sorted_and_advances() {
        let entries = vec![
            Entry::new(PathBuf::from("b.txt"), FileMode::Regular, 1, Oid::zero()),
            Entry::new(PathBuf::from("a.txt"), FileMode::Regular, 1, Oid::zero()),
        ];
        let mut cursor = MemoryCursor::new(SourceKind::Index, false, entries);
        assert_eq!(cursor.current().unwrap().path, PathBuf::from("a.txt"));
        cursor.advance().unwrap();
        assert_eq!(cursor.current().unwrap().path, PathBuf::from("b.txt"));
        cursor.advance().unwrap();
        assert!(cursor.current().is_none());
    }

    #[test]
    fn test_workdir_cursor_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/file.txt"), b"hi").unwrap();
        std::fs::write(dir.path().join("top.txt"), b"hi").unwrap();

        let mut cursor = WorkdirCursor::new(dir.path(), false).unwrap();
        // "sub" sorts before "top.txt"
        let first = cursor.current().unwrap();
        assert_eq!(first.path, PathBuf::from("sub"));
        assert_eq!(first.mode, FileMode::Directory);

        cursor.advance_into_directory().unwrap();
        let nested = cursor.current().unwrap();
        assert_eq!(nested.path, PathBuf::from("sub/file.txt"));

        cursor.advance().unwrap();
        let top = cursor.current().unwrap();
        assert_eq!(top.path, PathBuf::from("top.txt"));

        cursor.advance().unwrap();
        assert!(cursor.current().is_none());
    }

    #[test]
    fn test_workdir_cursor_advance_skips_directory_contents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/file.txt"), b"hi").unwrap();
        std::fs::write(dir.path().join("zzz.txt"), b"hi").unwrap();

        let mut cursor = WorkdirCursor::new(dir.path(), false).unwrap();
        assert_eq!(cursor.current().unwrap().path, PathBuf::from("sub"));
        cursor.advance().unwrap(); // skip into sub's contents entirely
        assert_eq!(cursor.current().unwrap().path, PathBuf::from("zzz.txt"));
    }

    #[test]
    fn test_workdir_cursor_respects_gitignore() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".gitignore"), b"*.log\n").unwrap();
        std::fs::write(dir.path().join("keep.txt"), b"hi").unwrap();
        std::fs::write(dir.path().join("debug.log"), b"hi").unwrap();

        let mut cursor = WorkdirCursor::new(dir.path(), false).unwrap();
        let mut seen = Vec::new();
        while let Some(e) = cursor.current() {
            seen.push((e.path.clone(), cursor.current_is_ignored()));
            cursor.advance_into_directory().unwrap();
        }
        let log_entry = seen.iter().find(|(p, _)| p == Path::new("debug.log")).unwrap();
        assert!(log_entry.1);
        let keep_entry = seen.iter().find(|(p, _)| p == Path::new("keep.txt")).unwrap();
        assert!(!keep_entry.1);
    }
}
