//! Git commit log iteration.
//!
//! This module provides an iterator for traversing commit history
//! in reverse chronological order (newest first).

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::path::PathBuf;

use crate::error::Result;
use crate::objects::{Commit, LooseObjectStore, ObjectType, Oid};

/// A pending commit in the priority queue.
///
/// Commits are ordered by timestamp (descending) for traversal.
#[derive(Debug, Clone)]
struct PendingCommit {
    /// The commit OID.
    oid: Oid,
    /// The author timestamp for ordering.
    timestamp: i64,
}

impl PartialEq for PendingCommit {
    fn eq(&self, other: &Self) -> bool {
        self.oid == other.oid
    }
}

impl Eq for PendingCommit {}

impl PartialOrd for PendingCommit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingCommit {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher timestamp = more recent = higher priority
        self.timestamp.cmp(&other.timestamp)
    }
}

/// An iterator over commits in the repository history.
///
/// Commits are yielded in reverse chronological order (newest first),
/// following parent links. Merge commits are handled by traversing
/// all parent branches.
///
/// # Example
///
/// ```no_run
/// use vcsdiff::repository::Repository;
///
/// let repo = Repository::open("path/to/repo").unwrap();
/// let log = repo.log().unwrap();
///
/// for result in log.take(10) {
///     match result {
///         Ok(commit) => println!("{}: {}", commit.author().name(), commit.summary()),
///         Err(e) => eprintln!("Error: {}", e),
///     }
/// }
/// ```
pub struct LogIterator {
    /// The loose object store for reading commits.
    store: LooseObjectStore,
    /// Priority queue of pending commits to visit.
    pending: BinaryHeap<PendingCommit>,
    /// Set of already visited commit OIDs to avoid duplicates.
    visited: HashSet<Oid>,
}

impl LogIterator {
    /// Creates a new LogIterator starting from the given OID.
    ///
    /// # Arguments
    ///
    /// * `objects_dir` - Path to the `.git/objects` directory.
    /// * `start_oid` - The OID of the commit to start from.
    pub fn new(objects_dir: PathBuf, start_oid: Oid) -> Result<Self> {
        let store = LooseObjectStore::new(&objects_dir);
        let mut pending = BinaryHeap::new();
        let visited = HashSet::new();

        // Read the initial commit to get its timestamp
        let raw = store.read(&start_oid)?;
        let commit = Commit::parse(raw)?;

        pending.push(PendingCommit {
            oid: start_oid,
            timestamp: commit.author().timestamp(),
        });

        Ok(LogIterator {
            store,
            pending,
            visited,
        })
    }

    /// Reads a commit by its OID.
    fn read_commit(&self, oid: &Oid) -> Result<Commit> {
        let raw = self.store.read(oid)?;

        if raw.object_type != ObjectType::Commit {
            return Err(crate::error::Error::TypeMismatch {
                expected: "commit",
                actual: raw.object_type.as_str(),
            });
        }

        Commit::parse(raw)
    }
}

impl Iterator for LogIterator {
    type Item = Result<Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        // Find the next unvisited commit
        while let Some(pending) = self.pending.pop() {
            if self.visited.contains(&pending.oid) {
                continue;
            }

            // Mark as visited
            self.visited.insert(pending.oid);

            // Read the commit
            let commit = match self.read_commit(&pending.oid) {
                Ok(c) => c,
                Err(e) => return Some(Err(e)),
            };

            // Add parents to the pending queue
            for parent_oid in commit.parents() {
                if !self.visited.contains(parent_oid) {
                    // Read parent to get its timestamp
                    match self.read_commit(parent_oid) {
                        Ok(parent_commit) => {
                            self.pending.push(PendingCommit {
                                oid: *parent_oid,
                                timestamp: parent_commit.author().timestamp(),
                            });
                        }
                        Err(e) => {
                            // If we can't read a parent, return the error on next iteration
                            // For now, we continue
                            return Some(Err(e));
                        }
                    }
                }
            }

            return Some(Ok(commit));
        }

        None
    }
}
