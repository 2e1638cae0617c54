//! HEAD reference representation.

use crate::objects::Oid;

/// Represents the current HEAD state of a Git repository.
///
/// HEAD can either point to a branch (normal state) or directly
/// to a commit (detached HEAD state).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// HEAD points to a branch (e.g., `refs/heads/main`).
    Branch {
        /// The branch name (without `refs/heads/` prefix).
        name: String,
        /// The commit OID the branch points to.
        oid: Oid,
    },
    /// HEAD points directly to a commit (detached state).
    Detached {
        /// The commit OID that HEAD points to.
        oid: Oid,
    },
}

impl Head {
    /// Creates a new Head pointing to a branch.
    ///
    /// # Arguments
    ///
    /// * `name` - The branch name (without `refs/heads/` prefix).
    /// * `oid` - The commit OID the branch points to.
    pub fn branch(name: impl Into<String>, oid: Oid) -> Self {
        Head::Branch {
            name: name.into(),
            oid,
        }
    }

    /// Creates a new detached Head.
    ///
    /// # Arguments
    ///
    /// * `oid` - The commit OID that HEAD points to.
    pub fn detached(oid: Oid) -> Self {
        Head::Detached { oid }
    }

    /// Returns the commit OID that HEAD points to.
    ///
    /// This works for both branch and detached states.
    pub fn oid(&self) -> &Oid {
        match self {
            Head::Branch { oid, .. } => oid,
            Head::Detached { oid } => oid,
        }
    }

    /// Returns the branch name if HEAD points to a branch.
    ///
    /// Returns `None` if HEAD is in detached state.
    pub fn branch_name(&self) -> Option<&str> {
        match self {
            Head::Branch { name, .. } => Some(name),
            Head::Detached { .. } => None,
        }
    }

    /// Returns `true` if HEAD is in detached state.
    pub fn is_detached(&self) -> bool {
        matches!(self, Head::Detached { .. })
    }

    /// Returns `true` if HEAD points to a branch.
    pub fn is_branch(&self) -> bool {
        matches!(self, Head::Branch { .. })
    }

    /// Returns the full reference name.
    ///
    /// For branches, returns `refs/heads/<name>`.
    /// For detached HEAD, returns the commit OID as hex.
    pub fn reference_name(&self) -> String {
        match self {
            Head::Branch { name, .. } => format!("refs/heads/{}", name),
            Head::Detached { oid } => oid.to_hex(),
        }
    }
}
