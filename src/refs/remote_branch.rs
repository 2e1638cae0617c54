//! Git remote branch representation.

use crate::objects::Oid;

/// Represents a remote-tracking branch.
///
/// A remote branch is a reference in `refs/remotes/<remote>/<branch>` that
/// tracks a branch from a remote repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteBranch {
    /// The remote name (e.g., "origin").
    remote: String,
    /// The branch name (e.g., "main").
    name: String,
    /// The commit OID this branch points to.
    oid: Oid,
}

impl RemoteBranch {
    /// Creates a new RemoteBranch.
    ///
    /// # Arguments
    ///
    /// * `remote` - The remote name (e.g., "origin").
    /// * `name` - The branch name (e.g., "main").
    /// * `oid` - The commit OID the branch points to.
    pub fn new(remote: impl Into<String>, name: impl Into<String>, oid: Oid) -> Self {
        RemoteBranch {
            remote: remote.into(),
            name: name.into(),
            oid,
        }
    }

    /// Returns the remote name.
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Returns the branch name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the full name in the format "remote/branch".
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.remote, self.name)
    }

    /// Returns the commit OID this branch points to.
    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    /// Returns the full reference name (with `refs/remotes/` prefix).
    pub fn reference_name(&self) -> String {
        format!("refs/remotes/{}/{}", self.remote, self.name)
    }

    /// Returns a short representation of the commit OID (7 characters).
    pub fn short_oid(&self) -> String {
        self.oid.short()
    }
}

impl std::fmt::Display for RemoteBranch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.remote, self.name)
    }
}
