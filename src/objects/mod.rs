//! Git object types (blob, tree, commit, tag).

pub mod blob;
pub mod commit;
pub mod oid;
pub mod store;
pub mod tree;

pub use blob::Blob;
pub use commit::{Commit, Signature};
pub use oid::Oid;
pub use store::{LooseObjectStore, ObjectType, RawObject};
pub use tree::{FileMode, Tree, TreeEntry};

/// A unified enum representing any Git object type.
///
/// This enum allows handling different Git object types uniformly
/// while still providing type-safe access to specific object data.
#[derive(Debug, Clone)]
pub enum Object {
    /// A blob object containing file content.
    Blob(Blob),
    /// A tree object containing directory entries.
    Tree(Tree),
    /// A commit object containing commit metadata.
    Commit(Commit),
}

impl Object {
    /// Returns the type of this object.
    pub fn kind(&self) -> ObjectType {
        match self {
            Object::Blob(_) => ObjectType::Blob,
            Object::Tree(_) => ObjectType::Tree,
            Object::Commit(_) => ObjectType::Commit,
        }
    }

    /// Returns a reference to the inner Blob if this is a Blob object.
    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            Object::Blob(blob) => Some(blob),
            _ => None,
        }
    }

    /// Returns a reference to the inner Tree if this is a Tree object.
    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Object::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    /// Returns a reference to the inner Commit if this is a Commit object.
    pub fn as_commit(&self) -> Option<&Commit> {
        match self {
            Object::Commit(commit) => Some(commit),
            _ => None,
        }
    }

    /// Consumes this Object and returns the inner Blob if this is a Blob object.
    pub fn into_blob(self) -> Option<Blob> {
        match self {
            Object::Blob(blob) => Some(blob),
            _ => None,
        }
    }

    /// Consumes this Object and returns the inner Tree if this is a Tree object.
    pub fn into_tree(self) -> Option<Tree> {
        match self {
            Object::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    /// Consumes this Object and returns the inner Commit if this is a Commit object.
    pub fn into_commit(self) -> Option<Commit> {
        match self {
            Object::Commit(commit) => Some(commit),
            _ => None,
        }
    }
}

impl From<Blob> for Object {
    fn from(blob: Blob) -> Self {
        Object::Blob(blob)
    }
}

impl From<Tree> for Object {
    fn from(tree: Tree) -> Self {
        Object::Tree(tree)
    }
}

impl From<Commit> for Object {
    fn from(commit: Commit) -> Self {
        Object::Commit(commit)
    }
}
