//! Git tag representation.

use crate::objects::{Oid, Signature};

/// Represents a Git tag.
///
/// Git supports two types of tags:
/// - Lightweight tags: Simple pointers to a commit (like a branch that doesn't move)
/// - Annotated tags: Full objects with tagger, date, message, and optional GPG signature
#[derive(Debug, Clone)]
pub struct Tag {
    /// The tag name (without `refs/tags/` prefix).
    name: String,
    /// The object this tag points to (commit for lightweight, or the peeled commit for annotated).
    target: Oid,
    /// The message (only for annotated tags).
    message: Option<String>,
    /// The tagger signature (only for annotated tags).
    tagger: Option<Signature>,
}

impl Tag {
    /// Creates a new lightweight tag.
    ///
    /// # Arguments
    ///
    /// * `name` - The tag name (without `refs/tags/` prefix).
    /// * `target` - The commit OID this tag points to.
    pub fn lightweight(name: impl Into<String>, target: Oid) -> Self {
        Tag {
            name: name.into(),
            target,
            message: None,
            tagger: None,
        }
    }

    /// Creates a new annotated tag.
    ///
    /// # Arguments
    ///
    /// * `name` - The tag name (without `refs/tags/` prefix).
    /// * `target` - The commit OID this tag ultimately points to.
    /// * `message` - The tag message.
    /// * `tagger` - The tagger signature.
    pub fn annotated(
        name: impl Into<String>,
        target: Oid,
        message: String,
        tagger: Signature,
    ) -> Self {
        Tag {
            name: name.into(),
            target,
            message: Some(message),
            tagger: Some(tagger),
        }
    }

    /// Returns the tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the target commit OID.
    pub fn target(&self) -> &Oid {
        &self.target
    }

    /// Returns the tag message if this is an annotated tag.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the tagger signature if this is an annotated tag.
    pub fn tagger(&self) -> Option<&Signature> {
        self.tagger.as_ref()
    }

    /// Returns `true` if this is an annotated tag.
    pub fn is_annotated(&self) -> bool {
        self.message.is_some()
    }

    /// Returns the full reference name (with `refs/tags/` prefix).
    pub fn reference_name(&self) -> String {
        format!("refs/tags/{}", self.name)
    }

    /// Returns a short representation of the target OID (7 characters).
    pub fn short_target(&self) -> String {
        self.target.short()
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
