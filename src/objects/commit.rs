//! Git commit object implementation.

use super::oid::Oid;
use super::store::{ObjectType, RawObject};
use crate::error::{Error, Result};

/// A signature representing an author or committer.
///
/// Contains the name, email, timestamp, and timezone offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// The name of the person.
    name: String,
    /// The email address.
    email: String,
    /// Unix timestamp (seconds since epoch).
    timestamp: i64,
    /// Timezone offset in minutes (e.g., +0900 = 540, -0500 = -300).
    tz_offset: i32,
}

impl Signature {
    /// Creates a new Signature.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the person.
    /// * `email` - The email address.
    /// * `timestamp` - Unix timestamp (seconds since epoch).
    /// * `tz_offset` - Timezone offset in minutes.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        timestamp: i64,
        tz_offset: i32,
    ) -> Self {
        Signature {
            name: name.into(),
            email: email.into(),
            timestamp,
            tz_offset,
        }
    }

    /// Returns the name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the Unix timestamp.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Returns the timezone offset in minutes.
    pub fn tz_offset(&self) -> i32 {
        self.tz_offset
    }

    /// Parses a signature from a Git signature line.
    ///
    /// Format: `Name <email> timestamp timezone`
    /// Example: `John Doe <john@example.com> 1234567890 +0900`
    fn parse(s: &str) -> Result<Self> {
        // Find the email part enclosed in < >
        let email_start = s.find('<').ok_or(Error::InvalidUtf8)?;
        let email_end = s.find('>').ok_or(Error::InvalidUtf8)?;

        if email_start >= email_end {
            return Err(Error::InvalidUtf8);
        }

        let name = s[..email_start].trim().to_string();
        let email = s[email_start + 1..email_end].to_string();

        // Parse timestamp and timezone after the email
        let after_email = s[email_end + 1..].trim();
        let mut parts = after_email.split_whitespace();

        let timestamp: i64 = parts
            .next()
            .ok_or(Error::InvalidUtf8)?
            .parse()
            .map_err(|_| Error::InvalidUtf8)?;

        let tz_str = parts.next().ok_or(Error::InvalidUtf8)?;
        let tz_offset = parse_timezone(tz_str)?;

        Ok(Signature {
            name,
            email,
            timestamp,
            tz_offset,
        })
    }
}

/// Parses a timezone string like "+0900" or "-0500" into minutes offset.
fn parse_timezone(s: &str) -> Result<i32> {
    if s.len() != 5 {
        return Err(Error::InvalidUtf8);
    }

    let sign = match s.chars().next() {
        Some('+') => 1,
        Some('-') => -1,
        _ => return Err(Error::InvalidUtf8),
    };

    let hours: i32 = s[1..3].parse().map_err(|_| Error::InvalidUtf8)?;
    let minutes: i32 = s[3..5].parse().map_err(|_| Error::InvalidUtf8)?;

    Ok(sign * (hours * 60 + minutes))
}

/// A Git commit object.
///
/// Contains information about a snapshot of the repository including
/// the tree, parent commits, author, committer, and message.
#[derive(Debug, Clone)]
pub struct Commit {
    /// The OID (SHA-1 hash) of this commit.
    oid: Oid,
    /// The tree object this commit points to.
    tree: Oid,
    /// Parent commit(s). Empty for root commits.
    parents: Vec<Oid>,
    /// The author of the changes.
    author: Signature,
    /// The person who created this commit.
    committer: Signature,
    /// The commit message.
    message: String,
}

impl Commit {
    /// Parses a Commit from a RawObject with its OID.
    ///
    /// Commit format:
    /// ```text
    /// tree <sha1>
    /// parent <sha1>  (zero or more)
    /// author <signature>
    /// committer <signature>
    ///
    /// <message>
    /// ```
    ///
    /// # Arguments
    ///
    /// * `oid` - The OID (SHA-1 hash) of this commit.
    /// * `raw` - The raw object data.
    pub fn parse(oid: Oid, raw: RawObject) -> Result<Self> {
        if raw.object_type != ObjectType::Commit {
            return Err(Error::TypeMismatch {
                expected: "commit",
                actual: raw.object_type.as_str(),
            });
        }

        let content = std::str::from_utf8(&raw.content).map_err(|_| Error::InvalidUtf8)?;

        let mut tree: Option<Oid> = None;
        let mut parents = Vec::new();
        let mut author: Option<Signature> = None;
        let mut committer: Option<Signature> = None;
        let mut message = String::new();

        let mut in_message = false;

        for line in content.lines() {
            if in_message {
                if !message.is_empty() {
                    message.push('\n');
                }
                message.push_str(line);
                continue;
            }

            if line.is_empty() {
                in_message = true;
                continue;
            }

            if let Some(value) = line.strip_prefix("tree ") {
                tree = Some(Oid::from_hex(value)?);
            } else if let Some(value) = line.strip_prefix("parent ") {
                parents.push(Oid::from_hex(value)?);
            } else if let Some(value) = line.strip_prefix("author ") {
                author = Some(Signature::parse(value)?);
            } else if let Some(value) = line.strip_prefix("committer ") {
                committer = Some(Signature::parse(value)?);
            }
            // Ignore other headers (e.g., gpgsig, encoding)
        }

        let tree = tree.ok_or_else(|| Error::InvalidObject {
            oid: String::new(),
            reason: "missing tree".to_string(),
        })?;

        let author = author.ok_or_else(|| Error::InvalidObject {
            oid: String::new(),
            reason: "missing author".to_string(),
        })?;

        let committer = committer.ok_or_else(|| Error::InvalidObject {
            oid: String::new(),
            reason: "missing committer".to_string(),
        })?;

        Ok(Commit {
            oid,
            tree,
            parents,
            author,
            committer,
            message,
        })
    }

    /// Returns the OID (SHA-1 hash) of this commit.
    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    /// Returns the tree object ID.
    pub fn tree(&self) -> &Oid {
        &self.tree
    }

    /// Returns the parent commit IDs.
    pub fn parents(&self) -> &[Oid] {
        &self.parents
    }

    /// Returns the first parent, if any.
    pub fn parent(&self) -> Option<&Oid> {
        self.parents.first()
    }

    /// Returns the author signature.
    pub fn author(&self) -> &Signature {
        &self.author
    }

    /// Returns the committer signature.
    pub fn committer(&self) -> &Signature {
        &self.committer
    }

    /// Returns the full commit message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the first line of the commit message (the summary).
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Returns true if this is a root commit (no parents).
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Returns true if this is a merge commit (multiple parents).
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}
