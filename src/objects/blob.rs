//! Git blob object implementation.

use super::store::{ObjectType, RawObject};
use crate::error::{Error, Result};

/// A Git blob object representing file content.
///
/// Blobs store the raw content of files in a Git repository.
/// They do not contain any metadata like filename or permissions;
/// that information is stored in tree objects.
#[derive(Debug, Clone)]
pub struct Blob {
    /// The raw content of the blob.
    content: Vec<u8>,
}

impl Blob {
    /// Parses a Blob from a RawObject.
    ///
    /// # Arguments
    ///
    /// * `raw` - The raw object to parse.
    ///
    /// # Returns
    ///
    /// The parsed Blob on success, or `Error::TypeMismatch` if the object
    /// is not a blob.
    pub fn parse(raw: RawObject) -> Result<Self> {
        if raw.object_type != ObjectType::Blob {
            return Err(Error::TypeMismatch {
                expected: "blob",
                actual: raw.object_type.as_str(),
            });
        }

        Ok(Blob {
            content: raw.content,
        })
    }

    /// Returns the raw content of the blob.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Returns the content as a UTF-8 string, if valid.
    ///
    /// # Returns
    ///
    /// `Ok(&str)` if the content is valid UTF-8, or `Err(Error::InvalidUtf8)`
    /// if it contains invalid UTF-8 sequences.
    pub fn content_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.content).map_err(|_| Error::InvalidUtf8)
    }

    /// Returns the size of the blob content in bytes.
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Returns true if the content appears to be binary.
    ///
    /// A file is considered binary if it contains a null byte (0x00)
    /// within the first 8000 bytes, which is the same heuristic
    /// used by Git.
    pub fn is_binary(&self) -> bool {
        let check_len = self.content.len().min(8000);
        self.content[..check_len].contains(&0)
    }
}
