//! Error types for vcsdiff.

use std::fmt;
use std::path::PathBuf;

/// The main error type for vcsdiff operations.
#[derive(Debug)]
pub enum Error {
    /// An I/O error occurred.
    Io(std::io::Error),

    /// The specified path is not a valid Git repository.
    NotARepository(PathBuf),

    /// The requested object was not found.
    ObjectNotFound(String),

    /// The requested reference was not found.
    RefNotFound(String),

    /// The specified path was not found.
    PathNotFound(PathBuf),

    /// The provided string is not a valid object ID.
    InvalidOid(String),

    /// The provided string is not a valid reference name.
    InvalidRefName(String),

    /// The object is invalid or corrupted.
    InvalidObject {
        /// The object ID.
        oid: String,
        /// The reason for invalidity.
        reason: String,
    },

    /// The index file is invalid.
    InvalidIndex {
        /// The index version.
        version: u32,
        /// The reason for invalidity.
        reason: String,
    },

    /// Type mismatch when expecting a specific object type.
    TypeMismatch {
        /// The expected type.
        expected: &'static str,
        /// The actual type.
        actual: &'static str,
    },

    /// Invalid UTF-8 sequence encountered.
    InvalidUtf8,

    /// Zlib decompression failed.
    DecompressionFailed,

    // Phase 2: Write operations
    /// The reference already exists.
    RefAlreadyExists(String),

    /// Cannot delete the currently checked out branch.
    CannotDeleteCurrentBranch,

    /// Attempted to create an empty commit.
    EmptyCommit,

    /// The working tree has uncommitted changes.
    DirtyWorkingTree,

    /// The requested configuration key was not found.
    ConfigNotFound(String),

    /// A repository already exists at the specified path.
    AlreadyARepository(PathBuf),

    // Diff engine error kinds (spec.md §7).
    /// Allocation or path-interning failure. Unreachable in practice under
    /// safe Rust; kept for contract completeness with the DiffList pool.
    OutOfMemory,

    /// Repository configuration is unreadable or the index is unavailable.
    InvalidRepo(String),

    /// A source iterator (tree/index/workdir) failed to advance or resolve.
    IteratorError(String),

    /// A file's size exceeds what the platform's size field can hold.
    OverflowError(PathBuf),

    /// The filter pipeline failed to load or apply for a path.
    FilterError(PathBuf),

    /// Submodule lookup failed during classification of a coincident path.
    ///
    /// Only fatal there; in one-sided delta construction this condition is
    /// caught and tolerated (substituted with a zero oid).
    SubmoduleError(PathBuf),

    /// A consumer callback (e.g. `stash::foreach`) requested early stop.
    UserAbort,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::NotARepository(path) => {
                write!(f, "not a git repository: {}", path.display())
            }
            Error::ObjectNotFound(oid) => write!(f, "object not found: {}", oid),
            Error::RefNotFound(name) => write!(f, "reference not found: {}", name),
            Error::PathNotFound(path) => write!(f, "path not found: {}", path.display()),
            Error::InvalidOid(s) => write!(f, "invalid object id: {}", s),
            Error::InvalidRefName(name) => write!(f, "invalid reference name: {}", name),
            Error::InvalidObject { oid, reason } => {
                write!(f, "invalid object {}: {}", oid, reason)
            }
            Error::InvalidIndex { version, reason } => {
                write!(f, "invalid index (version {}): {}", version, reason)
            }
            Error::TypeMismatch { expected, actual } => {
                write!(f, "type mismatch: expected {}, got {}", expected, actual)
            }
            Error::InvalidUtf8 => write!(f, "invalid UTF-8 sequence"),
            Error::DecompressionFailed => write!(f, "zlib decompression failed"),
            Error::RefAlreadyExists(name) => write!(f, "reference already exists: {}", name),
            Error::CannotDeleteCurrentBranch => write!(f, "cannot delete the current branch"),
            Error::EmptyCommit => write!(f, "nothing to commit"),
            Error::DirtyWorkingTree => write!(f, "working tree has uncommitted changes"),
            Error::ConfigNotFound(key) => write!(f, "configuration not found: {}", key),
            Error::AlreadyARepository(path) => {
                write!(f, "repository already exists: {}", path.display())
            }
            Error::OutOfMemory => write!(f, "out of memory"),
            Error::InvalidRepo(reason) => write!(f, "invalid repository: {}", reason),
            Error::IteratorError(reason) => write!(f, "diff source iterator failed: {}", reason),
            Error::OverflowError(path) => {
                write!(f, "file size overflow: {}", path.display())
            }
            Error::FilterError(path) => {
                write!(f, "filter pipeline failed for: {}", path.display())
            }
            Error::SubmoduleError(path) => {
                write!(f, "submodule lookup failed for: {}", path.display())
            }
            Error::UserAbort => write!(f, "aborted by caller"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for vcsdiff operations.
pub type Result<T> = std::result::Result<T, Error>;
