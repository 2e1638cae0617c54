//! Pathspec glob matching for filtering which paths the engine emits.
//!
//! Built on `ignore::gitignore`, the same glob engine the rest of the pack
//! reaches for when it needs gitignore-style matching. When
//! `DISABLE_PATHSPEC_MATCH` is set (or no patterns were given), matching
//! falls back to a plain literal-prefix check, or matches everything if
//! the pattern list is empty.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::{Error, Result};

enum Matcher {
    MatchAll,
    LiteralPrefix { prefixes: Vec<String>, icase: bool },
    Glob(Gitignore),
}

/// A compiled set of path-filtering patterns.
pub struct Pathspec {
    matcher: Matcher,
}

impl Pathspec {
    /// Compiles `patterns` into a matcher. `disable_literal` selects the
    /// literal-prefix fallback instead of glob matching; `icase` selects
    /// case-insensitive matching in either mode.
    pub fn new(patterns: &[String], disable_literal: bool, icase: bool) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(Pathspec {
                matcher: Matcher::MatchAll,
            });
        }

        if disable_literal {
            return Ok(Pathspec {
                matcher: Matcher::LiteralPrefix {
                    prefixes: patterns.to_vec(),
                    icase,
                },
            });
        }

        let mut builder = GitignoreBuilder::new("/");
        for pattern in patterns {
            builder
                .add_line(None, pattern)
                .map_err(|e| Error::InvalidRepo(e.to_string()))?;
        }
        if icase {
            builder
                .case_insensitive(true)
                .map_err(|e| Error::InvalidRepo(e.to_string()))?;
        }
        let matcher = builder.build().map_err(|e| Error::InvalidRepo(e.to_string()))?;

        Ok(Pathspec {
            matcher: Matcher::Glob(matcher),
        })
    }

    /// The pathspec that matches every path (no filtering).
    pub fn match_all() -> Self {
        Pathspec {
            matcher: Matcher::MatchAll,
        }
    }

    pub fn is_match(&self, path: &Path, is_dir: bool) -> bool {
        match &self.matcher {
            Matcher::MatchAll => true,
            Matcher::LiteralPrefix { prefixes, icase } => {
                let p = path.to_string_lossy();
                let p = if *icase { p.to_ascii_lowercase() } else { p.into_owned() };
                prefixes.iter().any(|prefix| {
                    let prefix = if *icase {
                        prefix.to_ascii_lowercase()
                    } else {
                        prefix.clone()
                    };
                    p.starts_with(&prefix)
                })
            }
            Matcher::Glob(gitignore) => gitignore.matched(path, is_dir).is_ignore(),
        }
    }
}
