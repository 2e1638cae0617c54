//! Content filters applied between the working tree and the object
//! database.
//!
//! Git calls this pair of transforms "clean" (workdir → ODB) and "smudge"
//! (ODB → workdir); this crate only ever needs the clean direction, since
//! the diff engine hashes working-tree content to compare it against a
//! stored oid and never writes files back out. The pipeline is driven by
//! a minimal `.gitattributes` reader: a line `pattern attr...` assigns
//! attributes to paths matching `pattern`, and the only attribute this
//! crate understands is `text` (git's builtin CRLF normalization).

use std::path::Path;

use crate::error::Result;

/// A single content transform applied before hashing a working-tree file.
pub(crate) trait FilterPipeline {
    /// Transforms workdir content into the bytes that would be hashed and
    /// stored as a blob.
    fn to_odb(&self, content: &[u8]) -> Result<Vec<u8>>;
}

/// The default pipeline: hash exactly what's on disk.
struct Passthrough;

impl FilterPipeline for Passthrough {
    fn to_odb(&self, content: &[u8]) -> Result<Vec<u8>> {
        Ok(content.to_vec())
    }
}

/// Normalizes CRLF line endings to LF, mirroring Git's `text=auto` clean
/// filter. Applied only to paths a `.gitattributes` in an ancestor
/// directory marks `text`.
struct CrlfNormalize;

impl FilterPipeline for CrlfNormalize {
    fn to_odb(&self, content: &[u8]) -> Result<Vec<u8>> {
        if !content.contains(&b'\r') {
            return Ok(content.to_vec());
        }
        let mut out = Vec::with_capacity(content.len());
        let mut i = 0;
        while i < content.len() {
            if content[i] == b'\r' && content.get(i + 1) == Some(&b'\n') {
                out.push(b'\n');
                i += 2;
            } else {
                out.push(content[i]);
                i += 1;
            }
        }
        Ok(out)
    }
}

/// One `pattern attr` line parsed out of a `.gitattributes` file.
struct AttrRule {
    pattern: String,
    text: bool,
}

fn parse_gitattributes(content: &str) -> Vec<AttrRule> {
    let mut rules = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let Some(pattern) = parts.next() else {
            continue;
        };
        let text = parts.any(|attr| attr == "text" || attr == "text=auto");
        rules.push(AttrRule {
            pattern: pattern.to_string(),
            text,
        });
    }
    rules
}

/// Walks from `path`'s directory up to the filesystem root looking for a
/// `.gitattributes` file that marks `path` as `text`.
fn path_is_text(path: &Path) -> bool {
    let file_name = match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => return false,
    };

    let mut dir = path.parent();
    while let Some(d) = dir {
        let attrs_path = d.join(".gitattributes");
        if let Ok(content) = std::fs::read_to_string(&attrs_path) {
            for rule in parse_gitattributes(&content) {
                if rule.pattern == file_name || rule.pattern == "*" {
                    return rule.text;
                }
            }
        }
        dir = d.parent();
    }
    false
}

/// Picks the filter pipeline for `path`: CRLF normalization if some
/// ancestor `.gitattributes` marks it `text`, passthrough otherwise.
pub(crate) fn pipeline_for(path: &Path) -> Box<dyn FilterPipeline> {
    if path_is_text(path) {
        Box::new(CrlfNormalize)
    } else {
        Box::new(Passthrough)
    }
}
