//! Reflog: an append-only, plain-text history of the values a reference
//! has pointed to.
//!
//! Real Git keeps one log file per ref under `.git/logs/<ref>`, one line
//! per update: `<old-oid> <new-oid> <name> <email> <timestamp> <tz>\t<action>:
//! <message>`. This module implements that line format well enough for the
//! stash composer's `refs/stash` bookkeeping; it does not hook into
//! ordinary ref updates (`update_head` et al. don't write reflogs, since
//! nothing else in this crate reads them).

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::infra::{read_file, write_file_atomic};
use crate::objects::Oid;

/// One line of a reference's reflog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflogEntry {
    pub old_oid: Oid,
    pub new_oid: Oid,
    pub committer_name: String,
    pub committer_email: String,
    pub timestamp: i64,
    pub action: String,
    pub message: String,
}

impl ReflogEntry {
    fn format(&self) -> String {
        format!(
            "{} {} {} <{}> {} +0000\t{}: {}\n",
            self.old_oid.to_hex(),
            self.new_oid.to_hex(),
            self.committer_name,
            self.committer_email,
            self.timestamp,
            self.action,
            self.message
        )
    }

    fn parse(line: &str) -> Result<Self> {
        let mut fields = line.splitn(2, '\t');
        let header = fields.next().unwrap_or_default();
        let rest = fields.next().unwrap_or_default();

        let mut header_parts = header.splitn(3, ' ');
        let old_hex = header_parts.next().unwrap_or_default();
        let new_hex = header_parts.next().unwrap_or_default();
        let signature_and_time = header_parts.next().unwrap_or_default();

        let email_start = signature_and_time.find('<');
        let email_end = signature_and_time.find('>');
        let (committer_name, committer_email, timestamp) = match (email_start, email_end) {
            (Some(s), Some(e)) if e > s => {
                let name = signature_and_time[..s].trim().to_string();
                let email = signature_and_time[s + 1..e].to_string();
                let timestamp = signature_and_time[e + 1..]
                    .split_whitespace()
                    .next()
                    .and_then(|s| s.parse::<i64>().ok())
                    .unwrap_or(0);
                (name, email, timestamp)
            }
            _ => (String::new(), String::new(), 0),
        };

        let mut action_and_message = rest.splitn(2, ": ");
        let action = action_and_message.next().unwrap_or_default().to_string();
        let message = action_and_message.next().unwrap_or_default().to_string();

        Ok(ReflogEntry {
            old_oid: Oid::from_hex(old_hex)?,
            new_oid: Oid::from_hex(new_hex)?,
            committer_name,
            committer_email,
            timestamp,
            action,
            message,
        })
    }
}

fn log_path(git_dir: &Path, ref_name: &str) -> PathBuf {
    git_dir.join("logs").join(ref_name)
}

/// Appends one entry to `ref_name`'s reflog, creating the log file (and
/// its parent directories) if this is the first entry.
pub(crate) fn append(git_dir: &Path, ref_name: &str, entry: &ReflogEntry) -> Result<()> {
    let path = log_path(git_dir, ref_name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut content = if path.exists() {
        String::from_utf8_lossy(&read_file(&path)?).into_owned()
    } else {
        String::new()
    };
    content.push_str(&entry.format());
    write_file_atomic(&path, content.as_bytes())
}

/// Reads every entry for `ref_name`, oldest first (the order they appear
/// on disk).
pub(crate) fn read_all(git_dir: &Path, ref_name: &str) -> Result<Vec<ReflogEntry>> {
    let path = log_path(git_dir, ref_name);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = String::from_utf8_lossy(&read_file(&path)?).into_owned();
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(ReflogEntry::parse)
        .collect()
}

/// Removes the entry at `newest_first_index` (0 = most recent) from
/// `ref_name`'s reflog. Returns `Ok(true)` iff the removed entry was the
/// last one, signalling the caller should delete the ref itself.
pub(crate) fn remove_at(git_dir: &Path, ref_name: &str, newest_first_index: usize) -> Result<bool> {
    let mut entries = read_all(git_dir, ref_name)?;
    // Stored oldest-first on disk; stash addresses entries newest-first.
    entries.reverse();
    if newest_first_index >= entries.len() {
        return Err(Error::RefNotFound(format!(
            "no stash entry at index {}",
            newest_first_index
        )));
    }
    entries.remove(newest_first_index);
    let now_empty = entries.is_empty();

    entries.reverse();
    let path = log_path(git_dir, ref_name);
    if now_empty {
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        return Ok(true);
    }

    let content: String = entries.iter().map(|e| e.format()).collect();
    write_file_atomic(&path, content.as_bytes())?;
    Ok(false)
}
