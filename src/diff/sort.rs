//! Sort discipline and the case-folding bridge between sources that
//! disagree on case sensitivity.
//!
//! The merge-join driver walks two sources in lockstep assuming both agree
//! on one total order over paths. When they don't (e.g. a case-sensitive
//! tree against a case-insensitive workdir filesystem), the side that
//! disagrees with the chosen policy is spooled: its remaining entries are
//! materialized into memory and re-sorted under the policy everyone else
//! uses for the rest of the run.

use std::cmp::Ordering;
use std::path::Path;

/// Whether path comparisons fold ASCII case. No locale-aware folding is
/// attempted; this matches a plain `git` checkout's own ASCII-only
/// case-insensitive mode (`core.ignorecase`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasePolicy {
    Sensitive,
    Insensitive,
}

/// The comparator bundle carried by a single diff run: `strcmp`,
/// `strncmp`, `prefixcmp`, `entrycmp`, all parameterized by one
/// [`CasePolicy`] chosen once at the start of the run.
#[derive(Debug, Clone, Copy)]
pub struct Comparators {
    pub case_policy: CasePolicy,
}

impl Comparators {
    pub fn new(case_policy: CasePolicy) -> Self {
        Comparators { case_policy }
    }

    pub fn strcmp(&self, a: &str, b: &str) -> Ordering {
        match self.case_policy {
            CasePolicy::Sensitive => a.cmp(b),
            CasePolicy::Insensitive => fold(a).cmp(&fold(b)),
        }
    }

    pub fn strncmp(&self, a: &str, b: &str, n: usize) -> Ordering {
        let ta: String = a.chars().take(n).collect();
        let tb: String = b.chars().take(n).collect();
        self.strcmp(&ta, &tb)
    }

    pub fn prefixcmp(&self, s: &str, prefix: &str) -> bool {
        match self.case_policy {
            CasePolicy::Sensitive => s.starts_with(prefix),
            CasePolicy::Insensitive => fold(s).starts_with(&fold(prefix)),
        }
    }

    pub fn entrycmp(&self, a: &Path, b: &Path) -> Ordering {
        self.strcmp(&a.to_string_lossy(), &b.to_string_lossy())
    }

    /// Whether `candidate` lives inside the subtree rooted at `root`, i.e.
    /// `candidate` has `root` as a proper path prefix (`root/...`).
    pub fn subtree_of(&self, root: &Path, candidate: &Path) -> bool {
        let prefix = format!("{}/", root.to_string_lossy());
        self.prefixcmp(&candidate.to_string_lossy(), &prefix)
    }
}

fn fold(s: &str) -> String {
    s.chars().map(|c| c.to_ascii_lowercase()).collect()
}

/// What spooling (if any) a pair of sources requires, given each source's
/// own `ignore_case` attribute.
///
/// Both sensitive: sensitive comparators, nobody spools. Either
/// insensitive: insensitive comparators; whichever side is (still)
/// case-sensitive must be spooled and re-sorted to match.
#[derive(Debug, Clone, Copy)]
pub struct SortDecision {
    pub policy: CasePolicy,
    pub spool_old: bool,
    pub spool_new: bool,
}

pub fn decide(old_icase: bool, new_icase: bool) -> SortDecision {
    if !old_icase && !new_icase {
        SortDecision {
            policy: CasePolicy::Sensitive,
            spool_old: false,
            spool_new: false,
        }
    } else {
        SortDecision {
            policy: CasePolicy::Insensitive,
            spool_old: !old_icase,
            spool_new: !new_icase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_strcmp() {
        let cmp = Comparators::new(CasePolicy::Sensitive);
        assert_eq!(cmp.strcmp("A", "a"), Ordering::Less);
        assert_eq!(cmp.strcmp("abc", "abc"), Ordering::Equal);
    }

    #[test]
    fn test_insensitive_strcmp() {
        let cmp = Comparators::new(CasePolicy::Insensitive);
        assert_eq!(cmp.strcmp("A", "a"), Ordering::Equal);
        assert_eq!(cmp.strcmp("ABC", "abd"), Ordering::Less);
    }

    #[test]
    fn test_prefixcmp() {
        let cmp = Comparators::new(CasePolicy::Insensitive);
        assert!(cmp.prefixcmp("SRC/main.rs", "src/"));
        assert!(!cmp.prefixcmp("srcfile", "src/"));
    }

    #[test]
    fn test_decide_both_sensitive() {
        let d = decide(false, false);
        assert_eq!(d.policy, CasePolicy::Sensitive);
        assert!(!d.spool_old && !d.spool_new);
    }

    #[test]
    fn test_decide_mixed_spools_sensitive_side() {
        let d = decide(false, true);
        assert_eq!(d.policy, CasePolicy::Insensitive);
        assert!(d.spool_old);
        assert!(!d.spool_new);
    }

    #[test]
    fn test_decide_both_insensitive() {
        let d = decide(true, true);
        assert_eq!(d.policy, CasePolicy::Insensitive);
        assert!(!d.spool_old && !d.spool_new);
    }
}
