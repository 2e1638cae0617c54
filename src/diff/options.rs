//! Diff option flags and the capability bits resolved from repo config.

use crate::config::Config;

/// Flags controlling how the merge-join driver classifies and emits deltas.
///
/// Builder-style setters mirror [`crate::log::LogOptions`]: construct with
/// [`DiffOptions::new`], chain the flags that matter, pass by value.
#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    reverse: bool,
    include_unmodified: bool,
    include_ignored: bool,
    include_untracked: bool,
    include_typechange: bool,
    include_typechange_trees: bool,
    recurse_untracked_dirs: bool,
    ignore_submodules: bool,
    ignore_filemode: bool,
    disable_pathspec_match: bool,
    deltas_are_icase: bool,
    old_prefix: Option<String>,
    new_prefix: Option<String>,
    pathspec: Vec<String>,
}

impl DiffOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reverse(mut self, yes: bool) -> Self {
        self.reverse = yes;
        self
    }

    pub fn include_unmodified(mut self, yes: bool) -> Self {
        self.include_unmodified = yes;
        self
    }

    pub fn include_ignored(mut self, yes: bool) -> Self {
        self.include_ignored = yes;
        self
    }

    pub fn include_untracked(mut self, yes: bool) -> Self {
        self.include_untracked = yes;
        self
    }

    pub fn include_typechange(mut self, yes: bool) -> Self {
        self.include_typechange = yes;
        self
    }

    pub fn include_typechange_trees(mut self, yes: bool) -> Self {
        self.include_typechange_trees = yes;
        self
    }

    pub fn recurse_untracked_dirs(mut self, yes: bool) -> Self {
        self.recurse_untracked_dirs = yes;
        self
    }

    pub fn ignore_submodules(mut self, yes: bool) -> Self {
        self.ignore_submodules = yes;
        self
    }

    pub fn ignore_filemode(mut self, yes: bool) -> Self {
        self.ignore_filemode = yes;
        self
    }

    pub fn disable_pathspec_match(mut self, yes: bool) -> Self {
        self.disable_pathspec_match = yes;
        self
    }

    pub fn deltas_are_icase(mut self, yes: bool) -> Self {
        self.deltas_are_icase = yes;
        self
    }

    pub fn pathspec(mut self, patterns: Vec<String>) -> Self {
        self.pathspec = patterns;
        self
    }

    pub fn old_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.old_prefix = Some(prefix.into());
        self
    }

    pub fn new_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.new_prefix = Some(prefix.into());
        self
    }

    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    pub fn wants_unmodified(&self) -> bool {
        self.include_unmodified
    }

    pub fn wants_ignored(&self) -> bool {
        self.include_ignored
    }

    pub fn wants_untracked(&self) -> bool {
        self.include_untracked
    }

    pub fn wants_typechange(&self) -> bool {
        self.include_typechange
    }

    pub fn wants_typechange_trees(&self) -> bool {
        self.include_typechange_trees
    }

    pub fn wants_recurse_untracked_dirs(&self) -> bool {
        self.recurse_untracked_dirs
    }

    pub fn ignores_submodules(&self) -> bool {
        self.ignore_submodules
    }

    pub fn ignores_filemode(&self) -> bool {
        self.ignore_filemode
    }

    pub fn pathspec_disabled(&self) -> bool {
        self.disable_pathspec_match
    }

    pub fn icase(&self) -> bool {
        self.deltas_are_icase
    }

    pub fn patterns(&self) -> &[String] {
        &self.pathspec
    }

    /// The `old_prefix`/`new_prefix` actually used, applying the default
    /// (`a/`/`b/`) and the REVERSE swap.
    pub fn resolved_prefixes(&self) -> (String, String) {
        let old = self.old_prefix.clone().unwrap_or_else(|| "a/".to_string());
        let new = self.new_prefix.clone().unwrap_or_else(|| "b/".to_string());
        let old = ensure_trailing_slash(old);
        let new = ensure_trailing_slash(new);
        if self.reverse {
            (new, old)
        } else {
            (old, new)
        }
    }
}

fn ensure_trailing_slash(mut s: String) -> String {
    if !s.is_empty() && !s.ends_with('/') {
        s.push('/');
    }
    s
}

/// Repository capability bits, resolved once from config and held fixed for
/// the lifetime of a single diff run.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    /// `core.symlinks`: whether the filesystem honors real symlinks.
    pub has_symlinks: bool,
    /// `core.ignorestat`: treat every index entry's worktree copy as
    /// unconditionally unchanged (skip stat comparison entirely).
    pub assume_unchanged: bool,
    /// `core.filemode`, further cleared by `IGNORE_FILEMODE`: whether the
    /// executable bit is trustworthy.
    pub trust_mode_bits: bool,
    /// `core.trustctime`: whether ctime participates in the stat-tuple fast
    /// path.
    pub trust_ctime: bool,
    /// Whether device number participates in the stat-tuple fast path.
    pub use_dev: bool,
}

impl Capabilities {
    /// Resolves capability bits from repo config, applying the documented
    /// defaults when a key is absent (`get_bool` alone can't distinguish
    /// "absent" from "explicitly false", so presence is checked first).
    pub fn resolve(config: &Config, opts: &DiffOptions) -> Self {
        let has_symlinks = bool_with_default(config, "core", "symlinks", cfg!(unix));
        let ignorestat = bool_with_default(config, "core", "ignorestat", false);
        let filemode = bool_with_default(config, "core", "filemode", true);
        let trustctime = bool_with_default(config, "core", "trustctime", true);

        Capabilities {
            has_symlinks,
            assume_unchanged: ignorestat,
            trust_mode_bits: filemode && !opts.ignores_filemode(),
            trust_ctime: trustctime,
            use_dev: true,
        }
    }
}

fn bool_with_default(config: &Config, section: &str, key: &str, default: bool) -> bool {
    match config.get(section, key) {
        Some(_) => config.get_bool(section, key).unwrap_or(default),
        None => default,
    }
}
