// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Loader configuration
//!
//! The search path is read from the environment exactly once and carried as an
//! immutable value afterwards. Nothing in the resolver reads the environment.

use std::ffi::OsStr;
use tracing::warn;

/// Environment variable holding the module search path
pub const SEARCH_PATH_VAR: &str = "SPACEY_PATH";

/// Separator between entries of the search path variable
#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: char = ';';
/// Separator between entries of the search path variable
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: char = ':';

/// Default upper bound for a joined candidate path, in bytes
pub const DEFAULT_MAX_CANDIDATE_LEN: usize = 4096;

/// Ordered list of root directories used to resolve bare specifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    roots: Vec<String>,
}

impl SearchPath {
    /// An empty search path; bare specifiers never resolve through it
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a delimited search path value
    ///
    /// Empty entries are skipped and trailing directory separators are
    /// stripped from each root. Order is preserved.
    pub fn parse(value: &str) -> Self {
        let roots = value
            .split(PATH_LIST_SEPARATOR)
            .filter(|entry| !entry.is_empty())
            .map(|entry| strip_trailing_separators(entry).to_string())
            .collect();
        Self { roots }
    }

    /// Build a search path from explicit roots
    pub fn from_roots<I, S>(roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let roots = roots
            .into_iter()
            .filter(|root| !root.as_ref().is_empty())
            .map(|root| strip_trailing_separators(root.as_ref()).to_string())
            .collect();
        Self { roots }
    }

    /// Parse a search path value that may not be UTF-8
    ///
    /// Roots that are not valid UTF-8 are skipped with a warning instead of
    /// being lossily rewritten into a different path.
    pub fn from_os(value: &OsStr) -> Self {
        if let Some(value) = value.to_str() {
            return Self::parse(value);
        }
        let roots = std::env::split_paths(value).filter_map(|root| match root.to_str() {
            Some(root) => Some(root.to_string()),
            None => {
                warn!(root = %root.display(), "skipping search path root that is not UTF-8");
                None
            }
        });
        Self::from_roots(roots)
    }

    /// Snapshot a search path from an environment variable
    ///
    /// An unset variable gives an empty search path.
    pub fn from_env(var: impl AsRef<OsStr>) -> Self {
        match std::env::var_os(var) {
            Some(value) => Self::from_os(&value),
            None => Self::empty(),
        }
    }

    /// Iterate roots in priority order
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.roots.iter().map(String::as_str)
    }

    /// Number of roots
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether the search path has no roots
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Strip trailing `/` (and `\` on Windows) from a root
///
/// A root consisting only of separators becomes empty, so joining it with a
/// name yields `/name`.
fn strip_trailing_separators(root: &str) -> &str {
    if cfg!(windows) {
        root.trim_end_matches(['/', '\\'])
    } else {
        root.trim_end_matches('/')
    }
}

/// Immutable configuration for a resolver
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Roots for bare specifiers
    pub search_path: SearchPath,
    /// Retry a bare specifier as a cwd-relative path when the search path misses
    pub bare_path_fallback: bool,
    /// Longest candidate path the probe will build
    pub max_candidate_len: usize,
}

impl LoaderConfig {
    /// Configuration with the given search path and default settings
    pub fn new(search_path: SearchPath) -> Self {
        Self {
            search_path,
            bare_path_fallback: true,
            max_candidate_len: DEFAULT_MAX_CANDIDATE_LEN,
        }
    }

    /// Configuration snapshotted from [`SEARCH_PATH_VAR`]
    pub fn from_env() -> Self {
        Self::new(SearchPath::from_env(SEARCH_PATH_VAR))
    }

    /// Enable or disable the bare-to-path fallback
    pub fn with_bare_path_fallback(mut self, enabled: bool) -> Self {
        self.bare_path_fallback = enabled;
        self
    }

    /// Override the candidate path limit
    pub fn with_max_candidate_len(mut self, max: usize) -> Self {
        self.max_candidate_len = max;
        self
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self::new(SearchPath::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_order() {
        let value = format!("./mods{0}./lib{0}/opt/js", PATH_LIST_SEPARATOR);
        let path = SearchPath::parse(&value);
        assert_eq!(path.roots().collect::<Vec<_>>(), vec!["./mods", "./lib", "/opt/js"]);
    }

    #[test]
    fn test_parse_strips_trailing_separators_and_empty_entries() {
        let value = format!("./mods/{0}{0}./lib//", PATH_LIST_SEPARATOR);
        let path = SearchPath::parse(&value);
        assert_eq!(path.roots().collect::<Vec<_>>(), vec!["./mods", "./lib"]);
    }

    #[test]
    fn test_empty_value() {
        assert!(SearchPath::parse("").is_empty());
        assert!(SearchPath::from_env("SPACEY_PATH_TEST_SURELY_UNSET").is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_root_is_skipped() {
        use std::os::unix::ffi::OsStrExt;

        let value = OsStr::from_bytes(b"/good/:/bad\xff:/also-good");
        let path = SearchPath::from_os(value);
        assert_eq!(path.roots().collect::<Vec<_>>(), vec!["/good", "/also-good"]);

        assert_eq!(SearchPath::from_os(OsStr::new("/a:/b")), SearchPath::parse("/a:/b"));
    }

    #[test]
    fn test_config_defaults() {
        let config = LoaderConfig::default();
        assert!(config.search_path.is_empty());
        assert!(config.bare_path_fallback);
        assert_eq!(config.max_candidate_len, DEFAULT_MAX_CANDIDATE_LEN);
    }
}
