// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Bare specifier resolution over the search path

use crate::config::SearchPath;
use crate::error::Result;
use crate::module_system::probe::{FsProbe, ProbeForm, SEARCH_PROBE_ORDER};
use std::path::PathBuf;
use tracing::trace;

/// A file found under one search root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Root the file was found under, as configured
    pub root: String,
    /// The file that matched
    pub path: PathBuf,
    /// Which form matched
    pub form: ProbeForm,
}

/// Resolves bare names against an ordered list of roots
#[derive(Debug, Clone, Copy)]
pub struct SearchPathResolver<'a> {
    search_path: &'a SearchPath,
    probe: FsProbe,
}

impl<'a> SearchPathResolver<'a> {
    /// Create a resolver over `search_path`
    pub fn new(search_path: &'a SearchPath, probe: FsProbe) -> Self {
        Self { search_path, probe }
    }

    /// Find `name` under the first root that has it
    ///
    /// Each root is tried as `root/name/index.js`, `root/name.js` and then
    /// `root/name`. A root that misses is skipped silently.
    pub fn resolve(&self, name: &str) -> Result<Option<SearchHit>> {
        self.resolve_with(name, SEARCH_PROBE_ORDER)
    }

    /// Find `name` under the first root that has it, probing forms in `order`
    pub fn resolve_with(&self, name: &str, order: &[ProbeForm]) -> Result<Option<SearchHit>> {
        for root in self.search_path.roots() {
            if let Some(hit) = self.probe_root(root, name, order)? {
                return Ok(Some(hit));
            }
        }
        Ok(None)
    }

    /// Probe `name` under a single root
    pub fn probe_root(&self, root: &str, name: &str, order: &[ProbeForm]) -> Result<Option<SearchHit>> {
        let base = format!("{root}/{name}");
        let Some(hit) = self.probe.probe(&base, order)? else {
            return Ok(None);
        };
        trace!(root, name, path = %hit.path.display(), "search path hit");
        Ok(Some(SearchHit {
            root: root.to_string(),
            path: hit.path,
            form: hit.form,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module_system::probe::DIRECT_PROBE_ORDER;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_first_root_wins() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        fs::write(first.path().join("utils.js"), "first").unwrap();
        fs::write(second.path().join("utils.js"), "second").unwrap();

        let search = SearchPath::from_roots([
            first.path().to_string_lossy(),
            second.path().to_string_lossy(),
        ]);
        let resolver = SearchPathResolver::new(&search, FsProbe::new(4096));
        let hit = resolver.resolve("utils").unwrap().unwrap();
        assert!(hit.path.starts_with(first.path()));
    }

    #[test]
    fn test_falls_through_to_later_root() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        fs::create_dir_all(second.path().join("node")).unwrap();
        fs::write(second.path().join("node/fs.js"), "").unwrap();

        let search = SearchPath::from_roots([
            first.path().to_string_lossy(),
            second.path().to_string_lossy(),
        ]);
        let resolver = SearchPathResolver::new(&search, FsProbe::new(4096));
        let hit = resolver.resolve("node/fs").unwrap().unwrap();
        assert_eq!(hit.form, ProbeForm::Extension);
        assert!(hit.path.starts_with(second.path()));
    }

    #[test]
    fn test_empty_search_path() {
        let search = SearchPath::empty();
        let resolver = SearchPathResolver::new(&search, FsProbe::new(4096));
        assert_eq!(resolver.resolve("anything").unwrap(), None);
    }

    #[test]
    fn test_trailing_separator_root() {
        let root = tempdir().unwrap();
        fs::write(root.path().join("mod.js"), "").unwrap();

        let search = SearchPath::from_roots([format!("{}/", root.path().display())]);
        let resolver = SearchPathResolver::new(&search, FsProbe::new(4096));
        let hit = resolver.resolve("mod").unwrap().unwrap();
        assert!(!hit.path.to_string_lossy().contains("//"));
    }

    #[test]
    fn test_hit_records_root() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        fs::write(second.path().join("tool.js"), "").unwrap();

        let second_root = second.path().to_string_lossy().to_string();
        let search = SearchPath::from_roots([first.path().to_string_lossy().to_string(), second_root.clone()]);
        let resolver = SearchPathResolver::new(&search, FsProbe::new(4096));
        assert_eq!(resolver.resolve("tool").unwrap().unwrap().root, second_root);
    }

    #[test]
    fn test_direct_order_under_one_root() {
        let root = tempdir().unwrap();
        fs::create_dir(root.path().join("pkg")).unwrap();
        fs::write(root.path().join("pkg/util"), "exact").unwrap();
        fs::write(root.path().join("pkg/util.js"), "extension").unwrap();

        let search = SearchPath::empty();
        let resolver = SearchPathResolver::new(&search, FsProbe::new(4096));
        let hit = resolver
            .probe_root(&root.path().to_string_lossy(), "pkg/util", DIRECT_PROBE_ORDER)
            .unwrap()
            .unwrap();
        assert_eq!(hit.form, ProbeForm::Exact);
    }
}
