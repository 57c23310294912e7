// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module identity shared by embedded and filesystem-backed modules

use crate::module_system::key::{parent_key, path_key, CWD_KEY};
use crate::module_system::probe::ProbeForm;
use serde::Serialize;
use std::fmt;

/// Which resolution space a module's key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Keyed by its bare name, found under a search path root
    Search,
    /// Keyed by a path relative to the working directory or absolute
    Filesystem,
}

impl Namespace {
    /// Tag byte used in the embedded table
    pub fn to_tag(self) -> u8 {
        match self {
            Namespace::Search => 0,
            Namespace::Filesystem => 1,
        }
    }

    /// Parse a tag byte from the embedded table
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Namespace::Search),
            1 => Some(Namespace::Filesystem),
            _ => None,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Namespace::Search => "search",
            Namespace::Filesystem => "filesystem",
        })
    }
}

/// Directory a module's relative imports are resolved against
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseDir {
    /// Space the directory key lives in
    pub namespace: Namespace,
    /// Directory key
    pub dir: String,
    /// Search root the directory lives under, for search-path modules
    pub root: Option<String>,
}

impl BaseDir {
    /// The process working directory
    pub fn cwd() -> Self {
        Self {
            namespace: Namespace::Filesystem,
            dir: CWD_KEY.to_string(),
            root: None,
        }
    }

    /// A filesystem directory, normalized into a key
    pub fn filesystem(dir: &str) -> Self {
        Self {
            namespace: Namespace::Filesystem,
            dir: path_key(dir),
            root: None,
        }
    }
}

impl Default for BaseDir {
    fn default() -> Self {
        Self::cwd()
    }
}

/// Identity of a resolved module
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ModuleMeta {
    /// Canonical key; also the module's full identity
    pub key: String,
    /// Directory key for the module's own relative imports
    pub dirname: String,
    /// Space `key` and `dirname` live in
    pub namespace: Namespace,
    /// Search root the module was read from
    ///
    /// Its relative imports are probed under this root only. Not part of the
    /// identity recorded in the embedded table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
}

impl ModuleMeta {
    /// Identity for a module found by probing `key`
    ///
    /// An index-style hit makes the key itself the directory, any other
    /// form uses the key's parent.
    pub fn from_probe(key: String, namespace: Namespace, form: ProbeForm) -> Self {
        let dirname = match form {
            ProbeForm::Index => key.clone(),
            ProbeForm::Exact | ProbeForm::Extension => parent_key(&key),
        };
        Self {
            key,
            dirname,
            namespace,
            root: None,
        }
    }

    /// Record the search root the module was found under
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Identity for a module supplied by the host engine
    pub fn engine(specifier: &str) -> Self {
        Self {
            key: specifier.to_string(),
            dirname: CWD_KEY.to_string(),
            namespace: Namespace::Filesystem,
            root: None,
        }
    }

    /// Base directory for this module's relative imports
    pub fn base_dir(&self) -> BaseDir {
        BaseDir {
            namespace: self.namespace,
            dir: self.dirname.clone(),
            root: self.root.clone(),
        }
    }

    /// import.meta view of this module
    pub fn import_meta(&self, is_main: bool) -> ImportMeta {
        ImportMeta {
            filename: self.key.clone(),
            dirname: self.dirname.clone(),
            main: is_main,
        }
    }
}

/// import.meta object exposed to a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportMeta {
    /// Full identity of the module
    pub filename: String,
    /// Containing directory of the module
    pub dirname: String,
    /// Whether this is the entry module
    pub main: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_module_is_its_own_directory() {
        let meta = ModuleMeta::from_probe("math".to_string(), Namespace::Search, ProbeForm::Index);
        assert_eq!(meta.dirname, "math");

        let meta =
            ModuleMeta::from_probe("node/fs".to_string(), Namespace::Search, ProbeForm::Extension);
        assert_eq!(meta.dirname, "node");
    }

    #[test]
    fn test_import_meta() {
        let meta = ModuleMeta::from_probe(
            "./app/lib/util".to_string(),
            Namespace::Filesystem,
            ProbeForm::Extension,
        );
        let import_meta = meta.import_meta(true);
        assert_eq!(import_meta.filename, "./app/lib/util");
        assert_eq!(import_meta.dirname, "./app/lib");
        assert!(import_meta.main);
    }

    #[test]
    fn test_base_dir_keeps_search_root() {
        let meta = ModuleMeta::from_probe("mathp".to_string(), Namespace::Search, ProbeForm::Index)
            .with_root("/opt/mods");
        let base = meta.base_dir();
        assert_eq!(base.dir, "mathp");
        assert_eq!(base.root.as_deref(), Some("/opt/mods"));
        assert_eq!(BaseDir::filesystem("app/").dir, "./app");
    }

    #[test]
    fn test_namespace_tags() {
        for ns in [Namespace::Search, Namespace::Filesystem] {
            assert_eq!(Namespace::from_tag(ns.to_tag()), Some(ns));
        }
        assert_eq!(Namespace::from_tag(7), None);
    }
}
