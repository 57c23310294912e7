// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Static module graph linking
//!
//! Walks a module's static imports through the loader the way an engine
//! does while parsing: depth-first, in declaration order, each import fully
//! resolved before the next. Modules land in evaluation order (dependencies
//! first). A module already linked or still being linked is not loaded again,
//! which also terminates import cycles.

use crate::error::Result;
use crate::module_system::loader::ModuleLoader;
use crate::module_system::meta::ModuleMeta;
use crate::module_system::resolver::Origin;
use crate::module_system::scan::scan_module;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::debug;

/// A module linked into a context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedModule {
    /// Identity of the module
    pub meta: ModuleMeta,
    /// Where its content came from
    pub origin: Origin,
    /// File it was read from, if any
    pub path: Option<PathBuf>,
    /// Keys of its static imports, in declaration order
    pub imports: Vec<String>,
    /// Names it exports
    pub exports: Vec<String>,
    /// Literal `import()` targets, linked only on demand
    pub dynamic_imports: Vec<String>,
}

/// Per-context module map
pub struct Linker<'a> {
    loader: &'a ModuleLoader,
    index: HashMap<String, usize>,
    modules: Vec<LinkedModule>,
    linking: HashSet<String>,
}

impl<'a> Linker<'a> {
    /// Create an empty context over `loader`
    pub fn new(loader: &'a ModuleLoader) -> Self {
        Self {
            loader,
            index: HashMap::new(),
            modules: Vec::new(),
            linking: HashSet::new(),
        }
    }

    /// Link a top-level module, resolved against the working directory
    pub fn link_entry(&mut self, specifier: &str) -> Result<String> {
        self.link(specifier, None)
    }

    /// Link a module requested by `import()` at run time
    pub fn import_dynamic(&mut self, specifier: &str, referrer: &ModuleMeta) -> Result<String> {
        self.link(specifier, Some(referrer))
    }

    /// Linked modules in evaluation order
    pub fn modules(&self) -> &[LinkedModule] {
        &self.modules
    }

    /// Look up a linked module by key
    pub fn get(&self, key: &str) -> Option<&LinkedModule> {
        self.index.get(key).map(|&idx| &self.modules[idx])
    }

    fn link(&mut self, specifier: &str, referrer: Option<&ModuleMeta>) -> Result<String> {
        let loaded = self.loader.load(specifier, referrer)?;
        let key = loaded.meta.key.clone();

        if self.index.contains_key(&key) || self.linking.contains(&key) {
            return Ok(key);
        }
        self.linking.insert(key.clone());

        let scan = scan_module(&loaded.source_text());
        let mut imports = Vec::new();
        for child in scan.static_specifiers() {
            imports.push(self.link(child, Some(&loaded.meta))?);
        }

        debug!(key = %key, origin = %loaded.origin, imports = imports.len(), "linked module");

        self.linking.remove(&key);
        self.index.insert(key.clone(), self.modules.len());
        self.modules.push(LinkedModule {
            meta: loaded.meta,
            origin: loaded.origin,
            path: loaded.path,
            imports,
            exports: scan.exported_names(),
            dynamic_imports: scan.dynamic_imports,
        });
        Ok(key)
    }
}
