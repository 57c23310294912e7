// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Build-time dependency discovery
//!
//! Breadth-first walk over static imports starting from the entry modules
//! and the force-embed list. Every edge is resolved with the same resolver
//! the runtime uses, so the keys recorded here are the keys the runtime will
//! look up.

use crate::error::{ModpathError, Result};
use crate::module_system::loader::read_resolved;
use crate::module_system::meta::{BaseDir, ModuleMeta};
use crate::module_system::resolver::{ModuleResolver, Origin, ResolvedModule};
use crate::module_system::scan::scan_module;
use bytes::Bytes;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::path::PathBuf;
use tracing::{debug, warn};

/// A module selected for embedding
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredModule {
    /// Identity the runtime will look it up by
    pub meta: ModuleMeta,
    /// File the source was read from
    pub path: Option<PathBuf>,
    /// Module source
    #[serde(skip)]
    pub source: Bytes,
    /// Keys of embedded modules it imports statically
    pub imports: Vec<String>,
}

/// A static import that did not resolve at build time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedImport {
    /// Key of the importing module
    pub importer: String,
    /// Specifier as written
    pub specifier: String,
}

/// Modules to embed and the edges between them
#[derive(Debug, Clone, Default, Serialize)]
pub struct DependencyGraph {
    /// Keys of the entry modules
    pub entries: Vec<String>,
    /// Keys of the force-embedded modules
    pub forced: Vec<String>,
    /// Every module to embed, by key
    pub modules: BTreeMap<String, DiscoveredModule>,
    /// Engine builtins referenced; these are not embedded
    pub engine_modules: BTreeSet<String>,
    /// Static imports that did not resolve
    pub unresolved: Vec<UnresolvedImport>,
}

impl DependencyGraph {
    /// Number of modules to embed
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether there is nothing to embed
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Check if a key will be embedded
    pub fn contains(&self, key: &str) -> bool {
        self.modules.contains_key(key)
    }

    /// Keys of all modules to embed
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Static edges as `(importer, imported)` pairs
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.modules.values().flat_map(|module| {
            module
                .imports
                .iter()
                .map(move |import| (module.meta.key.as_str(), import.as_str()))
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Root {
    Entry,
    Forced,
}

/// Discover every module reachable from `entry_roots` and `forced_roots`
///
/// Roots resolve against the working directory. A root that does not
/// resolve fails the build. A static import that does not resolve is
/// recorded in [`DependencyGraph::unresolved`] and skipped.
pub fn discover<E, F>(
    resolver: &ModuleResolver,
    entry_roots: &[E],
    forced_roots: &[F],
) -> Result<DependencyGraph>
where
    E: AsRef<str>,
    F: AsRef<str>,
{
    let mut graph = DependencyGraph::default();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();

    let roots = entry_roots
        .iter()
        .map(|spec| (spec.as_ref(), Root::Entry))
        .chain(forced_roots.iter().map(|spec| (spec.as_ref(), Root::Forced)));

    for (specifier, root) in roots {
        let resolved = resolver
            .resolve(specifier, &BaseDir::cwd())
            .map_err(|err| match err {
                ModpathError::NotFound { .. } => ModpathError::BuildTimeUnresolvable {
                    specifier: specifier.to_string(),
                },
                other => other,
            })?;

        if resolved.origin() == Origin::Engine {
            warn!(specifier, "root is an engine builtin and will not be embedded");
            graph.engine_modules.insert(resolved.key().to_string());
            continue;
        }

        let key = resolved.key().to_string();
        match root {
            Root::Entry => graph.entries.push(key.clone()),
            Root::Forced => graph.forced.push(key.clone()),
        }
        if visited.insert(key.clone()) {
            graph.modules.insert(key.clone(), fetch(resolved)?);
            queue.push_back(key);
        }
    }

    while let Some(key) = queue.pop_front() {
        let Some(module) = graph.modules.get(&key) else {
            continue;
        };
        let base = module.meta.base_dir();
        let scan = scan_module(&String::from_utf8_lossy(&module.source));

        let mut imports = Vec::new();
        for specifier in scan.static_specifiers() {
            let resolved = match resolver.resolve(specifier, &base) {
                Ok(resolved) => resolved,
                Err(err) if err.is_not_found() => {
                    warn!(importer = %key, specifier, "static import does not resolve at build time");
                    graph.unresolved.push(UnresolvedImport {
                        importer: key.clone(),
                        specifier: specifier.to_string(),
                    });
                    continue;
                }
                Err(err) => return Err(err),
            };

            if resolved.origin() == Origin::Engine {
                graph.engine_modules.insert(resolved.key().to_string());
                continue;
            }

            let child = resolved.key().to_string();
            debug!(importer = %key, imported = %child, "discovered edge");
            if visited.insert(child.clone()) {
                graph.modules.insert(child.clone(), fetch(resolved)?);
                queue.push_back(child.clone());
            }
            if !imports.contains(&child) {
                imports.push(child);
            }
        }

        if let Some(module) = graph.modules.get_mut(&key) {
            module.imports = imports;
        }
    }

    debug!(
        modules = graph.len(),
        unresolved = graph.unresolved.len(),
        "dependency discovery finished"
    );
    Ok(graph)
}

fn fetch(resolved: ResolvedModule) -> Result<DiscoveredModule> {
    let loaded = read_resolved(resolved)?;
    Ok(DiscoveredModule {
        meta: loaded.meta,
        path: loaded.path,
        source: loaded.code,
        imports: Vec::new(),
    })
}
