// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Runtime module resolution
//!
//! One resolution runs a fixed sequence of states and the first hit wins:
//!
//! 1. **Classify** the specifier and translate any `scheme:` prefix
//! 2. **EmbeddedLookup** by canonical key in the embedded table
//! 3. **SearchPathProbe** for bare names, and for relative imports of
//!    search-path modules under the root they came from
//! 4. **DirectProbe** of the key as a filesystem path
//! 5. **EngineDefault** with the untranslated specifier
//!
//! The resolver holds no mutable state, so the same inputs always give the
//! same answer and one resolver can be shared between contexts.

use crate::config::LoaderConfig;
use crate::embed::table::EmbeddedTable;
use crate::error::{ModpathError, Result};
use crate::module_system::host::HostEngine;
use crate::module_system::key::{join_key, name_key, path_key};
use crate::module_system::meta::{BaseDir, ModuleMeta, Namespace};
use crate::module_system::probe::{FsProbe, DIRECT_PROBE_ORDER};
use crate::module_system::search_path::{SearchHit, SearchPathResolver};
use crate::module_system::specifier::{ModuleSpecifier, SpecifierKind};
use bytes::Bytes;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, trace};

/// Where a resolved module came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// The embedded table
    Embedded,
    /// The live filesystem
    Filesystem,
    /// The host engine's own loader
    Engine,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Origin::Embedded => "embedded",
            Origin::Filesystem => "filesystem",
            Origin::Engine => "engine",
        })
    }
}

/// How to obtain a resolved module's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleSource {
    /// Bytes held in the embedded table
    Embedded(Bytes),
    /// Read from this file
    File(PathBuf),
    /// Bytes supplied by the host engine
    Engine(Bytes),
}

/// Result of a successful resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    /// Identity of the module
    pub meta: ModuleMeta,
    /// Where its content lives
    pub source: ModuleSource,
}

impl ResolvedModule {
    /// Canonical key of the module
    pub fn key(&self) -> &str {
        &self.meta.key
    }

    /// Diagnostic origin tag
    pub fn origin(&self) -> Origin {
        match self.source {
            ModuleSource::Embedded(_) => Origin::Embedded,
            ModuleSource::File(_) => Origin::Filesystem,
            ModuleSource::Engine(_) => Origin::Engine,
        }
    }

    /// Path on disk, for filesystem-backed modules
    pub fn path(&self) -> Option<&PathBuf> {
        match &self.source {
            ModuleSource::File(path) => Some(path),
            _ => None,
        }
    }
}

/// States of one resolution attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveState {
    /// Look up the canonical key in the embedded table
    EmbeddedLookup,
    /// Probe search path roots (search-namespace keys only)
    SearchPathProbe,
    /// Probe the key as a path
    DirectProbe,
    /// Ask the host engine
    EngineDefault,
}

enum Step {
    Next(ResolveState),
    Done(ResolvedModule),
}

/// A specifier after classification, with the key it maps to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRequest {
    /// The classified specifier
    pub specifier: ModuleSpecifier,
    /// Space the key belongs to
    pub namespace: Namespace,
    /// Canonical key used for the embedded table and for probing
    pub key: String,
    /// Filesystem key a bare name falls back to when the search path misses
    pub fallback_key: Option<String>,
    /// Search root of the importing module, for its relative imports
    pub root: Option<String>,
}

impl ModuleRequest {
    /// Classify `specifier` and compute its key relative to `base`
    ///
    /// Bare specifiers key by their normalized name. Relative ones join the
    /// importing module's directory and inherit its namespace and root.
    /// Absolute ones are filesystem keys.
    pub fn new(specifier: &str, base: &BaseDir) -> Self {
        let specifier = ModuleSpecifier::parse(specifier);
        let effective = specifier.effective();
        let (namespace, key, fallback_key, root) = match specifier.kind() {
            SpecifierKind::Bare => (
                Namespace::Search,
                name_key(effective),
                Some(path_key(effective)),
                None,
            ),
            SpecifierKind::Relative => (
                base.namespace,
                join_key(base.namespace, &base.dir, effective),
                None,
                base.root.clone(),
            ),
            SpecifierKind::Absolute => (Namespace::Filesystem, path_key(effective), None, None),
        };
        Self {
            specifier,
            namespace,
            key,
            fallback_key,
            root,
        }
    }

    fn is_relative(&self) -> bool {
        self.specifier.kind() == SpecifierKind::Relative
    }
}

/// Resolves specifiers against an embedded table, the search path and the
/// filesystem, in that order
#[derive(Clone)]
pub struct ModuleResolver {
    config: Arc<LoaderConfig>,
    table: Arc<EmbeddedTable>,
    host: Arc<dyn HostEngine>,
}

impl ModuleResolver {
    /// Create a resolver
    pub fn new(config: LoaderConfig, table: Arc<EmbeddedTable>, host: Arc<dyn HostEngine>) -> Self {
        Self {
            config: Arc::new(config),
            table,
            host,
        }
    }

    /// Create a resolver with an empty embedded table, as used at build time
    pub fn without_table(config: LoaderConfig, host: Arc<dyn HostEngine>) -> Self {
        Self::new(config, Arc::new(EmbeddedTable::new()), host)
    }

    /// The configuration snapshot
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// The embedded table
    pub fn table(&self) -> &Arc<EmbeddedTable> {
        &self.table
    }

    /// The host engine
    pub fn host(&self) -> &Arc<dyn HostEngine> {
        &self.host
    }

    /// Resolve `specifier` imported from a module whose directory is `base`
    pub fn resolve(&self, specifier: &str, base: &BaseDir) -> Result<ResolvedModule> {
        let request = ModuleRequest::new(specifier, base);
        trace!(
            specifier,
            effective = request.specifier.effective(),
            kind = ?request.specifier.kind(),
            key = %request.key,
            "classified"
        );

        let mut state = ResolveState::EmbeddedLookup;
        loop {
            let step = match state {
                ResolveState::EmbeddedLookup => self.embedded_lookup(&request),
                ResolveState::SearchPathProbe => self.search_path_probe(&request)?,
                ResolveState::DirectProbe => self.direct_probe(&request)?,
                ResolveState::EngineDefault => self.engine_default(&request)?,
            };
            match step {
                Step::Next(next) => {
                    trace!(specifier, from = ?state, to = ?next, "resolution advanced");
                    state = next;
                }
                Step::Done(resolved) => {
                    debug!(
                        specifier,
                        key = resolved.key(),
                        origin = %resolved.origin(),
                        "resolved module"
                    );
                    return Ok(resolved);
                }
            }
        }
    }

    fn embedded_lookup(&self, request: &ModuleRequest) -> Step {
        // A bare name embedded through the path fallback lives under its
        // filesystem key
        let fallback = request
            .fallback_key
            .as_deref()
            .filter(|_| self.config.bare_path_fallback);
        let embedded = self
            .table
            .get(&request.key)
            .or_else(|| fallback.and_then(|key| self.table.get(key)));
        if let Some(module) = embedded {
            return Step::Done(ResolvedModule {
                meta: module.meta.clone(),
                source: ModuleSource::Embedded(module.bytecode.clone()),
            });
        }
        match request.namespace {
            Namespace::Search => Step::Next(ResolveState::SearchPathProbe),
            Namespace::Filesystem => Step::Next(ResolveState::DirectProbe),
        }
    }

    fn search_path_probe(&self, request: &ModuleRequest) -> Result<Step> {
        let probe = FsProbe::new(self.config.max_candidate_len);
        let search = SearchPathResolver::new(&self.config.search_path, probe);

        if request.is_relative() {
            // Relative imports of a search-path module stay next to it
            let hit = match &request.root {
                Some(root) => search.probe_root(root, &request.key, DIRECT_PROBE_ORDER)?,
                None => search.resolve_with(&request.key, DIRECT_PROBE_ORDER)?,
            };
            return Ok(match hit {
                Some(hit) => Step::Done(search_hit(request, hit)),
                None => Step::Next(ResolveState::EngineDefault),
            });
        }

        if let Some(hit) = search.resolve(&request.key)? {
            return Ok(Step::Done(search_hit(request, hit)));
        }
        if self.config.bare_path_fallback {
            Ok(Step::Next(ResolveState::DirectProbe))
        } else {
            Ok(Step::Next(ResolveState::EngineDefault))
        }
    }

    fn direct_probe(&self, request: &ModuleRequest) -> Result<Step> {
        let probe = FsProbe::new(self.config.max_candidate_len);
        let key = request.fallback_key.as_deref().unwrap_or(&request.key);
        if let Some(hit) = probe.probe(key, DIRECT_PROBE_ORDER)? {
            return Ok(Step::Done(ResolvedModule {
                meta: ModuleMeta::from_probe(key.to_string(), Namespace::Filesystem, hit.form),
                source: ModuleSource::File(hit.path),
            }));
        }
        Ok(Step::Next(ResolveState::EngineDefault))
    }

    fn engine_default(&self, request: &ModuleRequest) -> Result<Step> {
        let raw = request.specifier.raw();
        match self.host.load_default(raw) {
            Some(code) => Ok(Step::Done(ResolvedModule {
                meta: ModuleMeta::engine(raw),
                source: ModuleSource::Engine(code),
            })),
            None => Err(ModpathError::not_found(raw)),
        }
    }
}

fn search_hit(request: &ModuleRequest, hit: SearchHit) -> ResolvedModule {
    ResolvedModule {
        meta: ModuleMeta::from_probe(request.key.clone(), Namespace::Search, hit.form)
            .with_root(hit.root),
        source: ModuleSource::File(hit.path),
    }
}

impl fmt::Debug for ModuleResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleResolver")
            .field("config", &self.config)
            .field("embedded", &self.table.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchPath;
    use crate::module_system::host::SourceHost;
    use crate::module_system::probe::ProbeForm;
    use std::fs;
    use tempfile::tempdir;

    fn resolver_for(root: &std::path::Path, table: EmbeddedTable) -> ModuleResolver {
        let config = LoaderConfig::new(SearchPath::from_roots([root.to_string_lossy()]));
        ModuleResolver::new(config, Arc::new(table), Arc::new(SourceHost::new()))
    }

    #[test]
    fn test_request_keys() {
        let cwd = BaseDir::cwd();
        let req = ModuleRequest::new("node:fs", &cwd);
        assert_eq!((req.namespace, req.key.as_str()), (Namespace::Search, "node/fs"));
        assert_eq!(req.fallback_key.as_deref(), Some("./node/fs"));

        let req = ModuleRequest::new("./lib/util", &BaseDir::filesystem("app"));
        assert_eq!((req.namespace, req.key.as_str()), (Namespace::Filesystem, "./app/lib/util"));

        let req = ModuleRequest::new("./util", &cwd);
        assert_eq!((req.namespace, req.key.as_str()), (Namespace::Filesystem, "./util"));

        let search_base = BaseDir {
            namespace: Namespace::Search,
            dir: "math".to_string(),
            root: Some("/opt/mods".to_string()),
        };
        let req = ModuleRequest::new("./helpers", &search_base);
        assert_eq!((req.namespace, req.key.as_str()), (Namespace::Search, "math/helpers"));
        assert_eq!(req.root.as_deref(), Some("/opt/mods"));

        let req = ModuleRequest::new("/opt/x.js", &search_base);
        assert_eq!((req.namespace, req.key.as_str()), (Namespace::Filesystem, "/opt/x.js"));
    }

    #[test]
    fn test_search_path_resolution() {
        let root = tempdir().unwrap();
        fs::create_dir(root.path().join("math")).unwrap();
        fs::write(root.path().join("math/index.js"), "export function add() {}").unwrap();

        let resolver = resolver_for(root.path(), EmbeddedTable::new());
        let resolved = resolver.resolve("math", &BaseDir::cwd()).unwrap();
        assert_eq!(resolved.key(), "math");
        assert_eq!(resolved.origin(), Origin::Filesystem);
        assert_eq!(resolved.meta.dirname, "math");
        assert_eq!(resolved.meta.root.as_deref(), Some(&*root.path().to_string_lossy()));
        assert_eq!(resolved.path(), Some(&root.path().join("math/index.js")));
    }

    fn two_roots() -> (tempfile::TempDir, tempfile::TempDir, ModuleResolver) {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        let config = LoaderConfig::new(SearchPath::from_roots([
            first.path().to_string_lossy(),
            second.path().to_string_lossy(),
        ]));
        let resolver = ModuleResolver::without_table(config, Arc::new(SourceHost::new()));
        (first, second, resolver)
    }

    #[test]
    fn test_relative_import_stays_in_own_root() {
        let (first, second, resolver) = two_roots();
        fs::create_dir_all(first.path().join("mathp")).unwrap();
        fs::write(first.path().join("mathp/helpers.js"), "wrong root").unwrap();
        fs::create_dir_all(second.path().join("mathp")).unwrap();
        fs::write(second.path().join("mathp/index.js"), "import './helpers.js';").unwrap();
        fs::write(second.path().join("mathp/helpers.js"), "right root").unwrap();

        let mathp = resolver.resolve("mathp", &BaseDir::cwd()).unwrap();
        assert_eq!(mathp.path(), Some(&second.path().join("mathp/index.js")));

        let helpers = resolver.resolve("./helpers.js", &mathp.meta.base_dir()).unwrap();
        assert_eq!(helpers.key(), "mathp/helpers.js");
        assert_eq!(helpers.path(), Some(&second.path().join("mathp/helpers.js")));
        assert_eq!(helpers.meta.root, mathp.meta.root);
    }

    #[test]
    fn test_relative_import_missing_from_own_root() {
        let (first, second, resolver) = two_roots();
        fs::write(first.path().join("only-first.js"), "").unwrap();
        fs::write(second.path().join("tool.js"), "import './only-first.js';").unwrap();

        let tool = resolver.resolve("tool", &BaseDir::cwd()).unwrap();
        let err = resolver
            .resolve("./only-first.js", &tool.meta.base_dir())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_relative_import_prefers_exact_file() {
        let root = tempdir().unwrap();
        fs::create_dir(root.path().join("pkg")).unwrap();
        fs::write(root.path().join("pkg/index.js"), "import './data';").unwrap();
        fs::write(root.path().join("pkg/data"), "exact").unwrap();
        fs::write(root.path().join("pkg/data.js"), "extension").unwrap();

        let resolver = resolver_for(root.path(), EmbeddedTable::new());
        let pkg = resolver.resolve("pkg", &BaseDir::cwd()).unwrap();
        let data = resolver.resolve("./data", &pkg.meta.base_dir()).unwrap();
        assert_eq!(data.path(), Some(&root.path().join("pkg/data")));
    }

    #[test]
    fn test_embedded_wins_over_filesystem() {
        let root = tempdir().unwrap();
        fs::write(root.path().join("utils.js"), "on disk").unwrap();

        let mut table = EmbeddedTable::new();
        table.insert(
            ModuleMeta {
                key: "utils".to_string(),
                dirname: ".".to_string(),
                namespace: Namespace::Search,
                root: None,
            },
            &b"embedded"[..],
        );

        let resolver = resolver_for(root.path(), table);
        let resolved = resolver.resolve("utils", &BaseDir::cwd()).unwrap();
        assert_eq!(resolved.source, ModuleSource::Embedded(Bytes::from_static(b"embedded")));
    }

    #[test]
    fn test_engine_default_gets_untranslated_specifier() {
        let root = tempdir().unwrap();
        let resolver = ModuleResolver::without_table(
            LoaderConfig::new(SearchPath::from_roots([root.path().to_string_lossy()])),
            Arc::new(SourceHost::without_builtins().with_builtin("sys:io", "export {};")),
        );
        let resolved = resolver.resolve("sys:io", &BaseDir::cwd()).unwrap();
        assert_eq!(resolved.origin(), Origin::Engine);
        assert_eq!(resolved.key(), "sys:io");
    }

    #[test]
    fn test_not_found_names_original_specifier() {
        let root = tempdir().unwrap();
        let resolver = resolver_for(root.path(), EmbeddedTable::new());
        let err = resolver.resolve("missing:thing", &BaseDir::cwd()).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Cannot find module 'missing:thing'");
    }

    /// A fixture directory under the working directory, named without a
    /// leading dot so its name classifies as bare
    fn cwd_fixture() -> (tempfile::TempDir, String) {
        let dir = tempfile::Builder::new()
            .prefix("fallback")
            .tempdir_in(".")
            .unwrap();
        fs::write(dir.path().join("local.js"), "").unwrap();
        let name = dir.path().file_name().unwrap().to_string_lossy().to_string();
        (dir, format!("{name}/local"))
    }

    #[test]
    fn test_bare_fallback_to_direct_path() {
        let (_dir, bare) = cwd_fixture();
        let root = tempdir().unwrap();

        let resolver = resolver_for(root.path(), EmbeddedTable::new());
        let resolved = resolver.resolve(&bare, &BaseDir::cwd()).unwrap();
        assert_eq!(resolved.origin(), Origin::Filesystem);
        assert_eq!(resolved.meta.namespace, Namespace::Filesystem);
        assert_eq!(resolved.key(), format!("./{bare}"));
    }

    #[test]
    fn test_bare_and_cwd_relative_are_different_modules() {
        let (_dir, bare) = cwd_fixture();
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join(&bare).parent().unwrap()).unwrap();
        fs::write(root.path().join(format!("{bare}.js")), "search root").unwrap();

        let build = resolver_for(root.path(), EmbeddedTable::new());
        let from_root = build.resolve(&bare, &BaseDir::cwd()).unwrap();
        let relative = format!("./{bare}");
        let from_cwd = build.resolve(&relative, &BaseDir::cwd()).unwrap();
        assert_ne!(from_root.key(), from_cwd.key());
        assert_eq!(from_cwd.key(), relative);

        // Embedding the bare module must not answer the relative import
        let mut table = EmbeddedTable::new();
        table.insert(from_root.meta.clone(), &b"search root"[..]);
        let runtime = resolver_for(root.path(), table);
        let resolved = runtime.resolve(&relative, &BaseDir::cwd()).unwrap();
        assert_eq!(resolved.origin(), Origin::Filesystem);
        assert_eq!(resolved.path(), from_cwd.path());
        assert_eq!(runtime.resolve(&bare, &BaseDir::cwd()).unwrap().origin(), Origin::Embedded);
    }

    #[test]
    fn test_embedded_fallback_module_found_by_bare_name() {
        let mut table = EmbeddedTable::new();
        table.insert(
            ModuleMeta::from_probe("./lib/local".to_string(), Namespace::Filesystem, ProbeForm::Extension),
            &b"fallback"[..],
        );
        let table = Arc::new(table);

        let resolver = ModuleResolver::new(
            LoaderConfig::new(SearchPath::empty()),
            Arc::clone(&table),
            Arc::new(SourceHost::new()),
        );
        let resolved = resolver.resolve("lib/local", &BaseDir::cwd()).unwrap();
        assert_eq!(resolved.origin(), Origin::Embedded);
        assert_eq!(resolved.key(), "./lib/local");

        let strict = ModuleResolver::new(
            LoaderConfig::new(SearchPath::empty()).with_bare_path_fallback(false),
            table,
            Arc::new(SourceHost::new()),
        );
        assert!(strict.resolve("lib/local", &BaseDir::cwd()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_bare_fallback_can_be_disabled() {
        let (_dir, bare) = cwd_fixture();

        let config = LoaderConfig::new(SearchPath::empty()).with_bare_path_fallback(false);
        let resolver = ModuleResolver::without_table(config, Arc::new(SourceHost::new()));
        let err = resolver.resolve(&bare, &BaseDir::cwd()).unwrap_err();
        assert!(err.is_not_found());
    }
}
