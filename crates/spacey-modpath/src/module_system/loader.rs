// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module loader - the callback an engine installs for every import

use crate::error::{ModpathError, Result};
use crate::module_system::meta::{BaseDir, ImportMeta, ModuleMeta};
use crate::module_system::resolver::{ModuleResolver, ModuleSource, Origin, ResolvedModule};
use bytes::Bytes;
use std::borrow::Cow;
use std::path::PathBuf;
use tracing::debug;

/// Loader callback shape: `(specifier, referrer) -> module`
///
/// `referrer` is `None` for top-level loads, which resolve against the
/// working directory.
pub type LoaderFn = dyn Fn(&str, Option<&ModuleMeta>) -> Result<LoadedModule> + Send + Sync;

/// A resolved module with its content in hand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    /// Identity of the module
    pub meta: ModuleMeta,
    /// Where the content came from
    pub origin: Origin,
    /// Engine-loadable content
    pub code: Bytes,
    /// File the content was read from, if any
    pub path: Option<PathBuf>,
}

impl LoadedModule {
    /// Content as text, replacing invalid UTF-8
    pub fn source_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.code)
    }

    /// import.meta view of this module
    pub fn import_meta(&self, is_main: bool) -> ImportMeta {
        self.meta.import_meta(is_main)
    }
}

/// Resolves and reads modules
#[derive(Debug, Clone)]
pub struct ModuleLoader {
    resolver: ModuleResolver,
}

impl ModuleLoader {
    /// Create a loader over a resolver
    pub fn new(resolver: ModuleResolver) -> Self {
        Self { resolver }
    }

    /// The underlying resolver
    pub fn resolver(&self) -> &ModuleResolver {
        &self.resolver
    }

    /// Load `specifier` as imported by `referrer`
    pub fn load(&self, specifier: &str, referrer: Option<&ModuleMeta>) -> Result<LoadedModule> {
        let base = referrer.map(ModuleMeta::base_dir).unwrap_or_default();
        self.load_from(specifier, &base)
    }

    /// Load `specifier` relative to an explicit base directory
    pub fn load_from(&self, specifier: &str, base: &BaseDir) -> Result<LoadedModule> {
        let resolved = self.resolver.resolve(specifier, base)?;
        read_resolved(resolved)
    }

    /// Turn the loader into a boxed callback for an engine
    pub fn into_callback(self) -> Box<LoaderFn> {
        Box::new(move |specifier: &str, referrer: Option<&ModuleMeta>| {
            self.load(specifier, referrer)
        })
    }
}

/// Fetch the content of a resolved module
///
/// A file that matched during probing but can no longer be read is an I/O
/// error; it is not retried.
pub fn read_resolved(resolved: ResolvedModule) -> Result<LoadedModule> {
    let origin = resolved.origin();
    let (code, path) = match resolved.source {
        ModuleSource::Embedded(code) | ModuleSource::Engine(code) => (code, None),
        ModuleSource::File(path) => {
            let code = std::fs::read(&path).map_err(|source| ModpathError::Io {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), bytes = code.len(), "read module");
            (Bytes::from(code), Some(path))
        }
    };
    Ok(LoadedModule {
        meta: resolved.meta,
        origin,
        code,
        path,
    })
}
