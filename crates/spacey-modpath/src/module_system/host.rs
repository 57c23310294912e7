// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Host engine interface
//!
//! The resolver never touches engine internals. An engine plugs in by
//! compiling module source into its loadable form and by answering the
//! specifiers it understands natively.

use crate::error::{ModpathError, Result};
use crate::module_system::meta::ModuleMeta;
use bytes::Bytes;
use std::collections::BTreeMap;

/// Capabilities the resolver needs from the JavaScript engine
pub trait HostEngine: Send + Sync {
    /// Turn module source into the form stored in the embedded table
    fn compile(&self, meta: &ModuleMeta, source: &[u8]) -> Result<Vec<u8>>;

    /// The engine's own loader, tried last with the untranslated specifier
    fn load_default(&self, specifier: &str) -> Option<Bytes>;
}

/// Engine builtins registered by default
pub const DEFAULT_BUILTINS: &[&str] = &["std", "os"];

/// Host that keeps modules as source text
///
/// Embeds UTF-8 source unchanged and serves a small registry of builtin
/// modules from memory.
#[derive(Debug, Clone)]
pub struct SourceHost {
    builtins: BTreeMap<String, Bytes>,
}

impl SourceHost {
    /// Create a host with the default builtin modules
    pub fn new() -> Self {
        let mut host = Self::without_builtins();
        for name in DEFAULT_BUILTINS {
            host = host.with_builtin(*name, format!("export default globalThis.{name};\n"));
        }
        host
    }

    /// Create a host with no builtin modules
    pub fn without_builtins() -> Self {
        Self {
            builtins: BTreeMap::new(),
        }
    }

    /// Register a builtin module
    pub fn with_builtin(mut self, name: impl Into<String>, source: impl Into<Bytes>) -> Self {
        self.builtins.insert(name.into(), source.into());
        self
    }

    /// Check if a specifier names a builtin module
    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtins.contains_key(name)
    }

    /// Names of all builtin modules
    pub fn builtin_names(&self) -> impl Iterator<Item = &str> {
        self.builtins.keys().map(String::as_str)
    }
}

impl Default for SourceHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostEngine for SourceHost {
    fn compile(&self, meta: &ModuleMeta, source: &[u8]) -> Result<Vec<u8>> {
        std::str::from_utf8(source).map_err(|e| ModpathError::Engine {
            specifier: meta.key.clone(),
            reason: format!("module source is not valid UTF-8: {e}"),
        })?;
        Ok(source.to_vec())
    }

    fn load_default(&self, specifier: &str) -> Option<Bytes> {
        self.builtins.get(specifier).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_builtins() {
        let host = SourceHost::new();
        assert!(host.is_builtin("std"));
        assert!(host.is_builtin("os"));
        assert!(!host.is_builtin("lodash"));
        assert_eq!(host.builtin_names().collect::<Vec<_>>(), vec!["os", "std"]);
    }

    #[test]
    fn test_custom_builtin() {
        let host = SourceHost::without_builtins().with_builtin("bjson", "export default 1;");
        assert_eq!(host.load_default("bjson").as_deref(), Some(&b"export default 1;"[..]));
        assert_eq!(host.load_default("std"), None);
    }

    #[test]
    fn test_compile_rejects_invalid_utf8() {
        let host = SourceHost::new();
        let meta = ModuleMeta::engine("bad");
        assert!(host.compile(&meta, &[0xff, 0xfe]).is_err());
        assert_eq!(host.compile(&meta, b"export {};").unwrap(), b"export {};".to_vec());
    }
}
