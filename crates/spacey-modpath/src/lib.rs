// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # spacey-modpath
//!
//! Module resolution for Spacey executables.
//!
//! Resolves the specifiers in `import` statements against a `NODE_PATH`-style
//! search path and, optionally, against a table of modules embedded in the
//! executable at build time. A program behaves the same whether its
//! dependencies live on disk or inside the binary.
//!
//! ## Resolution order
//!
//! 1. Embedded table, by canonical key
//! 2. Search path roots (bare specifiers): `root/name/index.js`,
//!    `root/name.js`, `root/name`
//! 3. The specifier as a path: `path`, `path/index.js`, `path.js`
//! 4. The host engine's own loader
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spacey_modpath::{LoaderConfig, ModuleLoader, ModuleResolver, SourceHost};
//! use std::sync::Arc;
//!
//! let resolver = ModuleResolver::without_table(LoaderConfig::from_env(), Arc::new(SourceHost::new()));
//! let loader = ModuleLoader::new(resolver);
//! let math = loader.load("math", None)?;
//! let helper = loader.load("./helper.js", Some(&math.meta))?;
//! ```
//!
//! ## Embedding
//!
//! ```rust,ignore
//! use spacey_modpath::embed::{build_table, write_executable};
//!
//! let table = build_table(&resolver, &["app/main.js"], &["node:fs"])?;
//! write_executable(&std::env::current_exe()?, &table, Path::new("app"))?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod embed;
pub mod error;
pub mod module_system;

// Re-exports
pub use config::{LoaderConfig, SearchPath, PATH_LIST_SEPARATOR, SEARCH_PATH_VAR};
pub use embed::{DependencyGraph, EmbeddedTable};
pub use error::{ModpathError, Result};
pub use module_system::{
    BaseDir, HostEngine, LoadedModule, ModuleLoader, ModuleMeta, ModuleResolver, ModuleSpecifier,
    Origin, ResolvedModule, SourceHost,
};

/// Version of spacey-modpath
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
