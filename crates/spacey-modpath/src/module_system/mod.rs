// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module resolution and loading
//!
//! ## Resolution
//! - Bare specifiers through the search path (`SPACEY_PATH`)
//! - Relative and absolute specifiers as paths
//! - `scheme:name` specifiers rewritten to `scheme/name`
//! - `name/index.js`, `name.js` and `name` probe forms
//!
//! ## Loading
//! - Embedded table first, filesystem second, engine builtins last
//! - Depth-first static linking in declaration order

mod key;
pub mod host;
pub mod linker;
pub mod loader;
pub mod meta;
pub mod probe;
pub mod resolver;
pub mod scan;
pub mod search_path;
pub mod specifier;

pub use host::{HostEngine, SourceHost, DEFAULT_BUILTINS};
pub use key::{join_key, name_key, parent_key, path_key, CWD_KEY};
pub use linker::{LinkedModule, Linker};
pub use loader::{read_resolved, LoadedModule, LoaderFn, ModuleLoader};
pub use meta::{BaseDir, ImportMeta, ModuleMeta, Namespace};
pub use probe::{FsProbe, ProbeForm, ProbeHit, DIRECT_PROBE_ORDER, SEARCH_PROBE_ORDER};
pub use resolver::{ModuleRequest, ModuleResolver, ModuleSource, Origin, ResolveState, ResolvedModule};
pub use scan::{scan_module, ModuleScan};
pub use search_path::{SearchHit, SearchPathResolver};
pub use specifier::{ModuleSpecifier, SpecifierKind};
