// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Executable emitter
//!
//! Compiles discovered modules with the host engine, builds the embedded
//! table and appends it to a runtime executable.

use crate::embed::discovery::{discover, DependencyGraph};
use crate::embed::table::{strip_table, EmbeddedTable};
use crate::error::{ModpathError, Result};
use crate::module_system::host::HostEngine;
use crate::module_system::resolver::ModuleResolver;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Serializes a dependency graph into an embedded table
pub struct Emitter<'a> {
    host: &'a dyn HostEngine,
}

impl<'a> Emitter<'a> {
    /// Create an emitter compiling with `host`
    pub fn new(host: &'a dyn HostEngine) -> Self {
        Self { host }
    }

    /// Compile every module in `graph` into a table keyed by its canonical key
    pub fn emit(&self, graph: &DependencyGraph) -> Result<EmbeddedTable> {
        let mut table = EmbeddedTable::new();
        for module in graph.modules.values() {
            let bytecode = self.host.compile(&module.meta, &module.source)?;
            debug!(key = %module.meta.key, bytes = bytecode.len(), "embedding module");
            table.insert(module.meta.clone(), bytecode);
        }
        for entry in &graph.entries {
            table.add_entry(entry.clone());
        }
        Ok(table)
    }
}

/// Discover and compile in one step
///
/// `resolver` should carry the build-time search path and an empty table.
pub fn build_table<E, F>(
    resolver: &ModuleResolver,
    entry_roots: &[E],
    forced_roots: &[F],
) -> Result<EmbeddedTable>
where
    E: AsRef<str>,
    F: AsRef<str>,
{
    let graph = discover(resolver, entry_roots, forced_roots)?;
    Emitter::new(resolver.host().as_ref()).emit(&graph)
}

/// Write `runtime` with `table` appended to `out`
///
/// Any table already carried by `runtime` is dropped first. Returns the size
/// of the written executable.
pub fn write_executable(runtime: &Path, table: &EmbeddedTable, out: &Path) -> Result<u64> {
    let image = std::fs::read(runtime).map_err(|source| ModpathError::Io {
        path: runtime.to_path_buf(),
        source,
    })?;
    let base = strip_table(&image)?;
    let sealed = table.seal()?;

    let mut file = File::create(out)?;
    file.write_all(base)?;
    file.write_all(&sealed)?;
    file.flush()?;
    drop(file);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(out, std::fs::Permissions::from_mode(0o755))?;
    }

    let size = (base.len() + sealed.len()) as u64;
    info!(
        out = %out.display(),
        modules = table.len(),
        size,
        "wrote executable"
    );
    Ok(size)
}
