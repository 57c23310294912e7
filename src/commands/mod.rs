// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Command implementations for spacey-pack

pub mod cat;
pub mod compile;
pub mod deps;
pub mod load;
pub mod resolve;

use crate::cli::Cli;
use anyhow::{Context, Result};
use spacey_modpath::{
    EmbeddedTable, LoaderConfig, ModuleLoader, ModuleResolver, SearchPath, SourceHost,
    SEARCH_PATH_VAR,
};
use std::sync::Arc;
use tracing::debug;

/// Common context for command execution
pub struct CommandContext {
    pub config: LoaderConfig,
    pub table: Arc<EmbeddedTable>,
}

impl CommandContext {
    /// Snapshot the search path and read any table embedded in this binary
    pub fn new(cli: &Cli) -> Result<Self> {
        let table = EmbeddedTable::from_current_exe()
            .context("failed to read the module table of this executable")?
            .unwrap_or_default();
        Ok(Self {
            config: loader_config(cli),
            table: Arc::new(table),
        })
    }

    /// Resolver that sees this binary's embedded modules
    pub fn runtime_resolver(&self) -> ModuleResolver {
        ModuleResolver::new(
            self.config.clone(),
            Arc::clone(&self.table),
            Arc::new(SourceHost::new()),
        )
    }

    /// Resolver for building a new table, which must not see the current one
    pub fn build_resolver(&self) -> ModuleResolver {
        ModuleResolver::without_table(self.config.clone(), Arc::new(SourceHost::new()))
    }

    /// Loader over [`Self::runtime_resolver`]
    pub fn loader(&self) -> ModuleLoader {
        ModuleLoader::new(self.runtime_resolver())
    }
}

fn loader_config(cli: &Cli) -> LoaderConfig {
    // clap already folded SPACEY_PATH into --path
    let search_path = cli
        .path
        .as_deref()
        .map(SearchPath::from_os)
        .unwrap_or_default();
    debug!(var = SEARCH_PATH_VAR, roots = search_path.len(), "search path");
    LoaderConfig::new(search_path).with_bare_path_fallback(!cli.no_bare_fallback)
}
