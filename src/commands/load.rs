// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Load command implementation

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use spacey_modpath::module_system::{LinkedModule, Linker};
use spacey_modpath::{ModuleLoader, Origin};

use crate::cli::LoadArgs;
use crate::commands::CommandContext;

/// Run the load command
pub fn run(args: &LoadArgs, ctx: &CommandContext) -> Result<()> {
    let loader = ctx.loader();
    let mut linker = Linker::new(&loader);
    let entry = linker.link_entry(&args.entry)?;

    if !args.dynamic.is_empty() {
        let referrer = linker
            .get(&entry)
            .map(|module| module.meta.clone())
            .context("entry module was not linked")?;
        for specifier in &args.dynamic {
            linker.import_dynamic(specifier, &referrer)?;
        }
    }

    for module in linker.modules() {
        print_module(module, module.meta.key == entry);
    }
    Ok(())
}

/// Link every entry of this executable's module table
pub fn run_embedded(loader: &ModuleLoader, entries: &[String]) -> Result<()> {
    let mut linker = Linker::new(loader);
    for entry in entries {
        linker.link_entry(entry)?;
    }
    tracing::debug!(modules = linker.modules().len(), "linked embedded entries");
    Ok(())
}

fn print_module(module: &LinkedModule, is_entry: bool) {
    let origin = match module.origin {
        Origin::Embedded => module.origin.to_string().green().to_string(),
        Origin::Filesystem => module.origin.to_string().blue().to_string(),
        Origin::Engine => module.origin.to_string().magenta().to_string(),
    };
    let key = if is_entry {
        module.meta.key.cyan().bold().to_string()
    } else {
        module.meta.key.cyan().to_string()
    };
    println!("{key} [{origin}]");
    if let Some(path) = &module.path {
        println!("  {} {}", "from".dimmed(), path.display());
    }
    if !module.exports.is_empty() {
        println!("  {} {}", "exports".dimmed(), module.exports.join(", "));
    }
}
