// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Resolve command implementation

use anyhow::Result;
use owo_colors::OwoColorize;
use spacey_modpath::BaseDir;

use crate::cli::ResolveArgs;
use crate::commands::CommandContext;

/// Run the resolve command
pub fn run(args: &ResolveArgs, ctx: &CommandContext) -> Result<()> {
    let base = match &args.from {
        Some(dir) => BaseDir::filesystem(dir.as_str()),
        None => BaseDir::cwd(),
    };
    let resolved = ctx.runtime_resolver().resolve(&args.specifier, &base)?;

    println!("{} {}", "key:".dimmed(), resolved.key().cyan().bold());
    println!("{} {}", "origin:".dimmed(), resolved.origin());
    println!("{} {}", "namespace:".dimmed(), resolved.meta.namespace);
    println!("{} {}", "dirname:".dimmed(), resolved.meta.dirname);
    if let Some(root) = &resolved.meta.root {
        println!("{} {}", "root:".dimmed(), root);
    }
    if let Some(path) = resolved.path() {
        println!("{} {}", "path:".dimmed(), path.display());
    }
    Ok(())
}
