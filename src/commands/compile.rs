// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Compile command implementation

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use spacey_modpath::embed::{build_table, write_executable};

use crate::cli::CompileArgs;
use crate::commands::CommandContext;

/// Run the compile command
pub fn run(args: &CompileArgs, ctx: &CommandContext) -> Result<()> {
    let runtime = match &args.runtime {
        Some(path) => path.clone(),
        None => std::env::current_exe().context("cannot locate the running executable")?,
    };

    let table = build_table(&ctx.build_resolver(), &args.entries, &args.embed)?;
    let size = write_executable(&runtime, &table, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    for key in table.keys() {
        println!("  {} {}", "+".green(), key);
    }
    println!(
        "{} {} ({} modules, {} bytes)",
        "Wrote".green().bold(),
        args.output.display(),
        table.len(),
        size
    );
    Ok(())
}
