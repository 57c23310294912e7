// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Deps command implementation

use anyhow::Result;
use owo_colors::OwoColorize;
use spacey_modpath::embed::discover;

use crate::cli::DepsArgs;
use crate::commands::CommandContext;

/// Run the deps command
pub fn run(args: &DepsArgs, ctx: &CommandContext) -> Result<()> {
    let graph = discover(&ctx.build_resolver(), &args.entries, &args.embed)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&graph)?);
        return Ok(());
    }

    for module in graph.modules.values() {
        let marker = if graph.entries.contains(&module.meta.key) {
            "entry".green().to_string()
        } else if graph.forced.contains(&module.meta.key) {
            "forced".yellow().to_string()
        } else {
            String::new()
        };
        println!("{} {}", module.meta.key.cyan().bold(), marker);
        if let Some(path) = &module.path {
            println!("  {} {}", "from".dimmed(), path.display());
        }
        for import in &module.imports {
            println!("  {} {}", "->".dimmed(), import);
        }
    }

    for name in &graph.engine_modules {
        println!("{} {}", name.cyan(), "builtin".dimmed());
    }
    for missing in &graph.unresolved {
        println!(
            "{}: '{}' imported by {} does not resolve",
            "warning".yellow().bold(),
            missing.specifier,
            missing.importer
        );
    }

    println!();
    println!("{} modules", graph.len().to_string().bold());
    Ok(())
}
