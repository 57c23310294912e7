// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! spacey-pack - module resolution and embedding for Spacey executables
//!
//! Resolves bare, relative and `scheme:` specifiers against `SPACEY_PATH`,
//! and builds executables that carry their modules with them. An executable
//! produced by `spacey-pack compile` links its embedded entry modules when
//! started without a subcommand.

mod cli;
mod commands;

use clap::Parser;
use owo_colors::OwoColorize;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands};
use commands::CommandContext;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "spacey_modpath=debug,spacey_pack=debug"
    } else {
        "spacey_modpath=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let ctx = CommandContext::new(cli)?;

    match &cli.command {
        Some(Commands::Resolve(args)) => commands::resolve::run(args, &ctx),
        Some(Commands::Deps(args)) => commands::deps::run(args, &ctx),
        Some(Commands::Compile(args)) => commands::compile::run(args, &ctx),
        Some(Commands::Load(args)) => commands::load::run(args, &ctx),
        Some(Commands::Cat(args)) => commands::cat::run(args, &ctx),
        None if !ctx.table.entries().is_empty() => {
            commands::load::run_embedded(&ctx.loader(), ctx.table.entries())
        }
        None => {
            println!("{}", "Usage: spacey-pack <command> [options]".yellow());
            println!();
            println!("Run {} for more information", "spacey-pack --help".cyan());
            Ok(())
        }
    }
}
