// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CLI argument parsing for spacey-pack

use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// spacey-pack - resolve, inspect and embed Spacey modules
#[derive(Parser, Debug)]
#[command(name = "spacey-pack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Module search path, separated like PATH
    #[arg(long, global = true, env = "SPACEY_PATH")]
    pub path: Option<OsString>,

    /// Do not retry unresolved bare names as paths from the working directory
    #[arg(long, global = true)]
    pub no_bare_fallback: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a specifier and print where it comes from
    Resolve(ResolveArgs),

    /// Show the modules reachable from entry points
    #[command(alias = "graph")]
    Deps(DepsArgs),

    /// Build an executable with its modules embedded
    #[command(alias = "build")]
    Compile(CompileArgs),

    /// Link a module graph through the runtime loader
    Load(LoadArgs),

    /// Print the content of a resolved module
    Cat(CatArgs),
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Specifier as written in an import
    pub specifier: String,

    /// Directory of the importing module
    #[arg(long)]
    pub from: Option<String>,
}

#[derive(Args, Debug)]
pub struct DepsArgs {
    /// Entry modules
    #[arg(required = true)]
    pub entries: Vec<String>,

    /// Additional module to include even if nothing imports it statically
    #[arg(short = 'M', long = "embed")]
    pub embed: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Entry modules
    #[arg(required = true)]
    pub entries: Vec<String>,

    /// Output executable
    #[arg(short, long)]
    pub output: PathBuf,

    /// Additional module to embed even if nothing imports it statically
    #[arg(short = 'M', long = "embed")]
    pub embed: Vec<String>,

    /// Runtime executable to append the modules to (defaults to this binary)
    #[arg(long)]
    pub runtime: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Entry module
    pub entry: String,

    /// Also link these specifiers as dynamic imports of the entry
    #[arg(long = "import")]
    pub dynamic: Vec<String>,
}

#[derive(Args, Debug)]
pub struct CatArgs {
    /// Specifier to resolve
    pub specifier: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compile() {
        let cli = Cli::try_parse_from([
            "spacey-pack",
            "compile",
            "bootstrap",
            "-o",
            "app",
            "-M",
            "node:fs",
            "--embed",
            "node:process",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Compile(args)) => {
                assert_eq!(args.entries, vec!["bootstrap"]);
                assert_eq!(args.output, PathBuf::from("app"));
                assert_eq!(args.embed, vec!["node:fs", "node:process"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "spacey-pack",
            "resolve",
            "math",
            "--path",
            "/opt/mods",
            "--no-bare-fallback",
        ])
        .unwrap();
        assert_eq!(cli.path.as_deref(), Some(std::ffi::OsStr::new("/opt/mods")));
        assert!(cli.no_bare_fallback);
    }
}
