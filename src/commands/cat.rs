// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Cat command implementation

use anyhow::Result;
use std::io::Write;

use crate::cli::CatArgs;
use crate::commands::CommandContext;

/// Run the cat command
pub fn run(args: &CatArgs, ctx: &CommandContext) -> Result<()> {
    let loaded = ctx.loader().load(&args.specifier, None)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&loaded.code)?;
    stdout.flush()?;
    Ok(())
}
