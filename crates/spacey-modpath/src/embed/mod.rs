// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Compile-time module embedding
//!
//! Discovery walks static imports from the entry modules plus an explicit
//! force-embed list; the emitter compiles the result into a table appended to
//! the executable; the resolver reads that table back at run time.

pub mod discovery;
pub mod emitter;
pub mod table;

pub use discovery::{discover, DependencyGraph, DiscoveredModule, UnresolvedImport};
pub use emitter::{build_table, write_executable, Emitter};
pub use table::{strip_table, EmbeddedModule, EmbeddedTable};
