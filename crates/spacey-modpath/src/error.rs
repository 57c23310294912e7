// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for module resolution and embedding

use std::path::PathBuf;
use thiserror::Error;

/// Result type for module resolution operations
pub type Result<T> = std::result::Result<T, ModpathError>;

/// Errors that can occur while resolving, loading or embedding modules
#[derive(Debug, Error)]
pub enum ModpathError {
    /// Every resolution strategy was exhausted
    #[error("Cannot find module '{specifier}'")]
    NotFound {
        /// The specifier as written in the import, before translation
        specifier: String,
    },

    /// A module requested for embedding does not resolve at build time
    #[error("Cannot embed module '{specifier}': it does not resolve against the build search path")]
    BuildTimeUnresolvable {
        /// The force-embed or entry specifier
        specifier: String,
    },

    /// A resolved module could not be read
    #[error("Error reading module '{}': {source}", path.display())]
    Io {
        /// Path that matched during probing
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// A candidate path exceeded the join limit
    #[error("Candidate path is {len} bytes long, limit is {max}")]
    PathTooLong {
        /// Length of the rejected candidate
        len: usize,
        /// Configured maximum
        max: usize,
    },

    /// A candidate path could not be built
    #[error("Invalid module path: {0}")]
    InvalidCandidate(String),

    /// The embedded module table is malformed
    #[error("Invalid embedded module table: {0}")]
    InvalidTable(String),

    /// The embedded module table failed its digest check
    #[error("Embedded module table is corrupt: expected digest {expected}, got {actual}")]
    IntegrityMismatch {
        /// Digest recorded in the trailer
        expected: String,
        /// Digest of the payload actually read
        actual: String,
    },

    /// The host engine rejected a module
    #[error("Engine error for module '{specifier}': {reason}")]
    Engine {
        /// Module key or specifier
        specifier: String,
        /// Reason reported by the engine
        reason: String,
    },

    /// File system error outside of module probing
    #[error("File system error: {0}")]
    Fs(#[from] std::io::Error),
}

impl ModpathError {
    /// Create a module not found error
    pub fn not_found(specifier: impl Into<String>) -> Self {
        Self::NotFound {
            specifier: specifier.into(),
        }
    }

    /// Create an invalid table error
    pub fn invalid_table(msg: impl Into<String>) -> Self {
        Self::InvalidTable(msg.into())
    }

    /// Whether this error means the module simply does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
