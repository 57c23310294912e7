// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Filesystem probing (Node.js-style file, index and extension forms)

use crate::error::{ModpathError, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::trace;

/// File tried when a candidate names a directory
pub const INDEX_FILE: &str = "index.js";

/// Extension appended for extension-style candidates
pub const MODULE_EXTENSION: &str = ".js";

/// One way of turning a base path into a candidate file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeForm {
    /// `base` itself
    Exact,
    /// `base/index.js`
    Index,
    /// `base.js`
    Extension,
}

/// Order for relative and absolute specifiers
pub const DIRECT_PROBE_ORDER: &[ProbeForm] = &[ProbeForm::Exact, ProbeForm::Index, ProbeForm::Extension];

/// Order for `root/name` joins made by the search path
pub const SEARCH_PROBE_ORDER: &[ProbeForm] = &[ProbeForm::Index, ProbeForm::Extension, ProbeForm::Exact];

/// A successful probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHit {
    /// The file that matched
    pub path: PathBuf,
    /// Which form matched
    pub form: ProbeForm,
}

/// Probes candidate paths on the live filesystem
#[derive(Debug, Clone, Copy)]
pub struct FsProbe {
    max_candidate_len: usize,
}

impl FsProbe {
    /// Create a probe that refuses candidates longer than `max_candidate_len` bytes
    pub fn new(max_candidate_len: usize) -> Self {
        Self { max_candidate_len }
    }

    /// Try each form of `base` in order, stopping at the first loadable file
    pub fn probe(&self, base: &str, order: &[ProbeForm]) -> Result<Option<ProbeHit>> {
        for &form in order {
            let candidate = self.candidate(base, form)?;
            if is_loadable_file(&candidate) {
                trace!(candidate = %candidate.display(), ?form, "probe hit");
                return Ok(Some(ProbeHit {
                    path: candidate,
                    form,
                }));
            }
            trace!(candidate = %candidate.display(), ?form, "probe miss");
        }
        Ok(None)
    }

    /// Build the candidate path for one form
    ///
    /// Fails rather than truncating when the result is too long or contains
    /// a NUL byte.
    pub fn candidate(&self, base: &str, form: ProbeForm) -> Result<PathBuf> {
        let suffix_len = match form {
            ProbeForm::Exact => 0,
            ProbeForm::Index => 1 + INDEX_FILE.len(),
            ProbeForm::Extension => MODULE_EXTENSION.len(),
        };
        let len = base.len() + suffix_len;
        if len > self.max_candidate_len {
            return Err(ModpathError::PathTooLong {
                len,
                max: self.max_candidate_len,
            });
        }
        if base.contains('\0') {
            return Err(ModpathError::InvalidCandidate(format!(
                "'{}' contains a NUL byte",
                base.escape_debug()
            )));
        }

        let mut candidate = String::with_capacity(len);
        candidate.push_str(base);
        match form {
            ProbeForm::Exact => {}
            ProbeForm::Index => {
                candidate.push('/');
                candidate.push_str(INDEX_FILE);
            }
            ProbeForm::Extension => candidate.push_str(MODULE_EXTENSION),
        }
        Ok(PathBuf::from(candidate))
    }
}

/// Whether `path` is a regular file we can open for reading
///
/// Directories, sockets and devices never match.
pub fn is_loadable_file(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => File::open(path).is_ok(),
        _ => false,
    }
}
