// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Canonical module keys
//!
//! Keys are `/`-separated and lexically normalized. They are never run through
//! the filesystem, so the key computed at build time for a module is the same
//! string the runtime computes for the same import.
//!
//! The two namespaces never share a key. A search-path key is a plain name
//! (`node/fs`, `math/helpers.js`). A filesystem key always starts with `./`,
//! `../`, `/` or a drive, and the working directory itself is `.`.

use crate::module_system::meta::Namespace;
use crate::module_system::specifier::is_drive_path;

/// Key for the current working directory
pub const CWD_KEY: &str = ".";

fn is_separator(c: char) -> bool {
    c == '/' || (cfg!(windows) && c == '\\')
}

/// Fold `.`, empty and `..` segments
///
/// With `clamp`, a `..` that would climb above the start is dropped.
fn segments(path: &str, clamp: bool) -> Vec<&str> {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split(is_separator) {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if clamp => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }
    parts
}

/// Key of a module addressed by name under a search root
///
/// `..` cannot leave the root, so the result never starts with `.` or `/`.
pub fn name_key(name: &str) -> String {
    let parts = segments(name, true);
    if parts.is_empty() {
        CWD_KEY.to_string()
    } else {
        parts.join("/")
    }
}

/// Key of a module addressed by filesystem path
///
/// Relative keys keep a leading `./` (or `../`). At the root of an absolute
/// path `..` is dropped.
pub fn path_key(path: &str) -> String {
    let (drive, rest) = if is_drive_path(path) {
        (Some(&path[..2]), &path[2..])
    } else {
        (None, path)
    };
    let absolute = drive.is_some() || rest.starts_with(is_separator);
    let parts = segments(rest, absolute);
    let joined = parts.join("/");

    match drive {
        Some(drive) => format!("{drive}/{joined}"),
        None if absolute => format!("/{joined}"),
        None if parts.is_empty() => CWD_KEY.to_string(),
        None if parts[0] == ".." => joined,
        None => format!("./{joined}"),
    }
}

/// Resolve a relative `specifier` against the directory key `base`
pub fn join_key(namespace: Namespace, base: &str, specifier: &str) -> String {
    let joined = format!("{base}/{specifier}");
    match namespace {
        Namespace::Search => name_key(&joined),
        Namespace::Filesystem => path_key(&joined),
    }
}

/// Directory key containing `key`
pub fn parent_key(key: &str) -> String {
    match key.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => key[..idx].to_string(),
        None => CWD_KEY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_key() {
        assert_eq!(name_key("node/fs"), "node/fs");
        assert_eq!(name_key("math/./lib/../index.js"), "math/index.js");
        assert_eq!(name_key("math/../../escape"), "escape");
        assert_eq!(name_key("a//b/"), "a/b");
    }

    #[test]
    fn test_path_key() {
        assert_eq!(path_key("./mods/math/index.js"), "./mods/math/index.js");
        assert_eq!(path_key("a/./b/../c"), "./a/c");
        assert_eq!(path_key("../x"), "../x");
        assert_eq!(path_key("./a/../../x"), "../x");
        assert_eq!(path_key("/a/../../b"), "/b");
        assert_eq!(path_key("./"), ".");
    }

    #[test]
    fn test_namespaces_never_share_a_key() {
        for name in ["util", "node/fs", "a/../b"] {
            assert_ne!(name_key(name), path_key(&format!("./{name}")));
            assert!(!name_key(name).starts_with('.'));
        }
    }

    #[test]
    fn test_join_key() {
        assert_eq!(join_key(Namespace::Filesystem, ".", "./util"), "./util");
        assert_eq!(join_key(Namespace::Filesystem, "./app/lib", "../main"), "./app/main");
        assert_eq!(join_key(Namespace::Filesystem, "/srv", "./x.js"), "/srv/x.js");
        assert_eq!(join_key(Namespace::Search, "node", "./internal/fs"), "node/internal/fs");
        assert_eq!(join_key(Namespace::Search, ".", "./helpers"), "helpers");
    }

    #[test]
    fn test_parent_key() {
        assert_eq!(parent_key("./app/main.js"), "./app");
        assert_eq!(parent_key("./main.js"), ".");
        assert_eq!(parent_key("main.js"), ".");
        assert_eq!(parent_key("node/fs"), "node");
        assert_eq!(parent_key("/main.js"), "/");
    }
}
