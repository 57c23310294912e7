// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Specifier classification and protocol-prefix translation

use std::fmt;

/// How a specifier addresses its module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecifierKind {
    /// Resolved through the search path (`lodash`, `node/fs`)
    Bare,
    /// Starts with `./` or `../`, resolved against the importing module
    Relative,
    /// Starts with `/` (or a drive letter on Windows)
    Absolute,
}

/// A module specifier as written in an import
///
/// Immutable once parsed. Translation produces the `translated` form next to
/// the raw one, it never rewrites `raw`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleSpecifier {
    raw: String,
    kind: SpecifierKind,
    translated: Option<String>,
}

impl ModuleSpecifier {
    /// Classify a raw specifier, translating any protocol prefix first
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let translated = translate_protocol(&raw);
        let kind = classify(translated.as_deref().unwrap_or(&raw));
        Self {
            raw,
            kind,
            translated,
        }
    }

    /// The specifier exactly as written
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The translated form, if translation applied
    pub fn translated(&self) -> Option<&str> {
        self.translated.as_deref()
    }

    /// The form every resolution step works with
    pub fn effective(&self) -> &str {
        self.translated.as_deref().unwrap_or(&self.raw)
    }

    /// Classification of the effective form
    pub fn kind(&self) -> SpecifierKind {
        self.kind
    }

    /// Whether the specifier goes through the search path
    pub fn is_bare(&self) -> bool {
        self.kind == SpecifierKind::Bare
    }
}

impl fmt::Display for ModuleSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Classify a specifier by its leading characters
pub fn classify(specifier: &str) -> SpecifierKind {
    if is_relative(specifier) {
        SpecifierKind::Relative
    } else if specifier.starts_with('/') || is_drive_path(specifier) {
        SpecifierKind::Absolute
    } else if cfg!(windows) && specifier.starts_with('\\') {
        SpecifierKind::Absolute
    } else {
        SpecifierKind::Bare
    }
}

fn is_relative(specifier: &str) -> bool {
    if specifier == "." || specifier == ".." {
        return true;
    }
    if specifier.starts_with("./") || specifier.starts_with("../") {
        return true;
    }
    cfg!(windows) && (specifier.starts_with(".\\") || specifier.starts_with("..\\"))
}

/// Whether the specifier is a Windows drive path (`C:\dir`, `C:/dir`)
///
/// Always false off Windows, where `c:thing` is an ordinary protocol form.
pub fn is_drive_path(specifier: &str) -> bool {
    if !cfg!(windows) {
        return false;
    }
    let bytes = specifier.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
}

/// Rewrite every `:` to `/`
///
/// Returns `None` when the specifier has no colon or is a drive path, so an
/// already-translated specifier translates to nothing.
pub fn translate_protocol(specifier: &str) -> Option<String> {
    if !specifier.contains(':') || is_drive_path(specifier) {
        return None;
    }
    Some(specifier.replace(':', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("./foo"), SpecifierKind::Relative);
        assert_eq!(classify("../foo/bar"), SpecifierKind::Relative);
        assert_eq!(classify("."), SpecifierKind::Relative);
        assert_eq!(classify("/usr/lib/foo.js"), SpecifierKind::Absolute);
        assert_eq!(classify("lodash"), SpecifierKind::Bare);
        assert_eq!(classify("node/fs"), SpecifierKind::Bare);
        assert_eq!(classify(".hidden"), SpecifierKind::Bare);
    }

    #[test]
    fn test_translate_protocol() {
        assert_eq!(translate_protocol("ns:sub:leaf").as_deref(), Some("ns/sub/leaf"));
        assert_eq!(translate_protocol("node:fs").as_deref(), Some("node/fs"));
        assert_eq!(translate_protocol("scheme:name/sub").as_deref(), Some("scheme/name/sub"));
        assert_eq!(translate_protocol("lodash"), None);
    }

    #[test]
    fn test_translation_is_idempotent() {
        let once = translate_protocol("ns:sub:leaf").unwrap();
        assert_eq!(translate_protocol(&once), None);

        let spec = ModuleSpecifier::parse(once.clone());
        assert_eq!(spec.effective(), once);
        assert_eq!(spec.translated(), None);
    }

    #[test]
    fn test_parse_keeps_raw() {
        let spec = ModuleSpecifier::parse("node:fs");
        assert_eq!(spec.raw(), "node:fs");
        assert_eq!(spec.translated(), Some("node/fs"));
        assert_eq!(spec.effective(), "node/fs");
        assert!(spec.is_bare());
        assert_eq!(spec.to_string(), "node:fs");
    }

    #[test]
    fn test_translated_relative() {
        let spec = ModuleSpecifier::parse("./a:b");
        assert_eq!(spec.effective(), "./a/b");
        assert_eq!(spec.kind(), SpecifierKind::Relative);
    }
}
