// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Static import/export scanning
//!
//! Finds the top-level `import` and `export ... from` declarations of a
//! module. Dynamic `import()` calls are collected separately; they are never
//! followed statically.

use regex::Regex;
use std::sync::LazyLock;

static IMPORT_FROM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^[ \t]*import\s+(?:type\s+)?(?:([\w$]+)\s*,?\s*)?(?:\{([^}]*)\})?\s*(?:\*\s*as\s+([\w$]+))?\s*from\s*['"]([^'"\n]+)['"]"#,
    )
    .expect("import regex")
});

static IMPORT_SIDE_EFFECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\s*['"]([^'"\n]+)['"]"#).expect("side-effect import regex")
});

static EXPORT_FROM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^[ \t]*export\s+(?:type\s+)?(?:\*\s*(?:as\s+([\w$]+))?|\{([^}]*)\})\s*from\s*['"]([^'"\n]+)['"]"#,
    )
    .expect("re-export regex")
});

static EXPORT_LOCAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^[ \t]*export\s+(?:(default)\b|(?:async\s+)?function\s*\*?\s*([\w$]+)|class\s+([\w$]+)|(?:const|let|var)\s+([\w$]+)|\{([^}]*)\})"#,
    )
    .expect("export regex")
});

static DYNAMIC_IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bimport\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#).expect("dynamic import regex")
});

/// One binding introduced by an import
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBinding {
    /// `import foo from 'module'`
    Default(String),
    /// `import { foo }` or `import { foo as bar }`
    Named(String, Option<String>),
    /// `import * as foo from 'module'`
    Namespace(String),
}

/// One name made visible by an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportSpecifier {
    /// `export default value`
    Default,
    /// `export { foo }`, `export { foo as bar }`, `export const foo`
    Named(String, Option<String>),
    /// `export * from 'module'`
    All,
    /// `export * as name from 'module'`
    AllAs(String),
}

/// A static import declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDeclaration {
    /// The module specifier
    pub specifier: String,
    /// Bindings introduced
    pub bindings: Vec<ImportBinding>,
    /// `import 'module'`
    pub side_effect_only: bool,
    offset: usize,
}

/// An export declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDeclaration {
    /// Exported names
    pub exports: Vec<ExportSpecifier>,
    /// Source module for re-exports
    pub from_module: Option<String>,
    offset: usize,
}

/// Static shape of one module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleScan {
    /// Import declarations in source order
    pub imports: Vec<ImportDeclaration>,
    /// Export declarations in source order
    pub exports: Vec<ExportDeclaration>,
    /// Literal `import()` targets, not followed statically
    pub dynamic_imports: Vec<String>,
}

impl ModuleScan {
    /// Specifiers of every static edge, in declaration order, first occurrence only
    pub fn static_specifiers(&self) -> Vec<&str> {
        let mut edges: Vec<(usize, &str)> = self
            .imports
            .iter()
            .map(|import| (import.offset, import.specifier.as_str()))
            .chain(
                self.exports
                    .iter()
                    .filter_map(|export| Some((export.offset, export.from_module.as_deref()?))),
            )
            .collect();
        edges.sort_by_key(|(offset, _)| *offset);

        let mut specifiers = Vec::with_capacity(edges.len());
        for (_, specifier) in edges {
            if !specifiers.contains(&specifier) {
                specifiers.push(specifier);
            }
        }
        specifiers
    }

    /// Names this module exports, as seen by importers
    pub fn exported_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for export in &self.exports {
            for spec in &export.exports {
                let name = match spec {
                    ExportSpecifier::Default => "default".to_string(),
                    ExportSpecifier::Named(local, alias) => alias.as_ref().unwrap_or(local).clone(),
                    ExportSpecifier::AllAs(name) => name.clone(),
                    ExportSpecifier::All => continue,
                };
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

/// Scan module source for its static imports and exports
pub fn scan_module(source: &str) -> ModuleScan {
    let code = blank_non_code(source);
    let mut scan = ModuleScan::default();

    for cap in IMPORT_FROM_RE.captures_iter(&code) {
        let mut bindings = Vec::new();
        if let Some(default) = cap.get(1) {
            bindings.push(ImportBinding::Default(default.as_str().to_string()));
        }
        if let Some(named) = cap.get(2) {
            bindings.extend(
                parse_named_list(named.as_str())
                    .into_iter()
                    .map(|(name, alias)| ImportBinding::Named(name, alias)),
            );
        }
        if let Some(ns) = cap.get(3) {
            bindings.push(ImportBinding::Namespace(ns.as_str().to_string()));
        }
        scan.imports.push(ImportDeclaration {
            specifier: cap[4].to_string(),
            bindings,
            side_effect_only: false,
            offset: cap.get(0).map_or(0, |m| m.start()),
        });
    }

    for cap in IMPORT_SIDE_EFFECT_RE.captures_iter(&code) {
        scan.imports.push(ImportDeclaration {
            specifier: cap[1].to_string(),
            bindings: Vec::new(),
            side_effect_only: true,
            offset: cap.get(0).map_or(0, |m| m.start()),
        });
    }

    for cap in EXPORT_FROM_RE.captures_iter(&code) {
        let exports = if let Some(named) = cap.get(2) {
            parse_named_list(named.as_str())
                .into_iter()
                .map(|(name, alias)| ExportSpecifier::Named(name, alias))
                .collect()
        } else if let Some(alias) = cap.get(1) {
            vec![ExportSpecifier::AllAs(alias.as_str().to_string())]
        } else {
            vec![ExportSpecifier::All]
        };
        scan.exports.push(ExportDeclaration {
            exports,
            from_module: Some(cap[3].to_string()),
            offset: cap.get(0).map_or(0, |m| m.start()),
        });
    }

    for cap in EXPORT_LOCAL_RE.captures_iter(&code) {
        let Some(whole) = cap.get(0) else { continue };
        let exports = if cap.get(1).is_some() {
            vec![ExportSpecifier::Default]
        } else if let Some(name) = cap.get(2).or_else(|| cap.get(3)).or_else(|| cap.get(4)) {
            vec![ExportSpecifier::Named(name.as_str().to_string(), None)]
        } else if let Some(named) = cap.get(5) {
            // `export { a } from 'x'` is a re-export, already recorded
            if code[whole.end()..].trim_start().starts_with("from") {
                continue;
            }
            parse_named_list(named.as_str())
                .into_iter()
                .map(|(name, alias)| ExportSpecifier::Named(name, alias))
                .collect()
        } else {
            continue;
        };
        scan.exports.push(ExportDeclaration {
            exports,
            from_module: None,
            offset: whole.start(),
        });
    }

    scan.imports.sort_by_key(|import| import.offset);
    scan.exports.sort_by_key(|export| export.offset);

    scan.dynamic_imports = DYNAMIC_IMPORT_RE
        .captures_iter(&code)
        .map(|cap| cap[1].to_string())
        .collect();

    scan
}

/// Parse `a, b as c` into `(name, alias)` pairs
fn parse_named_list(list: &str) -> Vec<(String, Option<String>)> {
    list.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once(" as ") {
            Some((name, alias)) => (name.trim().to_string(), Some(alias.trim().to_string())),
            None => (part.to_string(), None),
        })
        .collect()
}

/// Replace comments and template literal bodies with spaces, keeping
/// offsets and line breaks
///
/// Quoted strings are copied through so `"//"` inside a string is left
/// alone. They never span lines, so they cannot hide a declaration.
fn blank_non_code(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                out.push(' ');
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                    out.push_str(&" ".repeat(next.len_utf8()));
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str("  ");
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                    } else {
                        out.push_str(&" ".repeat(next.len_utf8()));
                    }
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            '`' => {
                out.push(c);
                let mut escaped = false;
                for next in chars.by_ref() {
                    if !escaped && next == '`' {
                        out.push(next);
                        break;
                    }
                    escaped = !escaped && next == '\\';
                    if next == '\n' {
                        out.push('\n');
                    } else {
                        out.push_str(&" ".repeat(next.len_utf8()));
                    }
                }
            }
            '"' | '\'' => {
                out.push(c);
                let mut escaped = false;
                for next in chars.by_ref() {
                    out.push(next);
                    if escaped {
                        escaped = false;
                    } else if next == '\\' {
                        escaped = true;
                    } else if next == c || next == '\n' {
                        break;
                    }
                }
            }
            _ => out.push(c),
        }
    }

    out
}
