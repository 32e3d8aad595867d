//! Syntax-level import scanning for module source text.
//!
//! The scanner recognizes the three specifier-bearing constructs that decide
//! what a module pulls in:
//!
//! - static imports: `import ... from "x"`, including bare `import "x"`
//! - dynamic loads: `import("x")` and `runtime.get("x")`
//! - re-exports: `export ... from "x"`
//!
//! Type-only declarations (`import type ...`, `export type ...`) carry no
//! runtime dependency and are skipped.
//!
//! # A heuristic, not a parser
//!
//! Matching is regex-based and deliberately stays at the syntax level. It is
//! not guaranteed correct on adversarial input: an import-shaped line inside a
//! template literal or a commented-out import at the start of a line will be
//! picked up as if it were real. This matches the scanning behavior the
//! dependency graph was designed around; swapping in a real lexer would
//! change which modules get shipped.

use std::sync::OnceLock;

use regex::Regex;

/// How a specifier was referenced in the scanned module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import ... from "x"` or a bare `import "x"`.
    Static,
    /// `export ... from "x"`.
    Reexport,
    /// `import("x")` or `runtime.get("x")`.
    Dynamic,
}

/// A specifier extracted from module source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpecifier {
    /// The raw specifier string between the quotes.
    pub specifier: String,
    /// The construct it appeared in.
    pub kind: ImportKind,
}

/// Statement-anchored static import/export matcher.
///
/// The leading `(?:^|;)` anchor replaces the lookbehind of the original
/// pattern this was derived from; an optional `*/` allows a declaration
/// directly after a closing block comment.
fn static_import_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?m)(?:^|;)[ \t]*(?:\*/[ \t]*)?((?:import|export)\s+[A-Za-z0-9_$,{}*\s]*?from\s*|import\s*)["']([^"']+)["']"#,
        )
        .expect("static import regex is valid")
    })
}

/// Dynamic `import(...)` / `runtime.get(...)` matcher.
fn dynamic_import_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:\bimport|\bruntime\.get)\s*\(\s*(?:"([^"]*)"|'([^']*)')\s*\)"#)
            .expect("dynamic import regex is valid")
    })
}

/// Type-only declaration prefix (`import type`, `export type`).
fn type_only_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:import|export)\s+type\b").expect("type-only regex is valid")
    })
}

/// Extracts all dependency specifiers from module source text.
///
/// Returns specifiers in source order, without deduplication - callers
/// accumulate into a set. Type-only declarations are dropped here; external
/// registry prefixes and import-map resolution are the caller's concern.
///
/// # Examples
///
/// ```rust
/// use weft::resolver::scanner::{ImportKind, scan_module_specifiers};
///
/// let source = r#"
/// import { render } from "./render.ts";
/// import type { Options } from "./options.ts";
/// export * from "../shared/theme.ts";
/// const lazy = await import("./lazy.ts");
/// "#;
///
/// let specs = scan_module_specifiers(source);
/// assert_eq!(specs.len(), 3);
/// assert_eq!(specs[0].specifier, "./render.ts");
/// assert_eq!(specs[1].kind, ImportKind::Reexport);
/// assert_eq!(specs[2].kind, ImportKind::Dynamic);
/// ```
#[must_use]
pub fn scan_module_specifiers(source: &str) -> Vec<ImportSpecifier> {
    let mut specifiers = Vec::new();

    for cap in static_import_regex().captures_iter(source) {
        let prefix = cap.get(1).map_or("", |m| m.as_str());
        if type_only_regex().is_match(prefix.trim_start()) {
            continue;
        }
        if let Some(spec) = cap.get(2) {
            let kind = if prefix.trim_start().starts_with("export") {
                ImportKind::Reexport
            } else {
                ImportKind::Static
            };
            specifiers.push(ImportSpecifier {
                specifier: spec.as_str().to_string(),
                kind,
            });
        }
    }

    for cap in dynamic_import_regex().captures_iter(source) {
        let spec = cap.get(1).or_else(|| cap.get(2));
        if let Some(spec) = spec {
            specifiers.push(ImportSpecifier {
                specifier: spec.as_str().to_string(),
                kind: ImportKind::Dynamic,
            });
        }
    }

    specifiers
}
