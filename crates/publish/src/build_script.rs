//! Dependency declarations from a module build script
//!
//! Reads `build.gradle.kts` or `build.gradle` and picks up entries for the
//! configured dependency configurations. Both Kotlin call syntax
//! (`implementation(libs.okhttp)`) and Groovy syntax (`implementation 'g:n:v'`,
//! `implementation group: 'g', name: 'n', version: 'v'`) are recognized.
//! Comments are removed first, and a parenthesized argument may span lines.

use crate::catalog::VersionCatalog;
use crate::manifest::DependencyDeclaration;
use aarpub_core::error::{Error, ErrorCode, Result, ResultExt};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, warn};

static DECLARATION_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)(\s*\(|\s+)").unwrap());

static NAMED_ARG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\b(group|name|version)\s*[:=]\s*["']([^"']*)["']"#).unwrap());

/// Extracts dependency declarations for a set of configurations
#[derive(Debug)]
pub struct BuildScriptReader<'a> {
    catalog: &'a VersionCatalog,
    configurations: Vec<String>,
}

impl<'a> BuildScriptReader<'a> {
    /// Reader for the given configuration names
    pub fn new(catalog: &'a VersionCatalog, configurations: &[String]) -> Self {
        Self {
            catalog,
            configurations: configurations.to_vec(),
        }
    }

    /// Read a build script file
    pub fn read(&self, path: &Path) -> Result<Vec<DependencyDeclaration>> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| {
                Error::new(
                    ErrorCode::BuildScriptError,
                    format!("Cannot read build script {}", path.display()),
                )
                .with_source(e)
            })
            .context("While reading declared dependencies")?;
        Ok(self.parse(&text))
    }

    /// Extract declarations from build script text, in file order
    pub fn parse(&self, text: &str) -> Vec<DependencyDeclaration> {
        let source = strip_comments(text);
        let mut declarations = Vec::new();
        let mut pos = 0;

        while pos < source.len() {
            let line_end = end_of_line(&source, pos);
            let line = &source[pos..line_end];
            let mut next = line_end + 1;

            let Some(caps) = DECLARATION_START.captures(line) else {
                pos = next;
                continue;
            };
            let configuration = &caps[1];
            if !self.configurations.iter().any(|c| c == configuration) {
                pos = next;
                continue;
            }

            let start = pos + caps.get(0).map_or(0, |m| m.end());
            let argument = if caps[2].trim_start().starts_with('(') {
                match balanced_argument(&source[start..]) {
                    Some((argument, close)) => {
                        next = end_of_line(&source, start + close) + 1;
                        argument
                    }
                    None => source[start..line_end].trim(),
                }
            } else {
                source[start..line_end].trim()
            };

            let declaration = self
                .classify(argument)
                .with_configuration(configuration);
            debug!(
                configuration,
                argument,
                complete = declaration.is_complete(),
                "Declared dependency"
            );
            declarations.push(declaration);
            pos = next;
        }

        declarations
    }

    fn classify(&self, argument: &str) -> DependencyDeclaration {
        if let Some(notation) = unquote(argument) {
            return DependencyDeclaration::from_notation(notation)
                .unwrap_or_else(|| unresolved(notation));
        }

        if let Some(accessor) = argument.strip_prefix("libs.") {
            return self.catalog.resolve(accessor).unwrap_or_else(|| {
                warn!(alias = argument, "Dependency alias not found in version catalog");
                unresolved(argument)
            });
        }

        if NAMED_ARG.is_match(argument) {
            let mut group = None;
            let mut name = String::new();
            let mut version = None;
            for caps in NAMED_ARG.captures_iter(argument) {
                let value = caps[2].to_string();
                match &caps[1] {
                    "group" => group = Some(value),
                    "name" => name = value,
                    _ => version = Some(value),
                }
            }
            return DependencyDeclaration::new(group, name, version);
        }

        // files(...), project(...), platform(...) and the like
        unresolved(argument)
    }
}

fn unresolved(name: &str) -> DependencyDeclaration {
    DependencyDeclaration::new(None::<String>, name, None::<String>)
}

fn unquote(argument: &str) -> Option<&str> {
    let first = argument.chars().next()?;
    if !matches!(first, '"' | '\'') || argument.len() < 2 || !argument.ends_with(first) {
        return None;
    }
    Some(&argument[1..argument.len() - 1])
}

fn end_of_line(source: &str, from: usize) -> usize {
    source[from..].find('\n').map_or(source.len(), |i| from + i)
}

/// Argument up to the parenthesis closing an already-consumed `(`
///
/// Returns the trimmed argument and the offset just past the closing
/// parenthesis, or `None` when the text never balances.
fn balanced_argument(rest: &str) -> Option<(&str, usize)> {
    let mut depth = 1usize;
    let mut quote: Option<char> = None;

    for (idx, ch) in rest.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => {
                depth -= 1;
                if depth == 0 {
                    return Some((rest[..idx].trim(), idx + 1));
                }
            }
            _ => {}
        }
    }
    None
}

/// Remove `//` and `/* */` comments outside string literals
///
/// Newlines inside block comments are kept so line structure survives.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            out.push(ch);
            match ch {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '\n' => quote = None,
                c if c == q => quote = None,
                _ => {}
            }
            continue;
        }

        let next = chars.peek().copied();
        match (ch, next) {
            ('"' | '\'', _) => {
                quote = Some(ch);
                out.push(ch);
            }
            ('/', Some('/')) => {
                while chars.next_if(|c| *c != '\n').is_some() {}
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            _ => out.push(ch),
        }
    }
    out
}
