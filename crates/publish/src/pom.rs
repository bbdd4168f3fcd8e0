//! Maven POM rendering

use crate::coordinates::PackageCoordinates;
use crate::manifest::ManifestEntry;
use std::fmt::Write;

const INDENT: &str = "  ";

/// Render the `<dependencies>` element for manifest entries
///
/// `depth` is the indentation level of the element itself.
pub fn render_dependencies(entries: &[ManifestEntry], depth: usize) -> String {
    let pad = INDENT.repeat(depth);
    if entries.is_empty() {
        return format!("{pad}<dependencies/>\n");
    }

    let mut out = format!("{pad}<dependencies>\n");
    for entry in entries {
        let inner = INDENT.repeat(depth + 2);
        let _ = writeln!(out, "{pad}{INDENT}<dependency>");
        for (tag, value) in [
            ("groupId", &entry.group),
            ("artifactId", &entry.artifact),
            ("version", &entry.version),
            ("scope", &entry.scope),
        ] {
            let _ = writeln!(out, "{inner}<{tag}>{}</{tag}>", escape(value));
        }
        let _ = writeln!(out, "{pad}{INDENT}</dependency>");
    }
    let _ = writeln!(out, "{pad}</dependencies>");
    out
}

/// Render a complete POM for an `.aar` package
pub fn render_pom(coordinates: &PackageCoordinates, entries: &[ManifestEntry]) -> String {
    let mut out = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <project xmlns=\"http://maven.apache.org/POM/4.0.0\" \
         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
         xsi:schemaLocation=\"http://maven.apache.org/POM/4.0.0 https://maven.apache.org/xsd/maven-4.0.0.xsd\">\n",
    );
    let _ = writeln!(out, "{INDENT}<modelVersion>4.0.0</modelVersion>");
    let _ = writeln!(out, "{INDENT}<groupId>{}</groupId>", escape(&coordinates.group));
    let _ = writeln!(out, "{INDENT}<artifactId>{}</artifactId>", escape(&coordinates.artifact));
    let _ = writeln!(out, "{INDENT}<version>{}</version>", escape(&coordinates.version));
    let _ = writeln!(out, "{INDENT}<packaging>aar</packaging>");
    out.push_str(&render_dependencies(entries, 1));
    out.push_str("</project>\n");
    out
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
