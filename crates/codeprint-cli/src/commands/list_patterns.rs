//! List patterns command implementation.

use codeprint_core::{Bucket, PatternCatalog, PatternRule};
use std::fmt::Write;

/// Runs the list-patterns command.
pub fn run() {
    print!("{}", render(&PatternCatalog::builtin()));
}

fn render(catalog: &PatternCatalog) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Construct rules (one alternation per kind and family):\n");
    for construct in catalog.constructs() {
        let _ = writeln!(out, "{}/{}", construct.kind, construct.family);
        write_rules(&mut out, &construct.alternatives);
    }

    for bucket in Bucket::ALL {
        let _ = writeln!(out, "\n{bucket} rules:\n");
        write_rules(&mut out, catalog.rules(bucket));
    }

    let _ = writeln!(out, "\n{}", "-".repeat(80));
    let _ = writeln!(
        out,
        "Web-family idioms run for JavaScript and TypeScript only; platform rules run"
    );
    let _ = writeln!(
        out,
        "for C# files mentioning {}.",
        codeprint_core::catalog::PLATFORM_MARKERS.join(", ")
    );

    out
}

fn write_rules(out: &mut String, rules: &[PatternRule]) {
    for rule in rules {
        let _ = writeln!(out, "  {:<22} {}", rule.name, rule.pattern);
    }
}
