//! Rendering of scan results.

use anyhow::Result;
use codeprint_core::{ProjectInfo, ProjectStructure};
use serde::Serialize;
use std::fmt::Write;

use crate::ScanFormat;

/// How many dependencies the text summary lists before eliding.
const DEPENDENCY_PREVIEW: usize = 15;

#[derive(Serialize)]
struct ScanReport<'a> {
    project: &'a ProjectInfo,
    structure: &'a ProjectStructure,
}

/// Print a scan result in the specified format.
pub fn print(info: &ProjectInfo, structure: &ProjectStructure, format: ScanFormat) -> Result<()> {
    match format {
        ScanFormat::Text => print!("{}", render_text(info, structure)),
        ScanFormat::Json => {
            let json = serde_json::to_string_pretty(&ScanReport {
                project: info,
                structure,
            })?;
            println!("{json}");
        }
    }
    Ok(())
}

fn render_text(info: &ProjectInfo, structure: &ProjectStructure) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\x1b[1m{}\x1b[0m v{}", info.name, info.version);
    let _ = writeln!(
        out,
        "  language: {}, framework: {}, type: {}",
        info.language, info.framework, info.project_type
    );
    let _ = writeln!(
        out,
        "  {} code file(s) analyzed, {} file(s) total, {} config file(s)",
        structure.files.len(),
        structure.total_files,
        structure.config_files.len()
    );

    if !structure.languages.is_empty() {
        let _ = writeln!(out, "\nLanguages:");
        for (language, count) in &structure.languages {
            let _ = writeln!(out, "  {:<14} {count}", language.to_string());
        }
    }

    if !structure.records.is_empty() {
        let _ = writeln!(out, "\nRecords:");
        for (kind, records) in &structure.records {
            let _ = writeln!(out, "  {:<20} {}", kind.as_str(), records.len());
        }
    }

    if !structure.directories.is_empty() {
        let _ = writeln!(out, "\nDirectories:");
        for (dir, stats) in &structure.directories {
            let name = if dir.is_empty() { "." } else { dir.as_str() };
            let mut line = format!("  {name:<30} {}/{} code", stats.code_files, stats.total_files);
            if let Some(naming) = stats.naming {
                let _ = write!(line, ", {naming}");
            }
            if !stats.purposes.is_empty() {
                let purposes: Vec<&str> = stats.purposes.iter().map(|p| p.as_str()).collect();
                let _ = write!(line, " [{}]", purposes.join(", "));
            }
            let _ = writeln!(out, "{line}");
        }
    }

    if !structure.dependencies.is_empty() {
        let names: Vec<&str> = structure
            .dependencies
            .keys()
            .take(DEPENDENCY_PREVIEW)
            .map(String::as_str)
            .collect();
        let _ = writeln!(
            out,
            "\nDependencies ({}): {}",
            structure.dependencies.len(),
            names.join(", ")
        );
        if structure.dependencies.len() > DEPENDENCY_PREVIEW {
            let _ = writeln!(
                out,
                "  ... and {} more",
                structure.dependencies.len() - DEPENDENCY_PREVIEW
            );
        }
    }

    out
}
