//! Find-projects command implementation.

use anyhow::{Context, Result};
use codeprint_core::{
    find_projects, is_code_extension, list_files, AnalyzerConfig, Language, ProjectInfo,
    ProjectStructure,
};
use serde::Serialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::config_resolver::ConfigSource;
use crate::ScanFormat;

/// One project found below the scanned directory.
#[derive(Debug, Serialize)]
struct FoundProject {
    path: PathBuf,
    #[serde(flatten)]
    info: ProjectInfo,
}

/// Runs the find-projects command.
pub fn run(
    path: &Path,
    max_depth: usize,
    format: ScanFormat,
    source: &ConfigSource,
) -> Result<()> {
    let config = source.load()?;
    let dirs = find_projects(path, max_depth)
        .with_context(|| format!("Failed to search {}", path.display()))?;

    tracing::info!("Found {} projects under {}", dirs.len(), path.display());

    let found = dirs
        .into_iter()
        .map(|dir| describe(dir, &config.analyzer))
        .collect::<Result<Vec<_>>>()?;

    match format {
        ScanFormat::Text => print!("{}", render_text(&found)),
        ScanFormat::Json => println!("{}", serde_json::to_string_pretty(&found)?),
    }
    Ok(())
}

/// Identifies a project from its manifests and a census of file
/// extensions; no file is read for analysis.
fn describe(dir: PathBuf, config: &AnalyzerConfig) -> Result<FoundProject> {
    let files = list_files(&dir, config)
        .with_context(|| format!("Failed to list files under {}", dir.display()))?;

    let mut structure = ProjectStructure::new();
    for rel in &files {
        let extension = Path::new(rel)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        if is_code_extension(extension) {
            *structure
                .languages
                .entry(Language::from_extension(extension))
                .or_default() += 1;
        }
    }

    let info = ProjectInfo::detect(&dir, &structure);
    Ok(FoundProject { path: dir, info })
}

fn render_text(found: &[FoundProject]) -> String {
    let mut out = String::new();
    if found.is_empty() {
        let _ = writeln!(out, "No projects found.");
        return out;
    }

    let _ = writeln!(out, "Found {} projects:\n", found.len());
    for project in found {
        let info = &project.info;
        let _ = writeln!(
            out,
            "  {} ({}, {}, {})",
            info.name, info.language, info.framework, info.project_type
        );
        let _ = writeln!(out, "    {}", project.path.display());
    }
    out
}
