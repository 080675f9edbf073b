//! Scan command implementation.

use anyhow::Result;
use std::path::Path;

use crate::config_resolver::ConfigSource;
use crate::ScanFormat;

/// Runs the scan command.
pub fn run(path: &Path, format: ScanFormat, source: &ConfigSource) -> Result<()> {
    let analysis = super::analyze(path, source)?;

    tracing::info!(
        "Found {} records in {} code files",
        analysis.structure.record_count(),
        analysis.structure.files.len()
    );

    super::output::print(&analysis.info, &analysis.structure, format)
}
