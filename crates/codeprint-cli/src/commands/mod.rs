//! Subcommand implementations.

pub mod find_projects;
pub mod generate;
pub mod init;
pub mod list_patterns;
pub mod output;
pub mod scan;
pub mod watch;

use anyhow::{anyhow, Context, Result};
use codeprint_core::{
    list_files, CompiledCatalog, Config, ProjectAggregator, ProjectInfo, ProjectStructure,
};
use std::path::{Path, PathBuf};

use crate::config_resolver::ConfigSource;

/// Everything one analysis pass produces.
pub struct Analysis {
    /// Resolved configuration.
    pub config: Config,
    /// Detected project identity.
    pub info: ProjectInfo,
    /// Aggregated structure.
    pub structure: ProjectStructure,
}

/// Loads the config, discovers files under `path` and aggregates them.
pub fn analyze(path: &Path, source: &ConfigSource) -> Result<Analysis> {
    let config = source.load()?;
    let root = project_root(path, &config.analyzer.root);

    // Catalog errors carry diagnostic codes and help; keep them in the message.
    let catalog = CompiledCatalog::builtin()
        .map_err(|e| anyhow!("{:?}", miette::Report::new(e)))
        .context("Built-in pattern catalog failed to compile")?;

    let files = list_files(&root, &config.analyzer)
        .with_context(|| format!("Failed to list files under {}", root.display()))?;

    tracing::info!("Scanning {} files in {}", files.len(), root.display());

    let structure = ProjectAggregator::new(&catalog, &config.analyzer).aggregate(&root, &files);
    let info = ProjectInfo::detect(&root, &structure);

    Ok(Analysis {
        config,
        info,
        structure,
    })
}

/// `configured` as-is when absolute, otherwise relative to `path`.
fn project_root(path: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else if configured == Path::new(".") {
        path.to_path_buf()
    } else {
        path.join(configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn root_defaults_to_path() {
        assert_eq!(
            project_root(Path::new("proj"), Path::new(".")),
            PathBuf::from("proj")
        );
        assert_eq!(
            project_root(Path::new("proj"), Path::new("src")),
            PathBuf::from("proj/src")
        );
        assert_eq!(
            project_root(Path::new("proj"), Path::new("/abs")),
            PathBuf::from("/abs")
        );
    }

    #[test]
    fn analyze_small_project() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("app")).unwrap();
        fs::write(
            tmp.path().join("app/main.py"),
            "import os\n\nclass Runner:\n    def run(self):\n        pass\n",
        )
        .unwrap();

        let analysis = analyze(tmp.path(), &ConfigSource::Default).unwrap();
        assert_eq!(analysis.structure.files, ["app/main.py"]);
        assert_eq!(analysis.structure.total_files, 1);
        assert!(analysis.structure.dependencies.contains_key("os"));
        assert_eq!(analysis.info.language, codeprint_core::Language::Python);
    }

    #[test]
    fn analyze_honors_configured_excludes() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("gen")).unwrap();
        fs::write(tmp.path().join("gen/out.py"), "def f():\n    pass\n").unwrap();
        fs::write(tmp.path().join("keep.py"), "def g():\n    pass\n").unwrap();
        let config = tmp.path().join("codeprint.toml");
        fs::write(&config, "[analyzer]\nexclude = [\"gen\"]\n").unwrap();

        let analysis = analyze(tmp.path(), &ConfigSource::Project(config)).unwrap();
        assert_eq!(analysis.structure.files, ["keep.py"]);
    }
}
