//! Project-wide aggregation over a discovered file list.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::analyzer::{FileAnalysis, FileAnalyzer};
use crate::compiler::CompiledCatalog;
use crate::config::AnalyzerConfig;
use crate::language::{self, Language};
use crate::types::{ConfigFile, NamingConvention, ProjectStructure, Purpose, RecordKind};

/// Builds a [`ProjectStructure`] from a file list.
///
/// The file list is trusted: exclusion filtering happens upstream in
/// [`list_files`](crate::list_files).
#[derive(Debug, Clone, Copy)]
pub struct ProjectAggregator<'c> {
    analyzer: FileAnalyzer<'c>,
    max_file_bytes: u64,
}

impl<'c> ProjectAggregator<'c> {
    /// Creates an aggregator over a compiled catalog.
    #[must_use]
    pub fn new(catalog: &'c CompiledCatalog, config: &AnalyzerConfig) -> Self {
        Self {
            analyzer: FileAnalyzer::new(catalog),
            max_file_bytes: config.max_file_bytes,
        }
    }

    /// Aggregates `files` (relative to `root`) into a structure.
    ///
    /// Unreadable, oversized or non-UTF-8 code files are logged and skipped.
    /// They still count toward `total_files` and their directory's
    /// `total_files`.
    #[must_use]
    pub fn aggregate(&self, root: &Path, files: &[String]) -> ProjectStructure {
        let mut structure = ProjectStructure::new();

        for rel in files {
            structure.total_files += 1;
            let dir = parent_dir(rel);
            structure.directories.entry(dir.to_string()).or_default().total_files += 1;
            for ancestor in ancestors(dir) {
                structure.directories.entry(ancestor.to_string()).or_default();
            }

            let extension = Path::new(rel)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default();

            if language::is_code_extension(extension) {
                let Some(text) = self.read(root, rel) else {
                    continue;
                };
                let language = Language::from_extension(extension);
                let analysis = self.analyzer.analyze(&text, rel, language);
                merge(&mut structure, dir, analysis);
                structure.code_contents.insert(rel.clone(), text);
            } else if language::is_config_extension(extension) {
                if let Some(content) = self.read(root, rel) {
                    structure.config_files.push(ConfigFile {
                        file: rel.clone(),
                        content,
                    });
                }
            }
        }

        classify_directories(&mut structure);

        info!(
            files = structure.files.len(),
            total = structure.total_files,
            records = structure.record_count(),
            dependencies = structure.dependencies.len(),
            "aggregated project"
        );
        structure
    }

    fn read(&self, root: &Path, rel: &str) -> Option<String> {
        let path = root.join(rel);
        match std::fs::metadata(&path) {
            Ok(meta) if meta.len() > self.max_file_bytes => {
                warn!(file = rel, bytes = meta.len(), "skipping oversized file");
                return None;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(file = rel, error = %e, "failed to read file");
                return None;
            }
        }

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(file = rel, error = %e, "failed to read file");
                return None;
            }
        };
        match String::from_utf8(bytes) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(file = rel, error = %e, "file is not valid UTF-8");
                None
            }
        }
    }
}

fn merge(structure: &mut ProjectStructure, dir: &str, analysis: FileAnalysis) {
    let FileAnalysis {
        file,
        language,
        imports,
        records,
    } = analysis;

    debug!(file = %file, %language, records = records.len(), "analyzed file");

    let stats = structure.directories.entry(dir.to_string()).or_default();
    stats.code_files += 1;
    *stats.languages.entry(language).or_default() += 1;
    if !imports.is_empty() {
        *stats.patterns.entry(RecordKind::Import).or_default() += imports.len();
    }
    for record in &records {
        *stats.patterns.entry(record.kind).or_default() += 1;
    }

    *structure.languages.entry(language).or_default() += 1;
    for module in &imports {
        structure.dependencies.insert(module.clone(), true);
    }
    if !imports.is_empty() {
        structure.imports.insert(file.clone(), imports);
    }
    for record in records {
        structure.records.entry(record.kind).or_default().push(record);
    }
    structure.files.push(file);
}

fn classify_directories(structure: &mut ProjectStructure) {
    for (path, stats) in &mut structure.directories {
        if path.is_empty() {
            continue;
        }
        let base = path.rsplit('/').next().unwrap_or(path);
        stats.naming = Some(NamingConvention::classify(base));
        stats.purposes = Purpose::infer(base);
    }
}

/// Parent directory of a `/`-separated relative path; `""` for the root.
fn parent_dir(rel: &str) -> &str {
    rel.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Proper ancestors of a non-root directory, nearest first. The root is not
/// included.
fn ancestors(dir: &str) -> impl Iterator<Item = &str> {
    dir.rmatch_indices('/').map(move |(i, _)| &dir[..i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn files(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("main.py"), "");
        assert_eq!(parent_dir("src/utils/io.py"), "src/utils");
    }

    #[test]
    fn test_ancestors() {
        assert_eq!(ancestors("").count(), 0);
        assert_eq!(ancestors("src").count(), 0);
        let chain: Vec<_> = ancestors("src/app/models").collect();
        assert_eq!(chain, ["src/app", "src"]);
    }

    #[test]
    fn test_ancestor_directories_are_classified() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "src/models/order.py", "class Order:\n    pass\n");

        let catalog = CompiledCatalog::builtin().unwrap();
        let structure = ProjectAggregator::new(&catalog, &AnalyzerConfig::default())
            .aggregate(tmp.path(), &files(&["src/models/order.py"]));

        let src = &structure.directories["src"];
        assert_eq!(src.total_files, 0);
        assert_eq!(src.code_files, 0);
        assert_eq!(src.naming, Some(NamingConvention::Lowercase));
        assert!(!structure.directories.contains_key(""));

        let models = &structure.directories["src/models"];
        assert_eq!(models.total_files, 1);
        assert_eq!(models.code_files, 1);
    }

    #[test]
    fn test_counts_and_records() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "app.py", "import os\n\ndef run(a):\n    pass\n");
        write(tmp.path(), "README.md", "# readme\n");

        let catalog = CompiledCatalog::builtin().unwrap();
        let aggregator = ProjectAggregator::new(&catalog, &AnalyzerConfig::default());
        let structure = aggregator.aggregate(tmp.path(), &files(&["README.md", "app.py"]));

        assert_eq!(structure.total_files, 2);
        assert_eq!(structure.files, ["app.py"]);
        assert_eq!(structure.dependencies.get("os"), Some(&true));
        assert_eq!(structure.records_of(RecordKind::Function).len(), 1);

        let root = &structure.directories[""];
        assert_eq!(root.total_files, 2);
        assert_eq!(root.code_files, 1);
        assert_eq!(root.languages[&Language::Python], 1);
        assert_eq!(root.patterns[&RecordKind::Import], 1);
        assert_eq!(root.patterns[&RecordKind::Function], 1);
        assert_eq!(root.naming, None);
    }

    #[test]
    fn test_oversized_file_skipped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "big.py", "def huge():\n    pass\n");

        let catalog = CompiledCatalog::builtin().unwrap();
        let config = AnalyzerConfig {
            max_file_bytes: 4,
            ..AnalyzerConfig::default()
        };
        let structure =
            ProjectAggregator::new(&catalog, &config).aggregate(tmp.path(), &files(&["big.py"]));

        assert_eq!(structure.total_files, 1);
        assert!(structure.files.is_empty());
        assert_eq!(structure.record_count(), 0);
        assert_eq!(structure.directories[""].code_files, 0);
    }

    #[test]
    fn test_missing_file_skipped() {
        let tmp = TempDir::new().unwrap();
        let catalog = CompiledCatalog::builtin().unwrap();
        let structure = ProjectAggregator::new(&catalog, &AnalyzerConfig::default())
            .aggregate(tmp.path(), &files(&["gone.ts"]));

        assert_eq!(structure.total_files, 1);
        assert!(structure.files.is_empty());
        assert!(structure.code_contents.is_empty());
    }
}
