//! Project file discovery.
//!
//! Produces the relative file list consumed by
//! [`ProjectAggregator`](crate::ProjectAggregator). Every returned path has
//! already passed the built-in exclusion list, the configured exclude globs
//! and (when enabled) `.gitignore` rules.

use std::path::{Component, Path, PathBuf};

use tracing::warn;

use crate::config::AnalyzerConfig;
use crate::project::is_project_dir;

/// Directory names that are never descended into.
pub const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "bower_components",
    "venv",
    ".venv",
    "env",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".tox",
    "build",
    "dist",
    "out",
    "target",
    ".next",
    ".nuxt",
    ".idea",
    ".vscode",
    ".vs",
    "Pods",
    "DerivedData",
];

/// File or directory name globs that are always skipped.
pub const EXCLUDED_GLOBS: &[&str] = &["*.pyc", "*.pyo", "*.egg-info", ".DS_Store", "Thumbs.db"];

/// Errors raised while listing project files.
#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    /// The analysis root is missing or not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// An exclude pattern is not a valid glob.
    #[error("Invalid exclude pattern '{pattern}': {source}")]
    Pattern {
        /// The offending pattern.
        pattern: String,
        /// Underlying glob error.
        source: glob::PatternError,
    },

    /// The directory walk failed.
    #[error("Failed to walk project: {0}")]
    Walk(#[from] ignore::Error),
}

/// Lists every eligible file under `root`.
///
/// Paths are relative to `root`, `/`-separated and sorted.
///
/// # Errors
///
/// Returns an error if `root` is not a directory, an exclude glob is
/// invalid, or the walk fails.
pub fn list_files(root: &Path, config: &AnalyzerConfig) -> Result<Vec<String>, DiscoverError> {
    if !root.is_dir() {
        return Err(DiscoverError::NotADirectory(root.display().to_string()));
    }

    let builtin = compile_globs(EXCLUDED_GLOBS.iter().copied())?;
    let configured = compile_globs(config.exclude.iter().map(String::as_str))?;

    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .hidden(!config.include_hidden)
        .git_ignore(config.respect_gitignore)
        .git_exclude(config.respect_gitignore)
        .require_git(false)
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !EXCLUDED_DIRS.contains(&name.as_ref()) && !builtin.iter().any(|g| g.matches(&name))
        });

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let rel = relative_path(entry.path(), root);
        if rel.is_empty() || is_excluded(&rel, &configured) {
            continue;
        }
        files.push(rel);
    }

    files.sort();
    tracing::debug!(count = files.len(), root = %root.display(), "discovered files");
    Ok(files)
}

/// Finds project directories under `root`, looking at most `max_depth`
/// levels below it.
///
/// `root` comes first when it holds a manifest itself. Below it, a directory
/// holding a manifest is reported and its subtree is not searched; any other
/// directory is searched further. Hidden and excluded directories are
/// skipped, as are directories that cannot be read. Results are in walk
/// order with siblings sorted by name.
///
/// # Errors
///
/// Returns an error if `root` is not a directory.
pub fn find_projects(root: &Path, max_depth: usize) -> Result<Vec<PathBuf>, DiscoverError> {
    if !root.is_dir() {
        return Err(DiscoverError::NotADirectory(root.display().to_string()));
    }

    let mut projects = Vec::new();
    if is_project_dir(root) {
        projects.push(root.to_path_buf());
    }

    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .hidden(true)
        .max_depth(Some(max_depth))
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            if !entry.file_type().is_some_and(|t| t.is_dir()) {
                return false;
            }
            let name = entry.file_name().to_string_lossy();
            if EXCLUDED_DIRS.contains(&name.as_ref()) {
                return false;
            }
            // A nested project belongs to the project enclosing it.
            entry.depth() == 1 || !entry.path().parent().is_some_and(is_project_dir)
        });

    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory");
                continue;
            }
        };
        if entry.depth() > 0 && is_project_dir(entry.path()) {
            projects.push(entry.into_path());
        }
    }

    tracing::debug!(count = projects.len(), root = %root.display(), "found projects");
    Ok(projects)
}

fn compile_globs<'a>(
    patterns: impl Iterator<Item = &'a str>,
) -> Result<Vec<glob::Pattern>, DiscoverError> {
    patterns
        .map(|p| {
            glob::Pattern::new(p).map_err(|source| DiscoverError::Pattern {
                pattern: p.to_string(),
                source,
            })
        })
        .collect()
}

/// A configured glob matches either the whole relative path or, when it
/// has no separator, any single component.
fn is_excluded(rel: &str, globs: &[glob::Pattern]) -> bool {
    globs.iter().any(|g| {
        g.matches(rel) || (!g.as_str().contains('/') && rel.split('/').any(|part| g.matches(part)))
    })
}

fn relative_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_lists_sorted_relative_paths() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "src/b.py");
        touch(tmp.path(), "src/a.py");
        touch(tmp.path(), "README.md");

        let files = list_files(tmp.path(), &AnalyzerConfig::default()).unwrap();
        assert_eq!(files, ["README.md", "src/a.py", "src/b.py"]);
    }

    #[test]
    fn test_builtin_exclusions() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "app.py");
        touch(tmp.path(), "node_modules/lib/index.js");
        touch(tmp.path(), "pkg/__pycache__/app.cpython-311.pyc");
        touch(tmp.path(), "pkg/mod.pyc");
        touch(tmp.path(), "dist/bundle.js");

        let files = list_files(tmp.path(), &AnalyzerConfig::default()).unwrap();
        assert_eq!(files, ["app.py"]);
    }

    #[test]
    fn test_configured_exclusions() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "src/main.ts");
        touch(tmp.path(), "src/generated/api.ts");
        touch(tmp.path(), "src/main.spec.ts");

        let config = AnalyzerConfig {
            exclude: vec!["**/generated/**".to_string(), "*.spec.ts".to_string()],
            ..AnalyzerConfig::default()
        };
        let files = list_files(tmp.path(), &config).unwrap();
        assert_eq!(files, ["src/main.ts"]);
    }

    #[test]
    fn test_gitignore_respected_without_repo() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "keep.py");
        touch(tmp.path(), "secret/creds.py");
        fs::write(tmp.path().join(".gitignore"), "secret/\n").unwrap();

        let files = list_files(tmp.path(), &AnalyzerConfig::default()).unwrap();
        assert_eq!(files, ["keep.py"]);

        let config = AnalyzerConfig {
            respect_gitignore: false,
            ..AnalyzerConfig::default()
        };
        let files = list_files(tmp.path(), &config).unwrap();
        assert_eq!(files, ["keep.py", "secret/creds.py"]);
    }

    #[test]
    fn test_hidden_files() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "main.py");
        touch(tmp.path(), ".config/settings.json");

        let files = list_files(tmp.path(), &AnalyzerConfig::default()).unwrap();
        assert_eq!(files, ["main.py"]);

        let config = AnalyzerConfig {
            include_hidden: true,
            respect_gitignore: false,
            ..AnalyzerConfig::default()
        };
        let files = list_files(tmp.path(), &config).unwrap();
        assert_eq!(files, [".config/settings.json", "main.py"]);
    }

    #[test]
    fn test_invalid_pattern() {
        let tmp = TempDir::new().unwrap();
        let config = AnalyzerConfig {
            exclude: vec!["[".to_string()],
            ..AnalyzerConfig::default()
        };
        let err = list_files(tmp.path(), &config).unwrap_err();
        assert!(matches!(err, DiscoverError::Pattern { .. }));
    }

    #[test]
    fn test_find_projects_stops_at_manifests() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "web/package.json");
        touch(tmp.path(), "web/packages/ui/package.json");
        touch(tmp.path(), "services/api/requirements.txt");
        touch(tmp.path(), "services/README.md");
        touch(tmp.path(), "node_modules/left-pad/package.json");
        touch(tmp.path(), ".cache/tool/package.json");

        let found = find_projects(tmp.path(), 3).unwrap();
        assert_eq!(
            found,
            [tmp.path().join("services/api"), tmp.path().join("web")]
        );
    }

    #[test]
    fn test_find_projects_depth_and_root() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "Cargo.toml");
        touch(tmp.path(), "tools/gen/Cargo.toml");
        touch(tmp.path(), "a/b/c/d/pom.xml");

        let found = find_projects(tmp.path(), 3).unwrap();
        assert_eq!(found, [tmp.path().to_path_buf(), tmp.path().join("tools/gen")]);

        let shallow = find_projects(tmp.path(), 1).unwrap();
        assert_eq!(shallow, [tmp.path().to_path_buf()]);

        let deep = find_projects(tmp.path(), 4).unwrap();
        assert!(deep.contains(&tmp.path().join("a/b/c/d")));
    }

    #[test]
    fn test_find_projects_missing_root() {
        let err = find_projects(Path::new("/nonexistent/projects"), 3).unwrap_err();
        assert!(matches!(err, DiscoverError::NotADirectory(_)));
    }

    #[test]
    fn test_missing_root() {
        let err = list_files(Path::new("/nonexistent/project"), &AnalyzerConfig::default())
            .unwrap_err();
        assert!(matches!(err, DiscoverError::NotADirectory(_)));
    }
}
