//! Watch command implementation.

use anyhow::{Context, Result};
use codeprint_core::watch::{Debouncer, Snapshot};
use codeprint_core::{list_files, AnalyzerConfig};
use std::path::Path;
use std::time::{Duration, Instant};

use super::generate::{self, Options};
use crate::config_resolver::ConfigSource;

/// Runs the watch command.
///
/// Writes the rules document once, then polls the project's manifests and
/// writes it again after each burst of changes. Runs until interrupted.
pub fn run(path: &Path, options: &Options, source: &ConfigSource) -> Result<()> {
    let config = source.load()?;
    let root = super::project_root(path, &config.analyzer.root);
    let poll = Duration::from_secs(config.watch.poll_secs.max(1));
    let mut debouncer = Debouncer::new(Duration::from_secs(config.watch.update_delay_secs));

    regenerate(path, options, source);

    let mut snapshot = capture(&root, &config.analyzer)?;
    if snapshot.is_empty() {
        tracing::warn!(
            "No manifest files under {}; nothing will trigger an update",
            root.display()
        );
    } else {
        tracing::info!(
            "Watching {} manifest files under {}",
            snapshot.len(),
            root.display()
        );
    }

    loop {
        std::thread::sleep(poll);

        let next = match capture(&root, &config.analyzer) {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!("{e:#}");
                continue;
            }
        };
        let changes = snapshot.changes(&next);
        if !changes.is_empty() {
            tracing::info!("Manifest changes: {}", changes.join(", "));
            debouncer.record(Instant::now());
        }
        snapshot = next;

        if debouncer.ready(Instant::now()) {
            regenerate(path, options, source);
        }
    }
}

fn capture(root: &Path, config: &AnalyzerConfig) -> Result<Snapshot> {
    let files = list_files(root, config)
        .with_context(|| format!("Failed to list files under {}", root.display()))?;
    Ok(Snapshot::capture(root, &files))
}

/// A failed run is logged; watching continues.
fn regenerate(path: &Path, options: &Options, source: &ConfigSource) {
    if let Err(e) = generate::run(path, options, source) {
        tracing::error!("Rules update failed: {e:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn capture_follows_configured_discovery() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("package.json"), "{}").unwrap();
        fs::write(tmp.path().join("index.js"), "run()").unwrap();
        fs::create_dir(tmp.path().join("vendor")).unwrap();
        fs::write(tmp.path().join("vendor/composer.json"), "{}").unwrap();

        let config = AnalyzerConfig {
            exclude: vec!["vendor".to_string()],
            ..AnalyzerConfig::default()
        };
        let snapshot = capture(tmp.path(), &config).unwrap();
        assert_eq!(snapshot.len(), 1);

        assert!(capture(&tmp.path().join("missing"), &config).is_err());
    }

    #[test]
    fn failed_regeneration_is_not_fatal() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("app.py"), "def main():\n    pass\n").unwrap();
        let config = tmp.path().join("codeprint.toml");
        fs::write(
            &config,
            "[generator]\napi_key_env = \"CODEPRINT_TEST_NEVER_SET\"\n",
        )
        .unwrap();

        regenerate(tmp.path(), &Options::default(), &ConfigSource::Project(config));
        assert!(!tmp.path().join(".cursorrules").exists());
    }
}
