//! Generate command implementation.

use anyhow::{Context, Result};
use codeprint_core::{ReportConfig, RulesFormat};
use codeprint_report::{build_rules_prompt, GeminiClient, Retrying, RulesPipeline, WithSpinner};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config_resolver::ConfigSource;

/// Command-line overrides for `generate`.
#[derive(Debug, Default)]
pub struct Options {
    /// Overrides `report.format`.
    pub format: Option<RulesFormat>,
    /// Overrides `report.output`.
    pub output: Option<PathBuf>,
    /// Print the rules prompt instead of calling the model.
    pub print_prompt: bool,
}

/// Runs the generate command.
pub fn run(path: &Path, options: &Options, source: &ConfigSource) -> Result<()> {
    let analysis = super::analyze(path, source)?;
    let report = &analysis.config.report;

    if options.print_prompt {
        println!(
            "{}",
            build_rules_prompt(&analysis.info, &analysis.structure, report)
        );
        return Ok(());
    }

    let generator_config = &analysis.config.generator;
    let client = GeminiClient::from_config(generator_config)
        .context("Failed to set up the generation client")?;
    tracing::info!("Generating rules with {}", client.model());

    let generator = WithSpinner::new(
        Retrying::new(
            client,
            generator_config.max_retries,
            Duration::from_secs(generator_config.base_delay_secs),
        ),
        "Generating rules...",
    );

    let document = RulesPipeline::new(generator, report)
        .run(&analysis.info, &analysis.structure)
        .context("Rules generation failed")?;

    let format = options.format.unwrap_or(report.format);
    let output = output_path(path, options.output.as_deref(), report);
    document
        .write_to(&output, format)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Wrote {}", output.display());
    Ok(())
}

/// The flag wins over config; relative paths land in the project directory.
fn output_path(project: &Path, flag: Option<&Path>, report: &ReportConfig) -> PathBuf {
    let chosen = flag.unwrap_or(report.output.as_path());
    if chosen.is_absolute() {
        chosen.to_path_buf()
    } else {
        project.join(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn output_defaults_to_config_in_project_dir() {
        let report = ReportConfig::default();
        assert_eq!(
            output_path(Path::new("proj"), None, &report),
            PathBuf::from("proj/.cursorrules")
        );
    }

    #[test]
    fn output_flag_overrides_config() {
        let report = ReportConfig::default();
        assert_eq!(
            output_path(Path::new("proj"), Some(Path::new("rules.md")), &report),
            PathBuf::from("proj/rules.md")
        );
        assert_eq!(
            output_path(Path::new("proj"), Some(Path::new("/tmp/rules.md")), &report),
            PathBuf::from("/tmp/rules.md")
        );
    }

    #[test]
    fn print_prompt_makes_no_request_and_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("app.py"), "def main():\n    pass\n").unwrap();
        // Points at an unset variable so any client construction would fail.
        let config = tmp.path().join("codeprint.toml");
        fs::write(
            &config,
            "[generator]\napi_key_env = \"CODEPRINT_TEST_NEVER_SET\"\n",
        )
        .unwrap();

        let options = Options {
            print_prompt: true,
            ..Options::default()
        };
        run(tmp.path(), &options, &ConfigSource::Project(config)).unwrap();
        assert!(!tmp.path().join(".cursorrules").exists());
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("app.py"), "def main():\n    pass\n").unwrap();
        let config = tmp.path().join("codeprint.toml");
        fs::write(
            &config,
            "[generator]\napi_key_env = \"CODEPRINT_TEST_NEVER_SET\"\n",
        )
        .unwrap();

        let err = run(tmp.path(), &Options::default(), &ConfigSource::Project(config))
            .unwrap_err();
        assert!(err.to_string().contains("generation client"));
    }
}
