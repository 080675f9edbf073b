//! Configuration types for codeprint.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// File discovery and aggregation settings.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Prompt and rules document settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Text generation service settings.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Watch mode settings.
    #[serde(default)]
    pub watch: WatchConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

/// Discovery and aggregation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze, relative to the project path.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude, in addition to the built-in list.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether to respect `.gitignore` files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Whether to walk hidden files and directories.
    #[serde(default)]
    pub include_hidden: bool,

    /// Code files larger than this are listed but not read.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: Vec::new(),
            respect_gitignore: true,
            include_hidden: false,
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

/// Output format of the rules document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RulesFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// Markdown.
    Markdown,
}

/// Prompt and rules document configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Rules document format.
    #[serde(default)]
    pub format: RulesFormat,

    /// Rules document path, relative to the project path.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Maximum number of code samples forwarded in the prompt.
    #[serde(default = "default_max_code_samples")]
    pub max_code_samples: usize,

    /// Maximum characters per forwarded code sample.
    #[serde(default = "default_max_sample_chars")]
    pub max_sample_chars: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: RulesFormat::default(),
            output: default_output(),
            max_code_samples: default_max_code_samples(),
            max_sample_chars: default_max_sample_chars(),
        }
    }
}

/// Text generation service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Model name. `GEMINI_MODEL` overrides it at runtime.
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Attempts per request, including the first.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry; doubles on each further retry.
    #[serde(default = "default_base_delay_secs")]
    pub base_delay_secs: u64,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
            max_retries: default_max_retries(),
            base_delay_secs: default_base_delay_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Watch mode configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Seconds between manifest polls.
    #[serde(default = "default_poll_secs")]
    pub poll_secs: u64,

    /// Quiet seconds required after the last manifest change before the
    /// rules document is regenerated.
    #[serde(default = "default_update_delay_secs")]
    pub update_delay_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_secs: default_poll_secs(),
            update_delay_secs: default_update_delay_secs(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

fn default_max_file_bytes() -> u64 {
    1024 * 1024
}

fn default_output() -> PathBuf {
    PathBuf::from(".cursorrules")
}

fn default_max_code_samples() -> usize {
    50
}

fn default_max_sample_chars() -> usize {
    10_000
}

fn default_model() -> String {
    "gemini-2.5-pro-exp-03-25".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_secs() -> u64 {
    2
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_poll_secs() -> u64 {
    2
}

fn default_update_delay_secs() -> u64 {
    5
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.analyzer.respect_gitignore);
        assert_eq!(config.report.max_code_samples, 50);
        assert_eq!(config.report.format, RulesFormat::Json);
        assert_eq!(config.generator.max_retries, 3);
        assert_eq!(config.watch.update_delay_secs, 5);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[analyzer]
root = "./src"
exclude = ["**/generated/**"]

[report]
format = "markdown"
max_code_samples = 10

[generator]
model = "gemini-1.5-flash"
base_delay_secs = 0

[watch]
update_delay_secs = 10
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.analyzer.root, PathBuf::from("./src"));
        assert_eq!(config.analyzer.exclude, ["**/generated/**"]);
        assert_eq!(config.report.format, RulesFormat::Markdown);
        assert_eq!(config.report.max_code_samples, 10);
        assert_eq!(config.report.max_sample_chars, 10_000);
        assert_eq!(config.generator.model, "gemini-1.5-flash");
        assert_eq!(config.generator.base_delay_secs, 0);
        assert_eq!(config.generator.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.watch.update_delay_secs, 10);
        assert_eq!(config.watch.poll_secs, 2);
    }

    #[test]
    fn test_parse_error() {
        let err = Config::parse("[report]\nformat = \"yaml\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file(Path::new("/nonexistent/codeprint.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
