//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const CONFIG_FILE: &str = "codeprint.toml";

const DEFAULT_CONFIG: &str = r#"# codeprint configuration

[analyzer]
# Directory to scan, relative to the command's PATH argument
# root = "."

# Extra glob patterns to skip, on top of the built-in list
# (VCS metadata, node_modules, virtualenvs, build output, IDE folders)
exclude = []

# Skip files matched by .gitignore
respect_gitignore = true

# Scan dot-files and dot-directories
include_hidden = false

# Larger code files are counted but not read
max_file_bytes = 1048576

[report]
# "json" or "markdown"
format = "json"

# Written relative to the project directory
output = ".cursorrules"

# Code samples forwarded to the model, and the per-sample character cap
max_code_samples = 50
max_sample_chars = 10000

[generator]
# GEMINI_MODEL in the environment takes precedence
model = "gemini-2.5-pro-exp-03-25"

# Variable holding the API key; a .env file in the working directory is loaded
api_key_env = "GEMINI_API_KEY"

# Attempts per request, including the first; rate-limit retries wait
# base_delay_secs, then double
max_retries = 3
base_delay_secs = 2

timeout_secs = 120

[watch]
# Seconds between manifest polls
poll_secs = 2

# Regenerate once manifests have been quiet this long
update_delay_secs = 5
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new(CONFIG_FILE), force)?;

    println!("Created {CONFIG_FILE}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE} to tune discovery and the report");
    println!("  2. Run: codeprint scan");
    println!("  3. Set GEMINI_API_KEY and run: codeprint generate");
    println!("  4. Keep the rules current with: codeprint watch");

    Ok(())
}

fn write_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))
}
