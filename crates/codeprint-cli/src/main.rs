//! codeprint CLI.
//!
//! Usage:
//! ```bash
//! codeprint scan [OPTIONS] [PATH]
//! codeprint generate [OPTIONS] [PATH]
//! codeprint watch [OPTIONS] [PATH]
//! codeprint find-projects [OPTIONS] [PATH]
//! codeprint list-patterns
//! codeprint init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Profiles a source tree and generates a rules document for AI assistants
#[derive(Parser)]
#[command(name = "codeprint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a project and print its structure
    Scan {
        /// Project directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: ScanFormat,
    },

    /// Analyze a project and write a rules document
    Generate {
        /// Project directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Document format (default: from config)
        #[arg(short, long)]
        format: Option<DocumentFormat>,

        /// Output file, relative to the project directory (default: from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the rules prompt and exit without calling the model
        #[arg(long)]
        print_prompt: bool,
    },

    /// Write the rules document, then rewrite it whenever project manifests change
    Watch {
        /// Project directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Document format (default: from config)
        #[arg(short, long)]
        format: Option<DocumentFormat>,

        /// Output file, relative to the project directory (default: from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Find project directories below a path
    FindProjects {
        /// Directory to search (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// How many directory levels below PATH to search
        #[arg(long, default_value_t = 3)]
        max_depth: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: ScanFormat,
    },

    /// List built-in pattern rules
    ListPatterns,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for `scan`.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum ScanFormat {
    /// Human-readable summary.
    #[default]
    Text,
    /// The full project structure as JSON.
    Json,
}

/// Output format for `generate`.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum DocumentFormat {
    /// Pretty-printed JSON.
    Json,
    /// Markdown.
    Markdown,
}

impl From<DocumentFormat> for codeprint_core::RulesFormat {
    fn from(format: DocumentFormat) -> Self {
        match format {
            DocumentFormat::Json => Self::Json,
            DocumentFormat::Markdown => Self::Markdown,
        }
    }
}

fn main() -> Result<()> {
    // A missing .env file is not an error.
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scan { path, format } => {
            let source = config_resolver::resolve(&path, cli.config.as_deref());
            commands::scan::run(&path, format, &source)
        }
        Commands::Generate {
            path,
            format,
            output,
            print_prompt,
        } => {
            let source = config_resolver::resolve(&path, cli.config.as_deref());
            let options = commands::generate::Options {
                format: format.map(Into::into),
                output,
                print_prompt,
            };
            commands::generate::run(&path, &options, &source)
        }
        Commands::Watch {
            path,
            format,
            output,
        } => {
            let source = config_resolver::resolve(&path, cli.config.as_deref());
            let options = commands::generate::Options {
                format: format.map(Into::into),
                output,
                print_prompt: false,
            };
            commands::watch::run(&path, &options, &source)
        }
        Commands::FindProjects {
            path,
            max_depth,
            format,
        } => {
            let source = config_resolver::resolve(&path, cli.config.as_deref());
            commands::find_projects::run(&path, max_depth, format, &source)
        }
        Commands::ListPatterns => {
            commands::list_patterns::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
