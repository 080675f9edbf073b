//! # codeprint-core
//!
//! Multi-language structural profiling of a source tree using textual
//! pattern rules.
//!
//! This crate provides:
//!
//! - [`PatternCatalog`]: rule tables grouped by construct kind and family
//! - [`CompiledCatalog`]: every rule compiled once, looked up per file
//! - [`FileAnalyzer`]: the matching engine producing [`StructuralRecord`]s
//! - [`ProjectAggregator`]: per-project and per-directory statistics
//! - [`list_files`] and [`ProjectInfo`] for discovery and project identity
//! - [`find_projects`] for locating project roots below a directory
//! - [`watch::Snapshot`] and [`watch::Debouncer`] for watch mode
//!
//! ## Example
//!
//! ```ignore
//! use codeprint_core::{list_files, CompiledCatalog, Config, ProjectAggregator};
//!
//! let config = Config::default();
//! let catalog = CompiledCatalog::builtin()?;
//! let files = list_files(root, &config.analyzer)?;
//! let structure = ProjectAggregator::new(&catalog, &config.analyzer).aggregate(root, &files);
//! println!("{} records", structure.record_count());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod aggregator;
mod analyzer;
mod compiler;
mod config;
mod discover;
mod language;
mod project;
mod types;

/// Built-in pattern tables and rule names.
pub mod catalog;
pub mod watch;

pub use aggregator::ProjectAggregator;
pub use analyzer::{FileAnalysis, FileAnalyzer, RuleError};
pub use catalog::{Bucket, ConstructKind, PatternCatalog, PatternRule, Role};
pub use compiler::{
    Captures, CatalogError, CompiledAlternation, CompiledCatalog, CompiledRule, RuleMatch,
};
pub use config::{
    AnalyzerConfig, Config, ConfigError, GeneratorConfig, ReportConfig, RulesFormat, WatchConfig,
};
pub use discover::{find_projects, list_files, DiscoverError, EXCLUDED_DIRS, EXCLUDED_GLOBS};
pub use language::{is_code_extension, is_config_extension, Family, Language};
pub use project::{ProjectInfo, DEFAULT_VERSION};
pub use types::{
    ConfigFile, DirectoryStats, NamingConvention, ProjectStructure, Purpose, RecordKind,
    StructuralRecord,
};
