//! # codeprint-report
//!
//! Turns an aggregated [`ProjectStructure`](codeprint_core::ProjectStructure)
//! into a rules document with the help of a text generation service.
//!
//! - [`build_rules_prompt`] / [`build_description_prompt`] assemble prompts
//! - [`TextGenerator`] is the service seam; [`GeminiClient`] implements it
//! - [`Retrying`] and [`WithSpinner`] wrap any generator
//! - [`RulesPipeline`] produces a [`RulesDocument`] rendered as JSON or Markdown
//!
//! ## Example
//!
//! ```ignore
//! use codeprint_report::{GeminiClient, Retrying, RulesPipeline, WithSpinner};
//!
//! let client = GeminiClient::from_config(&config.generator)?;
//! let generator = WithSpinner::new(Retrying::new(client, 3, delay), "Generating rules...");
//! let document = RulesPipeline::new(generator, &config.report).run(&info, &structure)?;
//! document.write_to(&output, config.report.format)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod gemini;
mod generator;
mod prompt;
mod retry;
mod rules;
mod spinner;

pub use gemini::{GeminiClient, MODEL_ENV};
pub use generator::{GenerateError, TextGenerator};
pub use prompt::{build_description_prompt, build_rules_prompt, REPLY_SCHEMA};
pub use retry::Retrying;
pub use rules::{
    clip_description, parse_behavior, AiBehavior, CodeGeneration, ModuleOrganization,
    PreferAvoid, ProjectSection, ReportError, RulesDocument, RulesPipeline, SuggestPatterns,
    DOCUMENT_VERSION, FALLBACK_DESCRIPTION,
};
pub use spinner::WithSpinner;
