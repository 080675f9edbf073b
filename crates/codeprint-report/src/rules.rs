//! The rules document: behaviour parsing, assembly and rendering.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use codeprint_core::{ProjectInfo, ProjectStructure, ReportConfig, RulesFormat};

use crate::generator::{GenerateError, TextGenerator};
use crate::prompt::{build_description_prompt, build_rules_prompt};

/// Version stamped on every rules document.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Description used when the description request fails.
pub const FALLBACK_DESCRIPTION: &str =
    "A software project with automated analysis and rule generation capabilities.";

/// Longest description kept, in words.
const DESCRIPTION_WORD_LIMIT: usize = 100;

/// Timestamp layout of `last_updated`.
const TIMESTAMP_FORMAT: &str = "%B %d, %Y at %I:%M %p";

/// Errors raised while producing the rules document.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The rules request failed, retries included.
    #[error("failed to generate behaviour rules: {0}")]
    Generate(#[from] GenerateError),

    /// The reply holds no `{...}` span.
    #[error("no JSON object found in the model reply")]
    MissingJson,

    /// The `{...}` span is not valid JSON of the expected shape.
    #[error("invalid behaviour JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The JSON object has no `ai_behavior` key.
    #[error("model reply has no `ai_behavior` object")]
    MissingBehavior,

    /// The document could not be serialized.
    #[error("failed to serialize rules document: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The document could not be written.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Output path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// Preferred and discouraged practices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferAvoid {
    /// Practices to follow.
    #[serde(deserialize_with = "lenient_list")]
    pub prefer: Vec<String>,
    /// Practices to stay away from.
    #[serde(deserialize_with = "lenient_list")]
    pub avoid: Vec<String>,
}

/// Suggested improvements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestPatterns {
    /// Improvements to suggest.
    #[serde(deserialize_with = "lenient_list")]
    pub improve: Vec<String>,
    /// Suggestions to hold back.
    #[serde(deserialize_with = "lenient_list")]
    pub avoid: Vec<String>,
}

/// How the project arranges its modules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleOrganization {
    /// Structure observations.
    #[serde(deserialize_with = "lenient_list")]
    pub structure: Vec<String>,
    /// Dependency observations.
    #[serde(deserialize_with = "lenient_list")]
    pub dependencies: Vec<String>,
    /// Module to responsibility.
    #[serde(deserialize_with = "lenient_map")]
    pub responsibilities: BTreeMap<String, String>,
    /// Organization rules.
    #[serde(deserialize_with = "lenient_list")]
    pub rules: Vec<String>,
    /// Category to naming convention.
    #[serde(deserialize_with = "lenient_map")]
    pub naming: BTreeMap<String, String>,
}

/// Code generation guidance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeGeneration {
    /// Code style.
    pub style: PreferAvoid,
    /// Error handling.
    pub error_handling: PreferAvoid,
    /// Performance.
    pub performance: PreferAvoid,
    /// Suggested patterns.
    pub suggest_patterns: SuggestPatterns,
    /// Module organization.
    pub module_organization: ModuleOrganization,
}

/// The behaviour object returned by the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiBehavior {
    /// Code generation guidance.
    pub code_generation: CodeGeneration,
}

/// Project section of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSection {
    /// Detected project facts.
    #[serde(flatten)]
    pub info: ProjectInfo,
    /// Generated description.
    pub description: String,
}

/// The persisted rules document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesDocument {
    /// Document format version.
    pub version: String,
    /// Human-readable generation time.
    pub last_updated: String,
    /// Project facts and description.
    pub project: ProjectSection,
    /// Behaviour rules.
    pub ai_behavior: AiBehavior,
}

impl RulesDocument {
    /// Assembles a document stamped with the current local time.
    #[must_use]
    pub fn new(info: ProjectInfo, description: String, ai_behavior: AiBehavior) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            last_updated: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            project: ProjectSection { info, description },
            ai_behavior,
        }
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialize`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ReportError> {
        serde_json::to_string_pretty(self).map_err(ReportError::Serialize)
    }

    /// Markdown rendering.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let info = &self.project.info;
        let code = &self.ai_behavior.code_generation;
        let org = &code.module_organization;
        let mut md = String::new();

        let _ = writeln!(md, "# Project Rules\n");
        let _ = writeln!(md, "## Project Information");
        let _ = writeln!(md, "- **Version**: {}", info.version);
        let _ = writeln!(md, "- **Last Updated**: {}", self.last_updated);
        let _ = writeln!(md, "- **Name**: {}", info.name);
        let _ = writeln!(md, "- **Language**: {}", info.language);
        let _ = writeln!(md, "- **Framework**: {}", info.framework);
        let _ = writeln!(md, "- **Type**: {}\n", info.project_type);

        let _ = writeln!(md, "## Project Description\n{}\n", self.project.description);

        let _ = writeln!(md, "## AI Behavior Rules\n");
        prefer_avoid(&mut md, "Code Generation Style", &code.style);
        prefer_avoid(&mut md, "Error Handling", &code.error_handling);
        prefer_avoid(&mut md, "Performance", &code.performance);

        let _ = writeln!(md, "### Module Organization");
        bullets(&mut md, "Structure", &org.structure);
        bullets(&mut md, "Dependencies", &org.dependencies);
        pairs(&mut md, "Module Responsibilities", &org.responsibilities);
        bullets(&mut md, "Rules", &org.rules);
        pairs(&mut md, "Naming Conventions", &org.naming);

        md
    }

    /// Renders in `format`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialize`] if JSON serialization fails.
    pub fn render(&self, format: RulesFormat) -> Result<String, ReportError> {
        match format {
            RulesFormat::Json => self.to_json(),
            RulesFormat::Markdown => Ok(self.to_markdown()),
        }
    }

    /// Renders in `format` and writes to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails.
    pub fn write_to(&self, path: &Path, format: RulesFormat) -> Result<(), ReportError> {
        let content = self.render(format)?;
        std::fs::write(path, content).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn prefer_avoid(md: &mut String, title: &str, section: &PreferAvoid) {
    let _ = writeln!(md, "### {title}");
    bullets(md, "Preferred Patterns", &section.prefer);
    bullets(md, "Patterns to Avoid", &section.avoid);
}

fn bullets(md: &mut String, title: &str, items: &[String]) {
    let _ = writeln!(md, "#### {title}");
    for item in items {
        let _ = writeln!(md, "- {item}");
    }
    let _ = writeln!(md);
}

fn pairs(md: &mut String, title: &str, items: &BTreeMap<String, String>) {
    let _ = writeln!(md, "#### {title}");
    for (key, value) in items {
        let _ = writeln!(md, "- **{key}**: {value}");
    }
    let _ = writeln!(md);
}

/// Parses the behaviour object out of a possibly chatty model reply.
///
/// Takes the span from the first `{` to the last `}`.
///
/// # Errors
///
/// Returns an error if there is no such span, it is not JSON, or it lacks
/// `ai_behavior`.
pub fn parse_behavior(reply: &str) -> Result<AiBehavior, ReportError> {
    let start = reply.find('{').ok_or(ReportError::MissingJson)?;
    let end = reply.rfind('}').ok_or(ReportError::MissingJson)?;
    if end < start {
        return Err(ReportError::MissingJson);
    }

    let mut object: serde_json::Map<String, Value> =
        serde_json::from_str(&reply[start..=end]).map_err(ReportError::InvalidJson)?;
    let behavior = object
        .remove("ai_behavior")
        .ok_or(ReportError::MissingBehavior)?;
    serde_json::from_value(behavior).map_err(ReportError::InvalidJson)
}

/// Keeps at most the first 100 words, marking a cut with `...`.
#[must_use]
pub fn clip_description(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > DESCRIPTION_WORD_LIMIT {
        format!("{}...", words[..DESCRIPTION_WORD_LIMIT].join(" "))
    } else {
        text.trim().to_string()
    }
}

/// Runs the two generation steps that produce a [`RulesDocument`].
#[derive(Debug)]
pub struct RulesPipeline<'a, G> {
    generator: G,
    config: &'a ReportConfig,
}

impl<'a, G: TextGenerator> RulesPipeline<'a, G> {
    /// Creates a pipeline over a generator.
    pub fn new(generator: G, config: &'a ReportConfig) -> Self {
        Self { generator, config }
    }

    /// Requests the behaviour rules, then the description.
    ///
    /// A failed description falls back to [`FALLBACK_DESCRIPTION`].
    ///
    /// # Errors
    ///
    /// Returns an error if the rules request fails or its reply cannot be
    /// parsed.
    pub fn run(
        &self,
        info: &ProjectInfo,
        structure: &ProjectStructure,
    ) -> Result<RulesDocument, ReportError> {
        info!("Generating behaviour rules");
        let prompt = build_rules_prompt(info, structure, self.config);
        let reply = self.generator.generate(&prompt)?;
        let ai_behavior = parse_behavior(&reply)?;

        info!("Generating project description");
        let description = match self.generator.generate(&build_description_prompt(structure)) {
            Ok(text) if !text.trim().is_empty() => clip_description(&text),
            Ok(_) => FALLBACK_DESCRIPTION.to_string(),
            Err(e) => {
                warn!("Description generation failed, using fallback: {e}");
                FALLBACK_DESCRIPTION.to_string()
            }
        };

        Ok(RulesDocument::new(info.clone(), description, ai_behavior))
    }
}

fn text_of(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().map(text_of).collect(),
        Value::Null => Vec::new(),
        other => vec![text_of(other)],
    })
}

fn lenient_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map.into_iter().map(|(k, v)| (k, text_of(v))).collect(),
        _ => BTreeMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeprint_core::Language;

    fn info() -> ProjectInfo {
        ProjectInfo {
            name: "inventory".to_string(),
            version: "1.0.0".to_string(),
            language: Language::Python,
            framework: "flask".to_string(),
            project_type: "application".to_string(),
        }
    }

    const REPLY: &str = r#"Sure! Here are the rules:
```json
{"ai_behavior": {"code_generation": {
    "style": {"prefer": ["type hints"], "avoid": ["wildcard imports"]},
    "module_organization": {
        "structure": ["app/ holds the service"],
        "responsibilities": {"app/models.py": "persistence", "app/api.py": ["routing", "auth"]},
        "naming": {"files": "snake_case"}
    }
}}}
```
Let me know if you need more."#;

    #[test]
    fn test_parse_chatty_reply() {
        let behavior = parse_behavior(REPLY).unwrap();
        let code = &behavior.code_generation;
        assert_eq!(code.style.prefer, ["type hints"]);
        assert_eq!(code.style.avoid, ["wildcard imports"]);
        assert!(code.performance.prefer.is_empty());
        assert_eq!(code.module_organization.responsibilities["app/models.py"], "persistence");
        assert_eq!(
            code.module_organization.responsibilities["app/api.py"],
            r#"["routing","auth"]"#
        );
    }

    #[test]
    fn test_parse_failures() {
        assert!(matches!(parse_behavior("no json here"), Err(ReportError::MissingJson)));
        assert!(matches!(parse_behavior("} {"), Err(ReportError::MissingJson)));
        assert!(matches!(parse_behavior("{not json}"), Err(ReportError::InvalidJson(_))));
        assert!(matches!(
            parse_behavior(r#"{"rules": []}"#),
            Err(ReportError::MissingBehavior)
        ));
    }

    #[test]
    fn test_clip_description() {
        assert_eq!(clip_description("  A small tool.  "), "A small tool.");
        let long = vec!["word"; 120].join(" ");
        let clipped = clip_description(&long);
        assert!(clipped.ends_with("word..."));
        assert_eq!(clipped.split_whitespace().count(), 100);
    }

    #[test]
    fn test_json_document_shape() {
        let behavior = parse_behavior(REPLY).unwrap();
        let doc = RulesDocument::new(info(), "Inventory service.".into(), behavior);
        let value: Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

        assert_eq!(value["version"], "1.0");
        assert_eq!(value["project"]["name"], "inventory");
        assert_eq!(value["project"]["type"], "application");
        assert_eq!(value["project"]["language"], "Python");
        assert_eq!(value["project"]["description"], "Inventory service.");
        assert_eq!(
            value["ai_behavior"]["code_generation"]["style"]["prefer"][0],
            "type hints"
        );
        assert!(value["last_updated"].as_str().unwrap().contains(" at "));
    }

    #[test]
    fn test_markdown_sections() {
        let behavior = parse_behavior(REPLY).unwrap();
        let doc = RulesDocument::new(info(), "Inventory service.".into(), behavior);
        let md = doc.to_markdown();

        assert!(md.starts_with("# Project Rules\n"));
        assert!(md.contains("- **Framework**: flask"));
        assert!(md.contains("## Project Description\nInventory service.\n"));
        assert!(md.contains("### Code Generation Style\n#### Preferred Patterns\n- type hints\n"));
        assert!(md.contains("#### Patterns to Avoid\n- wildcard imports\n"));
        assert!(md.contains("### Error Handling\n"));
        assert!(md.contains("- **app/models.py**: persistence"));
        assert!(md.contains("#### Naming Conventions\n- **files**: snake_case\n"));
    }

    #[test]
    fn test_write_to_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join(".cursorrules");
        let doc = RulesDocument::new(info(), "x".into(), AiBehavior::default());

        doc.write_to(&path, RulesFormat::Markdown).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Project Rules"));

        let missing = tmp.path().join("no/such/dir/out.json");
        let err = doc.write_to(&missing, RulesFormat::Json).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }
}
