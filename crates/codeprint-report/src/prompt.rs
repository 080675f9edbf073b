//! Prompt assembly from an aggregated project structure.

use std::fmt::Write;

use codeprint_core::{ProjectInfo, ProjectStructure, RecordKind, ReportConfig};

/// Entries shown per file or module listing.
const LIST_LIMIT: usize = 5;

/// Dependencies named in the rules prompt.
const DEPENDENCY_LIMIT: usize = 10;

const BUILD_FILES: &[&str] = &[
    "setup.py",
    "requirements.txt",
    "package.json",
    "Makefile",
    "composer.json",
    "Gemfile",
    "CMakeLists.txt",
    "build.gradle",
    "pom.xml",
    "webpack.config.js",
];

const SUPPORT_MARKERS: &[&str] = &["util", "helper", "common", "shared"];

/// Names that mark a file as scaffolding rather than a core module.
const NON_CORE_MARKERS: &[&str] = &["setup", "config", "test"];

/// Reply shape the rules prompt asks for.
pub const REPLY_SCHEMA: &str = r#"{"ai_behavior": {
    "code_generation": {
        "style": {"prefer": [], "avoid": []},
        "error_handling": {"prefer": [], "avoid": []},
        "performance": {"prefer": [], "avoid": []},
        "suggest_patterns": {"improve": [], "avoid": []},
        "module_organization": {
            "structure": [],
            "dependencies": [],
            "responsibilities": {},
            "rules": [],
            "naming": {}
        }
    }
}}"#;

/// Builds the prompt that asks for the behaviour rules object.
#[must_use]
pub fn build_rules_prompt(
    info: &ProjectInfo,
    structure: &ProjectStructure,
    config: &ReportConfig,
) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Analyze this project to understand how an AI coding assistant should behave \
         and generate code that matches the project's patterns and standards.\n"
    );
    let _ = writeln!(out, "Project Overview:");
    let _ = writeln!(out, "Name: {}", info.name);
    let _ = writeln!(out, "Language: {}", info.language);
    let _ = writeln!(out, "Framework: {}", info.framework);
    let _ = writeln!(out, "Type: {}\n", info.project_type);

    let _ = writeln!(out, "Project Metrics:");
    let _ = writeln!(out, "- Code Files: {}", structure.files.len());
    let _ = writeln!(out, "- Total Files: {}", structure.total_files);
    let _ = writeln!(out, "- Config Files: {}", structure.config_files.len());
    let core_deps: Vec<&str> = structure
        .dependencies
        .keys()
        .take(DEPENDENCY_LIMIT)
        .map(String::as_str)
        .collect();
    let _ = writeln!(out, "- Core Dependencies: {}", or_none(&core_deps.join(", ")));
    let _ = writeln!(out, "- Total Dependencies: {}\n", structure.dependencies.len());

    let _ = writeln!(out, "Project Ecosystem:");
    let _ = writeln!(out, "- Build System:");
    list(&mut out, build_files(structure));
    let _ = writeln!(out, "- Core Modules:");
    list(
        &mut out,
        core_modules(structure).map(|f| {
            let functions = structure
                .records_in(f)
                .filter(|r| r.kind == RecordKind::Function)
                .count();
            format!("{f}: {functions} functions")
        }),
    );
    let _ = writeln!(out, "- Support Modules:");
    list(
        &mut out,
        structure
            .files
            .iter()
            .filter(|f| contains_any(f, SUPPORT_MARKERS))
            .cloned(),
    );
    let _ = writeln!(out, "- Module Dependencies:");
    list(
        &mut out,
        structure
            .imports
            .iter()
            .map(|(file, imports)| format!("{file} depends on: {}", imports.join(", "))),
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "Directory Organization:");
    for (path, stats) in structure.directories.iter().filter(|(p, _)| !p.is_empty()) {
        let naming = stats.naming.map_or("unknown", |n| n.as_str());
        let purposes: Vec<&str> = stats.purposes.iter().map(|p| p.as_str()).collect();
        let _ = writeln!(
            out,
            "- {path}: {naming} naming, purpose: {}, {}/{} code files",
            or_none(&purposes.join(", ")),
            stats.code_files,
            stats.total_files
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Code Sample Analysis:");
    for (file, content) in structure.code_contents.iter().take(config.max_code_samples) {
        let (sample, truncated) = truncate_chars(content, config.max_sample_chars);
        let _ = writeln!(out, "File: {file}:\n{sample}{}", if truncated { "..." } else { "" });
    }
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "Based on this analysis, create behavior rules for the AI to:\n\
         1. Replicate the project's code style and patterns\n\
         2. Match naming conventions precisely\n\
         3. Follow the same error handling patterns\n\
         4. Reuse the performance techniques already in use\n\
         5. Keep the current code organization and module boundaries\n\
         6. Follow the established logging and configuration patterns\n"
    );
    let _ = writeln!(out, "Return a JSON object defining AI behavior rules:");
    let _ = writeln!(out, "{REPLY_SCHEMA}");

    out
}

/// Builds the prompt that asks for a short project description.
#[must_use]
pub fn build_description_prompt(structure: &ProjectStructure) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Analyze this project structure and create a detailed description \
         (2-3 sentences) that captures its essence:\n"
    );
    let modules: Vec<&String> = core_modules(structure).collect();

    let _ = writeln!(out, "1. Core Modules:");
    for file in &modules {
        let (classes, functions) = structure
            .records_in(file)
            .fold((0, 0), |(c, f), r| match r.kind {
                RecordKind::Class => (c + 1, f),
                RecordKind::Function => (c, f + 1),
                _ => (c, f),
            });
        let _ = writeln!(out, "- {file}: {classes} classes, {functions} functions");
    }

    let _ = writeln!(out, "\n2. Module Responsibilities:");
    for file in &modules {
        let classes: Vec<&str> = structure
            .records_in(file)
            .filter(|r| r.kind == RecordKind::Class)
            .take(2)
            .map(|r| r.name.as_str())
            .collect();
        if !classes.is_empty() {
            let _ = writeln!(out, "- {file}: main purpose indicated by {}", classes.join(", "));
        }
    }

    let _ = writeln!(out, "\n3. Technical Implementation:");
    let _ = writeln!(
        out,
        "- Error Handling: {} patterns found",
        structure.records_of(RecordKind::ErrorHandler).len()
    );
    let _ = writeln!(
        out,
        "- Code Organization: {} patterns found",
        structure.organization_count()
    );

    let _ = writeln!(out, "\n4. Project Architecture:");
    let _ = writeln!(out, "- Total Files: {}", structure.files.len());
    let _ = writeln!(out, "- Core Modules: {}", modules.len());
    let _ = writeln!(out, "- External Dependencies: {}", structure.dependencies.len());

    let _ = writeln!(
        out,
        "\nBased on this analysis, create a description that covers:\n\
         1. The project's main purpose and functionality\n\
         2. Key technical features and implementation approach\n\
         3. Target users and primary use cases\n\
         4. Unique characteristics\n\n\
         Return a clear, concise description. Do not include technical metrics."
    );

    out
}

/// Code files that are not setup, config or test scaffolding.
fn core_modules(structure: &ProjectStructure) -> impl Iterator<Item = &String> {
    structure
        .files
        .iter()
        .filter(|f| !contains_any(&f.to_lowercase(), NON_CORE_MARKERS))
}

fn build_files(structure: &ProjectStructure) -> impl Iterator<Item = String> + '_ {
    structure
        .files
        .iter()
        .chain(structure.config_files.iter().map(|c| &c.file))
        .filter(|f| BUILD_FILES.contains(&basename(f)))
        .cloned()
}

fn list(out: &mut String, items: impl Iterator<Item = String>) {
    let mut empty = true;
    for item in items.take(LIST_LIMIT) {
        let _ = writeln!(out, "  - {item}");
        empty = false;
    }
    if empty {
        let _ = writeln!(out, "  - none");
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn or_none(s: &str) -> &str {
    if s.is_empty() {
        "none"
    } else {
        s
    }
}

/// Cuts `text` to at most `max` chars on a char boundary.
fn truncate_chars(text: &str, max: usize) -> (&str, bool) {
    match text.char_indices().nth(max) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeprint_core::{
        ConfigFile, DirectoryStats, Language, NamingConvention, Purpose, StructuralRecord,
    };

    fn info() -> ProjectInfo {
        ProjectInfo {
            name: "inventory".to_string(),
            version: "1.0.0".to_string(),
            language: Language::Python,
            framework: "flask".to_string(),
            project_type: "application".to_string(),
        }
    }

    fn structure() -> ProjectStructure {
        let mut s = ProjectStructure::new();
        s.files = vec![
            "app/models.py".to_string(),
            "app/utils.py".to_string(),
            "setup.py".to_string(),
        ];
        s.total_files = 5;
        s.dependencies.insert("flask".to_string(), true);
        s.dependencies.insert("sqlalchemy".to_string(), true);
        s.imports.insert("app/models.py".to_string(), vec!["sqlalchemy".to_string()]);
        s.records.insert(
            RecordKind::Class,
            vec![StructuralRecord::new(RecordKind::Class, "Item", "app/models.py")],
        );
        s.records.insert(
            RecordKind::Function,
            vec![
                StructuralRecord::new(RecordKind::Function, "load", "app/models.py"),
                StructuralRecord::new(RecordKind::Function, "slug", "app/utils.py"),
            ],
        );
        s.directories.insert(
            "app".to_string(),
            DirectoryStats {
                total_files: 2,
                code_files: 2,
                naming: Some(NamingConvention::Lowercase),
                purposes: [Purpose::Domain].into_iter().collect(),
                ..DirectoryStats::default()
            },
        );
        s.code_contents.insert("app/models.py".to_string(), "é".repeat(20));
        s.config_files.push(ConfigFile {
            file: "package.json".to_string(),
            content: "{}".to_string(),
        });
        s
    }

    #[test]
    fn test_rules_prompt_sections() {
        let config = ReportConfig {
            max_sample_chars: 5,
            ..ReportConfig::default()
        };
        let prompt = build_rules_prompt(&info(), &structure(), &config);

        assert!(prompt.contains("Framework: flask"));
        assert!(prompt.contains("- Core Dependencies: flask, sqlalchemy"));
        assert!(prompt.contains("  - package.json"));
        assert!(prompt.contains("  - app/models.py: 1 functions"));
        assert!(prompt.contains("  - app/utils.py\n"));
        assert!(prompt.contains("app/models.py depends on: sqlalchemy"));
        assert!(prompt.contains("- app: lowercase naming, purpose: domain, 2/2 code files"));
        assert!(prompt.contains("File: app/models.py:\nééééé..."));
        assert!(prompt.ends_with("}}\n"));
    }

    #[test]
    fn test_sample_limit() {
        let config = ReportConfig {
            max_code_samples: 0,
            ..ReportConfig::default()
        };
        let prompt = build_rules_prompt(&info(), &structure(), &config);
        assert!(!prompt.contains("File: app/models.py"));
    }

    #[test]
    fn test_description_prompt() {
        let prompt = build_description_prompt(&structure());
        assert!(prompt.contains("- app/models.py: 1 classes, 1 functions"));
        assert!(prompt.contains("- app/utils.py: 0 classes, 1 functions"));
        assert!(!prompt.contains("- setup.py:"));
        assert!(prompt.contains("main purpose indicated by Item"));
        assert!(prompt.contains("- External Dependencies: 2"));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abc", 5), ("abc", false));
        assert_eq!(truncate_chars("abcdef", 3), ("abc", true));
        assert_eq!(truncate_chars("ééé", 2), ("éé", true));
    }
}
