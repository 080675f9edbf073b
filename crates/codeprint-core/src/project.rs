//! Project identity detection from manifest files.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::language::Language;
use crate::types::{ProjectStructure, RecordKind};

/// Default version reported when no manifest states one.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Basic facts about the analyzed project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// Project name.
    pub name: String,
    /// Project version.
    pub version: String,
    /// Dominant language.
    pub language: Language,
    /// Detected framework, or `none`.
    pub framework: String,
    /// Project type, e.g. `web application` or `library`.
    #[serde(rename = "type")]
    pub project_type: String,
}

/// `(needle, framework)` pairs; the first hit wins.
type Markers = &'static [(&'static str, &'static str)];

const PACKAGE_JSON_FRAMEWORKS: Markers = &[
    ("react", "react"),
    ("vue", "vue"),
    ("@angular/core", "angular"),
    ("next", "next.js"),
    ("express", "express"),
];

const REQUIREMENTS_FRAMEWORKS: Markers =
    &[("django", "django"), ("flask", "flask"), ("fastapi", "fastapi")];

const COMPOSER_FRAMEWORKS: Markers = &[
    ("laravel/framework", "laravel"),
    ("symfony/symfony", "symfony"),
    ("cakephp/cakephp", "cakephp"),
    ("codeigniter/framework", "codeigniter"),
    ("yiisoft/yii2", "yii2"),
];

const CMAKE_FRAMEWORKS: Markers = &[("qt", "qt"), ("boost", "boost"), ("opencv", "opencv")];

const CSPROJ_FRAMEWORKS: Markers = &[
    ("microsoft.aspnetcore", "asp.net core"),
    ("microsoft.net.sdk.web", "asp.net core"),
    ("xamarin", "xamarin"),
    ("microsoft.maui", "maui"),
];

const PODFILE_FRAMEWORKS: Markers =
    &[("swiftui", "swiftui"), ("combine", "combine"), ("vapor", "vapor")];

const GRADLE_FRAMEWORKS: Markers = &[
    ("org.jetbrains.compose", "jetpack compose"),
    ("org.springframework.boot", "spring boot"),
    ("ktor", "ktor"),
];

const WEB_INDICATORS: &[&str] = &["index.html", "public/index.html", "src/index.html"];

/// File names that mark a directory as a project root.
const MANIFEST_FILES: &[&str] = &[
    "package.json",
    "tsconfig.json",
    "requirements.txt",
    "setup.py",
    "pyproject.toml",
    "Pipfile",
    "Cargo.toml",
    "go.mod",
    "composer.json",
    "Gemfile",
    "CMakeLists.txt",
    "build.gradle",
    "build.gradle.kts",
    "pom.xml",
    "Podfile",
    "Package.swift",
    "pubspec.yaml",
];

/// Extensions that mark a directory as a project root.
const MANIFEST_EXTENSIONS: &[&str] = &["csproj", "vcxproj", "sln", "gemspec"];

/// Returns `true` if `file_name` is a project manifest.
#[must_use]
pub fn is_project_manifest(file_name: &str) -> bool {
    if MANIFEST_FILES.contains(&file_name) {
        return true;
    }
    file_name.rsplit_once('.').is_some_and(|(stem, ext)| {
        !stem.is_empty() && MANIFEST_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    })
}

/// Returns `true` if `dir` directly contains a project manifest.
#[must_use]
pub fn is_project_dir(dir: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries.filter_map(Result::ok).any(|entry| {
        entry.file_type().is_ok_and(|t| t.is_file())
            && is_project_manifest(&entry.file_name().to_string_lossy())
    })
}

impl ProjectInfo {
    /// Detects project facts from manifests under `root` and the aggregated
    /// structure. Unreadable manifests are ignored.
    #[must_use]
    pub fn detect(root: &Path, structure: &ProjectStructure) -> Self {
        let package = read_json(&root.join("package.json"));

        Self {
            name: detect_name(root, package.as_ref()),
            version: package
                .as_ref()
                .and_then(|p| p.get("version"))
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_VERSION)
                .to_string(),
            language: dominant_language(&structure.languages),
            framework: detect_framework(root, package.as_ref(), structure),
            project_type: detect_type(root, package.as_ref()),
        }
    }
}

fn detect_name(root: &Path, package: Option<&Value>) -> String {
    if let Some(name) = package
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
    {
        return name.to_string();
    }

    if let Some(name) = read_text(&root.join("setup.py")).and_then(|s| setup_py_name(&s)) {
        return name;
    }

    root.canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(root)
        .file_name()
        .map_or_else(|| "project".to_string(), |n| n.to_string_lossy().into_owned())
}

fn setup_py_name(content: &str) -> Option<String> {
    let (_, rest) = content.split_once("name=")?;
    let value = rest.split(',').next()?.trim().trim_matches(|c| c == '\'' || c == '"');
    (!value.is_empty()).then(|| value.to_string())
}

/// Most frequent language; ties go to the alphabetically first name.
fn dominant_language(languages: &BTreeMap<Language, usize>) -> Language {
    languages
        .iter()
        .max_by(|(a, x), (b, y)| x.cmp(y).then_with(|| b.name().cmp(a.name())))
        .map_or(Language::Unknown, |(language, _)| *language)
}

fn detect_framework(root: &Path, package: Option<&Value>, structure: &ProjectStructure) -> String {
    let from_manifests = package
        .and_then(|p| {
            let deps = dependency_names(p, &["dependencies", "devDependencies"]);
            first_marker(&deps, PACKAGE_JSON_FRAMEWORKS, true)
        })
        .or_else(|| {
            read_text(&root.join("requirements.txt"))
                .and_then(|s| first_marker(&s.to_lowercase(), REQUIREMENTS_FRAMEWORKS, false))
        })
        .or_else(|| {
            read_json(&root.join("composer.json")).and_then(|c| {
                let deps = dependency_names(&c, &["require", "require-dev"]);
                first_marker(&deps, COMPOSER_FRAMEWORKS, true)
            })
        })
        .or_else(|| root.join("wp-config.php").is_file().then_some("wordpress"))
        .or_else(|| manifest_marker(&root.join("CMakeLists.txt"), CMAKE_FRAMEWORKS))
        .or_else(|| csproj_marker(root))
        .or_else(|| manifest_marker(&root.join("Podfile"), PODFILE_FRAMEWORKS))
        .or_else(|| manifest_marker(&root.join("build.gradle"), GRADLE_FRAMEWORKS))
        .or_else(|| {
            (!structure.records_of(RecordKind::PlatformComponent).is_empty()).then_some("unity")
        });

    from_manifests.unwrap_or("none").to_string()
}

fn detect_type(root: &Path, package: Option<&Value>) -> String {
    if let Some(package) = package {
        let deps = dependency_names(package, &["dependencies", "devDependencies"]);
        let has = |name: &str| deps.lines().any(|d| d == name);

        if has("react-native") || has("@ionic/core") {
            return "mobile application".to_string();
        }
        if has("electron") {
            return "desktop application".to_string();
        }
        let name = package.get("name").and_then(Value::as_str).unwrap_or_default();
        if name.starts_with('@') || name.contains("-lib") {
            return "library".to_string();
        }
    }

    if WEB_INDICATORS.iter().any(|p| root.join(p).is_file()) {
        return "web application".to_string();
    }
    "application".to_string()
}

/// Dependency keys of the given manifest tables, one per line, lowercased.
fn dependency_names(manifest: &Value, tables: &[&str]) -> String {
    tables
        .iter()
        .filter_map(|t| manifest.get(*t).and_then(Value::as_object))
        .flat_map(|deps| deps.keys())
        .map(|k| k.to_lowercase())
        .collect::<Vec<_>>()
        .join("\n")
}

/// With `exact`, markers must equal a whole line; otherwise a substring hit
/// is enough.
fn first_marker(haystack: &str, markers: Markers, exact: bool) -> Option<&'static str> {
    markers
        .iter()
        .find(|(needle, _)| {
            if exact {
                haystack.lines().any(|line| line == *needle)
            } else {
                haystack.contains(needle)
            }
        })
        .map(|(_, framework)| *framework)
}

fn manifest_marker(path: &Path, markers: Markers) -> Option<&'static str> {
    read_text(path).and_then(|s| first_marker(&s.to_lowercase(), markers, false))
}

fn csproj_marker(root: &Path) -> Option<&'static str> {
    let entries = std::fs::read_dir(root).ok()?;
    let mut projects: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "csproj"))
        .collect();
    projects.sort();
    projects.iter().find_map(|p| manifest_marker(p, CSPROJ_FRAMEWORKS))
}

fn read_text(path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "ignoring unreadable manifest");
            None
        }
    }
}

fn read_json(path: &Path) -> Option<Value> {
    let content = read_text(path)?;
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "ignoring malformed manifest");
            None
        }
    }
}
