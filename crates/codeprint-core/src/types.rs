//! Structural records and the project aggregate.

use crate::language::Language;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Category of an extracted structural fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Imported module. Counted per directory, never stored as a record.
    Import,
    /// Class-like declaration.
    Class,
    /// Function or method declaration.
    Function,
    /// Interface declaration.
    Interface,
    /// Uppercase-led JSX tag.
    ReactComponent,
    /// `useXxx(` call.
    ReactHook,
    /// Exported data-loading function.
    NextDataFetching,
    /// Route file under `pages/` or `app/`.
    NextPage,
    /// Layout-style route file.
    NextLayout,
    /// Middleware file.
    NextMiddleware,
    /// `styled.x` template binding.
    StyledComponent,
    /// `try { } catch (e)` block.
    ErrorHandler,
    /// Class deriving from a runtime component base.
    PlatformComponent,
    /// Runtime lifecycle method.
    PlatformLifecycle,
    /// Bracketed runtime attribute.
    PlatformAttribute,
    /// Built-in runtime type reference.
    PlatformType,
    /// Typed event field.
    PlatformEvent,
    /// Typed serialized field.
    PlatformField,
}

impl RecordKind {
    /// Snake-case name, matching the serialized form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Class => "class",
            Self::Function => "function",
            Self::Interface => "interface",
            Self::ReactComponent => "react_component",
            Self::ReactHook => "react_hook",
            Self::NextDataFetching => "next_data_fetching",
            Self::NextPage => "next_page",
            Self::NextLayout => "next_layout",
            Self::NextMiddleware => "next_middleware",
            Self::StyledComponent => "styled_component",
            Self::ErrorHandler => "error_handler",
            Self::PlatformComponent => "platform_component",
            Self::PlatformLifecycle => "platform_lifecycle",
            Self::PlatformAttribute => "platform_attribute",
            Self::PlatformType => "platform_type",
            Self::PlatformEvent => "platform_event",
            Self::PlatformField => "platform_field",
        }
    }

    /// Returns `true` for kinds describing file organization rather than code.
    #[must_use]
    pub fn is_organization(self) -> bool {
        matches!(
            self,
            Self::NextPage | Self::NextLayout | Self::NextMiddleware | Self::StyledComponent
        )
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized extraction result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralRecord {
    /// Identifier of the construct.
    pub name: String,
    /// Relative path of the file it came from.
    pub file: String,
    /// Record kind.
    pub kind: RecordKind,
    /// Raw parameter list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
    /// Supertype / extends text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Declared return type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    /// Route for page records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    /// Whether a page route spans more than one segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<bool>,
    /// Styled element accessor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    /// Event payload type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Declared field or caught-error type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    /// Field initializer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl StructuralRecord {
    /// Creates a record with no optional fields set.
    #[must_use]
    pub fn new(kind: RecordKind, name: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            kind,
            parameters: None,
            base: None,
            return_type: None,
            route: None,
            nested: None,
            element: None,
            event_type: None,
            field_type: None,
            value: None,
        }
    }

    /// Sets the raw parameter list.
    #[must_use]
    pub fn parameters(mut self, parameters: Option<&str>) -> Self {
        self.parameters = parameters.map(String::from);
        self
    }

    /// Sets the supertype text.
    #[must_use]
    pub fn base(mut self, base: Option<&str>) -> Self {
        self.base = base.map(String::from);
        self
    }

    /// Sets the return type.
    #[must_use]
    pub fn return_type(mut self, return_type: Option<&str>) -> Self {
        self.return_type = return_type.map(String::from);
        self
    }

    /// Sets the page route and derives `nested`.
    #[must_use]
    pub fn route(mut self, route: &str) -> Self {
        self.nested = Some(route.contains('/'));
        self.route = Some(route.to_string());
        self
    }

    /// Sets the styled element.
    #[must_use]
    pub fn element(mut self, element: &str) -> Self {
        self.element = Some(element.to_string());
        self
    }

    /// Sets the event payload type.
    #[must_use]
    pub fn event_type(mut self, event_type: Option<&str>) -> Self {
        self.event_type = event_type.map(String::from);
        self
    }

    /// Sets the field type.
    #[must_use]
    pub fn field_type(mut self, field_type: Option<&str>) -> Self {
        self.field_type = field_type.map(String::from);
        self
    }

    /// Sets the field initializer.
    #[must_use]
    pub fn value(mut self, value: Option<&str>) -> Self {
        self.value = value.map(String::from);
        self
    }
}

/// Directory naming convention, classified from the directory basename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NamingConvention {
    /// Has cased characters, none uppercase.
    #[serde(rename = "lowercase")]
    Lowercase,
    /// Has cased characters, none lowercase.
    #[serde(rename = "uppercase")]
    Uppercase,
    /// Contains `_`.
    #[serde(rename = "snake_case")]
    SnakeCase,
    /// Contains `-`.
    #[serde(rename = "kebab-case")]
    KebabCase,
    /// Anything else.
    #[serde(rename = "mixed")]
    Mixed,
}

impl NamingConvention {
    /// Classifies a name. Checks run in declaration order; first match wins.
    ///
    /// ```
    /// use codeprint_core::NamingConvention;
    ///
    /// assert_eq!(NamingConvention::classify("utils"), NamingConvention::Lowercase);
    /// assert_eq!(NamingConvention::classify("My_Dir"), NamingConvention::SnakeCase);
    /// assert_eq!(NamingConvention::classify("MyDir"), NamingConvention::Mixed);
    /// ```
    #[must_use]
    pub fn classify(name: &str) -> Self {
        let has_lower = name.chars().any(char::is_lowercase);
        let has_upper = name.chars().any(char::is_uppercase);

        if has_lower && !has_upper {
            Self::Lowercase
        } else if has_upper && !has_lower {
            Self::Uppercase
        } else if name.contains('_') {
            Self::SnakeCase
        } else if name.contains('-') {
            Self::KebabCase
        } else {
            Self::Mixed
        }
    }

    /// Serialized name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lowercase => "lowercase",
            Self::Uppercase => "uppercase",
            Self::SnakeCase => "snake_case",
            Self::KebabCase => "kebab-case",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for NamingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Purpose inferred from keywords in a directory basename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    /// Tests, specs, mocks.
    Testing,
    /// Shared helpers.
    Utilities,
    /// Models and entities.
    Domain,
    /// Controllers, handlers, services.
    BusinessLogic,
    /// Views, templates, components.
    Presentation,
}

const PURPOSE_KEYWORDS: &[(Purpose, &[&str])] = &[
    (Purpose::Testing, &["test", "spec", "mock"]),
    (Purpose::Utilities, &["util", "helper", "common", "shared"]),
    (Purpose::Domain, &["model", "entity", "domain"]),
    (Purpose::BusinessLogic, &["controller", "handler", "service"]),
    (Purpose::Presentation, &["view", "template", "component"]),
];

impl Purpose {
    /// Returns every purpose whose keywords occur in the lowercased name.
    #[must_use]
    pub fn infer(name: &str) -> BTreeSet<Self> {
        let lower = name.to_lowercase();
        PURPOSE_KEYWORDS
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(purpose, _)| *purpose)
            .collect()
    }

    /// Serialized name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Testing => "testing",
            Self::Utilities => "utilities",
            Self::Domain => "domain",
            Self::BusinessLogic => "business_logic",
            Self::Presentation => "presentation",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated counts for one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryStats {
    /// Every listed file directly in this directory.
    pub total_files: usize,
    /// Files that were read and analyzed as code.
    pub code_files: usize,
    /// Code files per language.
    pub languages: BTreeMap<Language, usize>,
    /// Records per kind, imports included.
    pub patterns: BTreeMap<RecordKind, usize>,
    /// Naming convention of the basename; `None` for the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naming: Option<NamingConvention>,
    /// Purposes inferred from the basename.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub purposes: BTreeSet<Purpose>,
}

/// Raw content of a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Relative path.
    pub file: String,
    /// File content.
    pub content: String,
}

/// The project-wide aggregate built by one traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStructure {
    /// Code files that were read and analyzed, in traversal order.
    pub files: Vec<String>,
    /// Every path handed to the aggregator.
    pub total_files: usize,
    /// Code files per language, project-wide.
    pub languages: BTreeMap<Language, usize>,
    /// Imported module name to presence flag.
    pub dependencies: BTreeMap<String, bool>,
    /// Distinct imported modules per file.
    pub imports: BTreeMap<String, Vec<String>>,
    /// Records per kind.
    pub records: BTreeMap<RecordKind, Vec<StructuralRecord>>,
    /// Per-directory statistics keyed by `/`-separated relative path; the
    /// root is `""`.
    pub directories: BTreeMap<String, DirectoryStats>,
    /// Raw code text per analyzed file.
    pub code_contents: BTreeMap<String, String>,
    /// Configuration files with raw content.
    pub config_files: Vec<ConfigFile>,
}

impl ProjectStructure {
    /// Creates an empty structure.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records of one kind.
    #[must_use]
    pub fn records_of(&self, kind: RecordKind) -> &[StructuralRecord] {
        self.records.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Records of any kind that came from `file`.
    pub fn records_in<'a>(&'a self, file: &'a str) -> impl Iterator<Item = &'a StructuralRecord> {
        self.records
            .values()
            .flatten()
            .filter(move |record| record.file == file)
    }

    /// Total number of records across kinds.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    /// Number of records describing file organization.
    #[must_use]
    pub fn organization_count(&self) -> usize {
        self.records
            .iter()
            .filter(|(kind, _)| kind.is_organization())
            .map(|(_, records)| records.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naming_priority_order() {
        assert_eq!(NamingConvention::classify("src"), NamingConvention::Lowercase);
        // Python-style: underscores do not stop a name from being lowercase.
        assert_eq!(NamingConvention::classify("my_dir"), NamingConvention::Lowercase);
        assert_eq!(NamingConvention::classify("API"), NamingConvention::Uppercase);
        assert_eq!(NamingConvention::classify("My_Dir"), NamingConvention::SnakeCase);
        assert_eq!(NamingConvention::classify("My-Dir"), NamingConvention::KebabCase);
        assert_eq!(NamingConvention::classify("MyDir"), NamingConvention::Mixed);
    }

    #[test]
    fn naming_non_alphabetic_with_underscore_is_snake_case() {
        assert_eq!(NamingConvention::classify("__"), NamingConvention::SnakeCase);
        assert_eq!(NamingConvention::classify("2024_01"), NamingConvention::SnakeCase);
        assert_eq!(NamingConvention::classify("2024-01"), NamingConvention::KebabCase);
        assert_eq!(NamingConvention::classify("2024"), NamingConvention::Mixed);
    }

    #[test]
    fn purposes_can_overlap() {
        let purposes = Purpose::infer("shared_test_helpers");
        assert!(purposes.contains(&Purpose::Testing));
        assert!(purposes.contains(&Purpose::Utilities));
        assert_eq!(purposes.len(), 2);
    }

    #[test]
    fn purposes_empty_for_plain_names() {
        assert!(Purpose::infer("src").is_empty());
        assert_eq!(
            Purpose::infer("Controllers").into_iter().collect::<Vec<_>>(),
            [Purpose::BusinessLogic]
        );
    }

    #[test]
    fn route_sets_nested() {
        let flat =
            StructuralRecord::new(RecordKind::NextPage, "index", "pages/index.tsx").route("index");
        assert_eq!(flat.nested, Some(false));
        let nested = StructuralRecord::new(RecordKind::NextPage, "blog/[id]", "pages/blog/[id].tsx")
            .route("blog/[id]");
        assert_eq!(nested.nested, Some(true));
    }

    #[test]
    fn record_serializes_without_empty_fields() {
        let record =
            StructuralRecord::new(RecordKind::Function, "foo", "a.py").parameters(Some("a, b"));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "function");
        assert_eq!(json["parameters"], "a, b");
        assert!(json.get("base").is_none());
    }

    #[test]
    fn records_in_filters_by_file() {
        let mut structure = ProjectStructure::new();
        structure.records.insert(
            RecordKind::Class,
            vec![
                StructuralRecord::new(RecordKind::Class, "A", "a.ts"),
                StructuralRecord::new(RecordKind::Class, "B", "b.ts"),
            ],
        );
        let names: Vec<_> = structure.records_in("b.ts").map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["B"]);
        assert_eq!(structure.record_count(), 2);
        assert!(structure.records_of(RecordKind::Function).is_empty());
    }
}
