//! Extension to language classification and language family lookup.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source language recognized by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Language {
    /// Python.
    Python,
    /// JavaScript, including JSX.
    JavaScript,
    /// TypeScript, including TSX.
    TypeScript,
    /// Java.
    Java,
    /// Ruby.
    Ruby,
    /// C.
    C,
    /// C++.
    #[serde(rename = "C++")]
    Cpp,
    /// C#.
    #[serde(rename = "C#")]
    CSharp,
    /// PHP.
    #[serde(rename = "PHP")]
    Php,
    /// Kotlin.
    Kotlin,
    /// Swift.
    Swift,
    /// Objective-C.
    #[serde(rename = "Objective-C")]
    ObjectiveC,
    /// Anything not in the extension table.
    Unknown,
}

/// Language grouping that selects which construct alternations run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    /// Indentation-based scripting syntax.
    Script,
    /// Web and JVM-style syntax.
    Web,
    /// Brace/semicolon systems syntax. Default for unknown languages.
    System,
}

impl Family {
    /// All families, in catalog order.
    pub const ALL: [Family; 3] = [Family::Script, Family::Web, Family::System];

    /// Returns the lowercase family name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Web => "web",
            Self::System => "system",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extensions (lowercase, without dot) that are analyzed as code.
const CODE_EXTENSIONS: &[(&str, Language)] = &[
    ("py", Language::Python),
    ("js", Language::JavaScript),
    ("jsx", Language::JavaScript),
    ("mjs", Language::JavaScript),
    ("cjs", Language::JavaScript),
    ("ts", Language::TypeScript),
    ("tsx", Language::TypeScript),
    ("java", Language::Java),
    ("rb", Language::Ruby),
    ("c", Language::C),
    ("h", Language::C),
    ("cpp", Language::Cpp),
    ("cc", Language::Cpp),
    ("cxx", Language::Cpp),
    ("hpp", Language::Cpp),
    ("cs", Language::CSharp),
    ("csx", Language::CSharp),
    ("php", Language::Php),
    ("kt", Language::Kotlin),
    ("kts", Language::Kotlin),
    ("swift", Language::Swift),
    ("m", Language::ObjectiveC),
    ("mm", Language::ObjectiveC),
    ("objc", Language::ObjectiveC),
];

/// Non-code suffixes whose raw content is kept as configuration.
const CONFIG_EXTENSIONS: &[&str] = &["json", "ini", "conf"];

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}

impl Language {
    /// Classifies a file extension, with or without the leading dot.
    ///
    /// ```
    /// use codeprint_core::Language;
    ///
    /// assert_eq!(Language::from_extension(".ts"), Language::TypeScript);
    /// assert_eq!(Language::from_extension("CS"), Language::CSharp);
    /// assert_eq!(Language::from_extension("md"), Language::Unknown);
    /// ```
    #[must_use]
    pub fn from_extension(extension: &str) -> Self {
        let ext = normalize_extension(extension);
        CODE_EXTENSIONS
            .iter()
            .find(|(known, _)| *known == ext)
            .map_or(Self::Unknown, |(_, language)| *language)
    }

    /// Returns the family used to select construct rules.
    ///
    /// Languages outside the script and web tables fall back to
    /// [`Family::System`].
    #[must_use]
    pub fn family(self) -> Family {
        match self {
            Self::Python => Family::Script,
            Self::JavaScript | Self::TypeScript | Self::Java | Self::Ruby => Family::Web,
            _ => Family::System,
        }
    }

    /// Returns `true` for languages that get component/hook/route idiom extraction.
    #[must_use]
    pub fn has_web_idioms(self) -> bool {
        matches!(self, Self::JavaScript | Self::TypeScript)
    }

    /// Human-readable language name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Python => "Python",
            Self::JavaScript => "JavaScript",
            Self::TypeScript => "TypeScript",
            Self::Java => "Java",
            Self::Ruby => "Ruby",
            Self::C => "C",
            Self::Cpp => "C++",
            Self::CSharp => "C#",
            Self::Php => "PHP",
            Self::Kotlin => "Kotlin",
            Self::Swift => "Swift",
            Self::ObjectiveC => "Objective-C",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns `true` if the extension belongs to the analyzed code set.
#[must_use]
pub fn is_code_extension(extension: &str) -> bool {
    Language::from_extension(extension) != Language::Unknown
}

/// Returns `true` if the extension marks a configuration file.
#[must_use]
pub fn is_config_extension(extension: &str) -> bool {
    let ext = normalize_extension(extension);
    CONFIG_EXTENSIONS.contains(&ext.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_with_and_without_dot() {
        assert_eq!(Language::from_extension(".py"), Language::Python);
        assert_eq!(Language::from_extension("py"), Language::Python);
        assert_eq!(Language::from_extension(".TSX"), Language::TypeScript);
    }

    #[test]
    fn unknown_extension() {
        assert_eq!(Language::from_extension(".md"), Language::Unknown);
        assert_eq!(Language::from_extension(""), Language::Unknown);
        assert!(!is_code_extension(".txt"));
    }

    #[test]
    fn family_table() {
        assert_eq!(Language::Python.family(), Family::Script);
        for lang in [Language::JavaScript, Language::TypeScript, Language::Java, Language::Ruby] {
            assert_eq!(lang.family(), Family::Web, "{lang}");
        }
        for lang in [
            Language::C,
            Language::Cpp,
            Language::CSharp,
            Language::Php,
            Language::Kotlin,
            Language::Swift,
            Language::ObjectiveC,
        ] {
            assert_eq!(lang.family(), Family::System, "{lang}");
        }
    }

    #[test]
    fn unknown_defaults_to_system_family() {
        assert_eq!(Language::Unknown.family(), Family::System);
    }

    #[test]
    fn config_suffixes() {
        assert!(is_config_extension(".json"));
        assert!(is_config_extension("INI"));
        assert!(is_config_extension("conf"));
        assert!(!is_config_extension(".yaml"));
    }

    #[test]
    fn serialized_names() {
        let json = serde_json::to_string(&Language::CSharp).unwrap();
        assert_eq!(json, "\"C#\"");
        let json = serde_json::to_string(&Family::Web).unwrap();
        assert_eq!(json, "\"web\"");
    }
}
