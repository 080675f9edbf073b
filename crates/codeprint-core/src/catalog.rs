//! The pattern catalog: every textual rule the matcher knows about.
//!
//! Rules are grouped two ways:
//!
//! - **Construct buckets** (`import`, `class`, `function`): one ordered list
//!   of alternatives per [`Family`]. The compiler joins each list into a
//!   single alternation and reports which alternative fired.
//! - **Rule buckets** ([`Bucket::Common`], [`Bucket::Platform`]): standalone
//!   named rules for framework idioms.
//!
//! Capture groups use canonical role names (see [`Role`]) and every
//! alternative may reuse them. An alternative of an `import` construct must
//! declare `module`; class and function alternatives must declare `name`.
//!
//! No rule uses look-around or back-references, so matching stays linear in
//! the size of the input.

use crate::language::Family;
use serde::Serialize;
use std::fmt;

/// One named pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PatternRule {
    /// Rule or alternative label, unique within its bucket.
    pub name: &'static str,
    /// Regular expression text using canonical capture roles.
    pub pattern: &'static str,
}

impl PatternRule {
    /// Creates a rule.
    #[must_use]
    pub const fn new(name: &'static str, pattern: &'static str) -> Self {
        Self { name, pattern }
    }
}

/// Construct kinds that are matched per language family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstructKind {
    /// Import / include / using / require.
    Import,
    /// Class-like declarations.
    Class,
    /// Function and method declarations.
    Function,
}

impl ConstructKind {
    /// All construct kinds, in matching order.
    pub const ALL: [ConstructKind; 3] = [
        ConstructKind::Import,
        ConstructKind::Class,
        ConstructKind::Function,
    ];

    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Class => "class",
            Self::Function => "function",
        }
    }

    /// The role every alternative of this construct must declare.
    #[must_use]
    pub fn identifier_role(self) -> Role {
        match self {
            Self::Import => Role::Module,
            Self::Class | Self::Function => Role::Name,
        }
    }
}

impl fmt::Display for ConstructKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Buckets of standalone named rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    /// Family-independent and web-framework rules.
    Common,
    /// Component-runtime (Unity) rules.
    Platform,
}

impl Bucket {
    /// All rule buckets.
    pub const ALL: [Bucket; 2] = [Bucket::Common, Bucket::Platform];

    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Platform => "platform",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical capture-group roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Declared identifier.
    Name,
    /// Imported module path.
    Module,
    /// Supertype / extends list.
    Base,
    /// Raw parameter list.
    Params,
    /// Declared return type.
    Return,
    /// Styled element accessor.
    Element,
    /// Route derived from a file path.
    Route,
    /// Declared or annotated type.
    Type,
    /// Initializer expression.
    Value,
}

impl Role {
    /// All roles.
    pub const ALL: [Role; 9] = [
        Role::Name,
        Role::Module,
        Role::Base,
        Role::Params,
        Role::Return,
        Role::Element,
        Role::Route,
        Role::Type,
        Role::Value,
    ];

    /// Capture-group name used in pattern text.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Module => "module",
            Self::Base => "base",
            Self::Params => "params",
            Self::Return => "return",
            Self::Element => "element",
            Self::Route => "route",
            Self::Type => "type",
            Self::Value => "value",
        }
    }

    /// Parses a capture-group name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == name)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names of the rules in [`Bucket::Common`].
pub mod common {
    /// Generic method with a body.
    pub const METHOD: &str = "method";
    /// `const`/`let`/`var`/`final` binding with initializer.
    pub const VARIABLE: &str = "variable";
    /// `try { .. } catch (e: T)` block.
    pub const ERROR_HANDLING: &str = "error_handling";
    /// `interface Name extends ..`.
    pub const INTERFACE: &str = "interface";
    /// Uppercase-led JSX tag.
    pub const COMPONENT_TAG: &str = "component_tag";
    /// `useXxx(` hook call.
    pub const HOOK_CALL: &str = "hook_call";
    /// Exported data-loading function.
    pub const DATA_FETCHING: &str = "data_fetching";
    /// Route derived from a `pages/` or `app/` path.
    pub const PAGE_ROUTE: &str = "page_route";
    /// Layout-style file basename.
    pub const LAYOUT_FILE: &str = "layout_file";
    /// Middleware file basename.
    pub const MIDDLEWARE_FILE: &str = "middleware_file";
    /// `Name = styled.div\`..\``.
    pub const STYLED_BINDING: &str = "styled_binding";
}

/// Names of the rules in [`Bucket::Platform`].
pub mod platform {
    /// Class deriving from a runtime component base.
    pub const COMPONENT: &str = "component";
    /// Well-known lifecycle method.
    pub const LIFECYCLE: &str = "lifecycle";
    /// Bracketed attribute from the allow-list.
    pub const ATTRIBUTE: &str = "attribute";
    /// Built-in engine type name.
    pub const BUILTIN_TYPE: &str = "builtin_type";
    /// `UnityEvent<T> name`.
    pub const EVENT: &str = "event";
    /// Typed field with optional initializer.
    pub const FIELD: &str = "field";
}

const SCRIPT_IMPORT: &[PatternRule] = &[
    PatternRule::new(
        "from_import",
        r"(?m)^[ \t]*from\s+(?P<module>[A-Za-z0-9_.]+)\s+import\s+[^#\n]+",
    ),
    PatternRule::new(
        "plain_import",
        r"(?m)^[ \t]*import\s+(?P<module>[A-Za-z0-9_.]+(?:[ \t]*,[ \t]*[A-Za-z0-9_.]+)*)",
    ),
];

const WEB_IMPORT: &[PatternRule] = &[
    PatternRule::new(
        "es_module",
        r#"import\s+(?:type\s+)?[^'";]*?\bfrom\s+['"](?P<module>[^'"]+)['"]"#,
    ),
    PatternRule::new(
        "commonjs_require",
        r#"require\s*\(\s*['"](?P<module>[^'"]+)['"]\s*\)"#,
    ),
    PatternRule::new(
        "qualified_import",
        r"import\s+(?:static\s+)?(?P<module>[A-Za-z0-9_.]+(?:\.\*)?)",
    ),
    PatternRule::new(
        "ruby_require",
        r#"require(?:_relative)?\s+['"](?P<module>[^'"]+)['"]"#,
    ),
    PatternRule::new("bare_import", r#"import\s+['"](?P<module>[^'"]+)['"]"#),
];

const SYSTEM_IMPORT: &[PatternRule] = &[
    PatternRule::new("c_include", r#"#include\s*[<"](?P<module>[^>"]+)[>"]"#),
    PatternRule::new("objc_import", r#"#import\s*[<"](?P<module>[^>"]+)[>"]"#),
    PatternRule::new(
        "using_directive",
        r"using\s+(?:static\s+)?(?P<module>[A-Za-z0-9_.]+)\s*;",
    ),
    PatternRule::new("namespace", r"namespace\s+(?P<module>[A-Za-z0-9_\\]+)"),
    PatternRule::new(
        "php_use",
        r"(?m)^[ \t]*use\s+(?P<module>[A-Za-z0-9_\\]+)\s*;",
    ),
    PatternRule::new("module_import", r"\bimport\s+(?P<module>[^\n;]+)"),
];

const SCRIPT_CLASS: &[PatternRule] = &[PatternRule::new(
    "python_class",
    r"class\s+(?P<name>\w+)(?:\((?P<base>[^)]*)\))?\s*:",
)];

const WEB_CLASS: &[PatternRule] = &[
    PatternRule::new(
        "class_declaration",
        r"(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+(?P<name>\w+)(?:\s*(?:extends|implements)\s+(?P<base>[^{<]+))?(?:\s*<[^>\n]+>)?\s*\{",
    ),
    PatternRule::new(
        "class_expression",
        r"(?:export\s+)?(?:const|let|var)\s+(?P<name>\w+)\s*=\s*class(?:\s+extends\s+(?P<base>[^{]+))?\s*\{",
    ),
    PatternRule::new(
        "generic_class",
        r"(?:export\s+)?class\s+(?P<name>\w+)\s*(?:<[^>\n]+>)?\s*(?:extends|implements)\s+(?P<base>[^{]+)?\s*\{",
    ),
    PatternRule::new(
        "ruby_class",
        r"(?m)^[ \t]*class\s+(?P<name>[A-Z]\w*)(?:[ \t]*<[ \t]*(?P<base>[\w:]+))?[ \t]*$",
    ),
];

const SYSTEM_CLASS: &[PatternRule] = &[
    PatternRule::new(
        "type_declaration",
        r"(?:(?:public|private|protected|internal|friend|static|abstract|partial|sealed|final|open|data)\s+)*(?:enum\s+)?(?:class|struct|enum|union|interface)\s+(?P<name>\w+)(?:\s*(?::|extends|implements)\s*(?P<base>[^{;(]+))?",
    ),
    PatternRule::new(
        "objc_interface",
        r"@(?:interface|implementation)\s+(?P<name>\w+)(?:\s*:\s*(?P<base>[^{\n]+))?",
    ),
];

const SCRIPT_FUNCTION: &[PatternRule] = &[PatternRule::new(
    "python_def",
    r"(?:async\s+)?def\s+(?P<name>\w+)\s*\((?P<params>[^)]*)\)(?:\s*->\s*(?P<return>[^:#\n]+))?\s*:",
)];

const WEB_FUNCTION: &[PatternRule] = &[
    PatternRule::new(
        "function_declaration",
        r"(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*(?P<name>\w+)\s*(?:<[^>\n]+>)?\s*\((?P<params>[^)]*)\)(?:\s*:\s*(?P<return>[^{=]+))?\s*\{",
    ),
    PatternRule::new(
        "function_expression",
        r"(?:export\s+)?(?:const|let|var)\s+(?P<name>\w+)\s*=\s*(?:async\s+)?(?:function\s*\*?|\((?P<params>[^)]*)\)\s*=>)",
    ),
    PatternRule::new(
        "method",
        r"(?:(?:public|private|protected)\s+)?(?:static\s+)?(?:async\s+)?(?P<name>\w+)\s*\((?P<params>[^)]*)\)(?:\s*:\s*(?P<return>[^{;=]+))?\s*\{",
    ),
    PatternRule::new(
        "java_method",
        r"(?:(?:public|private|protected|static|final|abstract|synchronized|native|default)\s+)*(?:<[^>\n]+>\s+)?(?P<return>(?:void|boolean|byte|char|short|int|long|float|double|[A-Z][\w.]*)(?:<[^(){};\n]*>)?(?:\[\])*)\s+(?P<name>\w+)\s*\((?P<params>[^)]*)\)(?:\s*throws\s+[^{;]+)?\s*\{",
    ),
    PatternRule::new(
        "ruby_def",
        r"(?m)^[ \t]*def\s+(?:self\.)?(?P<name>\w+[?!=]?)(?:[ \t]*\((?P<params>[^)]*)\))?",
    ),
];

const SYSTEM_FUNCTION: &[PatternRule] = &[
    PatternRule::new(
        "method_declaration",
        r"(?:(?:public|private|protected|internal|friend|static|virtual|override|async|inline|extern|final|open|suspend)\s+)*\w[\w:<>,*&\[\]]*\s+(?P<name>\w+)\s*\((?P<params>[^)]*)\)(?:\s*(?:const|override|final|noexcept|throws))*(?:\s*(?:->|:)\s*(?P<return>[^{;=\n]+?))?\s*(?:\{|=>)",
    ),
    PatternRule::new(
        "objc_method",
        r"[-+]\s*\((?P<return>[^)]+)\)\s*(?P<name>\w+)(?::\s*\([^)]+\)\s*(?P<params>\w+))?",
    ),
];

const COMMON_RULES: &[PatternRule] = &[
    PatternRule::new(
        common::METHOD,
        r"(?:(?:public|private|protected)\s+)?(?:static\s+)?(?:async\s+)?(?P<name>\w+)\s*\((?P<params>[^)]*)\)(?:\s*:\s*(?P<return>[^{]+))?\s*\{",
    ),
    PatternRule::new(
        common::VARIABLE,
        r"(?:(?:public|private|protected)\s+)?(?:static\s+)?(?:const|let|var|final)\s+(?P<name>\w+)\s*(?::\s*(?P<type>[^=;]+))?\s*=\s*(?P<value>[^;\n]+)",
    ),
    PatternRule::new(
        common::ERROR_HANDLING,
        r"try\s*\{(?:[^{}]|\{[^{}]*\})*\}\s*catch\s*\(\s*(?P<name>\w+)(?:\s*:\s*(?P<type>[^)]+))?\s*\)",
    ),
    PatternRule::new(
        common::INTERFACE,
        r"(?:export\s+)?interface\s+(?P<name>\w+)(?:\s*<[^>\n]+>)?(?:\s+extends\s+(?P<base>[^{]+))?\s*\{",
    ),
    PatternRule::new(
        common::COMPONENT_TAG,
        r"(?m)(?:^|[^\w.$])<(?P<name>[A-Z][\w.]*)",
    ),
    PatternRule::new(common::HOOK_CALL, r"\b(?P<name>use[A-Z]\w*)\s*\("),
    PatternRule::new(
        common::DATA_FETCHING,
        r"export\s+(?:(?:async\s+)?function\s+|const\s+)(?P<name>getStaticProps|getStaticPaths|getServerSideProps|generateStaticParams|generateMetadata)\b",
    ),
    PatternRule::new(
        common::PAGE_ROUTE,
        r"(?:^|/)(?:pages|app)/(?P<route>[^_/][^/]*(?:/[^_/][^/]*)*)\.(?:jsx?|tsx?)$",
    ),
    PatternRule::new(
        common::LAYOUT_FILE,
        r"(?:^|/)(?P<name>layout|page|loading|error|not-found)\.(?:jsx?|tsx?)$",
    ),
    PatternRule::new(
        common::MIDDLEWARE_FILE,
        r"(?:^|/)(?P<name>middleware)\.(?:jsx?|tsx?)$",
    ),
    PatternRule::new(
        common::STYLED_BINDING,
        r"(?:const\s+)?(?P<name>\w+)\s*=\s*styled(?:\.(?P<element>\w+)|\([\w.]+\))(?:<[^>]*>)?`[^`]*`",
    ),
];

const PLATFORM_RULES: &[PatternRule] = &[
    PatternRule::new(
        platform::COMPONENT,
        r"(?:public\s+)?(?:(?:sealed|abstract|partial)\s+)*class\s+(?P<name>\w+)\s*:\s*(?P<base>MonoBehaviour|ScriptableObject|EditorWindow)\b",
    ),
    PatternRule::new(
        platform::LIFECYCLE,
        r"(?:(?:private|protected|public)\s+)?(?:virtual\s+)?(?:override\s+)?void\s+(?P<name>Awake|Start|Update|FixedUpdate|LateUpdate|OnEnable|OnDisable|OnDestroy|OnTriggerEnter|OnTriggerExit|OnCollisionEnter|OnCollisionExit|OnMouseDown|OnMouseUp|OnGUI)\s*\((?P<params>[^)]*)\)",
    ),
    PatternRule::new(
        platform::ATTRIBUTE,
        r"\[\s*(?P<name>SerializeField|Header|Tooltip|Range|RequireComponent|ExecuteInEditMode|CreateAssetMenu|MenuItem)\b(?:\s*\(\s*(?P<params>[^)]*?)\s*\))?\s*\]",
    ),
    PatternRule::new(
        platform::BUILTIN_TYPE,
        r"\b(?P<name>GameObject|Transform|Rigidbody|Collider|AudioSource|Camera|Light|Animator|ParticleSystem|Canvas|Image|Text|Button|Vector2|Vector3|Quaternion)\b",
    ),
    PatternRule::new(
        platform::EVENT,
        r"(?:(?:public|private|protected)\s+)?UnityEvent\s*<\s*(?P<type>[^>]*?)\s*>\s+(?P<name>\w+)",
    ),
    PatternRule::new(
        platform::FIELD,
        r"(?:(?:public|private|protected|internal)\s+)?(?:\[SerializeField\]\s*)?(?P<type>\w+(?:<[^>]+>)?)\s+(?P<name>\w+)\s*(?:=\s*(?P<value>[^;]+))?;",
    ),
];

/// Substrings whose presence in a C# file enables the platform bucket.
pub const PLATFORM_MARKERS: &[&str] = &["UnityEngine", "MonoBehaviour", "ScriptableObject"];

/// Words that brace-syntax rules can capture in identifier position but
/// never name a declaration.
pub const CONTROL_KEYWORDS: &[&str] = &[
    "if", "else", "elif", "for", "foreach", "while", "do", "switch", "case", "match", "when",
    "catch", "try", "finally", "return", "throw", "throws", "new", "delete", "sizeof", "typeof",
    "instanceof", "await", "yield", "function", "using", "lock", "fixed", "with", "assert",
    "super", "this", "base", "import", "require", "defined", "and", "or", "not",
];

/// Returns `true` if `word` is a control keyword.
#[must_use]
pub fn is_control_keyword(word: &str) -> bool {
    CONTROL_KEYWORDS.contains(&word)
}

/// Ordered alternatives for one construct kind and family.
#[derive(Debug, Clone, Serialize)]
pub struct ConstructRules {
    /// Construct kind.
    pub kind: ConstructKind,
    /// Language family.
    pub family: Family,
    /// Alternatives, tried left to right at each position.
    pub alternatives: Vec<PatternRule>,
}

/// The complete rule table.
///
/// [`PatternCatalog::builtin`] is the table every consumer uses. The
/// `with_*` builders exist so alternative tables can be assembled in tests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatternCatalog {
    constructs: Vec<ConstructRules>,
    common: Vec<PatternRule>,
    platform: Vec<PatternRule>,
}

impl PatternCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in rule table.
    #[must_use]
    pub fn builtin() -> Self {
        let table: [(ConstructKind, Family, &[PatternRule]); 9] = [
            (ConstructKind::Import, Family::Script, SCRIPT_IMPORT),
            (ConstructKind::Import, Family::Web, WEB_IMPORT),
            (ConstructKind::Import, Family::System, SYSTEM_IMPORT),
            (ConstructKind::Class, Family::Script, SCRIPT_CLASS),
            (ConstructKind::Class, Family::Web, WEB_CLASS),
            (ConstructKind::Class, Family::System, SYSTEM_CLASS),
            (ConstructKind::Function, Family::Script, SCRIPT_FUNCTION),
            (ConstructKind::Function, Family::Web, WEB_FUNCTION),
            (ConstructKind::Function, Family::System, SYSTEM_FUNCTION),
        ];

        table
            .into_iter()
            .fold(Self::new(), |catalog, (kind, family, alternatives)| {
                catalog.with_alternatives(kind, family, alternatives)
            })
            .with_rules(Bucket::Common, COMMON_RULES)
            .with_rules(Bucket::Platform, PLATFORM_RULES)
    }

    /// Sets the alternatives for a construct kind and family, replacing any
    /// existing entry.
    #[must_use]
    pub fn with_alternatives(
        mut self,
        kind: ConstructKind,
        family: Family,
        alternatives: &[PatternRule],
    ) -> Self {
        self.constructs
            .retain(|c| !(c.kind == kind && c.family == family));
        self.constructs.push(ConstructRules {
            kind,
            family,
            alternatives: alternatives.to_vec(),
        });
        self
    }

    /// Appends rules to a rule bucket.
    #[must_use]
    pub fn with_rules(mut self, bucket: Bucket, rules: &[PatternRule]) -> Self {
        self.bucket_mut(bucket).extend_from_slice(rules);
        self
    }

    /// Appends a single rule to a rule bucket.
    #[must_use]
    pub fn with_rule(mut self, bucket: Bucket, rule: PatternRule) -> Self {
        self.bucket_mut(bucket).push(rule);
        self
    }

    /// All construct entries.
    #[must_use]
    pub fn constructs(&self) -> &[ConstructRules] {
        &self.constructs
    }

    /// Alternatives for one construct kind and family, if present.
    #[must_use]
    pub fn alternatives(&self, kind: ConstructKind, family: Family) -> Option<&[PatternRule]> {
        self.constructs
            .iter()
            .find(|c| c.kind == kind && c.family == family)
            .map(|c| c.alternatives.as_slice())
    }

    /// Rules in a rule bucket.
    #[must_use]
    pub fn rules(&self, bucket: Bucket) -> &[PatternRule] {
        match bucket {
            Bucket::Common => &self.common,
            Bucket::Platform => &self.platform,
        }
    }

    fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<PatternRule> {
        match bucket {
            Bucket::Common => &mut self.common,
            Bucket::Platform => &mut self.platform,
        }
    }
}
