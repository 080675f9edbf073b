//! Compiles the [`PatternCatalog`] once into reusable matchers.
//!
//! Construct alternatives are joined into one regex per (kind, family).
//! Alternative `i` is wrapped in a group named `alt{i}` and each of its role
//! captures `(?P<role>` is renamed to `(?P<a{i}_role>`, so every alternative
//! keeps its own capture names. A match is resolved through the role table of
//! whichever `alt{i}` group participated, never by guessing from capture
//! names.

use crate::catalog::{Bucket, ConstructKind, PatternCatalog, PatternRule, Role};
use crate::language::Family;

use miette::Diagnostic;
use regex::Regex;
use std::collections::HashMap;
use thiserror::Error;

const ROLE_GROUP_OPEN: &str = "(?P<";

/// Fatal catalog errors, raised before any file is processed.
#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    /// A rule's pattern text failed to compile.
    #[error("invalid pattern in rule `{rule}`: {source}")]
    #[diagnostic(
        code(codeprint::catalog::invalid_pattern),
        help("patterns use the `regex` crate syntax: no look-around, no back-references")
    )]
    InvalidPattern {
        /// Qualified rule label, e.g. `function/web/method`.
        rule: String,
        /// Underlying compile error.
        #[source]
        source: regex::Error,
    },

    /// A capture group name is not a canonical role.
    #[error("rule `{rule}` uses unknown capture role `{role}`")]
    #[diagnostic(
        code(codeprint::catalog::unknown_role),
        help("use one of: name, module, base, params, return, element, route, type, value")
    )]
    UnknownRole {
        /// Qualified rule label.
        rule: String,
        /// The offending capture name.
        role: String,
    },

    /// A construct alternative does not declare the identifier role.
    #[error("rule `{rule}` must capture `{role}`")]
    #[diagnostic(code(codeprint::catalog::missing_identifier))]
    MissingIdentifier {
        /// Qualified rule label.
        rule: String,
        /// The role that is required.
        role: Role,
    },

    /// A construct entry has no alternatives.
    #[error("no alternatives for {kind}/{family}")]
    #[diagnostic(code(codeprint::catalog::empty_construct))]
    EmptyConstruct {
        /// Construct kind.
        kind: ConstructKind,
        /// Language family.
        family: Family,
    },

    /// Two rules in one bucket share a name.
    #[error("duplicate rule `{name}` in the {bucket} bucket")]
    #[diagnostic(code(codeprint::catalog::duplicate_rule))]
    DuplicateRule {
        /// Bucket.
        bucket: Bucket,
        /// Repeated rule name.
        name: &'static str,
    },
}

/// Non-empty role captures of one match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures<'t> {
    values: Vec<(Role, &'t str)>,
}

impl<'t> Captures<'t> {
    /// Returns the captured text for a role, if it participated and is not
    /// blank.
    #[must_use]
    pub fn get(&self, role: Role) -> Option<&'t str> {
        self.values
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, text)| *text)
    }

    /// Returns the trimmed capture for a role, if non-empty after trimming.
    #[must_use]
    pub fn trimmed(&self, role: Role) -> Option<&'t str> {
        self.get(role).map(str::trim).filter(|s| !s.is_empty())
    }

    fn collect(caps: &regex::Captures<'t>, roles: &[(Role, usize)]) -> Self {
        let values = roles
            .iter()
            .filter_map(|(role, index)| {
                caps.get(*index)
                    .map(|m| m.as_str())
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| (*role, s))
            })
            .collect();
        Self { values }
    }
}

/// One match of a compiled rule or alternation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch<'t> {
    /// Label of the rule or alternative that matched.
    pub label: &'static str,
    /// Role captures resolved for that rule or alternative.
    pub captures: Captures<'t>,
}

#[derive(Debug)]
struct AlternativeSlot {
    label: &'static str,
    group: usize,
    roles: Vec<(Role, usize)>,
}

/// Compiled alternation for one (construct kind, family).
#[derive(Debug)]
pub struct CompiledAlternation {
    regex: Regex,
    slots: Vec<AlternativeSlot>,
}

impl CompiledAlternation {
    fn compile(
        kind: ConstructKind,
        family: Family,
        alternatives: &[PatternRule],
    ) -> Result<Self, CatalogError> {
        if alternatives.is_empty() {
            return Err(CatalogError::EmptyConstruct { kind, family });
        }

        let mut parts = Vec::with_capacity(alternatives.len());
        let mut declared = Vec::with_capacity(alternatives.len());
        for (i, alt) in alternatives.iter().enumerate() {
            let label = qualified_label(kind.as_str(), family.as_str(), alt.name);
            let roles = declared_roles(&label, alt.pattern)?;
            let required = kind.identifier_role();
            if !roles.contains(&required) {
                return Err(CatalogError::MissingIdentifier {
                    rule: label,
                    role: required,
                });
            }
            parts.push(format!(
                "(?P<alt{i}>{})",
                prefix_roles(alt.pattern, &format!("a{i}_"))
            ));
            declared.push(roles);
        }

        let source = parts.join("|");
        let regex = Regex::new(&source).map_err(|e| CatalogError::InvalidPattern {
            rule: format!("{kind}/{family}"),
            source: e,
        })?;

        let mut slots = Vec::with_capacity(alternatives.len());
        for (i, (alt, roles)) in alternatives.iter().zip(declared).enumerate() {
            let group = group_index(&regex, &format!("alt{i}"));
            let roles = roles
                .into_iter()
                .filter_map(|role| {
                    let index = group_index(&regex, &format!("a{i}_{role}"));
                    (index != 0).then_some((role, index))
                })
                .collect();
            slots.push(AlternativeSlot {
                label: alt.name,
                group,
                roles,
            });
        }

        Ok(Self { regex, slots })
    }

    /// Scans `text` left to right for non-overlapping matches.
    pub fn find_iter<'a>(&'a self, text: &'a str) -> impl Iterator<Item = RuleMatch<'a>> + 'a {
        self.regex.captures_iter(text).filter_map(move |caps| {
            let slot = self.slots.iter().find(|s| caps.get(s.group).is_some())?;
            Some(RuleMatch {
                label: slot.label,
                captures: Captures::collect(&caps, &slot.roles),
            })
        })
    }
}

/// Compiled standalone rule.
#[derive(Debug)]
pub struct CompiledRule {
    name: &'static str,
    regex: Regex,
    roles: Vec<(Role, usize)>,
}

impl CompiledRule {
    fn compile(bucket: Bucket, rule: &PatternRule) -> Result<Self, CatalogError> {
        let label = format!("{bucket}/{}", rule.name);
        let declared = declared_roles(&label, rule.pattern)?;
        let regex = Regex::new(rule.pattern).map_err(|e| CatalogError::InvalidPattern {
            rule: label,
            source: e,
        })?;
        let roles = declared
            .into_iter()
            .map(|role| (role, group_index(&regex, role.as_str())))
            .filter(|(_, index)| *index != 0)
            .collect();
        Ok(Self {
            name: rule.name,
            regex,
            roles,
        })
    }

    /// Returns `true` if the rule declares a capture for `role`.
    #[must_use]
    pub fn declares(&self, role: Role) -> bool {
        self.roles.iter().any(|(r, _)| *r == role)
    }

    /// Scans `text` left to right for non-overlapping matches.
    pub fn find_iter<'a>(&'a self, text: &'a str) -> impl Iterator<Item = RuleMatch<'a>> + 'a {
        self.regex
            .captures_iter(text)
            .map(move |caps| self.to_match(&caps))
    }

    /// Returns the leftmost match, if any.
    #[must_use]
    pub fn find<'a>(&'a self, text: &'a str) -> Option<RuleMatch<'a>> {
        self.regex.captures(text).map(|caps| self.to_match(&caps))
    }

    fn to_match<'a>(&self, caps: &regex::Captures<'a>) -> RuleMatch<'a> {
        RuleMatch {
            label: self.name,
            captures: Captures::collect(caps, &self.roles),
        }
    }
}

/// Every catalog rule, compiled once.
///
/// Immutable after construction and `Send + Sync`, so one instance can be
/// shared across files and threads.
#[derive(Debug)]
pub struct CompiledCatalog {
    alternations: HashMap<(ConstructKind, Family), CompiledAlternation>,
    rules: HashMap<Bucket, HashMap<&'static str, CompiledRule>>,
}

impl CompiledCatalog {
    /// Compiles every rule in `catalog`.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] on the first invalid rule.
    pub fn compile(catalog: &PatternCatalog) -> Result<Self, CatalogError> {
        let mut alternations = HashMap::new();
        for construct in catalog.constructs() {
            let compiled = CompiledAlternation::compile(
                construct.kind,
                construct.family,
                &construct.alternatives,
            )?;
            alternations.insert((construct.kind, construct.family), compiled);
        }

        let mut rules = HashMap::new();
        for bucket in Bucket::ALL {
            let mut compiled: HashMap<&'static str, CompiledRule> = HashMap::new();
            for rule in catalog.rules(bucket) {
                if compiled.contains_key(rule.name) {
                    return Err(CatalogError::DuplicateRule {
                        bucket,
                        name: rule.name,
                    });
                }
                compiled.insert(rule.name, CompiledRule::compile(bucket, rule)?);
            }
            rules.insert(bucket, compiled);
        }

        tracing::debug!(
            alternations = alternations.len(),
            rules = rules.values().map(HashMap::len).sum::<usize>(),
            "compiled pattern catalog"
        );

        Ok(Self {
            alternations,
            rules,
        })
    }

    /// Compiles [`PatternCatalog::builtin`].
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if a built-in rule fails to compile.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::compile(&PatternCatalog::builtin())
    }

    /// Looks up the alternation for a construct kind and family.
    #[must_use]
    pub fn alternation(&self, kind: ConstructKind, family: Family) -> Option<&CompiledAlternation> {
        self.alternations.get(&(kind, family))
    }

    /// Looks up a standalone rule by bucket and name.
    #[must_use]
    pub fn rule(&self, bucket: Bucket, name: &str) -> Option<&CompiledRule> {
        self.rules.get(&bucket).and_then(|rules| rules.get(name))
    }
}

fn qualified_label(kind: &str, family: &str, name: &str) -> String {
    format!("{kind}/{family}/{name}")
}

fn group_index(regex: &Regex, name: &str) -> usize {
    regex
        .capture_names()
        .position(|n| n == Some(name))
        .unwrap_or(0)
}

/// Collects the roles named by `(?P<..>` groups in pattern text.
fn declared_roles(label: &str, pattern: &str) -> Result<Vec<Role>, CatalogError> {
    let mut roles = Vec::new();
    for (start, _) in pattern.match_indices(ROLE_GROUP_OPEN) {
        let rest = &pattern[start + ROLE_GROUP_OPEN.len()..];
        let Some(end) = rest.find('>') else {
            continue;
        };
        let name = &rest[..end];
        let role = Role::parse(name).ok_or_else(|| CatalogError::UnknownRole {
            rule: label.to_string(),
            role: name.to_string(),
        })?;
        if !roles.contains(&role) {
            roles.push(role);
        }
    }
    Ok(roles)
}

/// Rewrites `(?P<role>` to `(?P<{prefix}role>`.
fn prefix_roles(pattern: &str, prefix: &str) -> String {
    pattern.replace(ROLE_GROUP_OPEN, &format!("{ROLE_GROUP_OPEN}{prefix}"))
}
