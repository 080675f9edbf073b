//! The matching engine: runs compiled rules over one file's text.

use crate::catalog::{self, common, platform, Bucket, ConstructKind, Role};
use crate::compiler::{CompiledCatalog, CompiledRule};
use crate::language::{Family, Language};
use crate::types::{RecordKind, StructuralRecord};

use thiserror::Error;
use tracing::debug;

/// Recoverable error for a single rule; the rule is skipped for that file.
#[derive(Debug, Error)]
pub enum RuleError {
    /// No alternation was compiled for this construct kind and family.
    #[error("no compiled {kind} rules for the {family} family")]
    MissingAlternation {
        /// Construct kind.
        kind: ConstructKind,
        /// Language family.
        family: Family,
    },

    /// A named rule is absent from the compiled catalog.
    #[error("rule {bucket}/{name} is not in the compiled catalog")]
    MissingRule {
        /// Bucket searched.
        bucket: Bucket,
        /// Rule name.
        name: &'static str,
    },

    /// A rule does not capture a role its extractor depends on.
    #[error("rule {name} does not capture `{role}`")]
    MissingRole {
        /// Rule name.
        name: &'static str,
        /// Required role.
        role: Role,
    },
}

/// Everything extracted from one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAnalysis {
    /// Relative path.
    pub file: String,
    /// Language the file was analyzed as.
    pub language: Language,
    /// Distinct imported modules, sorted.
    pub imports: Vec<String>,
    /// Records in extraction order.
    pub records: Vec<StructuralRecord>,
}

impl FileAnalysis {
    fn new(file: &str, language: Language) -> Self {
        Self {
            file: file.to_string(),
            language,
            imports: Vec::new(),
            records: Vec::new(),
        }
    }

    fn push(&mut self, record: StructuralRecord) {
        self.records.push(record);
    }

    fn record(&self, kind: RecordKind, name: &str) -> StructuralRecord {
        StructuralRecord::new(kind, name, &self.file)
    }
}

/// Runs the compiled catalog against file text.
///
/// Holds no per-call state, so one analyzer serves every file of a run.
#[derive(Debug, Clone, Copy)]
pub struct FileAnalyzer<'c> {
    catalog: &'c CompiledCatalog,
}

impl<'c> FileAnalyzer<'c> {
    /// Creates an analyzer over a compiled catalog.
    #[must_use]
    pub fn new(catalog: &'c CompiledCatalog) -> Self {
        Self { catalog }
    }

    /// Extracts imports and structural records from `text`.
    ///
    /// [`Language::Unknown`] yields an empty analysis. A rule that cannot run
    /// is logged at debug level and skipped; the remaining rules still run.
    #[must_use]
    pub fn analyze(&self, text: &str, file: &str, language: Language) -> FileAnalysis {
        let mut analysis = FileAnalysis::new(file, language);
        if language == Language::Unknown {
            return analysis;
        }

        let family = language.family();
        for kind in ConstructKind::ALL {
            skip_on_error(file, self.extract_construct(kind, family, text, &mut analysis));
        }

        if language.has_web_idioms() {
            self.extract_web_idioms(text, file, &mut analysis);
        }

        if language == Language::CSharp && has_platform_marker(text) {
            self.extract_platform_idioms(text, &mut analysis);
        }

        analysis.imports.sort();
        analysis.imports.dedup();
        analysis
    }

    fn extract_construct(
        &self,
        kind: ConstructKind,
        family: Family,
        text: &str,
        analysis: &mut FileAnalysis,
    ) -> Result<(), RuleError> {
        let alternation = self
            .catalog
            .alternation(kind, family)
            .ok_or(RuleError::MissingAlternation { kind, family })?;

        for m in alternation.find_iter(text) {
            match kind {
                ConstructKind::Import => {
                    let Some(module) = m.captures.trimmed(Role::Module) else {
                        continue;
                    };
                    analysis.imports.extend(
                        module
                            .split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(String::from),
                    );
                }
                ConstructKind::Class | ConstructKind::Function => {
                    let Some(name) = m.captures.trimmed(Role::Name) else {
                        continue;
                    };
                    if kind == ConstructKind::Function && catalog::is_control_keyword(name) {
                        continue;
                    }
                    let record_kind = if kind == ConstructKind::Class {
                        RecordKind::Class
                    } else {
                        RecordKind::Function
                    };
                    let record = analysis
                        .record(record_kind, name)
                        .parameters(m.captures.get(Role::Params))
                        .base(m.captures.trimmed(Role::Base))
                        .return_type(m.captures.trimmed(Role::Return));
                    analysis.push(record);
                }
            }
        }
        Ok(())
    }

    fn extract_web_idioms(&self, text: &str, file: &str, analysis: &mut FileAnalysis) {
        skip_on_error(
            file,
            self.named_records(common::INTERFACE, RecordKind::Interface, text, analysis),
        );
        skip_on_error(file, self.component_tags(text, analysis));
        skip_on_error(
            file,
            self.named_records(common::HOOK_CALL, RecordKind::ReactHook, text, analysis),
        );
        skip_on_error(file, self.error_handlers(text, analysis));
        skip_on_error(file, self.styled_bindings(text, analysis));

        if file.contains("pages/") || file.contains("app/") {
            skip_on_error(
                file,
                self.named_records(
                    common::DATA_FETCHING,
                    RecordKind::NextDataFetching,
                    text,
                    analysis,
                ),
            );
            skip_on_error(file, self.page_route(file, analysis));
            skip_on_error(
                file,
                self.path_record(common::LAYOUT_FILE, RecordKind::NextLayout, file, analysis),
            );
            skip_on_error(
                file,
                self.path_record(
                    common::MIDDLEWARE_FILE,
                    RecordKind::NextMiddleware,
                    file,
                    analysis,
                ),
            );
        }
    }

    fn extract_platform_idioms(&self, text: &str, analysis: &mut FileAnalysis) {
        let file = analysis.file.clone();
        skip_on_error(&file, self.platform_components(text, analysis));
        skip_on_error(&file, self.platform_lifecycle(text, analysis));
        skip_on_error(&file, self.platform_attributes(text, analysis));
        skip_on_error(
            &file,
            self.bucket_records(
                Bucket::Platform,
                platform::BUILTIN_TYPE,
                RecordKind::PlatformType,
                text,
                analysis,
            ),
        );
        skip_on_error(&file, self.platform_events(text, analysis));
        skip_on_error(&file, self.platform_fields(text, analysis));
    }

    fn rule(&self, bucket: Bucket, name: &'static str) -> Result<&'c CompiledRule, RuleError> {
        self.catalog
            .rule(bucket, name)
            .ok_or(RuleError::MissingRule { bucket, name })
    }

    fn rule_with(
        &self,
        bucket: Bucket,
        name: &'static str,
        role: Role,
    ) -> Result<&'c CompiledRule, RuleError> {
        let rule = self.rule(bucket, name)?;
        if rule.declares(role) {
            Ok(rule)
        } else {
            Err(RuleError::MissingRole { name, role })
        }
    }

    /// One record per match, named by the `name` capture.
    fn named_records(
        &self,
        name: &'static str,
        kind: RecordKind,
        text: &str,
        analysis: &mut FileAnalysis,
    ) -> Result<(), RuleError> {
        self.bucket_records(Bucket::Common, name, kind, text, analysis)
    }

    fn bucket_records(
        &self,
        bucket: Bucket,
        name: &'static str,
        kind: RecordKind,
        text: &str,
        analysis: &mut FileAnalysis,
    ) -> Result<(), RuleError> {
        let rule = self.rule_with(bucket, name, Role::Name)?;
        for m in rule.find_iter(text) {
            if let Some(ident) = m.captures.trimmed(Role::Name) {
                let record = analysis
                    .record(kind, ident)
                    .base(m.captures.trimmed(Role::Base));
                analysis.push(record);
            }
        }
        Ok(())
    }

    fn component_tags(&self, text: &str, analysis: &mut FileAnalysis) -> Result<(), RuleError> {
        let rule = self.rule_with(Bucket::Common, common::COMPONENT_TAG, Role::Name)?;
        for m in rule.find_iter(text) {
            let Some(name) = m.captures.trimmed(Role::Name) else {
                continue;
            };
            if name.chars().next().is_some_and(char::is_uppercase) {
                let record = analysis.record(RecordKind::ReactComponent, name);
                analysis.push(record);
            }
        }
        Ok(())
    }

    fn error_handlers(&self, text: &str, analysis: &mut FileAnalysis) -> Result<(), RuleError> {
        let rule = self.rule_with(Bucket::Common, common::ERROR_HANDLING, Role::Name)?;
        for m in rule.find_iter(text) {
            let Some(binding) = m.captures.trimmed(Role::Name) else {
                continue;
            };
            let record = analysis
                .record(RecordKind::ErrorHandler, binding)
                .field_type(m.captures.trimmed(Role::Type));
            analysis.push(record);
        }
        Ok(())
    }

    fn styled_bindings(&self, text: &str, analysis: &mut FileAnalysis) -> Result<(), RuleError> {
        let rule = self.rule_with(Bucket::Common, common::STYLED_BINDING, Role::Name)?;
        for m in rule.find_iter(text) {
            let Some(name) = m.captures.trimmed(Role::Name) else {
                continue;
            };
            let element = m.captures.trimmed(Role::Element).unwrap_or("css");
            let record = analysis
                .record(RecordKind::StyledComponent, name)
                .element(element);
            analysis.push(record);
        }
        Ok(())
    }

    fn page_route(&self, file: &str, analysis: &mut FileAnalysis) -> Result<(), RuleError> {
        let rule = self.rule_with(Bucket::Common, common::PAGE_ROUTE, Role::Route)?;
        if let Some(route) = rule
            .find(file)
            .and_then(|m| m.captures.trimmed(Role::Route))
        {
            let record = analysis.record(RecordKind::NextPage, route).route(route);
            analysis.push(record);
        }
        Ok(())
    }

    /// Path-shape rules: the record is named by the `name` capture of the path.
    fn path_record(
        &self,
        name: &'static str,
        kind: RecordKind,
        file: &str,
        analysis: &mut FileAnalysis,
    ) -> Result<(), RuleError> {
        let rule = self.rule_with(Bucket::Common, name, Role::Name)?;
        if let Some(basename) = rule.find(file).and_then(|m| m.captures.trimmed(Role::Name)) {
            let record = analysis.record(kind, basename);
            analysis.push(record);
        }
        Ok(())
    }

    fn platform_components(
        &self,
        text: &str,
        analysis: &mut FileAnalysis,
    ) -> Result<(), RuleError> {
        let rule = self.rule_with(Bucket::Platform, platform::COMPONENT, Role::Name)?;
        for m in rule.find_iter(text) {
            let Some(name) = m.captures.trimmed(Role::Name) else {
                continue;
            };
            let record = analysis
                .record(RecordKind::PlatformComponent, name)
                .base(m.captures.trimmed(Role::Base));
            analysis.push(record);
        }
        Ok(())
    }

    fn platform_lifecycle(&self, text: &str, analysis: &mut FileAnalysis) -> Result<(), RuleError> {
        let rule = self.rule_with(Bucket::Platform, platform::LIFECYCLE, Role::Name)?;
        for m in rule.find_iter(text) {
            let Some(name) = m.captures.trimmed(Role::Name) else {
                continue;
            };
            let record = analysis
                .record(RecordKind::PlatformLifecycle, name)
                .parameters(m.captures.get(Role::Params))
                .return_type(Some("void"));
            analysis.push(record);
        }
        Ok(())
    }

    fn platform_attributes(
        &self,
        text: &str,
        analysis: &mut FileAnalysis,
    ) -> Result<(), RuleError> {
        let rule = self.rule_with(Bucket::Platform, platform::ATTRIBUTE, Role::Name)?;
        for m in rule.find_iter(text) {
            let Some(name) = m.captures.trimmed(Role::Name) else {
                continue;
            };
            let record = analysis
                .record(RecordKind::PlatformAttribute, name)
                .parameters(m.captures.trimmed(Role::Params));
            analysis.push(record);
        }
        Ok(())
    }

    fn platform_events(&self, text: &str, analysis: &mut FileAnalysis) -> Result<(), RuleError> {
        let rule = self.rule_with(Bucket::Platform, platform::EVENT, Role::Name)?;
        for m in rule.find_iter(text) {
            let Some(name) = m.captures.trimmed(Role::Name) else {
                continue;
            };
            let record = analysis
                .record(RecordKind::PlatformEvent, name)
                .event_type(m.captures.trimmed(Role::Type));
            analysis.push(record);
        }
        Ok(())
    }

    fn platform_fields(&self, text: &str, analysis: &mut FileAnalysis) -> Result<(), RuleError> {
        let rule = self.rule_with(Bucket::Platform, platform::FIELD, Role::Name)?;
        for m in rule.find_iter(text) {
            let Some(name) = m.captures.trimmed(Role::Name) else {
                continue;
            };
            let field_type = m.captures.trimmed(Role::Type);
            if field_type.is_some_and(catalog::is_control_keyword) {
                continue;
            }
            let record = analysis
                .record(RecordKind::PlatformField, name)
                .field_type(field_type)
                .value(m.captures.trimmed(Role::Value));
            analysis.push(record);
        }
        Ok(())
    }
}

fn has_platform_marker(text: &str) -> bool {
    catalog::PLATFORM_MARKERS
        .iter()
        .any(|marker| text.contains(marker))
}

fn skip_on_error(file: &str, result: Result<(), RuleError>) {
    if let Err(error) = result {
        debug!(file, %error, "skipping rule");
    }
}
