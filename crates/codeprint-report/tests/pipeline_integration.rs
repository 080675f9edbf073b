//! Integration test: the rules pipeline against scripted generators.
//!
//! No network: a fake [`TextGenerator`] replays canned replies and records
//! the prompts it was sent.

use std::cell::RefCell;
use std::time::Duration;

use codeprint_core::{
    Language, ProjectInfo, ProjectStructure, RecordKind, ReportConfig, StructuralRecord,
};
use codeprint_report::{
    GenerateError, ReportError, Retrying, RulesPipeline, TextGenerator, FALLBACK_DESCRIPTION,
};

struct Fake {
    replies: RefCell<Vec<Result<String, GenerateError>>>,
    prompts: RefCell<Vec<String>>,
}

impl Fake {
    fn new(mut replies: Vec<Result<String, GenerateError>>) -> Self {
        replies.reverse();
        Self {
            replies: RefCell::new(replies),
            prompts: RefCell::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl TextGenerator for Fake {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.replies
            .borrow_mut()
            .pop()
            .unwrap_or_else(|| Err(GenerateError::MalformedResponse("no reply".into())))
    }
}

fn info() -> ProjectInfo {
    ProjectInfo {
        name: "ledger".to_string(),
        version: "1.0.0".to_string(),
        language: Language::TypeScript,
        framework: "express".to_string(),
        project_type: "application".to_string(),
    }
}

fn structure() -> ProjectStructure {
    let mut s = ProjectStructure::new();
    s.files = vec!["src/server.ts".to_string()];
    s.total_files = 1;
    s.records.insert(
        RecordKind::Function,
        vec![StructuralRecord::new(RecordKind::Function, "listen", "src/server.ts")],
    );
    s.code_contents
        .insert("src/server.ts".to_string(), "function listen() {}".to_string());
    s
}

const RULES_REPLY: &str = r#"Here you go:
{"ai_behavior": {"code_generation": {"style": {"prefer": ["async/await"], "avoid": ["callbacks"]}}}}"#;

fn limited() -> Result<String, GenerateError> {
    Err(GenerateError::RateLimited {
        body: "slow down".into(),
    })
}

// ── Happy path ──

#[test]
fn builds_document_from_two_requests() {
    let fake = Fake::new(vec![
        Ok(RULES_REPLY.to_string()),
        Ok("  A double-entry ledger API.  ".to_string()),
    ]);
    let config = ReportConfig::default();
    let doc = RulesPipeline::new(&fake, &config)
        .run(&info(), &structure())
        .expect("pipeline succeeds");

    assert_eq!(doc.version, "1.0");
    assert_eq!(doc.project.info.name, "ledger");
    assert_eq!(doc.project.description, "A double-entry ledger API.");
    assert_eq!(doc.ai_behavior.code_generation.style.prefer, ["async/await"]);

    let prompts = fake.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("Return a JSON object defining AI behavior rules"));
    assert!(prompts[0].contains("File: src/server.ts:\nfunction listen() {}"));
    assert!(prompts[1].contains("- src/server.ts: 0 classes, 1 functions"));
}

// ── Description fallback ──

#[test]
fn description_failure_uses_fallback() {
    let fake = Fake::new(vec![
        Ok(RULES_REPLY.to_string()),
        Err(GenerateError::Http {
            status: 500,
            body: "boom".into(),
        }),
    ]);
    let config = ReportConfig::default();
    let doc = RulesPipeline::new(&fake, &config)
        .run(&info(), &structure())
        .expect("description failure is not fatal");

    assert_eq!(doc.project.description, FALLBACK_DESCRIPTION);
}

#[test]
fn long_description_is_clipped() {
    let long = vec!["ledger"; 150].join(" ");
    let fake = Fake::new(vec![Ok(RULES_REPLY.to_string()), Ok(long)]);
    let config = ReportConfig::default();
    let doc = RulesPipeline::new(&fake, &config)
        .run(&info(), &structure())
        .unwrap();

    assert!(doc.project.description.ends_with("..."));
    assert_eq!(doc.project.description.split_whitespace().count(), 100);
}

// ── Fatal paths ──

#[test]
fn rules_reply_without_behavior_is_fatal() {
    let fake = Fake::new(vec![Ok(r#"{"rules": "none"}"#.to_string())]);
    let config = ReportConfig::default();
    let err = RulesPipeline::new(&fake, &config)
        .run(&info(), &structure())
        .unwrap_err();

    assert!(matches!(err, ReportError::MissingBehavior));
    assert_eq!(fake.prompts().len(), 1);
}

#[test]
fn retry_exhaustion_surfaces_rate_limit() {
    let fake = Fake::new(vec![limited(), limited(), limited()]);
    let config = ReportConfig::default();
    let generator = Retrying::new(&fake, 3, Duration::ZERO);
    let err = RulesPipeline::new(generator, &config)
        .run(&info(), &structure())
        .unwrap_err();

    assert!(matches!(
        err,
        ReportError::Generate(GenerateError::RateLimited { .. })
    ));
    assert_eq!(fake.prompts().len(), 3);
}

#[test]
fn retry_recovers_before_exhaustion() {
    let fake = Fake::new(vec![
        limited(),
        Ok(RULES_REPLY.to_string()),
        Ok("Ledger.".to_string()),
    ]);
    let config = ReportConfig::default();
    let generator = Retrying::new(&fake, 3, Duration::ZERO);
    let doc = RulesPipeline::new(generator, &config)
        .run(&info(), &structure())
        .unwrap();

    assert_eq!(doc.project.description, "Ledger.");
    assert_eq!(fake.prompts().len(), 3);
}
