//! Compiled rule tables for severity and category classification.

use std::sync::LazyLock;

use faultline_core::errors::ClassificationError;
use faultline_core::{Metadata, Severity};
use regex::Regex;

/// Semantic regex families, most severe first.
const SEMANTIC_FAMILIES: [(Severity, &str); 5] = [
    (
        Severity::Critical,
        r"(?i)\b(fatal|panic|out of memory|oom|segfault|segmentation fault|data corruption|corrupted|unrecoverable|disk full|no space left)\b",
    ),
    (
        Severity::Error,
        r"(?i)\b(error|exception|failed|failure|unable to|cannot|refused|denied|unauthorized|forbidden|crash|crashed|timed out|timeout)\b",
    ),
    (
        Severity::Warn,
        r"(?i)\b(warn|warning|deprecated|retry|retrying|slow|degraded|high latency|approaching|fallback)\b",
    ),
    (
        Severity::Info,
        r"(?i)\b(started|stopped|connected|disconnected|completed|successful|success)\b",
    ),
    (Severity::Debug, r"(?i)\b(debug|trace|verbose|dump)\b"),
];

/// Fixed phrase table. Every matching phrase contributes; the highest wins.
const KEYWORD_PHRASES: [(&str, Severity); 10] = [
    ("database connection lost", Severity::Critical),
    ("connection pool exhausted", Severity::Critical),
    ("service unavailable", Severity::Critical),
    ("data loss", Severity::Critical),
    ("memory leak", Severity::Error),
    ("authentication failed", Severity::Error),
    ("permission denied", Severity::Error),
    ("rate limit", Severity::Warn),
    ("not found", Severity::Warn),
    ("cache miss", Severity::Info),
];

/// Stack-trace markers that imply a severity regardless of the message.
const STACK_MARKERS: [(&str, Severity); 8] = [
    ("outofmemory", Severity::Critical),
    ("out of memory", Severity::Critical),
    ("stackoverflow", Severity::Critical),
    ("stack overflow", Severity::Critical),
    ("maximum call stack", Severity::Critical),
    ("econnrefused", Severity::Error),
    ("panicked at", Severity::Error),
    ("etimedout", Severity::Warn),
];

/// Modules whose warnings are escalated to errors.
const SENSITIVE_MODULES: [&str; 4] = ["security", "auth", "authentication", "authorization"];

/// Category rules in priority order: (name, substrings, regexes).
const CATEGORY_RULES: [(&str, &[&str], &[&str]); 8] = [
    (
        "database",
        &["database", "sql", "query", "deadlock", "transaction", "connection pool"],
        &[r"(?i)\b(postgres|mysql|sqlite|mongo\w*|redis)\b"],
    ),
    (
        "network",
        &["network", "socket", "dns", "econnrefused", "etimedout", "connection reset", "unreachable"],
        &[r"(?i)\bhttps?://"],
    ),
    (
        "authentication",
        &["auth", "login", "token", "credential", "password", "unauthorized", "forbidden", "permission denied"],
        &[],
    ),
    ("memory", &["memory", "heap", "allocation"], &[r"(?i)\boom\b"]),
    (
        "filesystem",
        &["file", "directory", "enoent", "eacces", "disk"],
        &[r"(/[\w.-]+){2,}"],
    ),
    (
        "validation",
        &["invalid", "validation", "malformed", "missing required", "schema"],
        &[],
    ),
    (
        "configuration",
        &["config", "environment variable", "setting"],
        &[],
    ),
    (
        "performance",
        &["slow", "latency", "timeout", "timed out", "throughput"],
        &[],
    ),
];

pub struct CategoryRule {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub patterns: Vec<Regex>,
}

/// All compiled tables.
pub struct RuleTables {
    semantic: Vec<(Severity, Regex)>,
    categories: Vec<CategoryRule>,
}

fn build_tables() -> Option<RuleTables> {
    let semantic = SEMANTIC_FAMILIES
        .iter()
        .map(|(severity, pattern)| Regex::new(pattern).ok().map(|re| (*severity, re)))
        .collect::<Option<Vec<_>>>()?;

    let categories = CATEGORY_RULES
        .iter()
        .map(|(name, keywords, patterns)| {
            let patterns = patterns
                .iter()
                .map(|p| Regex::new(p).ok())
                .collect::<Option<Vec<_>>>()?;
            Some(CategoryRule {
                name: *name,
                keywords: *keywords,
                patterns,
            })
        })
        .collect::<Option<Vec<_>>>()?;

    Some(RuleTables {
        semantic,
        categories,
    })
}

static TABLES: LazyLock<Option<RuleTables>> = LazyLock::new(build_tables);

/// The compiled rule tables, or an error if any rule failed to compile.
pub fn tables() -> Result<&'static RuleTables, ClassificationError> {
    TABLES
        .as_ref()
        .ok_or_else(|| ClassificationError::RulesUnavailable {
            table: "severity/category".to_string(),
        })
}

impl RuleTables {
    /// First semantic family matching the message, most severe family first.
    pub fn semantic_severity(&self, message: &str) -> Option<Severity> {
        self.semantic
            .iter()
            .find(|(_, re)| re.is_match(message))
            .map(|(severity, _)| *severity)
    }

    /// First category whose keywords or regexes match.
    pub fn category(&self, text: &str) -> Option<&'static str> {
        let lower = text.to_lowercase();
        self.categories
            .iter()
            .find(|rule| {
                rule.keywords.iter().any(|k| lower.contains(k))
                    || rule.patterns.iter().any(|re| re.is_match(text))
            })
            .map(|rule| rule.name)
    }
}

/// Highest severity among matching keyword phrases.
pub fn keyword_severity(message: &str) -> Option<Severity> {
    let lower = message.to_lowercase();
    KEYWORD_PHRASES
        .iter()
        .filter(|(phrase, _)| lower.contains(phrase))
        .map(|(_, severity)| *severity)
        .max()
}

/// Severity implied by stack markers and metadata flags, given the original severity.
pub fn contextual_severity(
    original: Severity,
    stack: Option<&str>,
    metadata: &Metadata,
) -> Option<Severity> {
    let mut candidates: Vec<Severity> = Vec::new();

    if let Some(stack) = stack {
        let lower = stack.to_lowercase();
        candidates.extend(
            STACK_MARKERS
                .iter()
                .filter(|(marker, _)| lower.contains(marker))
                .map(|(_, severity)| *severity),
        );
    }

    let module = metadata
        .get("module")
        .and_then(|v| v.as_str())
        .map(str::to_lowercase);
    let sensitive = module
        .as_deref()
        .is_some_and(|m| SENSITIVE_MODULES.contains(&m));
    if original == Severity::Warn && (sensitive || flag(metadata, "user_facing")) {
        candidates.push(Severity::Error);
    }
    if flag(metadata, "security") {
        candidates.push(Severity::Error);
    }
    if flag(metadata, "data_loss") {
        candidates.push(Severity::Critical);
    }

    candidates.into_iter().max()
}

fn flag(metadata: &Metadata, key: &str) -> bool {
    metadata.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
}
