//! ClassificationService: severity resolution, categorization, tagging, dedup.

use faultline_core::config::ClassificationConfig;
use faultline_core::constants::{CATEGORY_KEY, DEFAULT_CATEGORY, DUPLICATE_KEY, MODULE_KEY};
use faultline_core::errors::FaultlineResult;
use faultline_core::time;
use faultline_core::{ErrorInput, ErrorRecord, Metadata, Severity};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::{CachedClassification, ClassificationCache};
use crate::dedup::DuplicateWindow;
use crate::rules;
use crate::similarity;

/// Result of classifying one raw input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub severity: Severity,
    pub category: String,
    pub tags: Vec<String>,
    pub duplicate: bool,
    /// The resolved severity is higher than the caller-supplied one.
    pub escalated: bool,
    pub content_hash: String,
}

impl Classification {
    /// Apply this classification to the raw input, producing a buffer record.
    pub fn apply(&self, input: &ErrorInput) -> ErrorRecord {
        let mut record = ErrorRecord::from_input(input);
        record.severity = self.severity;
        record
            .metadata
            .insert(CATEGORY_KEY.to_string(), self.category.clone().into());
        if self.duplicate {
            record
                .metadata
                .insert(DUPLICATE_KEY.to_string(), true.into());
        }
        record.tags = self.tags.clone();
        record
    }
}

/// Running classification counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationStats {
    pub classified: u64,
    pub escalated: u64,
    pub duplicates: u64,
    pub fallbacks: u64,
    pub cache_entries: usize,
}

/// Classifies raw errors. Never fails: internal errors degrade to the caller's values.
#[derive(Debug)]
pub struct ClassificationService {
    config: ClassificationConfig,
    cache: ClassificationCache,
    window: DuplicateWindow,
    stats: ClassificationStats,
}

impl ClassificationService {
    pub fn new(config: ClassificationConfig) -> Self {
        let cache = ClassificationCache::new(config.cache_max_entries);
        let window = DuplicateWindow::new(
            time::secs_to_ms(config.duplicate_window_secs),
            config.similarity_threshold,
        );
        Self {
            config,
            cache,
            window,
            stats: ClassificationStats::default(),
        }
    }

    pub fn config(&self) -> &ClassificationConfig {
        &self.config
    }

    /// Resolve the final severity of an error.
    ///
    /// Combines the original, semantic, contextual and keyword candidates and keeps
    /// the highest weight; ties keep the original.
    pub fn classify(
        &mut self,
        original: Severity,
        message: &str,
        metadata: &Metadata,
        stack: Option<&str>,
    ) -> Severity {
        match resolve_severity(original, message, metadata, stack) {
            Ok(severity) => {
                self.stats.classified += 1;
                if severity > original {
                    self.stats.escalated += 1;
                    debug!(from = %original, to = %severity, "severity escalated");
                }
                let hash = similarity::content_hash(&[message, stack.unwrap_or_default()]);
                let category = self.category_or_default(message, metadata);
                self.cache.insert(
                    hash,
                    CachedClassification {
                        severity,
                        category,
                        cached_at: time::now_ms(),
                    },
                );
                severity
            }
            Err(e) => {
                self.stats.fallbacks += 1;
                warn!(error = %e, "classification failed, keeping original severity");
                original
            }
        }
    }

    /// Resolve the category: explicit `metadata.category`, then the first matching rule,
    /// then `"general"`.
    pub fn classify_category(&mut self, message: &str, metadata: &Metadata) -> String {
        if let Some(explicit) = metadata
            .get(CATEGORY_KEY)
            .and_then(|v| v.as_str())
            .filter(|c| !c.is_empty())
        {
            return explicit.to_string();
        }
        match resolve_category(message, metadata) {
            Ok(category) => category,
            Err(e) => {
                self.stats.fallbacks += 1;
                warn!(error = %e, "categorization failed, using default category");
                DEFAULT_CATEGORY.to_string()
            }
        }
    }

    fn category_or_default(&self, message: &str, metadata: &Metadata) -> String {
        metadata
            .get(CATEGORY_KEY)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .or_else(|| resolve_category(message, metadata).ok())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
    }

    /// Whether `message` duplicates one seen within the duplicate window.
    pub fn is_duplicate(&mut self, message: &str, _metadata: &Metadata, now_ms: i64) -> bool {
        let duplicate = self.window.check(message, now_ms);
        if duplicate {
            self.stats.duplicates += 1;
        }
        duplicate
    }

    /// Classify a raw input: severity, category, duplicate status and tags.
    pub fn classify_input(&mut self, input: &ErrorInput, now_ms: i64) -> Classification {
        let module = input.resolved_module();
        let mut metadata = input.metadata.clone();
        metadata
            .entry(MODULE_KEY.to_string())
            .or_insert_with(|| module.clone().into());

        let stack = input.stack.as_deref();
        let severity = self.classify(input.severity, &input.message, &metadata, stack);
        let category = self.classify_category(&input.message, &metadata);
        let at = input.timestamp.unwrap_or(now_ms);
        let duplicate = self.is_duplicate(&input.message, &metadata, at);
        let escalated = severity > input.severity;

        let mut tags = vec![
            format!("severity:{severity}"),
            format!("category:{category}"),
            format!("module:{module}"),
        ];
        if escalated {
            tags.push("escalated".to_string());
        }
        if stack.is_some() {
            tags.push("has-stack".to_string());
        }
        if duplicate {
            tags.push("duplicate".to_string());
        }

        Classification {
            severity,
            category,
            tags,
            duplicate,
            escalated,
            content_hash: similarity::content_hash(&[&input.message, stack.unwrap_or_default()]),
        }
    }

    /// Look up an earlier classification by content hash.
    pub fn cached(&self, hash: &str) -> Option<&CachedClassification> {
        self.cache.get(hash)
    }

    pub fn stats(&self) -> ClassificationStats {
        ClassificationStats {
            cache_entries: self.cache.len(),
            ..self.stats.clone()
        }
    }
}

fn resolve_severity(
    original: Severity,
    message: &str,
    metadata: &Metadata,
    stack: Option<&str>,
) -> FaultlineResult<Severity> {
    let tables = rules::tables()?;
    let candidates = [
        tables.semantic_severity(message),
        rules::contextual_severity(original, stack, metadata),
        rules::keyword_severity(message),
    ];
    Ok(candidates
        .into_iter()
        .flatten()
        .fold(original, |best, candidate| {
            if candidate.weight() > best.weight() {
                candidate
            } else {
                best
            }
        }))
}

fn resolve_category(message: &str, metadata: &Metadata) -> FaultlineResult<String> {
    let tables = rules::tables()?;
    let source = metadata
        .get("source")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let text = if source.is_empty() {
        message.to_string()
    } else {
        format!("{message} {source}")
    };
    Ok(tables
        .category(&text)
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string())
}
