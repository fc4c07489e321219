//! Message normalization for grouping near-identical messages.

use std::sync::LazyLock;

use faultline_core::errors::AnalysisError;
use regex::Regex;

pub const NUMBER_PLACEHOLDER: &str = "<N>";

struct Patterns {
    punctuation: Regex,
    number: Regex,
    whitespace: Regex,
}

static PATTERNS: LazyLock<Option<Patterns>> = LazyLock::new(|| {
    Some(Patterns {
        punctuation: Regex::new(r"[^\p{L}\p{N}\s]+").ok()?,
        number: Regex::new(r"\d+").ok()?,
        whitespace: Regex::new(r"\s+").ok()?,
    })
});

/// Case-fold, strip punctuation, replace digit runs with `<N>`, collapse whitespace.
pub fn normalize(message: &str) -> Result<String, AnalysisError> {
    let p = PATTERNS.as_ref().ok_or_else(|| AnalysisError::RulesUnavailable {
        reason: "message normalization patterns failed to compile".to_string(),
    })?;
    let lower = message.to_lowercase();
    let stripped = p.punctuation.replace_all(&lower, " ");
    let numbered = p.number.replace_all(&stripped, NUMBER_PLACEHOLDER);
    Ok(p.whitespace.replace_all(numbered.trim(), " ").into_owned())
}

/// blake3 hex digest of a normalized message.
pub fn message_hash(normalized: &str) -> String {
    blake3::hash(normalized.as_bytes()).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_case_and_punctuation_are_normalized() {
        assert_eq!(
            normalize("Timeout after 3000ms (attempt #4)!").unwrap(),
            "timeout after <N>ms attempt <N>"
        );
        assert_eq!(
            normalize("User 17 not found").unwrap(),
            normalize("user 923: NOT found.").unwrap()
        );
    }
}
