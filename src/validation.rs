//! Artifact name and type validation.

/// Rule summary shown whenever a name is rejected.
pub const NAME_SUGGESTION: &str =
    "must be lower-kebab-case, start with a letter, and be >= 3 characters";

const MIN_NAME_LEN: usize = 3;

/// Outcome of a validation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub suggestion: &'static str,
}

/// Check an artifact name against the lower-kebab-case rules.
///
/// Total over all strings: empty, unicode and control characters simply
/// come back invalid. The suggestion is the same whichever rule failed.
pub fn validate_name(candidate: &str) -> ValidationResult {
    let bytes = candidate.as_bytes();

    let valid = bytes.len() >= MIN_NAME_LEN
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        && !candidate.contains("--")
        && !candidate.ends_with('-')
        && bytes.first().is_some_and(u8::is_ascii_lowercase);

    ValidationResult {
        valid,
        suggestion: NAME_SUGGESTION,
    }
}

/// Whether `candidate` is exactly one of the declared type tags.
pub fn validate_type(candidate: &str, tags: &[&str]) -> bool {
    tags.contains(&candidate)
}
