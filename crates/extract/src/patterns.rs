use regex::{Regex, RegexBuilder};

use crate::error::ExtractError;
use crate::schema::Field;

/// `stage` keyword followed by an arabic or roman code and optional A/B.
pub const EXPLICIT_STAGE: &str = r"\bstage\b\s*[:\-]?\s*([0-9]{1,2}|[IVX]{1,4})(\s*[AB])?\b";

/// TNM shorthand such as `pT3N0M0`.
pub const TNM: &str = r"\bp?[Tt]\d+[Nn]\d+M\d+\b";

/// Roman stage code that must be introduced by `stage` or `stg`.
pub const CONTEXTUAL_STAGE: &str = r"(stage|stg)\s*[:\-]?\s*([IVX]{1,4})(\s*[AB])?\b";

pub(crate) fn compile(
    field: Field,
    pattern: &str,
    case_insensitive: bool,
) -> Result<Regex, ExtractError> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source| ExtractError::InvalidPattern {
            field,
            pattern: pattern.to_string(),
            source,
        })
}

/// Case-insensitive matcher for a literal phrase.
pub(crate) fn literal(field: Field, phrase: &str) -> Result<Regex, ExtractError> {
    compile(field, &regex::escape(phrase), true)
}

/// Case-insensitive matcher for any of several regex alternatives.
pub(crate) fn any_of(field: Field, alternatives: &[String]) -> Result<Regex, ExtractError> {
    if alternatives.is_empty() {
        return Err(ExtractError::EmptyPatterns(field));
    }
    let joined = alternatives
        .iter()
        .map(|alt| format!("(?:{})", alt))
        .collect::<Vec<_>>()
        .join("|");
    compile(field, &joined, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pattern_reports_field() {
        let err = any_of(Field::ErStatus, &["(unclosed".to_string()]).unwrap_err();
        assert!(err.to_string().contains("er_status"));
    }

    #[test]
    fn test_empty_alternatives_rejected() {
        assert!(matches!(
            any_of(Field::PrStatus, &[]),
            Err(ExtractError::EmptyPatterns(Field::PrStatus))
        ));
    }

    #[test]
    fn test_literal_escapes_metacharacters() {
        let re = literal(Field::PrimarySite, "lung (rul)").unwrap();
        assert!(re.is_match("LUNG (RUL) mass"));
        assert!(!re.is_match("lung rul"));
    }
}
