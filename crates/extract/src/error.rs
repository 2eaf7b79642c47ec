use thiserror::Error;

use crate::schema::Field;

/// Errors raised while compiling an [`ExtractorConfig`](crate::ExtractorConfig)
/// into matchers. Extraction itself never fails.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid {field} pattern {pattern:?}: {source}")]
    InvalidPattern {
        field: Field,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("no patterns configured for {0}")]
    EmptyPatterns(Field),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field: {0}")]
pub struct UnknownField(pub String);
