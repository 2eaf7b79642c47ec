use regex::Regex;

use crate::config::BiomarkerConfig;
use crate::error::ExtractError;
use crate::patterns;
use crate::schema::{Field, FieldPrediction, RecognizedEntity};
use crate::text::NoteText;
use crate::FieldExtractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiomarkerStatus {
    Positive,
    Negative,
}

impl BiomarkerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BiomarkerStatus::Positive => "positive",
            BiomarkerStatus::Negative => "negative",
        }
    }

    /// Whichever polarity word occurs first in `window`.
    pub fn first_in(window: &str) -> Option<Self> {
        let lower = window.to_lowercase();
        match (lower.find("positive"), lower.find("negative")) {
            (Some(pos), Some(neg)) if neg < pos => Some(BiomarkerStatus::Negative),
            (Some(_), _) => Some(BiomarkerStatus::Positive),
            (None, Some(_)) => Some(BiomarkerStatus::Negative),
            (None, None) => None,
        }
    }
}

/// Receptor status read from the text just after the first marker mention.
///
/// Only text after the marker is inspected, so the polarity of a marker
/// mentioned just before (e.g. "ER negative, PR positive") does not leak.
pub struct BiomarkerExtractor {
    field: Field,
    marker: Regex,
    window_chars: usize,
}

impl BiomarkerExtractor {
    pub fn new(
        field: Field,
        markers: &[String],
        window_chars: usize,
    ) -> Result<Self, ExtractError> {
        Ok(Self {
            field,
            marker: patterns::any_of(field, markers)?,
            window_chars,
        })
    }

    pub fn er(config: &BiomarkerConfig) -> Result<Self, ExtractError> {
        Self::new(Field::ErStatus, &config.er_markers, config.window_chars)
    }

    pub fn pr(config: &BiomarkerConfig) -> Result<Self, ExtractError> {
        Self::new(Field::PrStatus, &config.pr_markers, config.window_chars)
    }

    pub fn her2(config: &BiomarkerConfig) -> Result<Self, ExtractError> {
        Self::new(Field::Her2Status, &config.her2_markers, config.window_chars)
    }

    /// The evidence span is the marker mention itself and is kept even when
    /// no polarity word follows, so reviewers can see why status is unknown.
    pub fn infer(&self, note: &NoteText<'_>) -> FieldPrediction {
        let Some(m) = self.marker.find(note.as_str()) else {
            return FieldPrediction::empty();
        };
        let span = note.span_of(&m);
        let window = note.window_after(span.end, self.window_chars);
        let status = BiomarkerStatus::first_in(window);

        FieldPrediction::new(status.map(|s| s.as_str().to_string()), span)
    }
}

impl FieldExtractor for BiomarkerExtractor {
    fn field(&self) -> Field {
        self.field
    }

    fn extract(&self, note: &NoteText<'_>, _entities: &[RecognizedEntity]) -> FieldPrediction {
        self.infer(note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Span;

    fn config() -> BiomarkerConfig {
        BiomarkerConfig::default()
    }

    #[test]
    fn test_status_after_marker() {
        let note = NoteText::new("Receptors: ER positive (90%), PR negative, HER2 1+ negative.");

        let er = BiomarkerExtractor::er(&config()).unwrap().infer(&note);
        assert_eq!(er.value.as_deref(), Some("positive"));
        assert_eq!(er.evidence, Some(Span::new(11, 13)));

        let pr = BiomarkerExtractor::pr(&config()).unwrap().infer(&note);
        assert_eq!(pr.value.as_deref(), Some("negative"));

        let her2 = BiomarkerExtractor::her2(&config()).unwrap().infer(&note);
        assert_eq!(her2.value.as_deref(), Some("negative"));
    }

    #[test]
    fn test_does_not_look_before_marker() {
        // "negative" belongs to ER; PR has no polarity after it
        let note = NoteText::new("ER negative. PR pending.");
        let pr = BiomarkerExtractor::pr(&config()).unwrap().infer(&note);

        assert_eq!(pr.value, None);
        assert_eq!(pr.evidence, Some(Span::new(13, 15)));
    }

    #[test]
    fn test_long_form_marker() {
        let note = NoteText::new("Estrogen receptor: strongly POSITIVE in 95% of cells.");
        let er = BiomarkerExtractor::er(&config()).unwrap().infer(&note);

        assert_eq!(er.value.as_deref(), Some("positive"));
        assert_eq!(er.evidence, Some(Span::new(0, 17)));
    }

    #[test]
    fn test_window_limit() {
        let text = format!("HER2 {} negative", "x".repeat(130));
        let her2 = BiomarkerExtractor::her2(&config()).unwrap().infer(&NoteText::new(&text));
        assert_eq!(her2.value, None);
        assert!(her2.evidence.is_some());
    }

    #[test]
    fn test_marker_must_be_a_word() {
        // "her" and "PRN" are not markers
        let note = NoteText::new("Gave her tylenol PRN, negative for fever.");
        assert!(BiomarkerExtractor::er(&config()).unwrap().infer(&note).is_empty());
        assert!(BiomarkerExtractor::pr(&config()).unwrap().infer(&note).is_empty());
    }

    #[test]
    fn test_first_polarity_wins() {
        assert_eq!(
            BiomarkerStatus::first_in(" weakly positive; previously negative"),
            Some(BiomarkerStatus::Positive)
        );
        assert_eq!(
            BiomarkerStatus::first_in(": negative (was positive)"),
            Some(BiomarkerStatus::Negative)
        );
        assert_eq!(BiomarkerStatus::first_in("equivocal"), None);
    }
}
