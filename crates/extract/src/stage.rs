use regex::{Captures, Match, Regex};
use tracing::debug;

use crate::config::StageConfig;
use crate::error::ExtractError;
use crate::patterns::{self, CONTEXTUAL_STAGE, EXPLICIT_STAGE, TNM};
use crate::schema::{Field, FieldPrediction, RecognizedEntity, Span};
use crate::select::pick_best;
use crate::text::NoteText;
use crate::FieldExtractor;

/// Stage inference. Strategies run in a fixed order and the first hit wins:
///
/// 1. explicit `Stage <code>` phrase in the note text
/// 2. a stage-like entity (`Stage ...`), reduced to its code when possible
/// 3. a TNM string such as `pT3N0M0`, verbatim
/// 4. a roman code directly introduced by `stage`/`stg`
pub struct StageExtractor {
    labels: Vec<String>,
    explicit: Regex,
    tnm: Regex,
    contextual: Regex,
}

impl StageExtractor {
    pub fn new(config: &StageConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            labels: config.entity_labels.clone(),
            explicit: patterns::compile(Field::Stage, EXPLICIT_STAGE, true)?,
            tnm: patterns::compile(Field::Stage, TNM, false)?,
            contextual: patterns::compile(Field::Stage, CONTEXTUAL_STAGE, true)?,
        })
    }

    pub fn infer(&self, note: &NoteText<'_>, entities: &[RecognizedEntity]) -> FieldPrediction {
        let text = note.as_str();

        if let Some((code, whole)) = coded_match(&self.explicit, text, 1, 2) {
            return self.resolved("explicit", code, note.span_of(&whole));
        }

        let len = note.char_len();
        let best = pick_best(
            entities,
            |e| {
                e.has_label_in(&self.labels)
                    && e.span_within(len).is_some()
                    && e.text().trim().to_lowercase().starts_with("stage")
            },
            |e| e.confidence(),
        );
        if let Some((entity, span)) = best.and_then(|e| e.span_within(len).map(|span| (e, span))) {
            let raw = entity.text().trim();
            let code = coded_match(&self.explicit, raw, 1, 2)
                .map(|(code, _)| code)
                .unwrap_or_else(|| raw.to_string());
            return self.resolved("entity", code, span);
        }

        if let Some(m) = self.tnm.find(text) {
            return self.resolved("tnm", m.as_str().to_string(), note.span_of(&m));
        }

        if let Some((code, whole)) = coded_match(&self.contextual, text, 2, 3) {
            return self.resolved("contextual", code, note.span_of(&whole));
        }

        FieldPrediction::empty()
    }

    fn resolved(&self, strategy: &'static str, code: String, span: Span) -> FieldPrediction {
        debug!(strategy, code = %code, "stage resolved");
        FieldPrediction::found(code, span)
    }
}

fn coded_match<'t>(
    re: &Regex,
    text: &'t str,
    code: usize,
    suffix: usize,
) -> Option<(String, Match<'t>)> {
    let caps = re.captures(text)?;
    let whole = caps.get(0)?;
    Some((stage_code(&caps, code, suffix), whole))
}

/// Code group plus optional sub-stage letter, whitespace removed, upper-cased.
fn stage_code(caps: &Captures<'_>, code: usize, suffix: usize) -> String {
    let mut joined = String::new();
    joined.push_str(caps.get(code).map_or("", |m| m.as_str()));
    joined.push_str(caps.get(suffix).map_or("", |m| m.as_str()));
    joined
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

impl FieldExtractor for StageExtractor {
    fn field(&self) -> Field {
        Field::Stage
    }

    fn extract(&self, note: &NoteText<'_>, entities: &[RecognizedEntity]) -> FieldPrediction {
        self.infer(note, entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(text: &str, entities: &[RecognizedEntity]) -> FieldPrediction {
        StageExtractor::new(&StageConfig::default())
            .unwrap()
            .infer(&NoteText::new(text), entities)
    }

    #[test]
    fn test_explicit_stage() {
        let pred = infer("Assessment: Stage IIA breast cancer.", &[]);
        assert_eq!(pred.value.as_deref(), Some("IIA"));
        assert_eq!(pred.evidence, Some(Span::new(12, 21)));
    }

    #[test]
    fn test_colon_and_spaced_suffix() {
        let pred = infer("DIAGNOSIS: stage: ii a.", &[]);
        assert_eq!(pred.value.as_deref(), Some("IIA"));
    }

    #[test]
    fn test_arabic_stage() {
        let pred = infer("Clinical stage 3 disease.", &[]);
        assert_eq!(pred.value.as_deref(), Some("3"));
    }

    #[test]
    fn test_suffix_not_taken_from_next_word() {
        let pred = infer("Stage IV bone metastases.", &[]);
        assert_eq!(pred.value.as_deref(), Some("IV"));
    }

    #[test]
    fn test_tnm_fallback() {
        let pred = infer("Path: pT3N0M0 noted in the report.", &[]);
        assert_eq!(pred.value.as_deref().map(str::to_lowercase).as_deref(), Some("pt3n0m0"));
        assert_eq!(pred.value.as_deref(), Some("pT3N0M0"));
        assert_eq!(pred.evidence, Some(Span::new(6, 13)));
    }

    #[test]
    fn test_entity_beats_tnm() {
        let text = "Tumor board: Stage: pending review; pT3N1M0.";
        let entities = vec![RecognizedEntity::new("Cancer", "Stage: pending review", 0.8, 13, 34)];
        let pred = infer(text, &entities);

        // no code in the entity text, so its raw text is the value
        assert_eq!(pred.value.as_deref(), Some("Stage: pending review"));
        assert_eq!(pred.evidence, Some(Span::new(13, 34)));
    }

    #[test]
    fn test_entity_code_is_extracted() {
        // no word boundary after "Stage", so the explicit phrase misses the note
        let text = "Known StageIIB carcinoma.";
        let entities = vec![
            RecognizedEntity::new("Cancer", "Stage IIB", 0.9, 6, 14),
            RecognizedEntity::new("Organ", "Stage I", 0.99, 6, 11),
        ];
        let pred = infer(text, &entities);
        assert_eq!(pred.value.as_deref(), Some("IIB"));
        assert_eq!(pred.evidence, Some(Span::new(6, 14)));
    }

    #[test]
    fn test_contextual_stg() {
        let pred = infer("Dx: breast ca, stg IIIA per onc.", &[]);
        assert_eq!(pred.value.as_deref(), Some("IIIA"));
    }

    #[test]
    fn test_ignores_stray_roman_numerals() {
        let pred = infer("Section II: plan. Page IV of V.", &[]);
        assert!(pred.is_empty());
    }
}
