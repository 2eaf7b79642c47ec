use regex::Regex;
use tracing::debug;

use crate::config::HistologyConfig;
use crate::error::ExtractError;
use crate::patterns;
use crate::schema::{Field, FieldPrediction, RecognizedEntity};
use crate::select::pick_best;
use crate::text::NoteText;
use crate::FieldExtractor;

pub struct HistologyExtractor {
    labels: Vec<String>,
    terms: Vec<String>,
    /// `<word> <term>` anywhere in the note.
    phrase: Regex,
}

impl HistologyExtractor {
    pub fn new(config: &HistologyConfig) -> Result<Self, ExtractError> {
        if config.terms.is_empty() {
            return Err(ExtractError::EmptyPatterns(Field::Histology));
        }
        let terms: Vec<String> = config.terms.iter().map(|t| t.trim().to_lowercase()).collect();
        let alternation = terms
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let phrase = patterns::compile(
            Field::Histology,
            &format!(r"\b(\w+\s+({}))\b", alternation),
            true,
        )?;

        Ok(Self {
            labels: config.entity_labels.clone(),
            terms,
            phrase,
        })
    }

    fn names_histology(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.terms.iter().any(|t| lower.contains(t.as_str()))
    }

    pub fn infer(&self, note: &NoteText<'_>, entities: &[RecognizedEntity]) -> FieldPrediction {
        let len = note.char_len();
        let best = pick_best(
            entities,
            |e| {
                e.has_label_in(&self.labels)
                    && e.span_within(len).is_some()
                    && self.names_histology(e.text())
            },
            |e| e.confidence(),
        );
        if let Some((entity, span)) = best.and_then(|e| e.span_within(len).map(|span| (e, span))) {
            return FieldPrediction::found(entity.text(), span);
        }

        match self.phrase.find(note.as_str()) {
            Some(m) => {
                debug!(phrase = m.as_str(), "histology from text fallback");
                FieldPrediction::found(m.as_str(), note.span_of(&m))
            }
            None => FieldPrediction::empty(),
        }
    }
}

impl FieldExtractor for HistologyExtractor {
    fn field(&self) -> Field {
        Field::Histology
    }

    fn extract(&self, note: &NoteText<'_>, entities: &[RecognizedEntity]) -> FieldPrediction {
        self.infer(note, entities)
    }
}
