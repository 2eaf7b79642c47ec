use regex::Regex;
use tracing::debug;

use crate::config::SiteConfig;
use crate::error::ExtractError;
use crate::patterns;
use crate::schema::{Field, FieldPrediction, RecognizedEntity};
use crate::select::pick_best;
use crate::text::NoteText;
use crate::FieldExtractor;

struct SiteKeyword {
    term: String,
    matcher: Regex,
}

/// Primary site: best site-bearing entity, else the first keyword found in
/// the note (keyword order, not text order).
pub struct SiteExtractor {
    labels: Vec<String>,
    keywords: Vec<SiteKeyword>,
}

impl SiteExtractor {
    pub fn new(config: &SiteConfig) -> Result<Self, ExtractError> {
        let keywords = config
            .keywords
            .iter()
            .map(|kw| {
                let term = kw.trim().to_lowercase();
                let matcher = patterns::literal(Field::PrimarySite, &term)?;
                Ok(SiteKeyword { term, matcher })
            })
            .collect::<Result<Vec<_>, ExtractError>>()?;

        Ok(Self {
            labels: config.entity_labels.clone(),
            keywords,
        })
    }

    fn mentions_site(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.keywords.iter().any(|kw| lower.contains(&kw.term))
    }

    pub fn infer(&self, note: &NoteText<'_>, entities: &[RecognizedEntity]) -> FieldPrediction {
        let len = note.char_len();
        let best = pick_best(
            entities,
            |e| {
                e.has_label_in(&self.labels)
                    && e.span_within(len).is_some()
                    && self.mentions_site(e.text())
            },
            |e| e.confidence(),
        );

        if let Some((entity, span)) = best.and_then(|e| e.span_within(len).map(|span| (e, span))) {
            return FieldPrediction::found(entity.text(), span);
        }

        for kw in &self.keywords {
            if let Some(m) = kw.matcher.find(note.as_str()) {
                debug!(keyword = %kw.term, "primary site from text fallback");
                return FieldPrediction::found(kw.term.clone(), note.span_of(&m));
            }
        }

        FieldPrediction::empty()
    }
}

impl FieldExtractor for SiteExtractor {
    fn field(&self) -> Field {
        Field::PrimarySite
    }

    fn extract(&self, note: &NoteText<'_>, entities: &[RecognizedEntity]) -> FieldPrediction {
        self.infer(note, entities)
    }
}
