pub mod biomarker;
pub mod config;
pub mod error;
pub mod evidence;
pub mod histology;
pub mod patterns;
pub mod schema;
pub mod select;
pub mod site;
pub mod stage;
pub mod text;

pub use biomarker::{BiomarkerExtractor, BiomarkerStatus};
pub use config::{
    BiomarkerConfig, EvidenceConfig, ExtractorConfig, HistologyConfig, SiteConfig, StageConfig,
};
pub use error::{ExtractError, UnknownField};
pub use evidence::{EvidenceResolver, collapse_whitespace, is_traceable};
pub use histology::HistologyExtractor;
pub use schema::{Field, FieldOutput, FieldPrediction, FieldRecord, RecognizedEntity, Span};
pub use select::pick_best;
pub use site::SiteExtractor;
pub use stage::StageExtractor;
pub use text::NoteText;

use tracing::debug;

/// One field's inference rule. Implementations are pure: they never fail and
/// return [`FieldPrediction::empty`] when the note offers no evidence.
pub trait FieldExtractor: Send + Sync {
    fn field(&self) -> Field;

    fn extract(&self, note: &NoteText<'_>, entities: &[RecognizedEntity]) -> FieldPrediction;
}

/// Runs all six extractors over a note and attaches evidence snippets.
///
/// Owns every compiled matcher; build it once and share it across threads.
pub struct FieldMapper {
    site: SiteExtractor,
    histology: HistologyExtractor,
    stage: StageExtractor,
    er: BiomarkerExtractor,
    pr: BiomarkerExtractor,
    her2: BiomarkerExtractor,
    evidence: EvidenceResolver,
}

impl FieldMapper {
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            site: SiteExtractor::new(&config.site)?,
            histology: HistologyExtractor::new(&config.histology)?,
            stage: StageExtractor::new(&config.stage)?,
            er: BiomarkerExtractor::er(&config.biomarkers)?,
            pr: BiomarkerExtractor::pr(&config.biomarkers)?,
            her2: BiomarkerExtractor::her2(&config.biomarkers)?,
            evidence: EvidenceResolver::new(config.evidence),
        })
    }

    pub fn with_defaults() -> Result<Self, ExtractError> {
        Self::new(&ExtractorConfig::default())
    }

    pub fn extractors(&self) -> [&dyn FieldExtractor; 6] {
        [
            &self.site,
            &self.histology,
            &self.stage,
            &self.er,
            &self.pr,
            &self.her2,
        ]
    }

    /// Raw predictions, in [`Field::ALL`] order.
    pub fn predict(
        &self,
        note_text: &str,
        entities: &[RecognizedEntity],
    ) -> Vec<(Field, FieldPrediction)> {
        let note = NoteText::new(note_text);
        self.extractors()
            .iter()
            .map(|extractor| (extractor.field(), extractor.extract(&note, entities)))
            .collect()
    }

    /// Predicted value and evidence snippet for every field of one note.
    pub fn map_note_to_fields(
        &self,
        note_text: &str,
        entities: &[RecognizedEntity],
    ) -> FieldRecord {
        let note = NoteText::new(note_text);
        let mut record = FieldRecord::default();

        for extractor in self.extractors() {
            let prediction = extractor.extract(&note, entities);
            let output = record.get_mut(extractor.field());
            output.evidence = self.evidence.snippet(&note, &prediction);
            output.pred = prediction.value;
        }

        debug!(
            entities = entities.len(),
            filled = record.iter().filter(|(_, o)| o.pred.is_some()).count(),
            "mapped note"
        );
        record
    }
}
