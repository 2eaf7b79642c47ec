use extract::{FieldMapper, is_traceable};
use ingest::{AbstractRow, EntityRecord, Note, NoteKey, entities_for};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{info, warn};

/// Map one note to its persisted row.
pub fn map_note(
    note: Note,
    entities: &HashMap<NoteKey, EntityRecord>,
    mapper: &FieldMapper,
) -> AbstractRow {
    let key = note.key();
    let predictions = mapper.map_note_to_fields(&note.note_text, entities_for(entities, &key));

    for (field, output) in predictions.iter() {
        if let Some(snippet) = output.evidence.as_deref() {
            if !is_traceable(snippet, &note.note_text) {
                warn!(
                    case_id = %key.case_id,
                    note_id = %key.note_id,
                    %field,
                    "evidence snippet not found in note text"
                );
            }
        }
    }

    AbstractRow::new(note, predictions)
}

/// Map every note; rows come back in corpus order whether or not the work
/// is spread across threads.
pub fn generate_rows(
    notes: Vec<Note>,
    entities: &HashMap<NoteKey, EntityRecord>,
    mapper: &FieldMapper,
    parallel: bool,
) -> Vec<AbstractRow> {
    let without_entities = notes
        .iter()
        .filter(|note| !entities.contains_key(&note.key()))
        .count();
    if without_entities > 0 {
        info!("{} notes have no entity record", without_entities);
    }

    if parallel {
        notes
            .into_par_iter()
            .map(|note| map_note(note, entities, mapper))
            .collect()
    } else {
        notes
            .into_iter()
            .map(|note| map_note(note, entities, mapper))
            .collect()
    }
}
