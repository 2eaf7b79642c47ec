pub mod entities;
pub mod note;
pub mod reader;
pub mod row;

pub use entities::{EntityFilter, EntityRecord, entity_from_value};
pub use note::{GroundTruth, Note, NoteKey};
pub use reader::FileReader;
pub use row::AbstractRow;

use anyhow::Result;
use extract::RecognizedEntity;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Load the note corpus.
pub async fn load_notes(path: &Path) -> Result<Vec<Note>> {
    let notes: Vec<Note> = FileReader::read_jsonl(path).await?;
    info!("Loaded {} notes from {:?}", notes.len(), path);
    Ok(notes)
}

/// Load recognized entities keyed by note, applying `filter` to each record.
///
/// A key seen twice keeps the later record.
pub async fn load_entities_map(
    path: &Path,
    filter: &EntityFilter,
) -> Result<HashMap<NoteKey, EntityRecord>> {
    let records: Vec<EntityRecord> = FileReader::read_jsonl(path).await?;
    let mut map = HashMap::with_capacity(records.len());
    let mut dropped = 0;

    for mut record in records {
        let before = record.entities.len();
        record.entities = filter.apply(record.entities);
        dropped += before - record.entities.len();

        let key = record.key();
        if map.insert(key.clone(), record).is_some() {
            warn!(
                case_id = %key.case_id,
                note_id = %key.note_id,
                "duplicate entity record, keeping the later one"
            );
        }
    }

    info!(
        "Loaded entities for {} notes from {:?} ({} below confidence floor)",
        map.len(),
        path,
        dropped
    );
    Ok(map)
}

/// Entities for one note; a note without a record has none.
pub fn entities_for<'a>(
    map: &'a HashMap<NoteKey, EntityRecord>,
    key: &NoteKey,
) -> &'a [RecognizedEntity] {
    map.get(key).map(|r| r.entities.as_slice()).unwrap_or(&[])
}

pub async fn write_rows(path: &Path, rows: &[AbstractRow]) -> Result<()> {
    FileReader::write_jsonl(path, rows).await?;
    info!("Wrote {} rows to {:?}", rows.len(), path);
    Ok(())
}

pub async fn read_rows(path: &Path) -> Result<Vec<AbstractRow>> {
    let rows: Vec<AbstractRow> = FileReader::read_jsonl(path).await?;
    info!("Loaded {} rows from {:?}", rows.len(), path);
    Ok(rows)
}
