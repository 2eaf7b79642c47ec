use extract::FieldRecord;
use serde::{Deserialize, Serialize};

use crate::note::Note;

/// A note together with its extracted fields; the persisted pre-abstract row.
///
/// Serialized flat: identity, `note_text`, `<field>_gt`, `<field>_pred` and
/// `<field>_evidence` all sit at the top level of one JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbstractRow {
    #[serde(flatten)]
    pub note: Note,
    #[serde(flatten)]
    pub predictions: FieldRecord,
}

impl AbstractRow {
    pub fn new(note: Note, predictions: FieldRecord) -> Self {
        Self { note, predictions }
    }
}
