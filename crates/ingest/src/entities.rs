use extract::RecognizedEntity;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::note::{NoteKey, identifier};

/// One line of the entity source: every entity recognized in one note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    #[serde(deserialize_with = "identifier")]
    pub case_id: String,
    #[serde(deserialize_with = "identifier")]
    pub note_id: String,
    #[serde(default)]
    pub note_type: Option<String>,
    #[serde(default)]
    pub note_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_entities")]
    pub entities: Vec<RecognizedEntity>,
}

impl EntityRecord {
    pub fn key(&self) -> NoteKey {
        NoteKey::new(self.case_id.clone(), self.note_id.clone())
    }
}

/// Confidence floor applied when entities are loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EntityFilter {
    pub min_confidence: Option<f64>,
}

impl EntityFilter {
    pub fn min_confidence(threshold: f64) -> Self {
        Self {
            min_confidence: Some(threshold),
        }
    }

    /// Without a floor everything is kept; with one, entities lacking a
    /// confidence are dropped.
    pub fn keeps(&self, entity: &RecognizedEntity) -> bool {
        match self.min_confidence {
            None => true,
            Some(floor) => entity.confidence.is_some_and(|c| c >= floor),
        }
    }

    pub fn apply(&self, entities: Vec<RecognizedEntity>) -> Vec<RecognizedEntity> {
        entities.into_iter().filter(|e| self.keeps(e)).collect()
    }
}

/// Read an entity from loosely typed JSON; attributes with the wrong shape
/// are dropped instead of failing the record.
pub fn entity_from_value(value: &Value) -> RecognizedEntity {
    let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
    let offset = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
    };

    RecognizedEntity {
        label: text("label"),
        text: text("text"),
        confidence: value.get("confidence").and_then(Value::as_f64),
        start: offset("start"),
        end: offset("end"),
    }
}

fn lenient_entities<'de, D>(deserializer: D) -> Result<Vec<RecognizedEntity>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default().iter().map(entity_from_value).collect())
}
