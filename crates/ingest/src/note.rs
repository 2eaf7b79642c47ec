use extract::Field;
use extract::schema::column_text;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Identity of a note across the corpus, the entity source and the rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteKey {
    pub case_id: String,
    pub note_id: String,
}

impl NoteKey {
    pub fn new(case_id: impl Into<String>, note_id: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            note_id: note_id.into(),
        }
    }
}

/// A clinical note with its externally supplied truth values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(deserialize_with = "identifier")]
    pub case_id: String,
    #[serde(deserialize_with = "identifier")]
    pub note_id: String,
    #[serde(default)]
    pub note_type: Option<String>,
    #[serde(default)]
    pub note_date: Option<String>,
    pub note_text: String,
    #[serde(flatten)]
    pub ground_truth: GroundTruth,
}

impl Note {
    pub fn key(&self) -> NoteKey {
        NoteKey::new(self.case_id.clone(), self.note_id.clone())
    }
}

/// Raw truth value per field, read from `<field>_gt` columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    into = "BTreeMap<String, Option<String>>",
    from = "BTreeMap<String, Value>"
)]
pub struct GroundTruth {
    values: BTreeMap<Field, String>,
}

impl GroundTruth {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }
}

impl From<GroundTruth> for BTreeMap<String, Option<String>> {
    fn from(truth: GroundTruth) -> Self {
        Field::ALL
            .into_iter()
            .map(|field| (field.gt_column(), truth.get(field).map(str::to_string)))
            .collect()
    }
}

impl From<BTreeMap<String, Value>> for GroundTruth {
    fn from(columns: BTreeMap<String, Value>) -> Self {
        let values = Field::ALL
            .into_iter()
            .filter_map(|field| {
                let value = columns.get(&field.gt_column()).and_then(column_text)?;
                Some((field, value))
            })
            .collect();
        Self { values }
    }
}

/// Ids may arrive as strings or numbers; both become text.
pub(crate) fn identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    column_text(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid identifier: {}", value)))
}
