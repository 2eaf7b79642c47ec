use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownField;

/// The registry fields tracked per note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    PrimarySite,
    Histology,
    Stage,
    ErStatus,
    PrStatus,
    #[serde(rename = "her2_status")]
    Her2Status,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::PrimarySite,
        Field::Histology,
        Field::Stage,
        Field::ErStatus,
        Field::PrStatus,
        Field::Her2Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::PrimarySite => "primary_site",
            Field::Histology => "histology",
            Field::Stage => "stage",
            Field::ErStatus => "er_status",
            Field::PrStatus => "pr_status",
            Field::Her2Status => "her2_status",
        }
    }

    pub fn pred_column(&self) -> String {
        format!("{}_pred", self.as_str())
    }

    pub fn evidence_column(&self) -> String {
        format!("{}_evidence", self.as_str())
    }

    pub fn gt_column(&self) -> String {
        format!("{}_gt", self.as_str())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Field::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// A labelled span produced by the external recognizer.
///
/// Every attribute is optional so that a malformed upstream entity can still be
/// carried through; such entities simply never match an extractor predicate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognizedEntity {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub start: Option<usize>,
    #[serde(default)]
    pub end: Option<usize>,
}

impl RecognizedEntity {
    pub fn new(label: &str, text: &str, confidence: f64, start: usize, end: usize) -> Self {
        Self {
            label: Some(label.to_string()),
            text: Some(text.to_string()),
            confidence: Some(confidence),
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn has_label_in(&self, labels: &[String]) -> bool {
        self.label
            .as_deref()
            .is_some_and(|label| labels.iter().any(|l| l == label))
    }

    /// Entity text, empty when the recognizer omitted it.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Confidence in `[0, 1]`; missing or non-finite values count as 0.
    pub fn confidence(&self) -> f64 {
        match self.confidence {
            Some(c) if c.is_finite() => c,
            _ => 0.0,
        }
    }

    /// The entity's span, if it is well formed and lies inside a note of
    /// `char_len` characters.
    pub fn span_within(&self, char_len: usize) -> Option<Span> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start <= end && end <= char_len => {
                Some(Span { start, end })
            }
            _ => None,
        }
    }
}

/// Half-open `[start, end)` character range into a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// One extractor's answer for one note.
///
/// Evidence offsets travel together as a [`Span`], so a half-present pair
/// cannot be built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldPrediction {
    pub value: Option<String>,
    pub evidence: Option<Span>,
}

impl FieldPrediction {
    /// Nothing found: no value and no evidence.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(value: Option<String>, evidence: Span) -> Self {
        Self {
            value,
            evidence: Some(evidence),
        }
    }

    pub fn found(value: impl Into<String>, evidence: Span) -> Self {
        Self::new(Some(value.into()), evidence)
    }

    pub fn evidence_start(&self) -> Option<usize> {
        self.evidence.map(|s| s.start)
    }

    pub fn evidence_end(&self) -> Option<usize> {
        self.evidence.map(|s| s.end)
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.evidence.is_none()
    }
}

/// A prediction paired with its display snippet, as persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOutput {
    pub pred: Option<String>,
    pub evidence: Option<String>,
}

/// The full extraction result for one note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    into = "BTreeMap<String, Option<String>>",
    from = "BTreeMap<String, Value>"
)]
pub struct FieldRecord {
    pub primary_site: FieldOutput,
    pub histology: FieldOutput,
    pub stage: FieldOutput,
    pub er_status: FieldOutput,
    pub pr_status: FieldOutput,
    pub her2_status: FieldOutput,
}

impl FieldRecord {
    pub fn get(&self, field: Field) -> &FieldOutput {
        match field {
            Field::PrimarySite => &self.primary_site,
            Field::Histology => &self.histology,
            Field::Stage => &self.stage,
            Field::ErStatus => &self.er_status,
            Field::PrStatus => &self.pr_status,
            Field::Her2Status => &self.her2_status,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut FieldOutput {
        match field {
            Field::PrimarySite => &mut self.primary_site,
            Field::Histology => &mut self.histology,
            Field::Stage => &mut self.stage,
            Field::ErStatus => &mut self.er_status,
            Field::PrStatus => &mut self.pr_status,
            Field::Her2Status => &mut self.her2_status,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldOutput)> + '_ {
        Field::ALL.into_iter().map(move |field| (field, self.get(field)))
    }

    /// Flat `<field>_pred` / `<field>_evidence` view.
    pub fn to_columns(&self) -> BTreeMap<String, Option<String>> {
        let mut columns = BTreeMap::new();
        for (field, output) in self.iter() {
            columns.insert(field.pred_column(), output.pred.clone());
            columns.insert(field.evidence_column(), output.evidence.clone());
        }
        columns
    }

    /// Rebuild from flat columns; unrelated columns are ignored.
    pub fn from_columns(columns: &BTreeMap<String, Value>) -> Self {
        let mut record = Self::default();
        for field in Field::ALL {
            let output = record.get_mut(field);
            output.pred = columns.get(&field.pred_column()).and_then(column_text);
            output.evidence = columns.get(&field.evidence_column()).and_then(column_text);
        }
        record
    }
}

impl From<FieldRecord> for BTreeMap<String, Option<String>> {
    fn from(record: FieldRecord) -> Self {
        record.to_columns()
    }
}

impl From<BTreeMap<String, Value>> for FieldRecord {
    fn from(columns: BTreeMap<String, Value>) -> Self {
        Self::from_columns(&columns)
    }
}

/// Read a flat column cell as text. Blank strings and nulls are absent;
/// numbers and booleans are stringified.
pub fn column_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
