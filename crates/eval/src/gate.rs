use extract::Field;
use regex::Regex;
use std::sync::LazyLock;

static STG_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bstg\b").unwrap());
static TNM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bp?t\d+n\d+m\d+\b").unwrap());

/// Whether a (truth, prediction) pair for `field` on this note may be scored.
///
/// Stage is only scored when the note itself carries a stage or TNM mention;
/// every other field is always scorable.
pub fn is_scorable(field: Field, note_text: &str) -> bool {
    match field {
        Field::Stage => has_stage_signal(note_text),
        Field::PrimarySite
        | Field::Histology
        | Field::ErStatus
        | Field::PrStatus
        | Field::Her2Status => true,
    }
}

pub fn has_stage_signal(note_text: &str) -> bool {
    note_text.to_lowercase().contains("stage")
        || STG_TOKEN.is_match(note_text)
        || TNM.is_match(note_text)
}
