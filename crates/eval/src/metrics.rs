use extract::Field;
use ingest::AbstractRow;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::gate::is_scorable;
use crate::normalizer::normalize_for_field;

/// Per-field scores over the scorable notes that have a truth value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMetrics {
    pub field: Field,
    pub support: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Normalized truth and prediction for one eligible (note, field) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgement {
    pub gt_norm: String,
    pub pred_norm: Option<String>,
}

impl Judgement {
    pub fn is_correct(&self) -> bool {
        self.pred_norm.as_deref() == Some(self.gt_norm.as_str())
    }
}

/// `None` when the pair is not scored: the gate rejects the note, or the
/// normalized truth is absent.
pub fn judge(row: &AbstractRow, field: Field) -> Option<Judgement> {
    if !is_scorable(field, &row.note.note_text) {
        return None;
    }

    let gt_norm = normalize_for_field(field, row.note.ground_truth.get(field))?;
    let pred_norm = normalize_for_field(field, row.predictions.get(field).pred.as_deref());
    Some(Judgement { gt_norm, pred_norm })
}

#[derive(Debug, Default)]
struct Tally {
    tp: usize,
    fp: usize,
    fn_: usize,
}

impl Tally {
    fn record(&mut self, judgement: &Judgement) {
        if judgement.is_correct() {
            self.tp += 1;
        } else if judgement.pred_norm.is_none() {
            self.fn_ += 1;
        } else {
            self.fp += 1;
        }
    }

    fn support(&self) -> usize {
        self.tp + self.fp + self.fn_
    }

    fn into_metrics(self, field: Field) -> FieldMetrics {
        let support = self.support();
        let accuracy = ratio(self.tp, support);
        let precision = ratio(self.tp, self.tp + self.fp);
        let recall = ratio(self.tp, self.tp + self.fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        FieldMetrics {
            field,
            support,
            correct: self.tp,
            accuracy: round3(accuracy),
            precision: round3(precision),
            recall: round3(recall),
            f1: round3(f1),
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Micro-averaged field accuracy, one entry per requested field in order.
pub fn compute_metrics(rows: &[AbstractRow], fields: &[Field]) -> Vec<FieldMetrics> {
    fields
        .iter()
        .map(|&field| {
            let mut tally = Tally::default();
            for judgement in rows.iter().filter_map(|row| judge(row, field)) {
                tally.record(&judgement);
            }
            debug!(%field, tp = tally.tp, fp = tally.fp, fn_ = tally.fn_, "scored field");
            tally.into_metrics(field)
        })
        .collect()
}
