use anyhow::{Context, Result};
use extract::Field;
use ingest::{AbstractRow, FileReader};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::metrics::{FieldMetrics, judge};

pub const METRICS_FILE: &str = "eval_metrics.json";
pub const ERRORS_FILE: &str = "eval_errors.jsonl";
pub const SUMMARY_FILE: &str = "EVALUATION.md";

/// One scorable (note, field) pair whose normalized values disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub case_id: String,
    pub note_id: String,
    pub note_type: Option<String>,
    pub note_date: Option<String>,
    pub field: Field,
    pub gt_value_raw: Option<String>,
    pub pred_value_raw: Option<String>,
    pub gt_value_norm: String,
    pub pred_value_norm: Option<String>,
    pub evidence: Option<String>,
}

/// Mismatches in row order, fields in the order given.
pub fn generate_error_report(rows: &[AbstractRow], fields: &[Field]) -> Vec<ErrorRecord> {
    let mut errors = Vec::new();

    for row in rows {
        for &field in fields {
            let Some(judgement) = judge(row, field) else {
                continue;
            };
            if judgement.is_correct() {
                continue;
            }

            let output = row.predictions.get(field);
            errors.push(ErrorRecord {
                case_id: row.note.case_id.clone(),
                note_id: row.note.note_id.clone(),
                note_type: row.note.note_type.clone(),
                note_date: row.note.note_date.clone(),
                field,
                gt_value_raw: row.note.ground_truth.get(field).map(str::to_string),
                pred_value_raw: output.pred.clone(),
                gt_value_norm: judgement.gt_norm,
                pred_value_norm: judgement.pred_norm,
                evidence: output.evidence.clone(),
            });
        }
    }

    errors
}

/// Markdown table of per-field scores.
pub fn render_metrics_table(metrics: &[FieldMetrics]) -> String {
    let mut table = String::from(
        "| Field | Support | Correct | Accuracy | Precision | Recall | F1 |\n\
         |-------|---------|---------|----------|-----------|--------|----|\n",
    );
    for m in metrics {
        table.push_str(&format!(
            "| {} | {} | {} | {:.3} | {:.3} | {:.3} | {:.3} |\n",
            m.field, m.support, m.correct, m.accuracy, m.precision, m.recall, m.f1
        ));
    }
    table
}

fn render_summary(metrics: &[FieldMetrics], errors: &[ErrorRecord]) -> String {
    let scored: usize = metrics.iter().map(|m| m.support).sum();
    let correct: usize = metrics.iter().map(|m| m.correct).sum();

    format!(
        r#"# Evaluation Results

## Field Accuracy

{}
## Summary

- **Scored pairs**: {}
- **Correct**: {}
- **Mismatches**: {} (see `{}`)

Stage is only scored on notes that mention a stage or a TNM code.
Values are compared after normalization, so `Stage IIA` and `IIA` agree.
"#,
        render_metrics_table(metrics),
        scored,
        correct,
        errors.len(),
        ERRORS_FILE,
    )
}

/// Paths written by [`write_reports`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub metrics: PathBuf,
    pub errors: PathBuf,
    pub summary: PathBuf,
}

pub async fn write_reports(
    metrics: &[FieldMetrics],
    errors: &[ErrorRecord],
    out_dir: &Path,
) -> Result<ReportPaths> {
    fs::create_dir_all(out_dir)
        .await
        .context(format!("Failed to create report directory: {:?}", out_dir))?;

    let paths = ReportPaths {
        metrics: out_dir.join(METRICS_FILE),
        errors: out_dir.join(ERRORS_FILE),
        summary: out_dir.join(SUMMARY_FILE),
    };

    let metrics_json = serde_json::to_string_pretty(metrics)?;
    fs::write(&paths.metrics, metrics_json)
        .await
        .context(format!("Failed to write {:?}", paths.metrics))?;

    FileReader::write_jsonl(&paths.errors, errors).await?;

    fs::write(&paths.summary, render_summary(metrics, errors))
        .await
        .context(format!("Failed to write {:?}", paths.summary))?;

    info!(
        "Wrote {} field metrics and {} errors to {:?}",
        metrics.len(),
        errors.len(),
        out_dir
    );
    Ok(paths)
}
