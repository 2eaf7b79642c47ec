pub mod config;
pub mod gate;
pub mod metrics;
pub mod normalizer;
pub mod pipeline;
pub mod report;

pub use config::PipelineConfig;
pub use gate::is_scorable;
pub use metrics::{FieldMetrics, Judgement, compute_metrics, judge};
pub use normalizer::normalize_for_field;
pub use pipeline::{generate_rows, map_note};
pub use report::{
    ErrorRecord, ReportPaths, generate_error_report, render_metrics_table, write_reports,
};

use anyhow::Result;
use extract::{Field, UnknownField};
use ingest::AbstractRow;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Metrics and mismatches for one set of rows, already written to `out_dir`.
pub struct Evaluation {
    pub metrics: Vec<FieldMetrics>,
    pub errors: Vec<ErrorRecord>,
    pub paths: ReportPaths,
}

pub async fn evaluate(
    rows: &[AbstractRow],
    fields: &[Field],
    out_dir: &Path,
) -> Result<Evaluation> {
    let metrics = compute_metrics(rows, fields);
    let errors = generate_error_report(rows, fields);
    let paths = write_reports(&metrics, &errors, out_dir).await?;
    Ok(Evaluation {
        metrics,
        errors,
        paths,
    })
}

/// Parse a comma-separated field list; `None` means every field.
pub fn parse_fields(list: Option<&str>) -> Result<Vec<Field>, UnknownField> {
    match list {
        None => Ok(Field::ALL.to_vec()),
        Some(list) => list
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse)
            .collect(),
    }
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` when verbose.
pub fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
