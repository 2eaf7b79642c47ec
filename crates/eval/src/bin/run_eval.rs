use anyhow::Result;
use clap::Parser;
use eval::{ErrorRecord, PipelineConfig, evaluate, init_tracing, parse_fields, render_metrics_table};
use std::path::PathBuf;

const ERRORS_SHOWN: usize = 25;

/// Score an existing pre-abstract against its ground-truth columns.
#[derive(Parser)]
#[command(name = "run_eval")]
#[command(about = "Evaluate pre-abstract rows against ground truth", long_about = None)]
struct Cli {
    /// Pipeline config (JSON); defaults apply when the file is absent
    #[arg(short, long, default_value = eval::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Pre-abstract rows (JSONL)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Report directory
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Comma-separated fields to score (default: all)
    #[arg(long)]
    fields: Option<String>,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = PipelineConfig::load(&cli.config)?;
    if let Some(path) = cli.input {
        config.preabstract_path = path;
    }
    if let Some(dir) = cli.report_dir {
        config.report_dir = dir;
    }
    let fields = parse_fields(cli.fields.as_deref())?;

    let rows = ingest::read_rows(&config.preabstract_path).await?;
    let evaluation = evaluate(&rows, &fields, &config.report_dir).await?;

    println!("\n=== PRE-ABSTRACT EVALUATION ===\n");
    println!("{}", render_metrics_table(&evaluation.metrics));

    if !evaluation.errors.is_empty() {
        println!(
            "=== ERRORS (first {} of {}) ===\n",
            ERRORS_SHOWN.min(evaluation.errors.len()),
            evaluation.errors.len()
        );
        for error in evaluation.errors.iter().take(ERRORS_SHOWN) {
            print_error(error);
        }
    }

    println!("\n✅ Reports saved to {:?}", config.report_dir);
    Ok(())
}

fn print_error(error: &ErrorRecord) {
    println!(
        "  {}/{} {}: gt={:?} ({}) pred={:?} ({})",
        error.case_id,
        error.note_id,
        error.field,
        error.gt_value_raw.as_deref().unwrap_or("-"),
        error.gt_value_norm,
        error.pred_value_raw.as_deref().unwrap_or("-"),
        error.pred_value_norm.as_deref().unwrap_or("-"),
    );
    if let Some(evidence) = &error.evidence {
        println!("      evidence: {}", evidence);
    }
}
