use anyhow::{Context, Result};
use clap::Parser;
use eval::{
    PipelineConfig, evaluate, generate_rows, init_tracing, parse_fields, render_metrics_table,
};
use extract::FieldMapper;
use std::path::PathBuf;
use tracing::info;

/// Extract registry fields from notes, persist the pre-abstract and score it.
#[derive(Parser)]
#[command(name = "run_pipeline")]
#[command(about = "Map notes to registry fields and evaluate the result", long_about = None)]
struct Cli {
    /// Pipeline config (JSON); defaults apply when the file is absent
    #[arg(short, long, default_value = eval::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Note corpus (JSONL)
    #[arg(long)]
    notes: Option<PathBuf>,

    /// Recognized entities (JSONL)
    #[arg(long)]
    entities: Option<PathBuf>,

    /// Where to write the pre-abstract rows
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report directory
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Comma-separated fields to score (default: all)
    #[arg(long)]
    fields: Option<String>,

    /// Map notes on a single thread
    #[arg(long)]
    sequential: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = PipelineConfig::load(&cli.config)?;
    if let Some(path) = cli.notes {
        config.notes_path = path;
    }
    if let Some(path) = cli.entities {
        config.entities_path = path;
    }
    if let Some(path) = cli.output {
        config.preabstract_path = path;
    }
    if let Some(dir) = cli.report_dir {
        config.report_dir = dir;
    }
    if cli.sequential {
        config.parallel = false;
    }
    let fields = parse_fields(cli.fields.as_deref())?;

    println!("=== Registry Field Extraction ===\n");

    let mapper = FieldMapper::new(&config.extraction).context("Invalid extraction config")?;
    let notes = ingest::load_notes(&config.notes_path).await?;
    let entities = ingest::load_entities_map(&config.entities_path, &config.entity_filter()).await?;

    info!(notes = notes.len(), parallel = config.parallel, "mapping notes");
    let rows = generate_rows(notes, &entities, &mapper, config.parallel);
    ingest::write_rows(&config.preabstract_path, &rows).await?;
    println!("✅ {} rows saved to {:?}", rows.len(), config.preabstract_path);

    let evaluation = evaluate(&rows, &fields, &config.report_dir).await?;

    println!("\n=== RESULTS ===\n");
    println!("{}", render_metrics_table(&evaluation.metrics));
    println!("✅ Metrics saved to {:?}", evaluation.paths.metrics);
    println!("✅ {} errors saved to {:?}", evaluation.errors.len(), evaluation.paths.errors);
    println!("✅ Summary saved to {:?}", evaluation.paths.summary);

    Ok(())
}
