use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use cardioprep_core::{
    config::{columns, DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH, DEFAULT_PREVIEW_ROWS},
    encoding::StringIndexer,
    ingestion, Pipeline, PipelineConfig, Stage, StageObserver,
};
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use polars::prelude::DataFrame;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Heart disease dataset preprocessing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full preprocessing pipeline and write the result
    Run(RunArgs),
    /// Show the chest pain categories and the codes they would receive
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Input CSV file (falls back to CARDIOPREP_INPUT_PATH)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Output directory, replaced if it exists (falls back to CARDIOPREP_OUTPUT_PATH)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Rows shown in each intermediate preview; 0 disables previews
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    preview_rows: usize,
    /// Print the run summary as JSON after the report
    #[arg(long)]
    summary_json: bool,
}

#[derive(Args, Debug, Default)]
struct InspectArgs {
    /// Input CSV file (falls back to CARDIOPREP_INPUT_PATH)
    #[arg(long)]
    input: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Inspect(args) => handle_inspect(args),
    }
}

fn handle_run(args: RunArgs) -> Result<()> {
    let config = PipelineConfig::new(
        resolve_path(args.input, "CARDIOPREP_INPUT_PATH", DEFAULT_INPUT_PATH),
        resolve_path(args.output, "CARDIOPREP_OUTPUT_PATH", DEFAULT_OUTPUT_PATH),
    );
    info!(
        input = %config.input_path.display(),
        output = %config.output_path.display(),
        "starting preprocessing run"
    );

    let mut previews = ConsolePreview {
        rows: args.preview_rows,
    };
    let output = Pipeline::new()
        .run(&config, &mut previews)
        .with_context(|| format!("pipeline failed for {}", config.input_path.display()))?;

    println!(
        "Number of patients with High cholesterol: {}",
        output.high_chol_count
    );
    println!("Processed dataset saved to {}", config.output_path.display());

    if args.summary_json {
        let json = serde_json::to_string_pretty(&output.summary)
            .context("failed to serialize run summary")?;
        println!("{json}");
    }

    Ok(())
}

fn handle_inspect(args: InspectArgs) -> Result<()> {
    let input = resolve_path(args.input, "CARDIOPREP_INPUT_PATH", DEFAULT_INPUT_PATH);
    let df = ingestion::load_table(&input)?;
    let model = StringIndexer::new(columns::CHEST_PAIN, columns::CHEST_PAIN_INDEX)
        .fit(&df)
        .context("failed to fit chest pain indexer")?;

    let mut table = Table::new();
    table.set_header(vec!["cp", "cp_index", "rows"]);
    for (idx, (label, count)) in model
        .labels()
        .iter()
        .zip(model.frequencies())
        .enumerate()
    {
        table.add_row(vec![label.clone(), idx.to_string(), count.to_string()]);
    }
    println!("{table}");

    Ok(())
}

/// CLI flag, then environment variable, then the built-in default.
fn resolve_path(flag: Option<PathBuf>, env_key: &str, default: &str) -> PathBuf {
    flag.or_else(|| env::var(env_key).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(default))
}

/// Prints the head of each intermediate table to stdout.
struct ConsolePreview {
    rows: usize,
}

impl StageObserver for ConsolePreview {
    fn on_stage(&mut self, stage: Stage, df: &DataFrame) -> cardioprep_core::Result<()> {
        if self.rows == 0 {
            return Ok(());
        }

        let preview = stage.preview_columns();
        let view = if preview.is_empty() {
            df.head(Some(self.rows))
        } else {
            df.select(preview.iter().copied())?.head(Some(self.rows))
        };

        println!("[{}]", stage.code_identifier());
        println!("{view}");
        Ok(())
    }
}
