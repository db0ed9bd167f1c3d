// Entry point and CLI flow.
//
// `update` enriches an existing report catalog with logic descriptors,
// `generate-dummy` writes a seeded synthetic catalog for volume testing and
// `import` converts a delimited export into a JSON catalog.
mod assembler;
mod batch;
mod classify;
mod dummy;
mod error;
mod loader;
mod output;
mod sources;
mod synth;
mod types;
mod util;

use assembler::{MergeMode, Strategy};
use batch::{DummyConfig, ImportConfig, RunConfig};
use clap::{Args, Parser, Subcommand};
use error::CatalogError;
use std::path::PathBuf;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "report_logic")]
#[command(about = "Infer structured logic descriptors for report catalogs")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Enrich an existing catalog (in place unless --output is given)
    Update(UpdateArgs),
    /// Write a synthetic catalog
    GenerateDummy(DummyArgs),
    /// Convert a delimited export into a JSON catalog
    Import(ImportArgs),
}

#[derive(Args)]
struct UpdateArgs {
    /// Catalog to read
    #[arg(long, short = 'i')]
    input: PathBuf,
    /// Where to write the enriched catalog (default: overwrite input)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
    /// Treatment of an existing `logic` value
    #[arg(long, value_enum, default_value_t = MergeMode::FillIfAbsent)]
    merge: MergeMode,
    /// How processing steps are derived
    #[arg(long, value_enum, default_value_t = Strategy::Formula)]
    strategy: Strategy,
}

#[derive(Args)]
struct DummyArgs {
    #[arg(long, short = 'o')]
    output: PathBuf,
    #[arg(long, short = 'n', default_value_t = 10_000)]
    count: usize,
    /// Seed for the random source; equal seeds give equal catalogs
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Args)]
struct ImportArgs {
    #[arg(long, short = 'i')]
    input: PathBuf,
    #[arg(long, short = 'o')]
    output: PathBuf,
    /// Prefix for generated ids of rows without one
    #[arg(long, default_value = "report")]
    id_prefix: String,
}

fn handle_update(args: UpdateArgs) -> Result<(), CatalogError> {
    let config = RunConfig {
        input: args.input,
        output: args.output,
        merge: args.merge,
        strategy: args.strategy,
    };
    println!("Updating reports in {}...", config.input.display());
    let summary = batch::run_update(&config)?;
    let r = &summary.report;
    println!(
        "Processed {} reports: logic written for {}, kept for {}.",
        util::format_int(r.total),
        util::format_int(r.logic_written),
        util::format_int(r.logic_kept)
    );
    println!(
        "Filled {} layers and {} chart types.\n",
        util::format_int(r.layers_filled),
        util::format_int(r.chart_types_filled)
    );
    output::preview_table_rows(&summary.layers, summary.layers.len());
    println!("(Catalog written to {})", config.output_path().display());
    Ok(())
}

fn handle_generate(args: DummyArgs) -> Result<(), CatalogError> {
    let config = DummyConfig {
        output: args.output,
        count: args.count,
        seed: args.seed,
    };
    let records = batch::run_generate(&config)?;
    println!(
        "Generated {} dummy reports in {}",
        util::format_int(records.len()),
        config.output.display()
    );
    Ok(())
}

fn handle_import(args: ImportArgs) -> Result<(), CatalogError> {
    let config = ImportConfig {
        input: args.input,
        output: args.output,
        id_prefix: args.id_prefix,
    };
    let report = batch::run_import(&config)?;
    println!("Decoded {} as {}.", config.input.display(), report.encoding.label());
    println!(
        "Imported {} of {} rows ({} without a title, {} unparsable) into {}",
        util::format_int(report.imported),
        util::format_int(report.total_rows),
        util::format_int(report.skipped_untitled),
        util::format_int(report.parse_errors),
        config.output.display()
    );
    Ok(())
}

fn run_cmd(result: Result<(), CatalogError>) {
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).compact())
        .with(filter)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Cmd::Update(args) => run_cmd(handle_update(args)),
        Cmd::GenerateDummy(args) => run_cmd(handle_generate(args)),
        Cmd::Import(args) => run_cmd(handle_import(args)),
    }
}
