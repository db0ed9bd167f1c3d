// Batch entry points.
//
// Every run reads its whole input, builds the new catalog in memory and only
// then writes it out. Any error before the write leaves the target untouched.
use crate::assembler::{enrich_catalog, EnrichReport, MergeMode, Strategy};
use crate::dummy;
use crate::error::Result;
use crate::loader::{import_csv, load_catalog, ImportReport};
use crate::output::{layer_summary, write_json};
use crate::types::{LayerSummaryRow, ReportRecord};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    /// Defaults to `input`, i.e. update in place.
    pub output: Option<PathBuf>,
    pub merge: MergeMode,
    pub strategy: Strategy,
}

impl RunConfig {
    pub fn output_path(&self) -> &PathBuf {
        self.output.as_ref().unwrap_or(&self.input)
    }
}

#[derive(Debug, Clone)]
pub struct DummyConfig {
    pub output: PathBuf,
    pub count: usize,
    pub seed: u64,
}

#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub id_prefix: String,
}

#[derive(Debug, Clone)]
pub struct UpdateSummary {
    pub report: EnrichReport,
    pub layers: Vec<LayerSummaryRow>,
}

/// Enrich an existing catalog and write the result.
pub fn run_update(config: &RunConfig) -> Result<UpdateSummary> {
    let records = load_catalog(&config.input)?;
    let (records, report) = enrich_catalog(records, config.merge, config.strategy)?;
    let out = config.output_path();
    write_json(out, &records)?;
    info!(
        output = %out.display(),
        written = report.logic_written,
        kept = report.logic_kept,
        merge = ?config.merge,
        "catalog updated"
    );
    Ok(UpdateSummary {
        layers: layer_summary(&records),
        report,
    })
}

/// Write `count` seeded synthetic records.
pub fn run_generate(config: &DummyConfig) -> Result<Vec<ReportRecord>> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let records = dummy::generate(config.count, &mut rng)?;
    write_json(&config.output, &records)?;
    info!(output = %config.output.display(), count = records.len(), seed = config.seed, "generated synthetic reports");
    Ok(records)
}

/// Convert a delimited export into a JSON catalog.
pub fn run_import(config: &ImportConfig) -> Result<ImportReport> {
    let (records, report) = import_csv(&config.input, &config.id_prefix)?;
    write_json(&config.output, &records)?;
    Ok(report)
}
