use crate::error::{CatalogError, Result};
use crate::types::{field, LayerSummaryRow, ProcessingStep, ReportRecord};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use tempfile::NamedTempFile;

/// Serialize `value` with 4-space indentation and move it over `path` in one
/// rename, so a failed run never leaves a half-written catalog.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    buf.push(b'\n');

    let display = path.display().to_string();
    let write_err = |source: std::io::Error| CatalogError::Write {
        path: display.clone(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(&buf).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Per-layer counts of reports, multi-source descriptors and raw fallbacks.
pub fn layer_summary(records: &[ReportRecord]) -> Vec<LayerSummaryRow> {
    let mut by_layer: BTreeMap<String, LayerSummaryRow> = BTreeMap::new();
    for r in records {
        let layer = match r.text(field::LAYER) {
            "" => "General".to_string(),
            name => name.to_string(),
        };
        let row = by_layer.entry(layer.clone()).or_insert_with(|| LayerSummaryRow {
            layer,
            reports: 0,
            multi_source: 0,
            custom_formula: 0,
        });
        row.reports += 1;
        if let Some(d) = r.descriptor() {
            row.multi_source += d.is_multi_source() as usize;
            row.custom_formula += d
                .processing()
                .iter()
                .any(|s| matches!(s, ProcessingStep::CustomFormula { .. })) as usize;
        }
    }
    by_layer.into_values().collect()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
