// Compose sources and processing steps into a logic descriptor and merge it
// back into report records.
use crate::classify::{classify_chart_type, classify_layer};
use crate::error::Result;
use crate::sources::{descriptor_for_tables, extract_sources, extract_tables};
use crate::synth::{chart_template, synthesize};
use crate::types::{field, ChartType, LogicDescriptor, ReportRecord};
use clap::ValueEnum;
use tracing::debug;

/// Table token used when a record names no source at all.
pub const PLACEHOLDER_TABLE: &str = "warehouse_data";

/// How an existing `logic` value is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MergeMode {
    /// Only generate `logic` when the key is missing. Present values, even
    /// `null` or `""`, are kept.
    FillIfAbsent,
    /// Always recompute and replace `logic`.
    Overwrite,
}

/// Which synthesizer builds the processing steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Heuristics over the formula and title.
    Formula,
    /// Canned pipeline per chart type.
    ChartTemplate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicAction {
    Written,
    Kept,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOutcome {
    pub layer_filled: bool,
    pub chart_type_filled: bool,
    pub logic: LogicAction,
}

/// Formula-driven descriptor: sources from `data_needed`, steps from formula/title.
pub fn assemble_logic(formula: &str, title: &str, data_needed: &str) -> LogicDescriptor {
    let mut logic = extract_sources(data_needed);
    let synthesis = synthesize(formula, title);
    logic.extend(synthesis.requirements, synthesis.processing);
    logic
}

/// Chart-driven descriptor. Falls back to the placeholder table when no
/// source is named.
pub fn assemble_from_chart(data_needed: &str, chart: ChartType) -> LogicDescriptor {
    let mut tables = extract_tables(data_needed);
    if tables.is_empty() {
        tables.push(PLACEHOLDER_TABLE.to_string());
    }
    let mut logic = descriptor_for_tables(tables);
    logic.extend(Vec::new(), chart_template(chart));
    logic
}

/// Enrich one record in place.
///
/// In fill-if-absent mode a missing or empty layer and chart type are derived
/// from the title, and `logic` is only written when the key is missing.
/// Overwrite mode touches nothing but `logic`.
pub fn apply(record: &mut ReportRecord, mode: MergeMode, strategy: Strategy) -> Result<RecordOutcome> {
    let fill = mode == MergeMode::FillIfAbsent;

    let layer_filled = fill && record.is_blank(field::LAYER);
    if layer_filled {
        let layer = classify_layer(
            record.title(),
            record.text(field::CATEGORY),
            record.text(field::MODULE),
        );
        debug!(title = record.title(), %layer, "filled layer");
        record.set(field::LAYER, layer.as_str());
    }

    let chart_type_filled = fill && record.is_blank(field::CHART_TYPE);
    if chart_type_filled {
        let chart = classify_chart_type(record.title());
        debug!(title = record.title(), %chart, "filled chart type");
        record.set(field::CHART_TYPE, chart.as_str());
    }

    if fill && record.logic().is_some() {
        return Ok(RecordOutcome {
            layer_filled,
            chart_type_filled,
            logic: LogicAction::Kept,
        });
    }

    let logic = match strategy {
        Strategy::Formula => assemble_logic(record.formula(), record.title(), record.data_needed()),
        Strategy::ChartTemplate => {
            let chart = ChartType::from_label(record.text(field::CHART_TYPE)).unwrap_or(ChartType::Table);
            assemble_from_chart(record.data_needed(), chart)
        }
    };
    debug!(
        title = record.title(),
        multi_source = logic.is_multi_source(),
        requirements = logic.requirements().len(),
        steps = logic.processing().len(),
        "assembled logic"
    );
    record.set(field::LOGIC, serde_json::to_value(&logic)?);
    Ok(RecordOutcome {
        layer_filled,
        chart_type_filled,
        logic: LogicAction::Written,
    })
}

/// Totals for one pass over a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichReport {
    pub total: usize,
    pub layers_filled: usize,
    pub chart_types_filled: usize,
    pub logic_written: usize,
    pub logic_kept: usize,
}

/// Enrich every record of a catalog, producing a new catalog.
pub fn enrich_catalog(
    mut records: Vec<ReportRecord>,
    mode: MergeMode,
    strategy: Strategy,
) -> Result<(Vec<ReportRecord>, EnrichReport)> {
    let mut report = EnrichReport {
        total: records.len(),
        ..EnrichReport::default()
    };
    for record in &mut records {
        let outcome = apply(record, mode, strategy)?;
        report.layers_filled += outcome.layer_filled as usize;
        report.chart_types_filled += outcome.chart_type_filled as usize;
        match outcome.logic {
            LogicAction::Written => report.logic_written += 1,
            LogicAction::Kept => report.logic_kept += 1,
        }
    }
    Ok((records, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Department, ProcessingStep};
    use serde_json::{json, Value};

    fn record(title: &str, formula: &str, data_needed: &str) -> ReportRecord {
        ReportRecord::new()
            .with(field::TITLE, title)
            .with(field::FORMULA, formula)
            .with(field::DATA_NEEDED, data_needed)
    }

    #[test]
    fn formula_logic_combines_sources_and_steps() {
        let d = assemble_logic("SUM(amount)", "Spend per PO", "Tables: Purchase Orders, AP Invoices.");
        assert!(d.is_multi_source());
        assert_eq!(d.sources()[1].department, Department::Finance);
        assert_eq!(d.requirements()[0].key, "amount_col");
        assert_eq!(d.processing().len(), 1);
    }

    #[test]
    fn chart_logic_uses_placeholder_table() {
        let d = assemble_from_chart("", ChartType::Bar);
        assert_eq!(d.sources()[0].table_keywords, vec![PLACEHOLDER_TABLE]);
        assert_eq!(d.sources()[0].department, Department::Warehouse);
        assert_eq!(d.processing().len(), 4);
        assert!(d.requirements().is_empty());
    }

    #[test]
    fn fills_missing_layer_and_chart_type() {
        let mut r = record("Vendor Spend Trend", "", "Vendor Master");
        let out = apply(&mut r, MergeMode::FillIfAbsent, Strategy::Formula).unwrap();
        assert!(out.layer_filled && out.chart_type_filled);
        assert_eq!(r.text(field::LAYER), "Strategic");
        assert_eq!(r.text(field::CHART_TYPE), "Line Chart");
        assert_eq!(out.logic, LogicAction::Written);
    }

    #[test]
    fn null_layer_counts_as_missing() {
        let mut r = record("Daily Log", "", "").with(field::LAYER, Value::Null);
        apply(&mut r, MergeMode::FillIfAbsent, Strategy::Formula).unwrap();
        assert_eq!(r.text(field::LAYER), "Operational");
    }

    #[test]
    fn existing_layer_is_never_replaced() {
        let mut r = record("Vendor Spend Trend", "", "").with(field::LAYER, 3);
        let out = apply(&mut r, MergeMode::FillIfAbsent, Strategy::Formula).unwrap();
        assert!(!out.layer_filled);
        assert_eq!(r.get(field::LAYER), Some(&json!(3)));
    }

    #[test]
    fn overwrite_only_touches_logic() {
        let mut r = record("Vendor Spend Trend", "", "");
        let out = apply(&mut r, MergeMode::Overwrite, Strategy::Formula).unwrap();
        assert!(!out.layer_filled && !out.chart_type_filled);
        assert!(r.get(field::LAYER).is_none());
        assert!(r.get(field::CHART_TYPE).is_none());
        assert_eq!(out.logic, LogicAction::Written);
    }

    #[test]
    fn fill_if_absent_keeps_explicit_empty_logic() {
        let mut r = record("Misc", "COUNT(*)", "").with(field::LOGIC, "");
        let out = apply(&mut r, MergeMode::FillIfAbsent, Strategy::Formula).unwrap();
        assert_eq!(out.logic, LogicAction::Kept);
        assert_eq!(r.logic(), Some(&json!("")));

        r.set(field::LOGIC, Value::Null);
        apply(&mut r, MergeMode::FillIfAbsent, Strategy::Formula).unwrap();
        assert_eq!(r.logic(), Some(&Value::Null));
    }

    #[test]
    fn overwrite_recomputes_from_current_formula() {
        let mut r = record("Orders", "COUNT(id)", "Purchase Orders");
        apply(&mut r, MergeMode::Overwrite, Strategy::Formula).unwrap();
        let first = r.logic().cloned();
        apply(&mut r, MergeMode::Overwrite, Strategy::Formula).unwrap();
        assert_eq!(r.logic().cloned(), first);

        r.set(field::FORMULA, "avg(x)/avg(y)");
        apply(&mut r, MergeMode::Overwrite, Strategy::Formula).unwrap();
        assert_ne!(r.logic().cloned(), first);
        let d = r.descriptor().unwrap();
        assert!(matches!(d.processing()[0], ProcessingStep::CustomFormula { .. }));
    }

    #[test]
    fn chart_template_strategy_follows_record_chart_type() {
        let mut r = record("Anything", "SUM(x)", "").with(field::CHART_TYPE, "Line Chart");
        apply(&mut r, MergeMode::Overwrite, Strategy::ChartTemplate).unwrap();
        let d = r.descriptor().unwrap();
        assert_eq!(d.processing().len(), 2);
        assert!(d.requirements().is_empty());
    }

    #[test]
    fn unknown_chart_label_gets_no_steps() {
        let mut r = record("Anything", "", "Stock").with(field::CHART_TYPE, "Radar");
        apply(&mut r, MergeMode::Overwrite, Strategy::ChartTemplate).unwrap();
        assert!(r.descriptor().unwrap().processing().is_empty());
    }

    #[test]
    fn enrich_catalog_counts_outcomes() {
        let kept = record("Stock List", "", "Stock")
            .with(field::LOGIC, json!({}))
            .with(field::LAYER, "Operational");
        let records = vec![record("Stock List", "", "Stock"), kept];
        let (out, report) = enrich_catalog(records, MergeMode::FillIfAbsent, Strategy::Formula).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(report.total, 2);
        assert_eq!(report.layers_filled, 1);
        assert_eq!(report.chart_types_filled, 2);
        assert_eq!(report.logic_written, 1);
        assert_eq!(report.logic_kept, 1);
    }
}
