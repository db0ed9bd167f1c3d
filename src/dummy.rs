// Synthetic report records for volume testing.
//
// The random source is injected so a fixed seed always yields the same catalog.
use crate::assembler::assemble_from_chart;
use crate::error::Result;
use crate::types::{field, ChartType, Layer, ReportRecord};
use rand::seq::SliceRandom;
use rand::Rng;

const CATEGORIES: [&str; 6] = ["Inventory", "Logistics", "Procurement", "Labor", "Equipment", "Safety"];
const MODULES: [&str; 5] = ["Inbound", "Outbound", "Storage", "Planning", "Compliance"];
const LAYERS: [Layer; 3] = [Layer::Strategic, Layer::Tactical, Layer::Operational];

/// Generate `count` records; logic comes from the chart-type templates.
pub fn generate<R: Rng>(count: usize, rng: &mut R) -> Result<Vec<ReportRecord>> {
    let mut reports = Vec::with_capacity(count);
    for i in 1..=count {
        let (Some(&category), Some(&module), Some(&layer), Some(&chart)) = (
            CATEGORIES.choose(rng),
            MODULES.choose(rng),
            LAYERS.choose(rng),
            ChartType::ALL.choose(rng),
        ) else {
            break;
        };
        let title = format!("{} {} {} Report {}", layer, category, module, i);
        let logic = serde_json::to_value(assemble_from_chart("", chart))?;
        reports.push(
            ReportRecord::new()
                .with(field::ID, format!("dummy_rpt_{}", i))
                .with(field::TITLE, title)
                .with(field::CATEGORY, category)
                .with(field::MODULE, module)
                .with(field::LAYER, layer.as_str())
                .with(field::CHART_TYPE, chart.as_str())
                .with(field::LOGIC, logic),
        );
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::PLACEHOLDER_TABLE;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn same_seed_same_catalog() {
        let a = generate(50, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = generate(50, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn records_are_numbered_and_complete() {
        let records = generate(3, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].text(field::ID), "dummy_rpt_3");
        assert!(records[2].title().ends_with(" Report 3"));
        for r in &records {
            let chart = ChartType::from_label(r.text(field::CHART_TYPE)).unwrap();
            let d = r.descriptor().unwrap();
            assert_eq!(d.sources()[0].table_keywords, vec![PLACEHOLDER_TABLE]);
            assert_eq!(d.processing().len(), crate::synth::chart_template(chart).len());
        }
    }

    #[test]
    fn layer_is_one_of_the_three_tiers() {
        let records = generate(30, &mut StdRng::seed_from_u64(3)).unwrap();
        assert!(records
            .iter()
            .all(|r| matches!(r.text(field::LAYER), "Strategic" | "Tactical" | "Operational")));
    }
}
