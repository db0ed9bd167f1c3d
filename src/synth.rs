// Processing-step synthesis.
//
// Two independent strategies live here:
// - `synthesize` reads the formula and title and applies the first matching
//   heuristic (aging buckets, count, sum, group-by, raw fallback).
// - `chart_template` maps a known chart type to a canned pipeline and is used
//   when no formula is available.
// A caller uses exactly one of them for a given record.
use crate::types::{
    AgingBucket, AggregationOp, BucketParams, ChartType, ColumnOperation, ProcessingStep,
    Requirement, SortDirection,
};
use once_cell::sync::Lazy;

pub const AGING_COLUMN: &str = "Aging Bucket";
pub const CUSTOM_FORMULA_NOTE: &str = "Requires manual configuration or advanced parsing";

static AGING_BUCKETS: Lazy<Vec<AgingBucket>> = Lazy::new(|| {
    vec![
        bucket("Current", None, Some(0)),
        bucket("1-30 Days", Some(1), Some(30)),
        bucket("31-60 Days", Some(31), Some(60)),
        bucket(">60 Days", Some(61), None),
    ]
});

fn bucket(label: &str, min_days: Option<u32>, max_days: Option<u32>) -> AgingBucket {
    AgingBucket {
        label: label.to_string(),
        min_days,
        max_days,
    }
}

/// Requirements and steps produced by one heuristic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Synthesis {
    pub requirements: Vec<Requirement>,
    pub processing: Vec<ProcessingStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heuristic {
    AgingBuckets,
    Count,
    Sum,
    GroupBy,
}

struct HeuristicRule {
    heuristic: Heuristic,
    matches: fn(formula: &str, title: &str) -> bool,
}

// Evaluated in order; the first rule that matches is the only one applied.
const HEURISTICS: &[HeuristicRule] = &[
    HeuristicRule {
        heuristic: Heuristic::AgingBuckets,
        matches: |formula, title| {
            formula.contains("grouped by buckets") || title.to_lowercase().contains("aging")
        },
    },
    HeuristicRule {
        heuristic: Heuristic::Count,
        matches: |formula, _| formula.contains("COUNT"),
    },
    HeuristicRule {
        heuristic: Heuristic::Sum,
        matches: |formula, title| formula.contains("SUM") || title.contains("Total Spend"),
    },
    HeuristicRule {
        heuristic: Heuristic::GroupBy,
        matches: |formula, title| {
            formula.contains("grouped by")
                || title.contains("by Status")
                || title.contains("by Category")
        },
    },
];

/// First heuristic matching `formula`/`title`, or `None` for the raw fallback.
pub fn select_heuristic(formula: &str, title: &str) -> Option<Heuristic> {
    HEURISTICS
        .iter()
        .find(|rule| (rule.matches)(formula, title))
        .map(|rule| rule.heuristic)
}

/// Derive requirements and processing steps from a formula and title.
pub fn synthesize(formula: &str, title: &str) -> Synthesis {
    match select_heuristic(formula, title) {
        Some(Heuristic::AgingBuckets) => aging_buckets(),
        Some(Heuristic::Count) => Synthesis {
            requirements: Vec::new(),
            processing: vec![ProcessingStep::Aggregation {
                operation: AggregationOp::Count,
                column_ref: None,
                label: Some("Total Count".to_string()),
            }],
        },
        Some(Heuristic::Sum) => Synthesis {
            requirements: vec![Requirement::new("amount_col", &["number"], &["amount", "spend", "cost"])],
            processing: vec![ProcessingStep::Aggregation {
                operation: AggregationOp::Sum,
                column_ref: Some("amount_col".to_string()),
                label: Some("Total Value".to_string()),
            }],
        },
        Some(Heuristic::GroupBy) => group_by_category_or_status(title),
        None => Synthesis {
            requirements: Vec::new(),
            processing: vec![ProcessingStep::CustomFormula {
                formula_raw: formula.to_string(),
                note: CUSTOM_FORMULA_NOTE.to_string(),
            }],
        },
    }
}

fn aging_buckets() -> Synthesis {
    Synthesis {
        requirements: vec![
            Requirement::new("date_col", &["date"], &["date", "created", "due"]),
            Requirement::new("amount_col", &["number"], &["amount", "total", "value"]),
        ],
        processing: vec![
            ProcessingStep::CalculateColumn {
                name: AGING_COLUMN.to_string(),
                operation: ColumnOperation::DateDiffBuckets,
                params: BucketParams {
                    date_column_ref: "date_col".to_string(),
                    buckets: AGING_BUCKETS.clone(),
                },
            },
            ProcessingStep::GroupBy {
                group_column_ref: None,
                group_column: Some(AGING_COLUMN.to_string()),
                value_column_ref: Some("amount_col".to_string()),
                aggregation: Some(AggregationOp::Sum),
            },
        ],
    }
}

fn group_by_category_or_status(title: &str) -> Synthesis {
    let key = if title.contains("by Status") { "Status" } else { "Category" };
    let keyword = key.to_lowercase();
    Synthesis {
        requirements: vec![Requirement::new("group_col", &["text"], &[keyword.as_str(), "type"])],
        processing: vec![ProcessingStep::GroupBy {
            group_column_ref: Some("group_col".to_string()),
            group_column: None,
            value_column_ref: None,
            aggregation: Some(AggregationOp::Count),
        }],
    }
}

fn group_on(column: &str) -> ProcessingStep {
    ProcessingStep::GroupBy {
        group_column_ref: Some(column.to_string()),
        group_column: None,
        value_column_ref: None,
        aggregation: None,
    }
}

fn sum_of(column: &str) -> ProcessingStep {
    ProcessingStep::Aggregation {
        operation: AggregationOp::Sum,
        column_ref: Some(column.to_string()),
        label: None,
    }
}

/// Canned pipeline for a chart type. Gauges and tables get no steps.
pub fn chart_template(chart: ChartType) -> Vec<ProcessingStep> {
    match chart {
        ChartType::Line => vec![group_on("Date"), sum_of("Amount")],
        ChartType::Pie => vec![group_on("Category"), sum_of("Amount")],
        ChartType::Bar => vec![
            group_on("Entity"),
            sum_of("Amount"),
            ProcessingStep::Sort {
                direction: SortDirection::Desc,
            },
            ProcessingStep::Limit { count: 10 },
        ],
        ChartType::Gauge | ChartType::Table => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aging_wins_even_when_title_has_other_keywords() {
        let s = synthesize("grouped by buckets", "AP Aging Report");
        assert_eq!(s.processing.len(), 2);
        match &s.processing[0] {
            ProcessingStep::CalculateColumn { name, operation, params } => {
                assert_eq!(name, AGING_COLUMN);
                assert_eq!(*operation, ColumnOperation::DateDiffBuckets);
                let labels: Vec<_> = params.buckets.iter().map(|b| b.label.as_str()).collect();
                assert_eq!(labels, vec!["Current", "1-30 Days", "31-60 Days", ">60 Days"]);
                assert_eq!(params.buckets[3].min_days, Some(61));
                assert_eq!(params.buckets[3].max_days, None);
            }
            other => panic!("expected calculate_column, got {:?}", other),
        }
        assert!(matches!(
            &s.processing[1],
            ProcessingStep::GroupBy { group_column: Some(c), aggregation: Some(AggregationOp::Sum), .. }
                if c == AGING_COLUMN
        ));
        let keys: Vec<_> = s.requirements.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["date_col", "amount_col"]);
    }

    #[test]
    fn aging_title_alone_triggers_buckets_over_count() {
        assert_eq!(select_heuristic("COUNT(*)", "Invoice aging"), Some(Heuristic::AgingBuckets));
    }

    #[test]
    fn count_before_sum() {
        let s = synthesize("COUNT(id) and SUM(amount)", "Orders");
        assert!(s.requirements.is_empty());
        assert_eq!(
            s.processing,
            vec![ProcessingStep::Aggregation {
                operation: AggregationOp::Count,
                column_ref: None,
                label: Some("Total Count".into()),
            }]
        );
    }

    #[test]
    fn count_match_is_case_sensitive() {
        assert_eq!(select_heuristic("count of orders", "Orders"), None);
    }

    #[test]
    fn sum_from_title() {
        let s = synthesize("", "Total Spend YTD");
        assert_eq!(s.requirements[0].key, "amount_col");
        assert_eq!(s.requirements[0].keywords, vec!["amount", "spend", "cost"]);
        assert!(matches!(
            &s.processing[0],
            ProcessingStep::Aggregation { operation: AggregationOp::Sum, label: Some(l), .. } if l == "Total Value"
        ));
    }

    #[test]
    fn group_by_status_or_category() {
        let s = synthesize("", "Requisitions by Status");
        assert_eq!(s.requirements[0].keywords, vec!["status", "type"]);

        let s = synthesize("amount grouped by supplier", "Supplier Spread");
        assert_eq!(s.requirements[0].keywords, vec!["category", "type"]);
        assert!(matches!(
            &s.processing[0],
            ProcessingStep::GroupBy { aggregation: Some(AggregationOp::Count), .. }
        ));
    }

    #[test]
    fn unmatched_input_falls_back_to_custom_formula() {
        let s = synthesize("avg(x)/avg(y)", "Misc Ratio");
        assert!(s.requirements.is_empty());
        assert_eq!(
            s.processing,
            vec![ProcessingStep::CustomFormula {
                formula_raw: "avg(x)/avg(y)".into(),
                note: CUSTOM_FORMULA_NOTE.into(),
            }]
        );
    }

    #[test]
    fn chart_templates() {
        assert_eq!(chart_template(ChartType::Line), vec![group_on("Date"), sum_of("Amount")]);
        assert_eq!(chart_template(ChartType::Pie)[0], group_on("Category"));
        let bar = chart_template(ChartType::Bar);
        assert_eq!(bar.len(), 4);
        assert_eq!(bar[3], ProcessingStep::Limit { count: 10 });
        assert!(chart_template(ChartType::Gauge).is_empty());
        assert!(chart_template(ChartType::Table).is_empty());
    }
}
