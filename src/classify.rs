// Keyword classifiers for chart type, organizational layer and department.
//
// Each classifier is an ordered table of keyword groups. Groups are checked
// top to bottom and the first group with any keyword contained in the input
// decides the result; later groups are never consulted.
use crate::types::{ChartType, Department, Layer};

/// A keyword group paired with the label it produces.
pub struct KeywordRule<T: 'static> {
    pub keywords: &'static [&'static str],
    pub result: T,
}

/// Walk `rules` in order and return the first result whose group matches.
pub fn first_match<T: Copy>(text: &str, rules: &[KeywordRule<T>], default: T) -> T {
    rules
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| text.contains(k)))
        .map(|rule| rule.result)
        .unwrap_or(default)
}

pub const CHART_RULES: &[KeywordRule<ChartType>] = &[
    KeywordRule {
        keywords: &["trend", "history", "over time", "monthly", "weekly", "daily", "timeline"],
        result: ChartType::Line,
    },
    KeywordRule {
        keywords: &["breakdown", "distribution", "by category", "by status", "share", "composition"],
        result: ChartType::Pie,
    },
    KeywordRule {
        keywords: &["top", "best", "worst", "highest", "lowest", "ranking", "performance"],
        result: ChartType::Bar,
    },
    KeywordRule {
        keywords: &["utilization", "completion", "rate", "percentage", "score", "kpi"],
        result: ChartType::Gauge,
    },
    KeywordRule {
        keywords: &["list", "register", "log", "details", "report", "summary"],
        result: ChartType::Table,
    },
];

pub const LAYER_RULES: &[KeywordRule<Layer>] = &[
    KeywordRule {
        keywords: &["strategic", "executive", "financial", "spend", "cost", "profit", "global", "kpi"],
        result: Layer::Strategic,
    },
    KeywordRule {
        keywords: &["planning", "forecast", "optimization", "analysis", "performance", "trend", "history"],
        result: Layer::Tactical,
    },
    KeywordRule {
        keywords: &[
            "daily", "log", "list", "status", "tracking", "real-time", "execution", "operational",
            "inventory", "shipment",
        ],
        result: Layer::Operational,
    },
];

// Matched against the upper-cased table token.
pub const DEPARTMENT_RULES: &[KeywordRule<Department>] = &[
    KeywordRule {
        keywords: &["INVOICE", "PAYMENT", "GL_", "BUDGET", "FINANCE", "AP_", "AR_"],
        result: Department::Finance,
    },
    KeywordRule {
        keywords: &[
            "PO", "PURCHASE", "SPEND", "SOURCING", "CONTRACT", "VENDOR", "SUPPLIER", "REQUISITION",
        ],
        result: Department::Procurement,
    },
    KeywordRule {
        keywords: &["INVENTORY", "STOCK", "WAREHOUSE"],
        result: Department::Warehouse,
    },
];

/// Pick a visualization for a report title. Total: unmatched titles are tables.
pub fn classify_chart_type(title: &str) -> ChartType {
    first_match(&title.to_lowercase(), CHART_RULES, ChartType::Table)
}

/// Place a report in an organizational tier from its title, category and module.
pub fn classify_layer(title: &str, category: &str, module: &str) -> Layer {
    let text = format!("{} {} {}", title, category, module).to_lowercase();
    first_match(&text, LAYER_RULES, Layer::General)
}

/// Owning department for a raw table token, defaulting to procurement.
pub fn classify_department(table: &str) -> Department {
    first_match(&table.to_uppercase(), DEPARTMENT_RULES, Department::Procurement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_keywords_take_precedence_over_bar() {
        assert_eq!(classify_chart_type("Monthly Top Performers"), ChartType::Line);
    }

    #[test]
    fn chart_type_groups() {
        assert_eq!(classify_chart_type("Spend Breakdown"), ChartType::Pie);
        assert_eq!(classify_chart_type("Requests by Status"), ChartType::Pie);
        assert_eq!(classify_chart_type("Worst Suppliers"), ChartType::Bar);
        assert_eq!(classify_chart_type("PO Approval Rate"), ChartType::Gauge);
        assert_eq!(classify_chart_type("Contract Register"), ChartType::Table);
    }

    #[test]
    fn chart_type_defaults_to_table() {
        assert_eq!(classify_chart_type(""), ChartType::Table);
        assert_eq!(classify_chart_type("Misc Ratio"), ChartType::Table);
    }

    #[test]
    fn chart_matching_is_case_insensitive() {
        assert_eq!(classify_chart_type("SPEND TIMELINE"), ChartType::Line);
    }

    #[test]
    fn strategic_keywords_take_precedence_over_tactical() {
        assert_eq!(classify_layer("Vendor Spend Trend", "", ""), Layer::Strategic);
    }

    #[test]
    fn layer_uses_category_and_module_text() {
        assert_eq!(classify_layer("Weekly Numbers", "Demand Planning", ""), Layer::Tactical);
        assert_eq!(classify_layer("Open Items", "", "Shipment"), Layer::Operational);
        assert_eq!(classify_layer("Miscellaneous", "Other", "Misc"), Layer::General);
    }

    #[test]
    fn layer_and_chart_type_are_independent() {
        // "performance" is a Bar keyword for charts and a Tactical keyword for layers.
        assert_eq!(classify_chart_type("Buyer Performance"), ChartType::Bar);
        assert_eq!(classify_layer("Buyer Performance", "", ""), Layer::Tactical);
    }

    #[test]
    fn department_groups() {
        assert_eq!(classify_department("ap_invoices"), Department::Finance);
        assert_eq!(classify_department("Vendor Master"), Department::Procurement);
        assert_eq!(classify_department("Stock Levels"), Department::Warehouse);
    }

    #[test]
    fn department_defaults_to_procurement() {
        assert_eq!(classify_department("WIDGET_X"), Department::Procurement);
        assert_eq!(classify_department(""), Department::Procurement);
    }

    #[test]
    fn finance_precedes_procurement() {
        // Contains both INVOICE and PURCHASE.
        assert_eq!(classify_department("Purchase Invoice Lines"), Department::Finance);
    }

    #[test]
    fn classifiers_are_deterministic() {
        for _ in 0..3 {
            assert_eq!(classify_chart_type("Daily Log"), ChartType::Line);
            assert_eq!(classify_layer("Daily Log", "", ""), Layer::Operational);
        }
    }
}
