use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tabled::Tabled;

/// Catalog field names. Existing catalogs use these exact strings.
pub mod field {
    pub const ID: &str = "id";
    pub const LAYER: &str = "Layer";
    pub const SUB_LAYER: &str = "Sub-Layer";
    pub const CATEGORY: &str = "Category 1 (Detailed)";
    pub const MODULE: &str = "Module (Category 2)";
    pub const TITLE: &str = "Report Title";
    pub const CHART_TYPE: &str = "Chart Type (ECharts)";
    pub const BENEFIT: &str = "benefit";
    pub const KPI_DEFINITION: &str = "kpi_definition";
    pub const FORMULA: &str = "formula";
    pub const DATA_NEEDED: &str = "data_needed";
    pub const DETAILED_EXPLANATION: &str = "detailed_explanation";
    pub const LOGIC: &str = "logic";
}

/// One report definition as stored in a catalog file.
///
/// Kept as the raw ordered JSON object so values of any type and the original
/// key order survive a pass untouched. Writes to an existing key replace the
/// value in place; new keys go to the end.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ReportRecord {
    fields: Map<String, Value>,
}

impl ReportRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// String value of `key`; missing or non-string values read as "".
    pub fn text(&self, key: &str) -> &str {
        self.get(key).and_then(Value::as_str).unwrap_or("")
    }

    /// Missing, or present with an empty/false/zero/null value.
    pub fn is_blank(&self, key: &str) -> bool {
        self.get(key).map_or(true, is_falsy)
    }

    pub fn title(&self) -> &str {
        self.text(field::TITLE)
    }

    pub fn formula(&self) -> &str {
        self.text(field::FORMULA)
    }

    pub fn data_needed(&self) -> &str {
        self.text(field::DATA_NEEDED)
    }

    /// `None` only when the key is missing; an explicit `null` is `Some(Null)`.
    pub fn logic(&self) -> Option<&Value> {
        self.get(field::LOGIC)
    }

    /// The stored logic, if it is a well-formed descriptor.
    pub fn descriptor(&self) -> Option<LogicDescriptor> {
        self.logic()
            .and_then(|v| LogicDescriptor::deserialize(v).ok())
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChartType {
    #[serde(rename = "Line Chart")]
    Line,
    #[serde(rename = "Pie Chart")]
    Pie,
    #[serde(rename = "Bar Chart")]
    Bar,
    #[serde(rename = "Gauge Chart")]
    Gauge,
    #[serde(rename = "Table")]
    Table,
}

impl ChartType {
    pub const ALL: [ChartType; 5] = [
        ChartType::Line,
        ChartType::Bar,
        ChartType::Pie,
        ChartType::Gauge,
        ChartType::Table,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Line => "Line Chart",
            ChartType::Pie => "Pie Chart",
            ChartType::Bar => "Bar Chart",
            ChartType::Gauge => "Gauge Chart",
            ChartType::Table => "Table",
        }
    }

    /// Exact label match; anything else is not a known chart type.
    pub fn from_label(label: &str) -> Option<ChartType> {
        Self::ALL.into_iter().find(|c| c.as_str() == label.trim())
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    Strategic,
    Tactical,
    Operational,
    General,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Strategic => "Strategic",
            Layer::Tactical => "Tactical",
            Layer::Operational => "Operational",
            Layer::General => "General",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse owner of a source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "finance")]
    Finance,
    #[serde(rename = "supply-chain/procurement")]
    Procurement,
    #[serde(rename = "supply-chain/warehouse")]
    Warehouse,
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Finance => "finance",
            Department::Procurement => "supply-chain/procurement",
            Department::Warehouse => "supply-chain/warehouse",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured description of how a report's data is sourced and computed.
///
/// Multi-source is listed first so untagged deserialization only picks it when
/// `sources` and `join` are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogicDescriptor {
    Multi {
        sources: Vec<SourceRef>,
        join: JoinSpec,
        requirements: Vec<Requirement>,
        processing: Vec<ProcessingStep>,
    },
    Single {
        source: SourceRef,
        requirements: Vec<Requirement>,
        processing: Vec<ProcessingStep>,
    },
}

impl LogicDescriptor {
    pub fn is_multi_source(&self) -> bool {
        matches!(self, LogicDescriptor::Multi { .. })
    }

    pub fn sources(&self) -> Vec<&SourceRef> {
        match self {
            LogicDescriptor::Multi { sources, .. } => sources.iter().collect(),
            LogicDescriptor::Single { source, .. } => vec![source],
        }
    }

    pub fn requirements(&self) -> &[Requirement] {
        match self {
            LogicDescriptor::Multi { requirements, .. }
            | LogicDescriptor::Single { requirements, .. } => requirements,
        }
    }

    pub fn processing(&self) -> &[ProcessingStep] {
        match self {
            LogicDescriptor::Multi { processing, .. }
            | LogicDescriptor::Single { processing, .. } => processing,
        }
    }

    pub fn extend(&mut self, reqs: Vec<Requirement>, steps: Vec<ProcessingStep>) {
        match self {
            LogicDescriptor::Multi {
                requirements,
                processing,
                ..
            }
            | LogicDescriptor::Single {
                requirements,
                processing,
                ..
            } => {
                requirements.extend(reqs);
                processing.extend(steps);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub department: Department,
    pub table_keywords: Vec<String>,
}

/// Key left unresolved in every generated join.
pub const JOIN_KEY_PLACEHOLDER: &str = "common_id_placeholder";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinSpec {
    #[serde(rename = "type")]
    pub kind: JoinKind,
    pub on: String,
}

impl JoinSpec {
    pub fn unresolved() -> Self {
        JoinSpec {
            kind: JoinKind::Inner,
            on: JOIN_KEY_PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    Inner,
}

/// A column the report needs, with ranked type and name guesses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub key: String,
    pub types: Vec<String>,
    pub keywords: Vec<String>,
}

impl Requirement {
    pub fn new(key: &str, types: &[&str], keywords: &[&str]) -> Self {
        Requirement {
            key: key.to_string(),
            types: types.iter().map(|s| s.to_string()).collect(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationOp {
    Sum,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnOperation {
    DateDiffBuckets,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgingBucket {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketParams {
    pub date_column_ref: String,
    pub buckets: Vec<AgingBucket>,
}

/// One stage of a report's computation pipeline, tagged by `step`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ProcessingStep {
    GroupBy {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        group_column_ref: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        group_column: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value_column_ref: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        aggregation: Option<AggregationOp>,
    },
    Aggregation {
        operation: AggregationOp,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        column_ref: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Sort {
        direction: SortDirection,
    },
    Limit {
        count: usize,
    },
    CalculateColumn {
        name: String,
        operation: ColumnOperation,
        params: BucketParams,
    },
    CustomFormula {
        formula_raw: String,
        note: String,
    },
}

/// Per-layer line of the run summary.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct LayerSummaryRow {
    #[tabled(rename = "Layer")]
    pub layer: String,
    #[tabled(rename = "Reports")]
    pub reports: usize,
    #[tabled(rename = "MultiSource")]
    pub multi_source: usize,
    #[tabled(rename = "CustomFormula")]
    pub custom_formula: usize,
}
