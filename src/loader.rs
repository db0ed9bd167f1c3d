use crate::error::{CatalogError, Result};
use crate::types::{field, ReportRecord};
use crate::util::{non_empty, strip_control_chars};
use csv::ReaderBuilder;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

/// Header that identifies a correctly decoded report sheet.
const REPORT_HEADER: &str = "Report Title";

/// Read a JSON catalog: a list of report records.
pub fn load_catalog(path: &Path) -> Result<Vec<ReportRecord>> {
    let shown = path.display().to_string();
    if !path.exists() {
        return Err(CatalogError::NotFound { path: shown });
    }
    let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: shown.clone(),
        source,
    })?;
    let records: Vec<ReportRecord> =
        serde_json::from_str(&text).map_err(|source| CatalogError::Malformed {
            path: shown.clone(),
            source,
        })?;
    info!(path = %shown, records = records.len(), "loaded catalog");
    Ok(records)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf16,
    Utf16Le,
    Utf8Sig,
    Latin1,
    Cp1252,
}

/// Order in which encodings are tried on tabular input.
pub const FALLBACK_ORDER: [TextEncoding; 5] = [
    TextEncoding::Utf16,
    TextEncoding::Utf16Le,
    TextEncoding::Utf8Sig,
    TextEncoding::Latin1,
    TextEncoding::Cp1252,
];

impl TextEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf16 => "utf-16",
            TextEncoding::Utf16Le => "utf-16-le",
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Cp1252 => "cp1252",
        }
    }

    /// Lossy decode: invalid sequences become U+FFFD rather than failing.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let text = match self {
            // BOM decides the byte order; without one, little-endian.
            TextEncoding::Utf16 => match Encoding::for_bom(bytes) {
                Some((enc, bom_len)) if enc == UTF_16LE || enc == UTF_16BE => {
                    enc.decode_without_bom_handling(&bytes[bom_len..]).0
                }
                _ => UTF_16LE.decode_without_bom_handling(bytes).0,
            },
            TextEncoding::Utf16Le => UTF_16LE.decode_without_bom_handling(bytes).0,
            TextEncoding::Utf8Sig => UTF_8.decode_with_bom_removal(bytes).0,
            TextEncoding::Latin1 => encoding_rs::mem::decode_latin1(bytes),
            TextEncoding::Cp1252 => WINDOWS_1252.decode_without_bom_handling(bytes).0,
        };
        text.into_owned()
    }
}

/// Try each fallback encoding and keep the first that yields a report header.
pub fn decode_report_text(bytes: &[u8]) -> Option<(TextEncoding, String)> {
    for encoding in FALLBACK_ORDER {
        let text = encoding.decode(bytes);
        if text.contains(REPORT_HEADER) {
            debug!(encoding = encoding.label(), "decoded tabular input");
            return Some((encoding, text));
        }
        debug!(encoding = encoding.label(), "no report header after decoding");
    }
    None
}

/// Drop control characters and normalise line endings to `\n`.
pub fn clean_text(text: &str) -> String {
    strip_control_chars(text)
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogRow {
    id: Option<String>,
    layer: Option<String>,
    #[serde(rename = "Sub-Layer")]
    sub_layer: Option<String>,
    #[serde(rename = "Category 1 (Detailed)")]
    category: Option<String>,
    #[serde(rename = "Module (Category 2)")]
    module: Option<String>,
    #[serde(rename = "Report Title")]
    title: Option<String>,
    #[serde(rename = "Chart Type (ECharts)")]
    chart_type: Option<String>,
    benefit: Option<String>,
    kpi_definition: Option<String>,
    formula: Option<String>,
    data_needed: Option<String>,
    detailed_explanation: Option<String>,
    logic: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ImportReport {
    pub encoding: TextEncoding,
    pub total_rows: usize,
    pub imported: usize,
    pub skipped_untitled: usize,
    pub parse_errors: usize,
}

/// Import report definitions from a delimited file of unknown encoding.
pub fn import_csv(path: &Path, id_prefix: &str) -> Result<(Vec<ReportRecord>, ImportReport)> {
    let shown = path.display().to_string();
    if !path.exists() {
        return Err(CatalogError::NotFound { path: shown });
    }
    let bytes = std::fs::read(path).map_err(|source| CatalogError::Read {
        path: shown.clone(),
        source,
    })?;
    let (encoding, text) = decode_report_text(&bytes)
        .ok_or_else(|| CatalogError::Undecodable { path: shown.clone() })?;
    if encoding != TextEncoding::Utf16 {
        warn!(encoding = encoding.label(), "fell back to a secondary encoding");
    }
    let (records, report) = parse_rows(&clean_text(&text), encoding, id_prefix)
        .map_err(|source| CatalogError::Csv { path: shown.clone(), source })?;
    info!(
        path = %shown,
        imported = report.imported,
        skipped = report.skipped_untitled,
        "imported tabular catalog"
    );
    Ok((records, report))
}

fn parse_rows(
    content: &str,
    encoding: TextEncoding,
    id_prefix: &str,
) -> std::result::Result<(Vec<ReportRecord>, ImportReport), csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());
    let headers = rdr.headers()?.clone();
    debug!(?headers, "tabular headers");

    let mut report = ImportReport {
        encoding,
        total_rows: 0,
        imported: 0,
        skipped_untitled: 0,
        parse_errors: 0,
    };
    let mut records = Vec::new();
    for result in rdr.deserialize::<CatalogRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(row = report.total_rows, error = %e, "skipping unparsable row");
                report.parse_errors += 1;
                continue;
            }
        };
        let Some(title) = non_empty(row.title) else {
            report.skipped_untitled += 1;
            continue;
        };
        let id = non_empty(row.id).unwrap_or_else(|| format!("{}-{}", id_prefix, report.total_rows));
        let mut record = ReportRecord::new()
            .with(field::ID, id)
            .with(field::LAYER, non_empty(row.layer).unwrap_or_else(|| "General".to_string()))
            .with(field::SUB_LAYER, non_empty(row.sub_layer).unwrap_or_else(|| "General".to_string()))
            .with(field::CATEGORY, row.category.unwrap_or_default())
            .with(field::MODULE, row.module.unwrap_or_default())
            .with(field::TITLE, title)
            .with(field::CHART_TYPE, non_empty(row.chart_type).unwrap_or_else(|| "Bar Chart".to_string()))
            .with(field::BENEFIT, row.benefit.unwrap_or_default())
            .with(field::KPI_DEFINITION, row.kpi_definition.unwrap_or_default())
            .with(field::FORMULA, row.formula.unwrap_or_default())
            .with(field::DATA_NEEDED, row.data_needed.unwrap_or_default())
            .with(field::DETAILED_EXPLANATION, row.detailed_explanation.unwrap_or_default());
        if let Some(raw) = non_empty(row.logic) {
            record.set(
                field::LOGIC,
                serde_json::from_str::<Value>(&raw).unwrap_or(Value::String(raw)),
            );
        }
        records.push(record);
        report.imported += 1;
    }
    Ok((records, report))
}
