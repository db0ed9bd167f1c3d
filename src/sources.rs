// Turn the free-text "data needed" field into table tokens and a source shape.
use crate::classify::classify_department;
use crate::types::{JoinSpec, LogicDescriptor, SourceRef};

const TABLES_PREFIX: &str = "Tables: ";
const TABLE_SUFFIX: &str = " table";

/// Split a `data_needed` string into ordered table tokens.
///
/// - Drops a leading `Tables: ` prefix.
/// - Splits on commas and trims every token.
/// - Strips trailing periods and a trailing ` table` from each token.
/// - Keeps order, duplicates and empty tokens between commas. Only blank
///   input gives an empty list.
pub fn extract_tables(data_needed: &str) -> Vec<String> {
    if data_needed.trim().is_empty() {
        return Vec::new();
    }
    let text = data_needed.trim_start();
    let text = text.strip_prefix(TABLES_PREFIX).unwrap_or(text);
    text.split(',').map(clean_token).collect()
}

fn clean_token(raw: &str) -> String {
    let mut token = raw.trim().trim_end_matches('.').trim_end();
    // "Vendor Master table." and "Vendor Master." both reduce to "Vendor Master".
    while let Some(stripped) = token.strip_suffix(TABLE_SUFFIX) {
        token = stripped.trim_end().trim_end_matches('.').trim_end();
    }
    token.to_string()
}

/// Build the source half of a descriptor, with empty requirements and processing.
///
/// More than one table gives the multi-source shape joined on an unresolved
/// placeholder key; otherwise a single source wraps whatever tokens exist.
pub fn extract_sources(data_needed: &str) -> LogicDescriptor {
    descriptor_for_tables(extract_tables(data_needed))
}

pub fn descriptor_for_tables(tables: Vec<String>) -> LogicDescriptor {
    if tables.len() > 1 {
        let sources = tables
            .into_iter()
            .map(|table| SourceRef {
                department: classify_department(&table),
                table_keywords: vec![table],
            })
            .collect();
        LogicDescriptor::Multi {
            sources,
            join: JoinSpec::unresolved(),
            requirements: Vec::new(),
            processing: Vec::new(),
        }
    } else {
        let department = classify_department(tables.first().map(String::as_str).unwrap_or(""));
        LogicDescriptor::Single {
            source: SourceRef {
                department,
                table_keywords: tables,
            },
            requirements: Vec::new(),
            processing: Vec::new(),
        }
    }
}
