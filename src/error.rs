// Errors raised at the catalog I/O boundary.
//
// Classification itself is total and never fails; everything here comes from
// reading, decoding, or writing files.

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The input file does not exist.
    #[error("input file '{path}' not found")]
    NotFound { path: String },

    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// Content is not a JSON list of report records.
    #[error("'{path}' is not a valid report catalog: {source}")]
    Malformed {
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to parse delimited rows in '{path}': {source}")]
    Csv { path: String, source: csv::Error },

    /// None of the fallback encodings produced text with a report header.
    #[error("could not decode '{path}' with any supported encoding")]
    Undecodable { path: String },

    #[error("failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write '{path}': {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}
