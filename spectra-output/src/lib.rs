pub mod csv;
pub mod json;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to encode CSV: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Column {column} of type {data_type} cannot be written as CSV")]
    UnsupportedColumnType {
        column: String,
        data_type: arrow::datatypes::DataType,
    },
}

/// An encoded response body together with the headers describing it.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputResponse {
    pub body: Vec<u8>,
    pub content_type: &'static str,
    pub content_disposition: String,
}
