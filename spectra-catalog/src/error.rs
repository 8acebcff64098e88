use std::path::PathBuf;

use arrow::error::ArrowError;
use spectra_arrow_netcdf::error::ArrowNetCDFError;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to load catalog {}: {}", .path.display(), .inner)]
    CatalogLoad {
        path: PathBuf,
        inner: Box<CatalogError>,
    },
    #[error("TARGETID {0} not found in catalog")]
    NotFound(i64),
    #[error("Catalog file {} does not exist", .0.display())]
    FileNotFound(PathBuf),
    #[error("Unsupported catalog format: {0}")]
    UnsupportedFormat(String),
    #[error("Catalog is missing required column {0}")]
    MissingColumn(String),
    #[error("Catalog contains duplicate identifier {0}")]
    DuplicateIdentifier(i64),
    #[error("Catalog contains a null identifier at row {0}")]
    NullIdentifier(usize),
    #[error("Invalid value for catalog field {field}: {reason}")]
    InvalidField { field: String, reason: String },
    #[error("Catalog IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Catalog arrow error: {0}")]
    Arrow(#[from] ArrowError),
    #[error("Catalog NetCDF error: {0}")]
    NetCDF(#[from] ArrowNetCDFError),
    #[error("Failed to open NetCDF catalog: {0}")]
    NetCDFOpen(#[from] netcdf::Error),
}

impl CatalogError {
    pub fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
