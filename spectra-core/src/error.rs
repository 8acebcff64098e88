use std::time::Duration;

use spectra_catalog::CatalogError;
use spectra_partition::{arm::ParseArmError, PartitionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The identifier is not part of the catalog.
    NotFound,
    /// The caller asked for something that cannot exist, e.g. an unknown arm.
    BadRequest,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum SpectrumError {
    #[error("TARGETID {0} not found in the catalog")]
    NotFound(i64),
    #[error("Missing spectrum file: {0}")]
    PartitionNotFound(PartitionError),
    #[error("Data inconsistency: {0}")]
    RowNotFound(PartitionError),
    #[error("Malformed spectrum file: {0}")]
    ArrayNotFound(PartitionError),
    #[error("Invalid arm {arm:?}: {reason}")]
    InvalidArm { arm: String, reason: String },
    #[error("Array {array} has {actual} samples but its wavelength grid has {expected}")]
    ShapeMismatch {
        array: String,
        expected: usize,
        actual: usize,
    },
    #[error("Catalog error: {0}")]
    Catalog(CatalogError),
    #[error("Failed to read spectrum: {0}")]
    Io(PartitionError),
    #[error("Failed to convert spectrum values: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("Reading the spectrum did not finish within {0:?}")]
    Timeout(Duration),
    #[error("Spectrum task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl SpectrumError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SpectrumError::NotFound(_) => ErrorKind::NotFound,
            SpectrumError::InvalidArm { .. } => ErrorKind::BadRequest,
            _ => ErrorKind::Internal,
        }
    }
}

impl From<PartitionError> for SpectrumError {
    fn from(err: PartitionError) -> Self {
        match err {
            PartitionError::PartitionNotFound { .. } => SpectrumError::PartitionNotFound(err),
            PartitionError::RowNotFound { .. } => SpectrumError::RowNotFound(err),
            PartitionError::ArrayNotFound { .. } => SpectrumError::ArrayNotFound(err),
            PartitionError::RowOutOfBounds { .. } | PartitionError::Read { .. } => {
                SpectrumError::Io(err)
            }
        }
    }
}

impl From<CatalogError> for SpectrumError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(identifier) => SpectrumError::NotFound(identifier),
            err => SpectrumError::Catalog(err),
        }
    }
}

impl From<ParseArmError> for SpectrumError {
    fn from(err: ParseArmError) -> Self {
        SpectrumError::InvalidArm {
            arm: err.0,
            reason: "expected one of B, R, Z".to_string(),
        }
    }
}
