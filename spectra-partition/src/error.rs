use std::path::PathBuf;

use spectra_arrow_netcdf::error::ArrowNetCDFError;

#[derive(Debug, thiserror::Error)]
pub enum PartitionError {
    #[error("Spectrum file {} not found: {}", .path.display(), .reason)]
    PartitionNotFound { path: PathBuf, reason: String },
    #[error("TARGETID {} not found in the fibermap of {}", .identifier, .path.display())]
    RowNotFound { identifier: i64, path: PathBuf },
    #[error("Array {} not found in {}", .array, .path.display())]
    ArrayNotFound { array: String, path: PathBuf },
    #[error(
        "Row {} is out of bounds for array {} with {} rows in {}",
        .row,
        .array,
        .len,
        .path.display()
    )]
    RowOutOfBounds {
        array: String,
        row: usize,
        len: usize,
        path: PathBuf,
    },
    #[error("Failed to read {} from {}: {}", .array, .path.display(), .inner)]
    Read {
        array: String,
        path: PathBuf,
        inner: ArrowNetCDFError,
    },
}

impl PartitionError {
    pub(crate) fn read(array: &str, path: PathBuf, inner: ArrowNetCDFError) -> Self {
        match inner {
            ArrowNetCDFError::RowOutOfBounds { row, len, .. } => Self::RowOutOfBounds {
                array: array.to_string(),
                row,
                len,
                path,
            },
            ArrowNetCDFError::VariableReadError { inner, .. }
                if matches!(*inner, ArrowNetCDFError::RowOutOfBounds { .. }) =>
            {
                Self::read(array, path, *inner)
            }
            inner => Self::Read {
                array: array.to_string(),
                path,
                inner,
            },
        }
    }
}
