use arrow::error::ArrowError;
use netcdf::types::NcVariableType;

#[derive(Debug, thiserror::Error)]
pub enum ArrowNetCDFError {
    #[error("Internal NetCDF error: {0}")]
    NetCDFError(#[from] netcdf::Error),
    #[error("Unsupported data type: {0:?}")]
    UnsupportedNetCDFDataType(NcVariableType),
    #[error("Failed to read variable {variable}: {inner}")]
    VariableReadError {
        variable: String,
        inner: Box<ArrowNetCDFError>,
    },
    #[error("Row {row} is out of bounds for variable {variable} with {len} rows")]
    RowOutOfBounds {
        variable: String,
        row: usize,
        len: usize,
    },
    #[error("Variable {variable} has no row dimension")]
    MissingRowDimension { variable: String },
    #[error("Failed to create arrow array: {0}")]
    ArrowError(#[from] ArrowError),
}
