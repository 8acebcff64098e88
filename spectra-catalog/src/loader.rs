use std::{fs::File, path::Path};

use arrow::{ipc::reader::FileReader, record_batch::RecordBatch};

use crate::{error::CatalogError, IDENTIFIER_COLUMN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    NetCDF,
    ArrowIpc,
}

impl CatalogFormat {
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "nc" | "nc4" | "netcdf" => Ok(Self::NetCDF),
            "arrow" | "ipc" | "feather" => Ok(Self::ArrowIpc),
            _ => Err(CatalogError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

pub fn read_catalog(path: &Path) -> Result<RecordBatch, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::FileNotFound(path.to_path_buf()));
    }

    match CatalogFormat::from_path(path)? {
        CatalogFormat::NetCDF => read_netcdf_catalog(path),
        CatalogFormat::ArrowIpc => read_ipc_catalog(path),
    }
}

/// Every root variable sharing the leading dimension of `TARGETID` becomes
/// a catalog column.
pub fn read_netcdf_catalog(path: &Path) -> Result<RecordBatch, CatalogError> {
    let file = netcdf::open(path)?;
    let identifiers = file
        .variable(IDENTIFIER_COLUMN)
        .ok_or_else(|| CatalogError::MissingColumn(IDENTIFIER_COLUMN.to_string()))?;
    let row_dimension = identifiers
        .dimensions()
        .first()
        .map(|d| d.name())
        .ok_or_else(|| CatalogError::invalid_field(IDENTIFIER_COLUMN, "scalar variable"))?;

    let batch = spectra_arrow_netcdf::reader::read_table(file.variables(), &row_dimension)?;
    Ok(batch)
}

pub fn read_ipc_catalog(path: &Path) -> Result<RecordBatch, CatalogError> {
    let reader = FileReader::try_new(File::open(path)?, None)?;
    let schema = reader.schema();
    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    let batch = arrow::compute::concat_batches(&schema, &batches)?;
    Ok(batch)
}
