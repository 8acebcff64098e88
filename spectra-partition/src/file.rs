use std::path::{Path, PathBuf};

use arrow::array::ArrayRef;
use spectra_arrow_netcdf::reader::{read_record, read_variable, read_variable_row, RecordValue};

use crate::error::PartitionError;

/// An open coadd file. The underlying handle is closed when this value is
/// dropped.
pub struct PartitionFile {
    path: PathBuf,
    file: netcdf::File,
}

impl std::fmt::Debug for PartitionFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionFile")
            .field("path", &self.path)
            .finish()
    }
}

impl PartitionFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PartitionError> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(PartitionError::PartitionNotFound {
                path,
                reason: "no such file".to_string(),
            });
        }

        let file = netcdf::open(&path).map_err(|e| PartitionError::PartitionNotFound {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        tracing::debug!("Opened partition file {}", path.display());
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn netcdf(&self) -> &netcdf::File {
        &self.file
    }

    fn array_not_found(&self, array: &str) -> PartitionError {
        PartitionError::ArrayNotFound {
            array: array.to_string(),
            path: self.path.clone(),
        }
    }

    pub fn has_array(&self, array_name: &str) -> bool {
        self.file.variable(array_name).is_some()
    }

    /// Reads only `row_offset` of the named per row array.
    pub fn read_section(&self, array_name: &str, row_offset: usize) -> Result<ArrayRef, PartitionError> {
        let variable = self
            .file
            .variable(array_name)
            .ok_or_else(|| self.array_not_found(array_name))?;

        read_variable_row(&variable, row_offset)
            .map_err(|e| PartitionError::read(array_name, self.path.clone(), e))
    }

    /// Reads an array shared by every row of the file, e.g. a wavelength grid.
    pub fn read_full_array(&self, array_name: &str) -> Result<ArrayRef, PartitionError> {
        let variable = self
            .file
            .variable(array_name)
            .ok_or_else(|| self.array_not_found(array_name))?;

        read_variable(&variable).map_err(|e| PartitionError::read(array_name, self.path.clone(), e))
    }

    /// Reads `row_offset` of every variable inside `group` that shares the
    /// row dimension of the fibermap. Other variables are left out.
    pub fn read_record(
        &self,
        group: &str,
        row_offset: usize,
    ) -> Result<Vec<RecordValue>, PartitionError> {
        let row_dimension = self.row_dimension()?;
        let group_handle = self
            .file
            .group(group)
            .map_err(|e| PartitionError::read(group, self.path.clone(), e.into()))?
            .ok_or_else(|| self.array_not_found(group))?;

        read_record(group_handle.variables(), &row_dimension, row_offset)
            .map_err(|e| PartitionError::read(group, self.path.clone(), e))
    }
}
