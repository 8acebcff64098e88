use std::path::Path;

use arrow::{
    array::{Array, AsArray},
    datatypes::{DataType, Int64Type},
};
use netcdf::Variable;
use spectra_arrow_netcdf::reader::{read_variable, row_dimension};

use crate::{error::PartitionError, file::PartitionFile, FIBERMAP_GROUP, ROW_IDENTIFIER_VARIABLE};

/// Position of an object inside the row ordering shared by every per row
/// array of a partition file.
pub type RowOffset = usize;

fn identifier_array_name() -> String {
    format!("{}/{}", FIBERMAP_GROUP, ROW_IDENTIFIER_VARIABLE)
}

impl PartitionFile {
    fn with_identifier_variable<T>(
        &self,
        f: impl FnOnce(&Variable) -> Result<T, PartitionError>,
    ) -> Result<T, PartitionError> {
        let array_name = identifier_array_name();
        let not_found = || PartitionError::ArrayNotFound {
            array: array_name.clone(),
            path: self.path().to_path_buf(),
        };

        let fibermap = self
            .netcdf()
            .group(FIBERMAP_GROUP)
            .map_err(|e| PartitionError::read(&array_name, self.path().to_path_buf(), e.into()))?
            .ok_or_else(not_found)?;
        let variable = fibermap
            .variable(ROW_IDENTIFIER_VARIABLE)
            .ok_or_else(not_found)?;
        f(&variable)
    }

    /// Name of the dimension every per row array of the file is indexed by.
    pub fn row_dimension(&self) -> Result<String, PartitionError> {
        self.with_identifier_variable(|variable| {
            row_dimension(variable).map_err(|e| {
                PartitionError::read(&identifier_array_name(), self.path().to_path_buf(), e)
            })
        })
    }

    /// Scans the fibermap identifier column for the first row matching
    /// `identifier`. Only that column is read.
    pub fn locate(&self, identifier: i64) -> Result<RowOffset, PartitionError> {
        let array_name = identifier_array_name();
        let identifiers = self.with_identifier_variable(|variable| {
            read_variable(variable)
                .map_err(|e| PartitionError::read(&array_name, self.path().to_path_buf(), e))
        })?;
        let identifiers = match identifiers.data_type() {
            DataType::Int64 => identifiers,
            _ => arrow::compute::cast(&identifiers, &DataType::Int64).map_err(|e| {
                PartitionError::read(&array_name, self.path().to_path_buf(), e.into())
            })?,
        };

        let row = identifiers
            .as_primitive::<Int64Type>()
            .iter()
            .position(|value| value == Some(identifier))
            .ok_or_else(|| PartitionError::RowNotFound {
                identifier,
                path: self.path().to_path_buf(),
            })?;

        tracing::debug!(
            "Located TARGETID {} at row {} of {} in {}",
            identifier,
            row,
            identifiers.len(),
            self.path().display()
        );

        Ok(row)
    }
}

/// Opens the partition file, locates `identifier` and closes the file again.
pub fn locate<P: AsRef<Path>>(path: P, identifier: i64) -> Result<RowOffset, PartitionError> {
    PartitionFile::open(path)?.locate(identifier)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::fixtures::CoaddFixture;

    #[test]
    fn test_locate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("coadd-main-dark-9103.nc");
        CoaddFixture::new(vec![11, 39633345008634311, 13])
            .write(&path)
            .unwrap();

        assert_eq!(locate(&path, 11).unwrap(), 0);
        assert_eq!(locate(&path, 39633345008634311).unwrap(), 1);
        assert_eq!(locate(&path, 13).unwrap(), 2);
    }

    #[test]
    fn test_locate_first_match() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("coadd.nc");
        CoaddFixture::new(vec![5, 6, 5]).write(&path).unwrap();

        assert_eq!(locate(&path, 5).unwrap(), 0);
    }

    #[test]
    fn test_locate_missing_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("coadd.nc");
        CoaddFixture::new(vec![1, 2]).write(&path).unwrap();

        let err = locate(&path, 39633345008634311).unwrap_err();
        assert!(matches!(
            err,
            PartitionError::RowNotFound {
                identifier: 39633345008634311,
                ..
            }
        ));
    }

    #[test]
    fn test_locate_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = locate(dir.path().join("absent.nc"), 1).unwrap_err();
        assert!(matches!(err, PartitionError::PartitionNotFound { .. }));
    }

    #[test]
    fn test_locate_unreadable_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("coadd.nc");
        std::fs::write(&path, b"not a netcdf file").unwrap();

        let err = locate(&path, 1).unwrap_err();
        assert!(matches!(err, PartitionError::PartitionNotFound { .. }));
    }

    #[test]
    fn test_locate_without_fibermap() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("coadd.nc");
        CoaddFixture::new(vec![1])
            .without_fibermap()
            .write(&path)
            .unwrap();

        let err = locate(&path, 1).unwrap_err();
        assert!(
            matches!(err, PartitionError::ArrayNotFound { ref array, .. } if array == "FIBERMAP/TARGETID")
        );
    }
}
