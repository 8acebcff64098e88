use std::path::Path;

use arrow::array::ArrayRef;

use crate::{error::PartitionError, file::PartitionFile, row_index::RowOffset};

/// Reads `row_offset` of `array_name`. The file is opened for this call only.
pub fn read_section<P: AsRef<Path>>(
    path: P,
    array_name: &str,
    row_offset: RowOffset,
) -> Result<ArrayRef, PartitionError> {
    PartitionFile::open(path)?.read_section(array_name, row_offset)
}

pub fn read_full_array<P: AsRef<Path>>(path: P, array_name: &str) -> Result<ArrayRef, PartitionError> {
    PartitionFile::open(path)?.read_full_array(array_name)
}
