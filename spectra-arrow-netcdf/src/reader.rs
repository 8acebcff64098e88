use std::sync::Arc;

use arrow::{
    array::{ArrayRef, FixedSizeListArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use netcdf::{types::NcVariableType, Extent, Extents, Variable};

use crate::{decoders::decoder_for, error::ArrowNetCDFError, NcResult};

/// Hyperslab selecting a single index along the leading dimension and
/// everything along the remaining ones.
pub fn row_extents(ndims: usize, row: usize) -> Extents {
    let mut extents = Vec::with_capacity(ndims.max(1));
    extents.push(Extent::from(row..row + 1));
    extents.extend((1..ndims).map(|_| Extent::from(..)));
    Extents::Extent(extents)
}

/// Length of the leading dimension, or 1 for scalar variables.
pub fn leading_len(variable: &Variable) -> usize {
    variable.dimensions().first().map(|d| d.len()).unwrap_or(1)
}

fn with_context(variable: &Variable, inner: ArrowNetCDFError) -> ArrowNetCDFError {
    ArrowNetCDFError::VariableReadError {
        variable: variable.name(),
        inner: Box::new(inner),
    }
}

/// Reads the whole variable as a flat arrow array.
pub fn read_variable(variable: &Variable) -> NcResult<ArrayRef> {
    let decoder = decoder_for(variable).map_err(|e| with_context(variable, e))?;
    decoder
        .read(variable, Extents::All)
        .map_err(|e| with_context(variable, e))
}

/// Reads a single row, reading only the bytes of that row.
pub fn read_variable_row(variable: &Variable, row: usize) -> NcResult<ArrayRef> {
    let dimensions = variable.dimensions();
    if dimensions.is_empty() {
        return read_variable(variable);
    }

    let len = leading_len(variable);
    if row >= len {
        return Err(ArrowNetCDFError::RowOutOfBounds {
            variable: variable.name(),
            row,
            len,
        });
    }

    let decoder = decoder_for(variable).map_err(|e| with_context(variable, e))?;
    decoder
        .read(variable, row_extents(dimensions.len(), row))
        .map_err(|e| with_context(variable, e))
}

/// Column shape of a variable inside a row-oriented table, `None` if the
/// variable cannot be represented as one column.
fn column_width(variable: &Variable) -> Option<Option<usize>> {
    let dimensions = variable.dimensions();
    match (variable.vartype(), dimensions.len()) {
        (NcVariableType::Char, 2) | (NcVariableType::String, 1) => Some(None),
        (NcVariableType::Char, _) | (NcVariableType::String, _) => None,
        (_, 1) => Some(None),
        (_, 2) => Some(Some(dimensions[1].len())),
        _ => None,
    }
}

/// Builds a record batch out of every variable whose leading dimension is
/// `row_dimension`. Two dimensional numeric variables become fixed size list
/// columns. Variables that do not fit the table are skipped.
pub fn read_table<'f, I>(variables: I, row_dimension: &str) -> NcResult<RecordBatch>
where
    I: IntoIterator<Item = Variable<'f>>,
{
    let mut fields = Vec::new();
    let mut columns = Vec::new();

    for variable in variables {
        let leading = variable.dimensions().first().map(|d| d.name());
        if leading.as_deref() != Some(row_dimension) {
            tracing::debug!(
                "Skipping variable {} that is not indexed by {}",
                variable.name(),
                row_dimension
            );
            continue;
        }

        let Some(width) = column_width(&variable) else {
            tracing::debug!(
                "Skipping variable {} with unsupported shape {:?}",
                variable.name(),
                variable.dimensions().iter().map(|d| d.len()).collect::<Vec<_>>()
            );
            continue;
        };

        let values = match read_variable(&variable) {
            Ok(values) => values,
            Err(ArrowNetCDFError::VariableReadError { inner, .. })
                if matches!(*inner, ArrowNetCDFError::UnsupportedNetCDFDataType(_)) =>
            {
                tracing::debug!("Skipping variable {} with unsupported type", variable.name());
                continue;
            }
            Err(e) => return Err(e),
        };

        let data_type = values.data_type().clone();
        let (field, column) = match width {
            Some(width) if data_type != DataType::Utf8 => {
                let item = Arc::new(Field::new("item", data_type, true));
                let list = FixedSizeListArray::try_new(item.clone(), width as i32, values, None)?;
                (
                    Field::new(variable.name(), DataType::FixedSizeList(item, width as i32), true),
                    Arc::new(list) as ArrayRef,
                )
            }
            _ => (Field::new(variable.name(), data_type, true), values),
        };

        fields.push(field);
        columns.push(column);
    }

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
    Ok(batch)
}

/// Name of the leading dimension of `variable`.
pub fn row_dimension(variable: &Variable) -> NcResult<String> {
    variable
        .dimensions()
        .first()
        .map(|d| d.name())
        .ok_or_else(|| ArrowNetCDFError::MissingRowDimension {
            variable: variable.name(),
        })
}

/// One variable of a record.
#[derive(Debug, Clone)]
pub struct RecordValue {
    pub name: String,
    /// Dimensions after the row dimension, a string length excluded. Zero
    /// means the row holds a single value.
    pub inner_rank: usize,
    pub values: ArrayRef,
}

impl RecordValue {
    pub fn is_scalar(&self) -> bool {
        self.inner_rank == 0
    }
}

fn inner_rank(variable: &Variable) -> usize {
    let rank = variable.dimensions().len().saturating_sub(1);
    match variable.vartype() {
        NcVariableType::Char => rank.saturating_sub(1),
        _ => rank,
    }
}

/// Reads `row` of every variable indexed by `row_dimension`, in declaration
/// order. Other variables are skipped.
pub fn read_record<'f, I>(variables: I, row_dimension: &str, row: usize) -> NcResult<Vec<RecordValue>>
where
    I: IntoIterator<Item = Variable<'f>>,
{
    let mut record = Vec::new();
    for variable in variables {
        let leading = variable.dimensions().first().map(|d| d.name());
        if leading.as_deref() != Some(row_dimension) {
            tracing::debug!(
                "Skipping variable {} that is not indexed by {}",
                variable.name(),
                row_dimension
            );
            continue;
        }

        record.push(RecordValue {
            name: variable.name(),
            inner_rank: inner_rank(&variable),
            values: read_variable_row(&variable, row)?,
        });
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use arrow::array::{Array, AsArray};
    use arrow::datatypes::{Float32Type, Int64Type};
    use tempfile::Builder;

    use super::*;
    use crate::NcChar;

    fn write_table_nc() -> tempfile::NamedTempFile {
        let tmp = Builder::new().suffix(".nc").tempfile().unwrap();
        {
            let mut nc = netcdf::create(tmp.path()).unwrap();
            nc.add_dimension("row", 3).unwrap();
            nc.add_dimension("coeff", 2).unwrap();
            nc.add_dimension("strlen", 4).unwrap();
            nc.add_dimension("other", 5).unwrap();

            let mut id = nc.add_variable::<i64>("TARGETID", &["row"]).unwrap();
            id.put_values(&[10i64, 20, 30], Extents::All).unwrap();

            let mut coeff = nc.add_variable::<f32>("COEFF", &["row", "coeff"]).unwrap();
            coeff
                .put_values(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], Extents::All)
                .unwrap();

            let mut name = nc.add_variable::<NcChar>("NAME", &["row", "strlen"]).unwrap();
            let raw: Vec<NcChar> = b"ab\0\0cdefgh\0\0".iter().map(|b| NcChar(*b)).collect();
            name.put_values(&raw, Extents::All).unwrap();

            let mut unrelated = nc.add_variable::<u8>("UNRELATED", &["other"]).unwrap();
            unrelated.put_values(&[0u8; 5], Extents::All).unwrap();
        }
        tmp
    }

    #[test]
    fn test_row_extents_reads_single_row() {
        let tmp = write_table_nc();
        let file = netcdf::open(tmp.path()).unwrap();
        let variable = file.variable("COEFF").unwrap();

        let row = read_variable_row(&variable, 1).unwrap();
        let row = row.as_primitive::<Float32Type>();
        assert_eq!(row.values().to_vec(), vec![3.0, 4.0]);
    }

    #[test]
    fn test_row_out_of_bounds() {
        let tmp = write_table_nc();
        let file = netcdf::open(tmp.path()).unwrap();
        let variable = file.variable("TARGETID").unwrap();

        let err = read_variable_row(&variable, 3).unwrap_err();
        assert!(matches!(
            err,
            ArrowNetCDFError::RowOutOfBounds { row: 3, len: 3, .. }
        ));
    }

    #[test]
    fn test_read_table() {
        let tmp = write_table_nc();
        let file = netcdf::open(tmp.path()).unwrap();

        let batch = read_table(file.variables(), "row").unwrap();
        assert_eq!(batch.num_rows(), 3);
        assert_eq!(batch.num_columns(), 3);
        assert!(batch.column_by_name("UNRELATED").is_none());

        let ids = batch.column_by_name("TARGETID").unwrap();
        assert_eq!(ids.as_primitive::<Int64Type>().value(2), 30);

        let coeff = batch.column_by_name("COEFF").unwrap();
        let coeff = coeff.as_fixed_size_list();
        assert_eq!(coeff.value_length(), 2);
        let second = coeff.value(1);
        assert_eq!(second.as_primitive::<Float32Type>().values().to_vec(), vec![3.0, 4.0]);

        let names = batch.column_by_name("NAME").unwrap();
        let names = names.as_string::<i32>();
        assert_eq!(names.value(0), "ab");
        assert_eq!(names.value(1), "cdef");
        assert_eq!(names.value(2), "gh");
    }

    #[test]
    fn test_read_record() {
        let tmp = write_table_nc();
        let file = netcdf::open(tmp.path()).unwrap();

        let record = read_record(file.variables(), "row", 2).unwrap();
        let names = record.iter().map(|v| v.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["TARGETID", "COEFF", "NAME"]);

        assert!(record[0].is_scalar());
        assert_eq!(record[0].values.len(), 1);
        assert_eq!(record[1].inner_rank, 1);
        assert_eq!(record[1].values.len(), 2);
        assert!(record[2].is_scalar());
        assert_eq!(record[2].values.as_string::<i32>().value(0), "gh");
    }

    #[test]
    fn test_row_dimension() {
        let tmp = write_table_nc();
        let file = netcdf::open(tmp.path()).unwrap();

        let variable = file.variable("COEFF").unwrap();
        assert_eq!(row_dimension(&variable).unwrap(), "row");
        let variable = file.variable("UNRELATED").unwrap();
        assert_eq!(row_dimension(&variable).unwrap(), "other");
    }
}
