use std::{collections::HashMap, path::Path, time::Instant};

use arrow::{
    array::{Array, ArrayRef, AsArray},
    datatypes::{DataType, Int64Type, SchemaRef},
    record_batch::RecordBatch,
};
use indexmap::IndexMap;

use crate::{
    error::CatalogError,
    loader,
    value::{field_value, FieldValue},
    HEALPIX_COLUMN, IDENTIFIER_COLUMN, PROGRAM_COLUMN, REQUIRED_COLUMNS, SURVEY_COLUMN,
};

/// The full catalog table together with a `TARGETID -> row` hash index.
///
/// Immutable once built. Share it behind an `Arc`.
#[derive(Debug)]
pub struct CatalogIndex {
    batch: RecordBatch,
    rows: HashMap<i64, usize>,
}

impl CatalogIndex {
    /// Loads the catalog file and indexes it. Any failure is reported as
    /// [`CatalogError::CatalogLoad`].
    pub fn build<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let start = Instant::now();

        let index = loader::read_catalog(path)
            .and_then(Self::from_record_batch)
            .map_err(|inner| CatalogError::CatalogLoad {
                path: path.to_path_buf(),
                inner: Box::new(inner),
            })?;

        tracing::info!(
            "Loaded catalog {} with {} rows and {} columns in {:?}",
            path.display(),
            index.len(),
            index.schema().fields().len(),
            start.elapsed()
        );

        Ok(index)
    }

    pub fn from_record_batch(batch: RecordBatch) -> Result<Self, CatalogError> {
        for column in REQUIRED_COLUMNS {
            if batch.column_by_name(column).is_none() {
                return Err(CatalogError::MissingColumn(column.to_string()));
            }
        }

        let identifiers = identifier_column(&batch)?;
        let identifiers = identifiers.as_primitive::<Int64Type>();

        let mut rows = HashMap::with_capacity(identifiers.len());
        for (row, identifier) in identifiers.iter().enumerate() {
            let identifier = identifier.ok_or(CatalogError::NullIdentifier(row))?;
            if rows.insert(identifier, row).is_some() {
                return Err(CatalogError::DuplicateIdentifier(identifier));
            }
        }

        Ok(Self { batch, rows })
    }

    pub fn lookup(&self, identifier: i64) -> Result<CatalogRow<'_>, CatalogError> {
        self.rows
            .get(&identifier)
            .map(|row| CatalogRow {
                index: self,
                row: *row,
            })
            .ok_or(CatalogError::NotFound(identifier))
    }

    pub fn len(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }
}

fn identifier_column(batch: &RecordBatch) -> Result<ArrayRef, CatalogError> {
    let column = batch
        .column_by_name(IDENTIFIER_COLUMN)
        .ok_or_else(|| CatalogError::MissingColumn(IDENTIFIER_COLUMN.to_string()))?;

    match column.data_type() {
        DataType::Int64 => Ok(column.clone()),
        data_type if data_type.is_integer() => {
            Ok(arrow::compute::cast(column.as_ref(), &DataType::Int64)?)
        }
        data_type => Err(CatalogError::invalid_field(
            IDENTIFIER_COLUMN,
            format!("expected an integer column, found {}", data_type),
        )),
    }
}

/// A borrowed view of one catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct CatalogRow<'a> {
    index: &'a CatalogIndex,
    row: usize,
}

impl CatalogRow<'_> {
    pub fn row_number(&self) -> usize {
        self.row
    }

    pub fn field(&self, name: &str) -> Result<FieldValue, CatalogError> {
        let column = self
            .index
            .batch
            .column_by_name(name)
            .ok_or_else(|| CatalogError::MissingColumn(name.to_string()))?;
        field_value(column.as_ref(), self.row)
    }

    /// Every field in catalog column order.
    pub fn to_map(&self) -> Result<IndexMap<String, FieldValue>, CatalogError> {
        let schema = self.index.batch.schema();
        schema
            .fields()
            .iter()
            .zip(self.index.batch.columns())
            .map(|(field, column)| -> Result<(String, FieldValue), CatalogError> {
                Ok((field.name().clone(), field_value(column.as_ref(), self.row)?))
            })
            .collect()
    }

    pub fn survey(&self) -> Result<String, CatalogError> {
        self.string_field(SURVEY_COLUMN)
    }

    pub fn program(&self) -> Result<String, CatalogError> {
        self.string_field(PROGRAM_COLUMN)
    }

    pub fn healpix(&self) -> Result<u64, CatalogError> {
        match self.field(HEALPIX_COLUMN)? {
            FieldValue::Null => Err(CatalogError::invalid_field(HEALPIX_COLUMN, "missing value")),
            value => value.as_u64().ok_or_else(|| {
                CatalogError::invalid_field(
                    HEALPIX_COLUMN,
                    format!("expected a non-negative integer, found {:?}", value),
                )
            }),
        }
    }

    fn string_field(&self, name: &str) -> Result<String, CatalogError> {
        match self.field(name)? {
            FieldValue::Str(value) => Ok(value),
            FieldValue::Null => Err(CatalogError::invalid_field(name, "missing value")),
            value => Err(CatalogError::invalid_field(
                name,
                format!("expected a string, found {:?}", value),
            )),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use arrow::{
        array::{
            BooleanArray, FixedSizeListArray, Float32Array, Float64Array, Int32Array, Int64Array,
            StringArray,
        },
        datatypes::{Field, Schema},
    };

    use super::*;

    pub(crate) fn catalog_batch(identifiers: Vec<i64>) -> RecordBatch {
        let n = identifiers.len();
        let coeff_item = Arc::new(Field::new("item", DataType::Float32, true));
        let schema = Arc::new(Schema::new(vec![
            Field::new("TARGETID", DataType::Int64, false),
            Field::new("SURVEY", DataType::Utf8, true),
            Field::new("PROGRAM", DataType::Utf8, true),
            Field::new("HEALPIX", DataType::Int32, true),
            Field::new("Z", DataType::Float64, true),
            Field::new("ZWARN", DataType::Boolean, true),
            Field::new(
                "COEFF",
                DataType::FixedSizeList(coeff_item.clone(), 2),
                true,
            ),
        ]));

        let coeff_values = Float32Array::from_iter_values((0..n * 2).map(|v| v as f32));
        let coeff = FixedSizeListArray::try_new(coeff_item, 2, Arc::new(coeff_values), None).unwrap();

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(identifiers)),
                Arc::new(StringArray::from_iter_values((0..n).map(|_| "main"))),
                Arc::new(StringArray::from_iter_values((0..n).map(|_| "dark"))),
                Arc::new(Int32Array::from_iter_values((0..n).map(|i| 9103 + i as i32))),
                Arc::new(Float64Array::from_iter(
                    (0..n).map(|i| if i % 2 == 0 { Some(0.5 * i as f64) } else { None }),
                )),
                Arc::new(BooleanArray::from_iter((0..n).map(|i| Some(i == 0)))),
                Arc::new(coeff),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_lookup() {
        let index = CatalogIndex::from_record_batch(catalog_batch(vec![
            39633345008634311,
            39633345008634312,
            7,
        ]))
        .unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.lookup(7).unwrap().row_number(), 2);

        let row = index.lookup(39633345008634312).unwrap();
        assert_eq!(row.row_number(), 1);
        assert_eq!(
            row.to_map().unwrap()["TARGETID"],
            FieldValue::Int(39633345008634312)
        );
        assert_eq!(row.survey().unwrap(), "main");
        assert_eq!(row.program().unwrap(), "dark");
        assert_eq!(row.healpix().unwrap(), 9104);
    }

    #[test]
    fn test_lookup_missing_identifier() {
        let index = CatalogIndex::from_record_batch(catalog_batch(vec![1, 2])).unwrap();
        let err = index.lookup(3).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(3)));
    }

    #[test]
    fn test_duplicate_identifier() {
        let err = CatalogIndex::from_record_batch(catalog_batch(vec![1, 2, 1])).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateIdentifier(1)));
    }

    #[test]
    fn test_missing_required_column() {
        let batch = catalog_batch(vec![1]);
        let healpix = batch.schema().index_of("HEALPIX").unwrap();
        let mut batch = batch;
        batch.remove_column(healpix);

        let err = CatalogIndex::from_record_batch(batch).unwrap_err();
        assert!(matches!(err, CatalogError::MissingColumn(column) if column == "HEALPIX"));
    }

    #[test]
    fn test_to_map_normalizes_values() {
        let index = CatalogIndex::from_record_batch(catalog_batch(vec![1, 2])).unwrap();
        let map = index.lookup(2).unwrap().to_map().unwrap();

        let keys = map.keys().map(String::as_str).collect::<Vec<_>>();
        assert_eq!(
            keys,
            vec!["TARGETID", "SURVEY", "PROGRAM", "HEALPIX", "Z", "ZWARN", "COEFF"]
        );
        assert_eq!(map["Z"], FieldValue::Null);
        assert_eq!(map["ZWARN"], FieldValue::Bool(false));
        assert_eq!(
            map["COEFF"],
            FieldValue::List(vec![FieldValue::Float(2.0), FieldValue::Float(3.0)])
        );
    }

    #[test]
    fn test_negative_healpix_is_invalid() {
        let batch = catalog_batch(vec![1]);
        let schema = batch.schema();
        let mut columns = batch.columns().to_vec();
        columns[3] = Arc::new(Int32Array::from(vec![-5]));
        let batch = RecordBatch::try_new(schema, columns).unwrap();

        let index = CatalogIndex::from_record_batch(batch).unwrap();
        let err = index.lookup(1).unwrap().healpix().unwrap_err();
        assert!(matches!(err, CatalogError::InvalidField { field, .. } if field == "HEALPIX"));
    }

    #[test]
    fn test_build_reports_load_error() {
        let err = CatalogIndex::build("/definitely/not/here/zall.nc").unwrap_err();
        match err {
            CatalogError::CatalogLoad { inner, .. } => {
                assert!(matches!(*inner, CatalogError::FileNotFound(_)))
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
