use std::sync::Arc;

use arrow::{
    array::{Array, ArrayRef, AsArray},
    compute::cast,
    datatypes::{DataType, Field, Float64Type, Int64Type, Schema, SchemaRef},
    record_batch::RecordBatch,
};
use indexmap::IndexMap;
use spectra_catalog::FieldValue;
use spectra_partition::Arm;

use crate::error::SpectrumError;

/// Everything known about one object: its catalog row, its quality scores
/// and the spectral arrays of all three arms.
#[derive(Debug, Clone, PartialEq, serde::Serialize, utoipa::ToSchema)]
pub struct SpectrumDocument {
    #[schema(value_type = Object)]
    pub zall_pix_info: IndexMap<String, FieldValue>,
    #[schema(value_type = Object)]
    pub scores: IndexMap<String, FieldValue>,
    /// `b_wavelength`, `b_flux`, `b_ivar`, `b_mask`, then the same for `r` and `z`.
    #[schema(value_type = Object)]
    pub data: IndexMap<String, Vec<FieldValue>>,
}

/// Spectral arrays of a single arm laid out as a table, one row per
/// wavelength sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmTable {
    identifier: i64,
    arm: Arm,
    batch: RecordBatch,
}

impl ArmTable {
    pub const WAVELENGTH: &'static str = "wavelength";
    pub const FLUX: &'static str = "flux";
    pub const IVAR: &'static str = "ivar";
    pub const MASK: &'static str = "mask";

    /// Columns have to be of equal length. The wavelength grid is widened to
    /// `Float64` and the mask to `Int64`; flux and ivar keep their stored type.
    pub fn try_new(
        identifier: i64,
        arm: Arm,
        wavelength: ArrayRef,
        flux: ArrayRef,
        ivar: ArrayRef,
        mask: ArrayRef,
    ) -> Result<Self, SpectrumError> {
        let wavelength = cast(&wavelength, &DataType::Float64)?;
        let mask = cast(&mask, &DataType::Int64)?;

        let schema: SchemaRef = Arc::new(Schema::new(vec![
            Field::new(Self::WAVELENGTH, DataType::Float64, true),
            Field::new(Self::FLUX, flux.data_type().clone(), true),
            Field::new(Self::IVAR, ivar.data_type().clone(), true),
            Field::new(Self::MASK, DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(schema, vec![wavelength, flux, ivar, mask])?;

        Ok(Self {
            identifier,
            arm,
            batch,
        })
    }

    pub fn identifier(&self) -> i64 {
        self.identifier
    }

    pub fn arm(&self) -> Arm {
        self.arm
    }

    pub fn len(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    pub fn record_batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn wavelength(&self) -> &arrow::array::Float64Array {
        self.batch.column(0).as_primitive::<Float64Type>()
    }

    pub fn flux(&self) -> &ArrayRef {
        self.batch.column(1)
    }

    pub fn ivar(&self) -> &ArrayRef {
        self.batch.column(2)
    }

    pub fn mask(&self) -> &arrow::array::Int64Array {
        self.batch.column(3).as_primitive::<Int64Type>()
    }
}

#[cfg(test)]
mod tests {
    use arrow::array::{Float32Array, Float64Array, Int32Array};

    use super::*;

    #[test]
    fn test_arm_table_columns() {
        let table = ArmTable::try_new(
            7,
            Arm::R,
            Arc::new(Float64Array::from(vec![5760.0, 5760.8])),
            Arc::new(Float32Array::from(vec![0.1, 0.2])),
            Arc::new(Float32Array::from(vec![1.0, 0.5])),
            Arc::new(Int32Array::from(vec![0, 1])),
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.arm(), Arm::R);
        assert_eq!(table.identifier(), 7);
        assert_eq!(table.wavelength().values().to_vec(), vec![5760.0, 5760.8]);
        assert_eq!(table.flux().data_type(), &DataType::Float32);
        assert_eq!(table.mask().values().to_vec(), vec![0i64, 1]);

        let names = table
            .record_batch()
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["wavelength", "flux", "ivar", "mask"]);
    }

    #[test]
    fn test_arm_table_unequal_columns() {
        let result = ArmTable::try_new(
            7,
            Arm::B,
            Arc::new(Float64Array::from(vec![1.0, 2.0, 3.0])),
            Arc::new(Float32Array::from(vec![0.1, 0.2])),
            Arc::new(Float32Array::from(vec![1.0, 0.5])),
            Arc::new(Int32Array::from(vec![0, 1])),
        );
        assert!(matches!(result, Err(SpectrumError::Arrow(_))));
    }
}
