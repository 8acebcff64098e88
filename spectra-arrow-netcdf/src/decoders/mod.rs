use std::{fmt::Debug, sync::Arc};

use arrow::{
    array::{make_array, Array, ArrayRef, Scalar},
    buffer::NullBuffer,
    datatypes::{DataType, Field},
};
use netcdf::{
    types::{FloatType, IntType, NcVariableType},
    Extents,
};

use crate::{error::ArrowNetCDFError, NcResult};

pub mod strings;

pub use strings::StringVariableDecoder;

pub trait VariableDecoder: Debug + Send + Sync {
    fn read(&self, variable: &netcdf::Variable, extents: Extents) -> NcResult<ArrayRef>;
    fn arrow_field(&self) -> &Field;
    fn variable_name(&self) -> &str {
        self.arrow_field().name()
    }
    /// Values equal to `fill_scalar` become nulls.
    fn mask_fill_values(
        &self,
        array: ArrayRef,
        fill_scalar: Scalar<ArrayRef>,
    ) -> NcResult<ArrayRef> {
        let valid = match arrow::compute::kernels::cmp::neq(&array, &fill_scalar) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!(
                    "Failed to compare variable {} with its fill value: {}. Returning unmasked values.",
                    self.variable_name(),
                    e
                );
                return Ok(array);
            }
        };

        if valid.true_count() == valid.len() {
            return Ok(array);
        }

        let data = array
            .to_data()
            .into_builder()
            .nulls(Some(NullBuffer::new(valid.values().clone())))
            .build()?;

        Ok(make_array(data))
    }
}

/// Maps a numeric netCDF type onto its arrow counterpart.
pub fn arrow_data_type(nc_type: &NcVariableType) -> Option<DataType> {
    let data_type = match nc_type {
        NcVariableType::Int(IntType::U8) => DataType::UInt8,
        NcVariableType::Int(IntType::U16) => DataType::UInt16,
        NcVariableType::Int(IntType::U32) => DataType::UInt32,
        NcVariableType::Int(IntType::U64) => DataType::UInt64,
        NcVariableType::Int(IntType::I8) => DataType::Int8,
        NcVariableType::Int(IntType::I16) => DataType::Int16,
        NcVariableType::Int(IntType::I32) => DataType::Int32,
        NcVariableType::Int(IntType::I64) => DataType::Int64,
        NcVariableType::Float(FloatType::F32) => DataType::Float32,
        NcVariableType::Float(FloatType::F64) => DataType::Float64,
        _ => return None,
    };
    Some(data_type)
}

macro_rules! read_primitive {
    ($variable:expr, $extents:expr, $t:ty, $array:ty) => {{
        let values = $variable.get_values::<$t, _>($extents)?;
        Arc::new(<$array>::from(values)) as ArrayRef
    }};
}

macro_rules! fill_scalar {
    ($variable:expr, $t:ty, $array:ty) => {{
        $variable
            .fill_value::<$t>()?
            .map(|fill| Arc::new(<$array>::from(vec![fill])) as ArrayRef)
    }};
}

#[derive(Debug)]
pub struct DefaultVariableDecoder {
    pub arrow_field: Field,
    pub nc_type: NcVariableType,
    pub fill_value: Option<ArrayRef>,
}

impl DefaultVariableDecoder {
    pub fn from_variable(variable: &netcdf::Variable) -> NcResult<Self> {
        let nc_type = variable.vartype();
        let data_type = arrow_data_type(&nc_type)
            .ok_or_else(|| ArrowNetCDFError::UnsupportedNetCDFDataType(nc_type.clone()))?;

        let fill_value = match nc_type {
            NcVariableType::Int(IntType::U8) => fill_scalar!(variable, u8, arrow::array::UInt8Array),
            NcVariableType::Int(IntType::U16) => {
                fill_scalar!(variable, u16, arrow::array::UInt16Array)
            }
            NcVariableType::Int(IntType::U32) => {
                fill_scalar!(variable, u32, arrow::array::UInt32Array)
            }
            NcVariableType::Int(IntType::U64) => {
                fill_scalar!(variable, u64, arrow::array::UInt64Array)
            }
            NcVariableType::Int(IntType::I8) => fill_scalar!(variable, i8, arrow::array::Int8Array),
            NcVariableType::Int(IntType::I16) => {
                fill_scalar!(variable, i16, arrow::array::Int16Array)
            }
            NcVariableType::Int(IntType::I32) => {
                fill_scalar!(variable, i32, arrow::array::Int32Array)
            }
            NcVariableType::Int(IntType::I64) => {
                fill_scalar!(variable, i64, arrow::array::Int64Array)
            }
            NcVariableType::Float(FloatType::F32) => {
                fill_scalar!(variable, f32, arrow::array::Float32Array)
            }
            NcVariableType::Float(FloatType::F64) => {
                fill_scalar!(variable, f64, arrow::array::Float64Array)
            }
            _ => None,
        };

        Ok(Self {
            arrow_field: Field::new(variable.name(), data_type, true),
            nc_type,
            fill_value,
        })
    }
}

impl VariableDecoder for DefaultVariableDecoder {
    fn arrow_field(&self) -> &Field {
        &self.arrow_field
    }

    fn read(&self, variable: &netcdf::Variable, extents: Extents) -> NcResult<ArrayRef> {
        let array = match self.nc_type {
            NcVariableType::Int(IntType::U8) => {
                read_primitive!(variable, extents, u8, arrow::array::UInt8Array)
            }
            NcVariableType::Int(IntType::U16) => {
                read_primitive!(variable, extents, u16, arrow::array::UInt16Array)
            }
            NcVariableType::Int(IntType::U32) => {
                read_primitive!(variable, extents, u32, arrow::array::UInt32Array)
            }
            NcVariableType::Int(IntType::U64) => {
                read_primitive!(variable, extents, u64, arrow::array::UInt64Array)
            }
            NcVariableType::Int(IntType::I8) => {
                read_primitive!(variable, extents, i8, arrow::array::Int8Array)
            }
            NcVariableType::Int(IntType::I16) => {
                read_primitive!(variable, extents, i16, arrow::array::Int16Array)
            }
            NcVariableType::Int(IntType::I32) => {
                read_primitive!(variable, extents, i32, arrow::array::Int32Array)
            }
            NcVariableType::Int(IntType::I64) => {
                read_primitive!(variable, extents, i64, arrow::array::Int64Array)
            }
            NcVariableType::Float(FloatType::F32) => {
                read_primitive!(variable, extents, f32, arrow::array::Float32Array)
            }
            NcVariableType::Float(FloatType::F64) => {
                read_primitive!(variable, extents, f64, arrow::array::Float64Array)
            }
            _ => {
                return Err(ArrowNetCDFError::UnsupportedNetCDFDataType(
                    self.nc_type.clone(),
                ))
            }
        };

        if let Some(fill_array) = &self.fill_value {
            self.mask_fill_values(array, Scalar::new(fill_array.clone()))
        } else {
            Ok(array)
        }
    }
}

/// Picks the decoder matching the variable's on-disk type.
pub fn decoder_for(variable: &netcdf::Variable) -> NcResult<Box<dyn VariableDecoder>> {
    match variable.vartype() {
        NcVariableType::Char | NcVariableType::String => {
            Ok(Box::new(StringVariableDecoder::from_variable(variable)?))
        }
        _ => Ok(Box::new(DefaultVariableDecoder::from_variable(variable)?)),
    }
}
