use arrow::{
    array::{Array, AsArray},
    datatypes::{
        DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
        UInt16Type, UInt32Type, UInt64Type, UInt8Type,
    },
    util::display::array_value_to_string,
};

use crate::error::CatalogError;

/// Storage independent value of a single catalog or partition field.
///
/// Arrow nulls, netCDF fill values and non finite floats are all surfaced
/// as [`FieldValue::Null`].
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::Int(v) => u64::try_from(*v).ok(),
            FieldValue::UInt(v) => Some(*v),
            _ => None,
        }
    }
}

fn float(value: f64) -> FieldValue {
    if value.is_finite() {
        FieldValue::Float(value)
    } else {
        FieldValue::Null
    }
}

/// Normalized value of `array[index]`.
pub fn field_value(array: &dyn Array, index: usize) -> Result<FieldValue, CatalogError> {
    if array.is_null(index) {
        return Ok(FieldValue::Null);
    }

    let value = match array.data_type() {
        DataType::Boolean => FieldValue::Bool(array.as_boolean().value(index)),
        DataType::Int8 => FieldValue::Int(array.as_primitive::<Int8Type>().value(index) as i64),
        DataType::Int16 => FieldValue::Int(array.as_primitive::<Int16Type>().value(index) as i64),
        DataType::Int32 => FieldValue::Int(array.as_primitive::<Int32Type>().value(index) as i64),
        DataType::Int64 => FieldValue::Int(array.as_primitive::<Int64Type>().value(index)),
        DataType::UInt8 => FieldValue::UInt(array.as_primitive::<UInt8Type>().value(index) as u64),
        DataType::UInt16 => {
            FieldValue::UInt(array.as_primitive::<UInt16Type>().value(index) as u64)
        }
        DataType::UInt32 => {
            FieldValue::UInt(array.as_primitive::<UInt32Type>().value(index) as u64)
        }
        DataType::UInt64 => FieldValue::UInt(array.as_primitive::<UInt64Type>().value(index)),
        DataType::Float32 => float(array.as_primitive::<Float32Type>().value(index) as f64),
        DataType::Float64 => float(array.as_primitive::<Float64Type>().value(index)),
        DataType::Utf8 => FieldValue::Str(array.as_string::<i32>().value(index).to_string()),
        DataType::LargeUtf8 => FieldValue::Str(array.as_string::<i64>().value(index).to_string()),
        DataType::FixedSizeList(_, _) => {
            FieldValue::List(values(array.as_fixed_size_list().value(index).as_ref())?)
        }
        DataType::List(_) => FieldValue::List(values(array.as_list::<i32>().value(index).as_ref())?),
        DataType::LargeList(_) => {
            FieldValue::List(values(array.as_list::<i64>().value(index).as_ref())?)
        }
        _ => FieldValue::Str(array_value_to_string(array, index)?),
    };

    Ok(value)
}

/// Normalized values of the whole array, in order.
pub fn values(array: &dyn Array) -> Result<Vec<FieldValue>, CatalogError> {
    (0..array.len()).map(|i| field_value(array, i)).collect()
}
