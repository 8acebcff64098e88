use std::sync::Arc;

use arrow::{
    array::{ArrayRef, StringArray},
    datatypes::{DataType, Field},
};
use netcdf::types::NcVariableType;

use crate::{decoders::VariableDecoder, error::ArrowNetCDFError, NcResult};

/// Decodes `char` arrays (last dimension is the string length) and
/// variable length `string` variables. Empty strings are read as nulls.
#[derive(Debug)]
pub struct StringVariableDecoder {
    pub arrow_field: Field,
    pub nc_type: NcVariableType,
    pub string_length: Option<usize>,
}

impl StringVariableDecoder {
    pub fn from_variable(variable: &netcdf::Variable) -> NcResult<Self> {
        let nc_type = variable.vartype();
        let string_length = match nc_type {
            NcVariableType::Char => variable.dimensions().last().map(|d| d.len()),
            NcVariableType::String => None,
            _ => return Err(ArrowNetCDFError::UnsupportedNetCDFDataType(nc_type)),
        };

        Ok(Self {
            arrow_field: Field::new(variable.name(), DataType::Utf8, true),
            nc_type,
            string_length,
        })
    }
}

fn decode_fixed_string(bytes: &[u8]) -> Option<String> {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    let string = String::from_utf8_lossy(&bytes[..end]);
    let trimmed = string.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl VariableDecoder for StringVariableDecoder {
    fn arrow_field(&self) -> &Field {
        &self.arrow_field
    }

    fn read(&self, variable: &netcdf::Variable, extents: netcdf::Extents) -> NcResult<ArrayRef> {
        match self.nc_type {
            NcVariableType::Char => {
                let raw = variable.get_raw_values(extents)?;
                let string_length = self.string_length.unwrap_or(1).max(1);
                let array = StringArray::from_iter(raw.chunks(string_length).map(decode_fixed_string));
                Ok(Arc::new(array))
            }
            NcVariableType::String => {
                let strings = variable.get_strings(extents)?;
                let array = StringArray::from_iter(strings.into_iter().map(|s| {
                    let trimmed = s.trim();
                    (!trimmed.is_empty()).then(|| trimmed.to_string())
                }));
                Ok(Arc::new(array))
            }
            _ => Err(ArrowNetCDFError::UnsupportedNetCDFDataType(
                self.nc_type.clone(),
            )),
        }
    }
}
