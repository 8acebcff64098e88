use netcdf::{types::NcVariableType, NcTypeDescriptor};

pub mod decoders;
pub mod error;
pub mod reader;

pub type NcResult<T> = std::result::Result<T, error::ArrowNetCDFError>;

/// A single byte of a netCDF `char` variable.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NcChar(pub u8);

unsafe impl NcTypeDescriptor for NcChar {
    fn type_descriptor() -> NcVariableType {
        NcVariableType::Char
    }
}
