use std::io::Write;

use arrow::{
    array::{Array, AsArray},
    datatypes::{DataType, Float32Type, Float64Type},
};
use spectra_core::ArmTable;

use crate::{OutputError, OutputResponse};

pub const CONTENT_TYPE: &str = "text/csv";

pub fn output(table: &ArmTable) -> Result<OutputResponse, OutputError> {
    let mut body = Vec::new();
    write_arm_table(table, &mut body)?;

    Ok(OutputResponse {
        body,
        content_type: CONTENT_TYPE,
        content_disposition: format!(
            "attachment; filename=\"coadd-{}-{}.csv\"",
            table.identifier(),
            table.arm().as_str().to_lowercase()
        ),
    })
}

/// Header `wavelength,flux,ivar,mask`, then one line per wavelength sample.
/// Wavelengths are printed with one decimal, missing values as empty fields.
pub fn write_arm_table<W: Write>(table: &ArmTable, writer: W) -> Result<(), OutputError> {
    let mut csv_writer = ::csv::WriterBuilder::new().from_writer(writer);
    csv_writer.write_record([
        ArmTable::WAVELENGTH,
        ArmTable::FLUX,
        ArmTable::IVAR,
        ArmTable::MASK,
    ])?;

    let wavelength = table.wavelength();
    let mask = table.mask();
    for row in 0..table.len() {
        let wavelength = if wavelength.is_null(row) {
            String::new()
        } else {
            format!("{:.1}", wavelength.value(row))
        };
        let mask = if mask.is_null(row) {
            String::new()
        } else {
            mask.value(row).to_string()
        };

        csv_writer.write_record([
            wavelength,
            float_cell(ArmTable::FLUX, table.flux().as_ref(), row)?,
            float_cell(ArmTable::IVAR, table.ivar().as_ref(), row)?,
            mask,
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn float_cell(column: &str, array: &dyn Array, row: usize) -> Result<String, OutputError> {
    if array.is_null(row) {
        return Ok(String::new());
    }

    let value = match array.data_type() {
        DataType::Float32 => {
            let value = array.as_primitive::<Float32Type>().value(row);
            (!value.is_nan()).then(|| value.to_string())
        }
        DataType::Float64 => {
            let value = array.as_primitive::<Float64Type>().value(row);
            (!value.is_nan()).then(|| value.to_string())
        }
        data_type => {
            return Err(OutputError::UnsupportedColumnType {
                column: column.to_string(),
                data_type: data_type.clone(),
            })
        }
    };

    Ok(value.unwrap_or_default())
}
