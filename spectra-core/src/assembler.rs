use std::sync::Arc;

use arrow::array::{Array, ArrayRef};
use indexmap::IndexMap;
use spectra_catalog::{
    value::{field_value, values},
    CatalogIndex, CatalogRow, FieldValue,
};
use spectra_partition::{
    ArrayKind, Arm, PartitionFile, PartitionPath, PartitionResolver, RowOffset, SCORES_GROUP,
};

use crate::{
    document::{ArmTable, SpectrumDocument},
    error::SpectrumError,
};

/// A located object: the partition file holding it is open and its row is
/// known. The file is closed when the record is dropped.
#[derive(Debug)]
pub struct SpectrumRecord {
    pub identifier: i64,
    pub partition: PartitionPath,
    pub row: RowOffset,
    file: PartitionFile,
}

/// Wavelength grid plus the per row arrays of one arm.
#[derive(Debug, Clone)]
pub struct ArmArrays {
    pub wavelength: ArrayRef,
    pub flux: ArrayRef,
    pub ivar: ArrayRef,
    pub mask: ArrayRef,
}

impl ArmArrays {
    pub fn iter(&self) -> impl Iterator<Item = (ArrayKind, &ArrayRef)> {
        [
            (ArrayKind::Wavelength, &self.wavelength),
            (ArrayKind::Flux, &self.flux),
            (ArrayKind::Ivar, &self.ivar),
            (ArrayKind::Mask, &self.mask),
        ]
        .into_iter()
    }
}

impl SpectrumRecord {
    pub fn has_arm(&self, arm: Arm) -> bool {
        self.file.has_array(&arm.array_name(ArrayKind::Wavelength))
    }

    /// Every variable of the scores group at this record's row.
    pub fn scores(&self) -> Result<IndexMap<String, FieldValue>, SpectrumError> {
        self.file
            .read_record(SCORES_GROUP, self.row)?
            .into_iter()
            .map(|score| -> Result<(String, FieldValue), SpectrumError> {
                let value = if score.is_scalar() {
                    field_value(score.values.as_ref(), 0)?
                } else {
                    FieldValue::List(values(score.values.as_ref())?)
                };
                Ok((score.name, value))
            })
            .collect()
    }

    pub fn arm_arrays(&self, arm: Arm) -> Result<ArmArrays, SpectrumError> {
        let wavelength = self
            .file
            .read_full_array(&arm.array_name(ArrayKind::Wavelength))?;
        let samples = wavelength.len();

        Ok(ArmArrays {
            flux: self.read_row_array(arm, ArrayKind::Flux, samples)?,
            ivar: self.read_row_array(arm, ArrayKind::Ivar, samples)?,
            mask: self.read_row_array(arm, ArrayKind::Mask, samples)?,
            wavelength,
        })
    }

    fn read_row_array(
        &self,
        arm: Arm,
        kind: ArrayKind,
        samples: usize,
    ) -> Result<ArrayRef, SpectrumError> {
        let array_name = arm.array_name(kind);
        let array = self.file.read_section(&array_name, self.row)?;
        if array.len() != samples {
            return Err(SpectrumError::ShapeMismatch {
                array: array_name,
                expected: samples,
                actual: array.len(),
            });
        }
        Ok(array)
    }
}

/// Synchronous lookup pipeline: catalog row, partition path, row offset and
/// finally the arrays. Callers on an async runtime go through
/// [`crate::Runtime`] which moves this work onto the blocking pool.
#[derive(Debug, Clone)]
pub struct SpectrumAssembler {
    catalog: Arc<CatalogIndex>,
    resolver: PartitionResolver,
}

impl SpectrumAssembler {
    pub fn new(catalog: Arc<CatalogIndex>, resolver: PartitionResolver) -> Self {
        Self { catalog, resolver }
    }

    pub fn catalog(&self) -> &CatalogIndex {
        &self.catalog
    }

    pub fn resolver(&self) -> &PartitionResolver {
        &self.resolver
    }

    pub fn open_record(
        &self,
        identifier: i64,
    ) -> Result<(CatalogRow<'_>, SpectrumRecord), SpectrumError> {
        let row = self.catalog.lookup(identifier)?;
        let partition = self.resolver.resolve(&row)?;
        let file = PartitionFile::open(&partition)?;
        let offset = file.locate(identifier)?;

        Ok((
            row,
            SpectrumRecord {
                identifier,
                partition,
                row: offset,
                file,
            },
        ))
    }

    pub fn assemble_full(&self, identifier: i64) -> Result<SpectrumDocument, SpectrumError> {
        let (row, record) = self.open_record(identifier)?;

        let zall_pix_info = row.to_map()?;
        let scores = record.scores()?;

        let mut data = IndexMap::new();
        for arm in Arm::ALL {
            let arrays = record.arm_arrays(arm)?;
            for (kind, array) in arrays.iter() {
                data.insert(arm.document_key(kind), values(array.as_ref())?);
            }
        }

        tracing::debug!(
            "Assembled spectrum of TARGETID {} from row {} of {}",
            identifier,
            record.row,
            record.partition.path.display()
        );

        Ok(SpectrumDocument {
            zall_pix_info,
            scores,
            data,
        })
    }

    pub fn assemble_arm(&self, identifier: i64, arm: Arm) -> Result<ArmTable, SpectrumError> {
        let (_, record) = self.open_record(identifier)?;

        if !record.has_arm(arm) {
            return Err(SpectrumError::InvalidArm {
                arm: arm.to_string(),
                reason: format!(
                    "{} is not present in {}",
                    arm.array_name(ArrayKind::Wavelength),
                    record.partition.path.display()
                ),
            });
        }

        let ArmArrays {
            wavelength,
            flux,
            ivar,
            mask,
        } = record.arm_arrays(arm)?;

        ArmTable::try_new(identifier, arm, wavelength, flux, ivar, mask)
    }
}
