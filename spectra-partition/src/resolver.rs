use std::path::{Path, PathBuf};

use spectra_catalog::{CatalogError, CatalogRow};

/// Number of healpix pixels grouped into one directory bucket.
pub const HEALPIX_PER_BUCKET: u64 = 100;

pub fn bucket(healpix: u64) -> u64 {
    healpix / HEALPIX_PER_BUCKET
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionCoordinates {
    pub survey: String,
    pub program: String,
    pub healpix: u64,
}

impl PartitionCoordinates {
    pub fn from_row(row: &CatalogRow<'_>) -> Result<Self, CatalogError> {
        Ok(Self {
            survey: row.survey()?,
            program: row.program()?,
            healpix: row.healpix()?,
        })
    }

    pub fn bucket(&self) -> u64 {
        bucket(self.healpix)
    }
}

/// Location of the coadd file holding one partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionPath {
    pub coordinates: PartitionCoordinates,
    pub path: PathBuf,
}

impl AsRef<Path> for PartitionPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone)]
pub struct PartitionResolver {
    root: PathBuf,
    extension: String,
}

impl PartitionResolver {
    pub fn new<P: Into<PathBuf>>(root: P, extension: &str) -> Self {
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `{root}/{survey}/{program}/{bucket}/{healpix}/coadd-{survey}-{program}-{healpix}.{ext}`
    pub fn path_for(&self, coordinates: PartitionCoordinates) -> PartitionPath {
        let PartitionCoordinates {
            survey,
            program,
            healpix,
        } = &coordinates;

        let path = self
            .root
            .join(survey)
            .join(program)
            .join(bucket(*healpix).to_string())
            .join(healpix.to_string())
            .join(format!(
                "coadd-{}-{}-{}.{}",
                survey, program, healpix, self.extension
            ));

        PartitionPath { coordinates, path }
    }

    /// Pure function of the row's `SURVEY`, `PROGRAM` and `HEALPIX` fields.
    /// The file is not checked for existence.
    pub fn resolve(&self, row: &CatalogRow<'_>) -> Result<PartitionPath, CatalogError> {
        Ok(self.path_for(PartitionCoordinates::from_row(row)?))
    }
}
