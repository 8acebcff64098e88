use std::sync::Arc;

use spectra_catalog::CatalogIndex;
use spectra_partition::{
    fixtures::{catalog_batch, write_partition, CatalogEntry, CoaddFixture},
    PartitionResolver,
};
use tempfile::TempDir;

use crate::{assembler::SpectrumAssembler, runtime::RuntimeOptions};

/// A catalog plus a healpix tree inside a temporary directory.
pub(crate) struct TestArchive {
    pub dir: TempDir,
    pub entries: Vec<CatalogEntry>,
    pub catalog: Arc<CatalogIndex>,
}

impl TestArchive {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let catalog = CatalogIndex::from_record_batch(catalog_batch(&entries)).unwrap();
        Self {
            dir: TempDir::new().unwrap(),
            entries,
            catalog: Arc::new(catalog),
        }
    }

    pub fn resolver(&self) -> PartitionResolver {
        PartitionResolver::new(self.dir.path(), "nc")
    }

    pub fn options(&self) -> RuntimeOptions {
        RuntimeOptions {
            healpix_root: self.dir.path().to_path_buf(),
            ..RuntimeOptions::default()
        }
    }

    pub fn assembler(&self) -> SpectrumAssembler {
        SpectrumAssembler::new(self.catalog.clone(), self.resolver())
    }

    /// Writes `fixture` as the partition of the `entry`th catalog row.
    pub fn write(&self, entry: usize, fixture: &CoaddFixture) {
        write_partition(&self.resolver(), &self.entries[entry], fixture).unwrap();
    }
}
