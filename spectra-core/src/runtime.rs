use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use indexmap::IndexMap;
use spectra_catalog::{CatalogError, CatalogIndex, FieldValue};
use spectra_partition::{Arm, PartitionResolver};

use crate::{
    assembler::SpectrumAssembler,
    document::{ArmTable, SpectrumDocument},
    error::SpectrumError,
};

#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    pub healpix_root: PathBuf,
    pub partition_extension: String,
    /// Upper bound on a single partition read.
    pub io_timeout: Duration,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            healpix_root: PathBuf::from("/data/desi/healpix"),
            partition_extension: "nc".to_string(),
            io_timeout: Duration::from_secs(30),
        }
    }
}

/// Shared service state. The catalog is loaded once and never mutated, so
/// the runtime can be handed to every request through an `Arc` without
/// locking.
#[derive(Debug)]
pub struct Runtime {
    assembler: Arc<SpectrumAssembler>,
    io_timeout: Duration,
}

impl Runtime {
    /// Loads the catalog from `catalog_path`. Fails if the catalog cannot be
    /// read, in which case the service must not start.
    pub fn init<P: AsRef<Path>>(
        catalog_path: P,
        options: RuntimeOptions,
    ) -> Result<Self, CatalogError> {
        let catalog = CatalogIndex::build(catalog_path)?;
        Ok(Self::new(Arc::new(catalog), options))
    }

    pub fn new(catalog: Arc<CatalogIndex>, options: RuntimeOptions) -> Self {
        tracing::info!(
            "Serving spectra from {} (*.{})",
            options.healpix_root.display(),
            options.partition_extension
        );
        let resolver = PartitionResolver::new(options.healpix_root, &options.partition_extension);
        Self {
            assembler: Arc::new(SpectrumAssembler::new(catalog, resolver)),
            io_timeout: options.io_timeout,
        }
    }

    pub fn catalog(&self) -> &CatalogIndex {
        self.assembler.catalog()
    }

    pub fn healpix_root(&self) -> &Path {
        self.assembler.resolver().root()
    }

    /// The catalog row of `identifier`, column order preserved.
    pub fn lookup_identifier(
        &self,
        identifier: i64,
    ) -> Result<IndexMap<String, FieldValue>, SpectrumError> {
        Ok(self.catalog().lookup(identifier)?.to_map()?)
    }

    pub async fn get_full_spectrum(&self, identifier: i64) -> Result<SpectrumDocument, SpectrumError> {
        let assembler = self.assembler.clone();
        run_blocking(self.io_timeout, move || assembler.assemble_full(identifier)).await
    }

    /// `arm` defaults to `R`. An unknown identifier is `NotFound` whatever the
    /// arm; the arm is validated after the catalog lookup and before the
    /// partition is touched.
    pub async fn get_arm_table(
        &self,
        identifier: i64,
        arm: Option<&str>,
    ) -> Result<ArmTable, SpectrumError> {
        self.catalog().lookup(identifier)?;
        let arm = match arm {
            Some(arm) => arm.parse::<Arm>()?,
            None => Arm::default(),
        };
        let assembler = self.assembler.clone();
        run_blocking(self.io_timeout, move || assembler.assemble_arm(identifier, arm)).await
    }
}

/// Runs `f` on the blocking pool. The task is abandoned, not cancelled, once
/// `timeout` elapses; it finishes in the background and closes its file.
pub async fn run_blocking<T, F>(timeout: Duration, f: F) -> Result<T, SpectrumError>
where
    F: FnOnce() -> Result<T, SpectrumError> + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::task::spawn_blocking(f);
    match tokio::time::timeout(timeout, task).await {
        Ok(joined) => joined?,
        Err(_) => {
            tracing::warn!("Partition read exceeded {:?}", timeout);
            Err(SpectrumError::Timeout(timeout))
        }
    }
}

#[cfg(test)]
mod tests {
    use spectra_partition::fixtures::{CatalogEntry, CoaddFixture};

    use super::*;
    use crate::{error::ErrorKind, test_util::TestArchive};

    const TARGETID: i64 = 39633345008634311;

    fn runtime() -> (TestArchive, Runtime) {
        let archive = TestArchive::new(vec![
            CatalogEntry::new(TARGETID, "main", "dark", 9103),
            CatalogEntry::new(616094114412233066, "sv3", "bright", 26965),
        ]);
        archive.write(
            0,
            &CoaddFixture::new(vec![1, TARGETID]).without_arm(Arm::Z),
        );
        let runtime = Runtime::new(archive.catalog.clone(), archive.options());
        (archive, runtime)
    }

    #[test]
    fn test_lookup_identifier() {
        let (_archive, runtime) = runtime();

        let row = runtime.lookup_identifier(616094114412233066).unwrap();
        assert_eq!(row["PROGRAM"], FieldValue::Str("bright".to_string()));
        assert_eq!(row["HEALPIX"], FieldValue::Int(26965));

        let err = runtime.lookup_identifier(5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_get_arm_table_default_arm() {
        let (_archive, runtime) = runtime();

        let default = runtime.get_arm_table(TARGETID, None).await.unwrap();
        let explicit = runtime.get_arm_table(TARGETID, Some("R")).await.unwrap();
        let lower = runtime.get_arm_table(TARGETID, Some("r")).await.unwrap();
        assert_eq!(default.arm(), Arm::R);
        assert_eq!(default, explicit);
        assert_eq!(default, lower);
        assert_eq!(default.len(), CoaddFixture::wave_len(Arm::R));
    }

    #[tokio::test]
    async fn test_get_arm_table_invalid_arm() {
        let (_archive, runtime) = runtime();

        let err = runtime.get_arm_table(TARGETID, Some("X")).await.unwrap_err();
        assert!(matches!(err, SpectrumError::InvalidArm { ref arm, .. } if arm == "X"));
        assert_eq!(err.kind(), ErrorKind::BadRequest);

        let err = runtime.get_arm_table(TARGETID, Some("Z")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn test_get_arm_table_unknown_identifier() {
        let (_archive, runtime) = runtime();

        for arm in [None, Some("b"), Some("X")] {
            let err = runtime.get_arm_table(-1, arm).await.unwrap_err();
            assert!(matches!(err, SpectrumError::NotFound(-1)), "{arm:?}: {err}");
            assert_eq!(err.kind(), ErrorKind::NotFound);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests() {
        let archive = TestArchive::new(vec![CatalogEntry::new(TARGETID, "main", "dark", 9103)]);
        archive.write(0, &CoaddFixture::new(vec![3, 5, TARGETID, 8]));
        let runtime = Arc::new(Runtime::new(archive.catalog.clone(), archive.options()));

        let documents = (0..8)
            .map(|_| {
                let runtime = runtime.clone();
                tokio::spawn(async move { runtime.get_full_spectrum(TARGETID).await })
            })
            .collect::<Vec<_>>();
        let tables = (0..8)
            .map(|_| {
                let runtime = runtime.clone();
                tokio::spawn(async move { runtime.get_arm_table(TARGETID, Some("b")).await })
            })
            .collect::<Vec<_>>();

        let expected = serde_json::to_vec(&runtime.get_full_spectrum(TARGETID).await.unwrap())
            .unwrap();
        for handle in documents {
            let document = handle.await.unwrap().unwrap();
            assert_eq!(serde_json::to_vec(&document).unwrap(), expected);
        }

        let expected = runtime.get_arm_table(TARGETID, Some("B")).await.unwrap();
        for handle in tables {
            assert_eq!(handle.await.unwrap().unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn test_get_full_spectrum_errors() {
        let (_archive, runtime) = runtime();

        let err = runtime.get_full_spectrum(1234).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        // Partition of the second object was never written.
        let err = runtime
            .get_full_spectrum(616094114412233066)
            .await
            .unwrap_err();
        assert!(matches!(err, SpectrumError::PartitionNotFound(_)));
        assert_eq!(err.kind(), ErrorKind::Internal);

        // Z arm missing from the file.
        let err = runtime.get_full_spectrum(TARGETID).await.unwrap_err();
        assert!(matches!(err, SpectrumError::ArrayNotFound(_)));
    }

    #[tokio::test]
    async fn test_run_blocking_timeout() {
        let timeout = Duration::from_millis(10);
        let result = run_blocking(timeout, || {
            std::thread::sleep(Duration::from_millis(200));
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(SpectrumError::Timeout(t)) if t == timeout));

        let value = run_blocking(Duration::from_secs(5), || Ok(3)).await.unwrap();
        assert_eq!(value, 3);
    }

    #[tokio::test]
    async fn test_run_blocking_panic() {
        let result: Result<(), _> = run_blocking(Duration::from_secs(5), || panic!("boom")).await;
        assert!(matches!(result, Err(SpectrumError::Join(_))));
    }
}
