use std::{path::PathBuf, time::Duration};

use envconfig::Envconfig;
use lazy_static::lazy_static;

#[derive(Debug, Envconfig)]
pub struct Config {
    #[envconfig(from = "SPECTRA_PORT", default = "5001")]
    pub port: u16,
    #[envconfig(from = "SPECTRA_HOST", default = "0.0.0.0")]
    pub host: String,
    #[envconfig(from = "SPECTRA_LOG_LEVEL", default = "info")]
    pub log_level: String,
    /// Catalog table (netCDF or Arrow IPC) loaded once at startup
    #[envconfig(from = "SPECTRA_CATALOG_PATH", default = "/data/desi/zall-pix-fuji.nc")]
    pub catalog_path: PathBuf,
    /// Root of the `{survey}/{program}/{bucket}/{healpix}` partition tree
    #[envconfig(from = "SPECTRA_HEALPIX_ROOT", default = "/data/desi/healpix")]
    pub healpix_root: PathBuf,
    #[envconfig(from = "SPECTRA_PARTITION_EXTENSION", default = "nc")]
    pub partition_extension: String,
    //Upper bound for the partition reads of a single request, in seconds
    #[envconfig(from = "SPECTRA_IO_TIMEOUT_SECS", default = "30")]
    pub io_timeout_secs: u64,
    #[envconfig(from = "SPECTRA_WORKER_THREADS", default = "8")]
    pub worker_threads: usize,
}

impl Config {
    pub fn init() -> Config {
        Config::init_from_env().expect("Failed to load config")
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs)
    }
}

lazy_static! {
    pub static ref CONFIG: Config = Config::init();
}
