pub mod assembler;
pub mod document;
pub mod error;
pub mod runtime;

#[cfg(test)]
pub(crate) mod test_util;

pub use assembler::{SpectrumAssembler, SpectrumRecord};
pub use document::{ArmTable, SpectrumDocument};
pub use error::{ErrorKind, SpectrumError};
pub use runtime::{run_blocking, Runtime, RuntimeOptions};
