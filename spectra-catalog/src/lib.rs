pub mod error;
pub mod index;
pub mod loader;
pub mod value;

pub use error::CatalogError;
pub use index::{CatalogIndex, CatalogRow};
pub use value::FieldValue;

pub const IDENTIFIER_COLUMN: &str = "TARGETID";
pub const SURVEY_COLUMN: &str = "SURVEY";
pub const PROGRAM_COLUMN: &str = "PROGRAM";
pub const HEALPIX_COLUMN: &str = "HEALPIX";

/// Columns every catalog has to provide to route a lookup to its partition.
pub const REQUIRED_COLUMNS: [&str; 4] = [
    IDENTIFIER_COLUMN,
    SURVEY_COLUMN,
    PROGRAM_COLUMN,
    HEALPIX_COLUMN,
];
