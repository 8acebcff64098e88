pub mod arm;
pub mod error;
pub mod file;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod resolver;
pub mod row_index;
pub mod section;

pub use arm::{ArrayKind, Arm};
pub use error::PartitionError;
pub use file::PartitionFile;
pub use resolver::{PartitionCoordinates, PartitionPath, PartitionResolver};
pub use row_index::{locate, RowOffset};
pub use section::{read_full_array, read_section};

/// Group holding the per file row identifier column.
pub const FIBERMAP_GROUP: &str = "FIBERMAP";
/// Row identifier column inside [`FIBERMAP_GROUP`].
pub const ROW_IDENTIFIER_VARIABLE: &str = "TARGETID";
/// Group holding the per row quality scores.
pub const SCORES_GROUP: &str = "SCORES";
