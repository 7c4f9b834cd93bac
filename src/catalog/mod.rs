/// Catalog data model: identifiers and the records stored for them

pub mod identifier;
pub mod records;

pub use identifier::{Identifier, RecordKind};
pub use records::{AssetRecord, Record, ShowRecord, UNKNOWN};
