//! Schema types for representing generated table structure.

mod column;
mod table;
mod types;

pub use column::ColumnDef;
pub use table::{Table, TableDescriptor, TableKind, sanitize_name};
pub use types::PrimitiveType;
