//! Input parsing for structured files.

mod parser;
mod source;

pub use parser::{Parser, ParserConfig};
pub use source::DataTable;
