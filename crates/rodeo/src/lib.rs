//! Rodeo: catalog a directory tree of heterogeneous files into relational
//! table schemas.
//!
//! Every directory becomes a table with one row per file; structured files
//! (CSVs) get a table of their own whose columns are typed from the first
//! data row. Pluggable predictors add derived columns: image labels, text
//! sentiment, years and units mentioned in free text.
//!
//! # Core Principles
//!
//! - **Deterministic**: the same tree always yields the same ordered schemas
//! - **File-scoped failures**: a bad file is skipped, never fatal
//! - **Explicit enrichment**: every bonus column records the predictor that owns it
//!
//! # Example
//!
//! ```no_run
//! use rodeo::Rodeo;
//!
//! let rodeo = Rodeo::new();
//! let catalog = rodeo.wrangle("datasets/").unwrap();
//!
//! for table in catalog.tables() {
//!     println!("{}", table.descriptor().create_command());
//! }
//! ```

pub mod error;
pub mod extract;
pub mod generate;
pub mod inference;
pub mod input;
pub mod predict;
pub mod preview;
pub mod schema;

mod rodeo;

pub use crate::rodeo::{Catalog, Rodeo, RodeoConfig, SkippedFile};
pub use error::{Result, RodeoError};
pub use extract::{find_extractor, Extractor};
pub use generate::{find_generator, GeneratedSchema, SchemaGenerator, SchemaOptions};
pub use inference::classify;
pub use input::{DataTable, Parser, ParserConfig};
pub use predict::{
    Domain, FieldValue, Prediction, Predictor, PredictorId, PredictorRegistry, Subject,
};
pub use preview::SamplePreview;
pub use schema::{sanitize_name, ColumnDef, PrimitiveType, Table, TableDescriptor, TableKind};
