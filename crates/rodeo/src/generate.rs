//! Schema generation for structured (CSV-like) files.
//!
//! One header row and the first data row are enough: every header becomes a
//! primary column typed by [`classify`], and every predictor that accepts the
//! value contributes namespaced bonus columns `<prefix>_<header>_<field>`.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, RodeoError};
use crate::inference::classify;
use crate::input::{DataTable, Parser};
use crate::predict::{Domain, PredictorId, PredictorRegistry};
use crate::schema::{ColumnDef, PrimitiveType};

/// Options controlling column naming.
#[derive(Debug, Clone)]
pub struct SchemaOptions {
    /// Header renames applied before typing (reserved words in the target store).
    pub reserved_headers: Vec<(String, String)>,
    /// Namespace for bonus columns.
    pub bonus_prefix: String,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            reserved_headers: vec![
                ("timestamp".to_string(), "t_timestamp".to_string()),
                ("id".to_string(), "t_id".to_string()),
                ("string".to_string(), "t_string".to_string()),
            ],
            bonus_prefix: "rodeo".to_string(),
        }
    }
}

impl SchemaOptions {
    /// Apply the reserved-header renames to one header.
    pub fn rename_header<'a>(&'a self, header: &'a str) -> &'a str {
        self.reserved_headers
            .iter()
            .find(|(from, _)| from == header)
            .map(|(_, to)| to.as_str())
            .unwrap_or(header)
    }

    /// Bonus column name for a header and predictor field.
    pub fn bonus_name(&self, header: &str, field: &str) -> String {
        format!("{}_{}_{}", self.bonus_prefix, header, field)
    }
}

/// Which predictor fills a bonus column and from which source column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusSource {
    pub predictor: PredictorId,
    /// Predictor field the column holds.
    pub field: String,
    /// Zero-based index of the source column in the file.
    pub column: usize,
}

/// Result of one schema-generation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSchema {
    /// One column per distinct (renamed) header, in header order.
    pub primary: Vec<ColumnDef>,
    /// Source column index for each primary column.
    pub primary_sources: Vec<usize>,
    /// Predictor-contributed columns, in match order.
    pub bonus: Vec<ColumnDef>,
    /// Bonus column name -> owning predictor.
    pub bonus_sources: IndexMap<String, BonusSource>,
}

impl GeneratedSchema {
    /// Primary columns followed by bonus columns.
    pub fn columns(&self) -> Vec<ColumnDef> {
        self.primary.iter().chain(self.bonus.iter()).cloned().collect()
    }

    /// Distinct predictors owning bonus columns, in first-seen order.
    pub fn predictors(&self) -> Vec<PredictorId> {
        let mut ids = Vec::new();
        for source in self.bonus_sources.values() {
            if !ids.contains(&source.predictor) {
                ids.push(source.predictor);
            }
        }
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }
}

/// Builds a column schema for one structured file.
pub trait SchemaGenerator: Send + Sync {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Whether the generator handles this file.
    fn supports_file(&self, path: &Path) -> bool;

    /// Generate the schema for a file.
    fn extract_schema(
        &self,
        path: &Path,
        parser: &Parser,
        registry: &PredictorRegistry,
        options: &SchemaOptions,
    ) -> Result<GeneratedSchema>;
}

/// Schema generator for delimited text files.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSchemaGenerator;

impl CsvSchemaGenerator {
    const EXTENSIONS: &'static [&'static str] = &["csv", "tsv"];

    /// Generate a schema from parsed data (header plus first row).
    pub fn schema_from_table(
        table: &DataTable,
        registry: &PredictorRegistry,
        options: &SchemaOptions,
    ) -> Option<GeneratedSchema> {
        let row = table.first_row()?;

        // Mapping semantics: a repeated header keeps its first position, last type wins.
        let mut types: IndexMap<String, (PrimitiveType, usize)> = IndexMap::new();
        let mut bonus: IndexMap<String, (PrimitiveType, BonusSource)> = IndexMap::new();

        for (index, raw_header) in table.headers.iter().enumerate() {
            let header = options.rename_header(raw_header);
            let value = row.get(index).map(String::as_str).unwrap_or("");

            let inferred = classify(value);
            types.insert(header.to_string(), (inferred, index));

            for predictor in registry.find_predictors(Domain::Value(inferred), value) {
                for (field, field_type) in predictor.added_fields() {
                    let source = BonusSource {
                        predictor: predictor.id(),
                        field: field.to_string(),
                        column: index,
                    };
                    bonus.insert(options.bonus_name(header, field), (*field_type, source));
                }
            }
        }

        let mut schema = GeneratedSchema::default();
        for (name, (ty, index)) in types {
            schema.primary.push(ColumnDef::new(name, ty));
            schema.primary_sources.push(index);
        }
        for (name, (ty, source)) in bonus {
            schema.bonus.push(ColumnDef::new(name.clone(), ty));
            schema.bonus_sources.insert(name, source);
        }
        Some(schema)
    }
}

impl SchemaGenerator for CsvSchemaGenerator {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn supports_file(&self, path: &Path) -> bool {
        path.extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .is_some_and(|e| Self::EXTENSIONS.contains(&e.as_str()))
    }

    fn extract_schema(
        &self,
        path: &Path,
        parser: &Parser,
        registry: &PredictorRegistry,
        options: &SchemaOptions,
    ) -> Result<GeneratedSchema> {
        let table = parser.limited(1).parse_file(path)?;

        let schema = Self::schema_from_table(&table, registry, options)
            .ok_or_else(|| RodeoError::extraction(path, "no data rows found"))?;

        debug!(
            path = %path.display(),
            primary = schema.primary.len(),
            bonus = schema.bonus.len(),
            "generated schema"
        );
        Ok(schema)
    }
}

const CSV_GENERATOR: CsvSchemaGenerator = CsvSchemaGenerator;

/// Registered generators in priority order.
static GENERATORS: &[&dyn SchemaGenerator] = &[&CSV_GENERATOR];

/// First generator supporting the file, if any.
pub fn find_generator(path: impl AsRef<Path>) -> Option<&'static dyn SchemaGenerator> {
    let path = path.as_ref();
    GENERATORS.iter().copied().find(|g| g.supports_file(path))
}

/// Find a generator and run it, failing with `NoGenerator` when none applies.
pub fn extract_schema(
    path: impl AsRef<Path>,
    parser: &Parser,
    registry: &PredictorRegistry,
    options: &SchemaOptions,
) -> Result<GeneratedSchema> {
    let path = path.as_ref();
    let generator =
        find_generator(path).ok_or_else(|| RodeoError::NoGenerator(path.to_path_buf()))?;
    generator.extract_schema(path, parser, registry, options)
}
