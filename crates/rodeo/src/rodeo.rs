//! Main Rodeo struct and public API.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, RodeoError};
use crate::extract::find_extractor;
use crate::generate::{self, GeneratedSchema, SchemaOptions};
use crate::input::{Parser, ParserConfig};
use crate::predict::{PredictorId, PredictorRegistry};
use crate::preview::SamplePreview;
use crate::schema::{sanitize_name, Table, TableKind};

/// Configuration for a catalog run.
#[derive(Debug, Clone)]
pub struct RodeoConfig {
    /// Parser configuration for structured files.
    pub parser: ParserConfig,
    /// Header renames and bonus column naming.
    pub schema: SchemaOptions,
    /// Name of the table for the root directory.
    pub root_table_name: String,
    /// Maximum rows in a sample preview.
    pub preview_rows: usize,
}

impl Default for RodeoConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            schema: SchemaOptions::default(),
            root_table_name: "root".to_string(),
            preview_rows: 20,
        }
    }
}

impl RodeoConfig {
    pub fn with_root_table_name(mut self, name: impl Into<String>) -> Self {
        self.root_table_name = name.into();
        self
    }

    pub fn with_schema_options(mut self, schema: SchemaOptions) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }
}

/// A file left out of the catalog, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of cataloging a directory tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Root directory that was walked.
    pub root: PathBuf,
    /// One table per directory, parents before children.
    pub directory_tables: Vec<Table>,
    /// One table per structured file, in discovery order.
    pub standalone_tables: Vec<Table>,
    /// Table name -> predictor used when sampling rows.
    pub table_predictors: IndexMap<String, Option<PredictorId>>,
    /// Standalone table name -> generated schema with bonus ownership.
    pub standalone_schemas: IndexMap<String, GeneratedSchema>,
    /// Files and directories that could not be cataloged.
    pub skipped: Vec<SkippedFile>,
}

impl Catalog {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            directory_tables: Vec::new(),
            standalone_tables: Vec::new(),
            table_predictors: IndexMap::new(),
            standalone_schemas: IndexMap::new(),
            skipped: Vec::new(),
        }
    }

    /// Directory tables followed by standalone tables.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.directory_tables
            .iter()
            .chain(self.standalone_tables.iter())
    }

    /// Find a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables().find(|t| t.name == name)
    }

    /// Predictor recorded for a table, if any.
    pub fn predictor_for(&self, name: &str) -> Option<PredictorId> {
        self.table_predictors.get(name).copied().flatten()
    }

    /// Total number of tables.
    pub fn len(&self) -> usize {
        self.directory_tables.len() + self.standalone_tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn skip(&mut self, path: &Path, error: &RodeoError) {
        warn!(path = %path.display(), error = %error, "skipping");
        self.skipped.push(SkippedFile {
            path: path.to_path_buf(),
            reason: error.to_string(),
        });
    }
}

/// The main Rodeo cataloging engine.
#[derive(Debug, Default)]
pub struct Rodeo {
    config: RodeoConfig,
    parser: Parser,
    registry: PredictorRegistry,
}

impl Rodeo {
    /// Create a new Rodeo instance with default configuration.
    pub fn new() -> Self {
        Self::with_config(RodeoConfig::default())
    }

    /// Create a Rodeo instance with custom configuration.
    pub fn with_config(config: RodeoConfig) -> Self {
        let parser = Parser::with_config(config.parser.clone());
        Self {
            config,
            parser,
            registry: PredictorRegistry::new(),
        }
    }

    /// Replace the predictor registry (e.g. to plug in an image annotator).
    pub fn with_registry(mut self, registry: PredictorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &RodeoConfig {
        &self.config
    }

    pub fn registry(&self) -> &PredictorRegistry {
        &self.registry
    }

    /// Catalog a directory tree: directory tables first, then one table per
    /// structured file.
    ///
    /// Per-file failures are recorded in [`Catalog::skipped`]; only an
    /// unreadable root fails the run.
    pub fn wrangle(&self, root: impl AsRef<Path>) -> Result<Catalog> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(RodeoError::Config(format!(
                "Root '{}' is not a readable directory",
                root.display()
            )));
        }

        let mut catalog = Catalog::new(root);
        let mut queued = Vec::new();

        self.lasso(root, &self.config.root_table_name, &mut catalog, &mut queued)
            .map_err(|e| match e {
                RodeoError::Io { path, source } if path == root => RodeoError::Config(format!(
                    "Cannot read root '{}': {}",
                    path.display(),
                    source
                )),
                other => other,
            })?;

        for path in queued {
            self.tame(&path, &mut catalog)?;
        }

        info!(
            root = %root.display(),
            directories = catalog.directory_tables.len(),
            standalone = catalog.standalone_tables.len(),
            skipped = catalog.skipped.len(),
            "catalog complete"
        );
        Ok(catalog)
    }

    /// Collect one directory into a table and recurse into its children.
    fn lasso(
        &self,
        dir: &Path,
        name: &str,
        catalog: &mut Catalog,
        queued: &mut Vec<PathBuf>,
    ) -> Result<()> {
        let mut table = Table::directory(name, dir);
        if catalog.table(&table.name).is_some() {
            catalog.skipped.push(SkippedFile {
                path: dir.to_path_buf(),
                reason: format!("table name '{}' already in use", table.name),
            });
            warn!(path = %dir.display(), table = %table.name, "duplicate table name");
            return Ok(());
        }

        let entries = list_dir(dir)?;
        catalog
            .table_predictors
            .entry(table.name.clone())
            .or_insert(None);

        let mut subdirs = Vec::new();
        for (file_name, path, is_dir) in entries {
            if is_dir {
                subdirs.push((file_name, path));
                continue;
            }

            let extractor = find_extractor(&file_name);
            let added = table.extend_schema(extractor.schema_suggestion(&file_name));
            debug!(
                file = %path.display(),
                extractor = extractor.name,
                added = added.len(),
                "extended directory table"
            );

            // First non-null predictor wins for the table.
            if let Some(slot) = catalog.table_predictors.get_mut(&table.name) {
                if slot.is_none() {
                    *slot = extractor.predictor;
                }
            }

            if extractor.should_create_new_table(&file_name) && !queued.contains(&path) {
                queued.push(path);
            }
        }

        let parent = table.name.clone();
        catalog.directory_tables.push(table);

        for (child, path) in subdirs {
            let child_name = format!("{}_{}", parent, child);
            match self.lasso(&path, &child_name, catalog, queued) {
                Ok(()) => {}
                Err(e) if e.is_file_scoped() => catalog.skip(&path, &e),
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Build a standalone table for one queued file.
    fn tame(&self, path: &Path, catalog: &mut Catalog) -> Result<()> {
        let name = standalone_name(&catalog.root, path);

        if catalog.table(&name).is_some() {
            catalog.skipped.push(SkippedFile {
                path: path.to_path_buf(),
                reason: format!("table name '{}' already in use", name),
            });
            warn!(path = %path.display(), table = %name, "duplicate table name");
            return Ok(());
        }

        let generated = match self.generate_schema(path) {
            Ok(schema) => schema,
            Err(e) if e.is_file_scoped() => {
                catalog.skip(path, &e);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let mut table = Table::standalone(&name, path);
        table.extend_schema(generated.columns());

        catalog
            .table_predictors
            .insert(table.name.clone(), generated.predictors().first().copied());
        catalog
            .standalone_schemas
            .insert(table.name.clone(), generated);
        catalog.standalone_tables.push(table);
        Ok(())
    }

    /// Run the schema generator registered for one file.
    pub fn generate_schema(&self, path: impl AsRef<Path>) -> Result<GeneratedSchema> {
        generate::extract_schema(path, &self.parser, &self.registry, &self.config.schema)
    }

    /// Build a sample preview for one table of a catalog.
    ///
    /// Returns `None` when the table has nothing to predict.
    pub fn sample_predictions(
        &self,
        catalog: &Catalog,
        table_name: &str,
    ) -> Result<Option<SamplePreview>> {
        let table = catalog
            .table(table_name)
            .ok_or_else(|| RodeoError::Config(format!("Unknown table '{}'", table_name)))?;

        let preview = match table.kind {
            TableKind::Directory => {
                let Some(id) = catalog.predictor_for(&table.name) else {
                    return Ok(None);
                };
                let Some(predictor) = self.registry.get(id) else {
                    return Ok(None);
                };
                SamplePreview::for_directory(table, predictor, self.config.preview_rows)?
            }
            TableKind::Standalone => {
                let Some(generated) = catalog.standalone_schemas.get(&table.name) else {
                    return Ok(None);
                };
                if generated.bonus.is_empty() {
                    return Ok(None);
                }
                SamplePreview::for_standalone(
                    table,
                    generated,
                    &self.registry,
                    &self.parser.limited(self.config.preview_rows),
                )?
            }
        };
        Ok(Some(preview))
    }
}

/// Visible entries of a directory, sorted by name: `(name, path, is_dir)`.
pub(crate) fn list_dir(dir: &Path) -> Result<Vec<(String, PathBuf, bool)>> {
    let io_err = |e| RodeoError::Io {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.starts_with('.') {
            continue;
        }
        let is_dir = entry.file_type().map_err(io_err)?.is_dir();
        entries.push((file_name, entry.path(), is_dir));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

/// Table name for a standalone file: path relative to the root, minus extension.
fn standalone_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path).with_extension("");
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    sanitize_name(&joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_standalone_name() {
        let root = Path::new("/data");
        assert_eq!(standalone_name(root, Path::new("/data/notes.csv")), "notes");
        assert_eq!(
            standalone_name(root, Path::new("/data/sub dir/my-notes.csv")),
            "subdir_my_notes"
        );
    }

    #[test]
    fn test_wrangle_images_and_csv() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("images/cat.jpg"), "fake");
        write(&root.join("notes.csv"), "name,amount\na,12.5\n");

        let catalog = Rodeo::new().wrangle(root).unwrap();

        let names: Vec<&str> = catalog.tables().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["root", "root_images", "notes"]);

        let images = catalog.table("root_images").unwrap();
        assert!(images.get_column("object_labels").is_some());
        assert_eq!(catalog.predictor_for("root_images"), Some(PredictorId::Image));
        assert_eq!(catalog.predictor_for("root"), None);

        let root_table = catalog.table("root").unwrap();
        assert!(root_table.get_column("amount").is_none());

        let notes = catalog.table("notes").unwrap();
        assert_eq!(notes.column_names(), vec!["name", "amount"]);
        assert_eq!(notes.kind, TableKind::Standalone);
    }

    #[test]
    fn test_hidden_entries_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join(".cache/x.csv"), "a,b\n1,2\n");
        write(&dir.path().join(".hidden.csv"), "a,b\n1,2\n");

        let catalog = Rodeo::new().wrangle(dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.standalone_tables.is_empty());
    }

    #[test]
    fn test_missing_root_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Rodeo::new().wrangle(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, RodeoError::Config(_)));
        assert!(!err.is_file_scoped());
    }

    #[test]
    fn test_header_only_csv_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("empty.csv"), "a,b\n");
        write(&dir.path().join("good.csv"), "a,b\n1,2\n");

        let catalog = Rodeo::new().wrangle(dir.path()).unwrap();
        assert_eq!(catalog.standalone_tables.len(), 1);
        assert_eq!(catalog.skipped.len(), 1);
        assert!(catalog.skipped[0].path.ends_with("empty.csv"));
    }

    #[test]
    fn test_custom_root_name() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("sub/a.txt"), "x");

        let config = RodeoConfig::default().with_root_table_name("my data");
        let catalog = Rodeo::with_config(config).wrangle(dir.path()).unwrap();

        let names: Vec<&str> = catalog.tables().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["mydata", "mydata_sub"]);
    }

    #[test]
    fn test_colliding_directory_names_keep_first() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("a-b/cat.jpg"), "fake");
        write(&dir.path().join("a_b/readme.txt"), "x");
        write(&dir.path().join("a_b/nested.csv"), "a,b\n1,2\n");

        let catalog = Rodeo::new().wrangle(dir.path()).unwrap();

        let names: Vec<&str> = catalog.tables().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["root", "root_a_b"]);
        assert_eq!(catalog.table("root_a_b").unwrap().source(), dir.path().join("a-b"));
        assert_eq!(catalog.predictor_for("root_a_b"), Some(PredictorId::Image));

        assert_eq!(catalog.skipped.len(), 1);
        assert!(catalog.skipped[0].path.ends_with("a_b"));
        assert!(catalog.skipped[0].reason.contains("root_a_b"));
    }

    #[test]
    fn test_unknown_table_sample() {
        let dir = tempfile::tempdir().unwrap();
        let rodeo = Rodeo::new();
        let catalog = rodeo.wrangle(dir.path()).unwrap();

        assert!(rodeo.sample_predictions(&catalog, "missing").is_err());
        assert!(rodeo.sample_predictions(&catalog, "root").unwrap().is_none());
    }
}
