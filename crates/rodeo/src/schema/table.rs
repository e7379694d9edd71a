//! Table model: a named, deduplicated, ordered list of columns.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::column::ColumnDef;

/// Whether a table stands for a directory or a single structured file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// One row per file found in a directory.
    Directory,
    /// The rows of one structured file (e.g. a CSV).
    Standalone,
}

/// A table schema accumulated during a catalog run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Sanitized table name.
    pub name: String,
    /// Directory or standalone.
    pub kind: TableKind,
    /// Ordered columns. Re-adding an existing `(name, type)` pair is a no-op.
    pub schema: Vec<ColumnDef>,
    /// Directory or file the table was built from.
    pub source: PathBuf,
}

impl Table {
    /// Create a standalone table with an empty schema.
    pub fn standalone(name: &str, source: impl Into<PathBuf>) -> Self {
        Self {
            name: sanitize_name(name),
            kind: TableKind::Standalone,
            schema: Vec::new(),
            source: source.into(),
        }
    }

    /// Create a directory table seeded with the default file columns.
    pub fn directory(name: &str, source: impl Into<PathBuf>) -> Self {
        Self {
            name: sanitize_name(name),
            kind: TableKind::Directory,
            schema: Self::default_directory_schema(),
            source: source.into(),
        }
    }

    /// Columns every directory table starts with.
    pub fn default_directory_schema() -> Vec<ColumnDef> {
        vec![
            ColumnDef::string("filename"),
            ColumnDef::string("name"),
            ColumnDef::string("extension"),
        ]
    }

    /// Append every column not already present and return the ones added.
    pub fn extend_schema<I>(&mut self, columns: I) -> Vec<ColumnDef>
    where
        I: IntoIterator<Item = ColumnDef>,
    {
        let mut added = Vec::new();
        for column in columns {
            if !self.schema.contains(&column) {
                self.schema.push(column.clone());
                added.push(column);
            }
        }
        added
    }

    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.schema.iter().find(|c| c.name == name)
    }

    /// Get all column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.schema.iter().map(|c| c.name.as_str()).collect()
    }

    /// Source path of the table.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Creation descriptor consumed by a DDL renderer.
    pub fn descriptor(&self) -> TableDescriptor {
        TableDescriptor {
            table_name: self.name.clone(),
            columns: self
                .schema
                .iter()
                .map(|c| (c.name.clone(), c.column_type.to_string()))
                .collect(),
        }
    }
}

/// `(table_name, [(column_name, type_name)])` handed to the DDL renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub table_name: String,
    pub columns: Vec<(String, String)>,
}

impl TableDescriptor {
    /// Render a tab-delimited text table definition.
    pub fn create_command(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|(name, ty)| format!("{} {}", name, ty))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "CREATE TABLE IF NOT EXISTS {} ( {})\n    \
             ROW FORMAT DELIMITED\n    \
             FIELDS TERMINATED BY '\\t'\n    \
             LINES TERMINATED BY '\\n'\n    \
             STORED AS TEXTFILE;",
            self.table_name, columns
        )
    }
}

/// Remove spaces and turn `/` and `-` into `_`.
pub fn sanitize_name(name: &str) -> String {
    name.replace(' ', "").replace(['/', '-'], "_")
}
