//! Sample previews: a few rows of predicted values for one table.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, RodeoError};
use crate::generate::GeneratedSchema;
use crate::inference::classify;
use crate::input::Parser;
use crate::predict::{
    Domain, FieldValue, Prediction, Predictor, PredictorId, PredictorRegistry, Subject,
};
use crate::rodeo::list_dir;
use crate::schema::Table;

/// Rendered in place of a field a predictor did not fill.
pub const PLACEHOLDER: &str = "-";

/// Tabulated predictions for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplePreview {
    pub table_name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SamplePreview {
    /// Run a file predictor over the files of a directory table.
    ///
    /// Files the predictor rejects are left out; a failed prediction still
    /// yields a row, filled with placeholders.
    pub fn for_directory(
        table: &Table,
        predictor: &dyn Predictor,
        max_rows: usize,
    ) -> Result<Self> {
        let fields: Vec<&str> = predictor.added_fields().iter().map(|(f, _)| *f).collect();
        let mut rows = Vec::new();

        for (file_name, path, is_dir) in list_dir(table.source())? {
            if rows.len() >= max_rows {
                break;
            }
            let subject = Subject::File(&path);
            if is_dir || !predictor.applies(&subject) {
                continue;
            }

            let prediction = match predictor.predict(&subject) {
                Ok(p) => p,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "prediction failed");
                    let mut partial = Prediction::new();
                    if fields.contains(&"filename") {
                        partial.insert("filename".to_string(), FieldValue::Text(file_name));
                    }
                    partial
                }
            };
            rows.push(fill_row(&fields, &prediction));
        }

        debug!(table = %table.name, rows = rows.len(), "built directory preview");
        Ok(Self {
            table_name: table.name.clone(),
            header: fields.iter().map(|f| f.to_string()).collect(),
            rows,
        })
    }

    /// Read the rows of a standalone table and fill its bonus columns.
    ///
    /// Each bonus column is filled by running its owning predictor on the
    /// source column's value, once per row and source.
    pub fn for_standalone(
        table: &Table,
        generated: &GeneratedSchema,
        registry: &PredictorRegistry,
        parser: &Parser,
    ) -> Result<Self> {
        let data = parser.parse_file(table.source())?;
        let mut rows = Vec::with_capacity(data.row_count());

        for row in &data.rows {
            let value_at = |column: usize| row.get(column).map(String::as_str).unwrap_or("");

            let mut cells: Vec<String> = generated
                .primary_sources
                .iter()
                .map(|&column| value_at(column).to_string())
                .collect();

            let mut memo: IndexMap<(usize, PredictorId), Option<Prediction>> = IndexMap::new();
            for source in generated.bonus_sources.values() {
                let prediction = memo
                    .entry((source.column, source.predictor))
                    .or_insert_with(|| {
                        predict_value(registry, source.predictor, value_at(source.column))
                    });

                let cell = prediction
                    .as_ref()
                    .and_then(|p| p.get(&source.field))
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| PLACEHOLDER.to_string());
                cells.push(cell);
            }
            rows.push(cells);
        }

        Ok(Self {
            table_name: table.name.clone(),
            header: generated.columns().into_iter().map(|c| c.name).collect(),
            rows,
        })
    }

    /// Bordered ASCII grid.
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.header.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let border = format!(
            "+{}+",
            widths
                .iter()
                .map(|w| "-".repeat(w + 2))
                .collect::<Vec<_>>()
                .join("+")
        );
        let line = |cells: &[String]| {
            let padded: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    let cell = cells.get(i).map(String::as_str).unwrap_or("");
                    format!(" {}{} ", cell, " ".repeat(w - cell.chars().count()))
                })
                .collect();
            format!("|{}|", padded.join("|"))
        };

        let mut out = String::new();
        out.push_str(&border);
        out.push('\n');
        out.push_str(&line(&self.header));
        out.push('\n');
        out.push_str(&border);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&line(row));
            out.push('\n');
        }
        if !self.rows.is_empty() {
            out.push_str(&border);
            out.push('\n');
        }
        out
    }

    /// `sample-<table>-preview.txt`
    pub fn file_name(&self) -> String {
        format!("sample-{}-preview.txt", self.table_name)
    }

    /// Write the rendered preview into `dir` and return the file path.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(self.file_name());
        fs::write(&path, self.render()).map_err(|e| RodeoError::Io {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }
}

fn fill_row(fields: &[&str], prediction: &Prediction) -> Vec<String> {
    fields
        .iter()
        .map(|f| {
            prediction
                .get(*f)
                .map(|v| v.to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string())
        })
        .collect()
}

/// Run one value predictor if it accepts the value; failures degrade to `None`.
fn predict_value(registry: &PredictorRegistry, id: PredictorId, value: &str) -> Option<Prediction> {
    let predictor = registry.get(id)?;
    let subject = Subject::Value(value);
    if !predictor.operates_on(Domain::Value(classify(value))) || !predictor.applies(&subject) {
        return None;
    }
    match predictor.predict(&subject) {
        Ok(p) => Some(p),
        Err(e) => {
            warn!(predictor = %id, error = %e, "prediction failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::generate::{CsvSchemaGenerator, SchemaGenerator, SchemaOptions};
    use crate::predict::{ImageAnnotations, MockAnnotator};

    #[test]
    fn test_render_grid() {
        let preview = SamplePreview {
            table_name: "t".to_string(),
            header: vec!["a".to_string(), "long".to_string()],
            rows: vec![vec!["xyz".to_string(), "-".to_string()]],
        };

        assert_eq!(
            preview.render(),
            "+-----+------+\n\
             | a   | long |\n\
             +-----+------+\n\
             | xyz | -    |\n\
             +-----+------+\n"
        );
        assert_eq!(preview.file_name(), "sample-t-preview.txt");
    }

    #[test]
    fn test_directory_preview_with_mock() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.png"), b"png").unwrap();
        fs::write(dir.path().join("a.jpg"), b"jpg").unwrap();
        fs::write(dir.path().join("readme.txt"), b"txt").unwrap();

        let annotator = Arc::new(MockAnnotator::new(ImageAnnotations {
            labels: vec!["dog".to_string()],
            ..Default::default()
        }));
        let registry = PredictorRegistry::with_image_annotator(annotator);
        let table = Table::directory("root_images", dir.path());

        let predictor = registry.get(PredictorId::Image).unwrap();
        let preview = SamplePreview::for_directory(&table, predictor, 10).unwrap();

        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.header[0], "filename");
        assert_eq!(preview.rows[0][0], "a.jpg");
        assert_eq!(preview.rows[0][2], "dog");
        assert_eq!(preview.rows[1][1], ".png");
        assert_eq!(preview.rows[1][3], PLACEHOLDER);
    }

    #[test]
    fn test_directory_preview_degrades_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"jpg").unwrap();

        let registry = PredictorRegistry::with_image_annotator(Arc::new(MockAnnotator::failing()));
        let table = Table::directory("root", dir.path());
        let predictor = registry.get(PredictorId::Image).unwrap();

        let preview = SamplePreview::for_directory(&table, predictor, 10).unwrap();
        assert_eq!(preview.rows.len(), 1);
        assert_eq!(preview.rows[0][0], "a.jpg");
        assert!(preview.rows[0][1..].iter().all(|c| c == PLACEHOLDER));
    }

    #[test]
    fn test_standalone_preview() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.csv");
        fs::write(
            &path,
            "name,bio\nann,Born 1998 in a small town\nbob,no year here at all\n",
        )
        .unwrap();

        let registry = PredictorRegistry::new();
        let parser = Parser::new();
        let generated = CsvSchemaGenerator
            .extract_schema(&path, &parser, &registry, &SchemaOptions::default())
            .unwrap();
        let mut table = Table::standalone("people", &path);
        table.extend_schema(generated.columns());

        let preview =
            SamplePreview::for_standalone(&table, &generated, &registry, &parser).unwrap();

        assert_eq!(preview.header, vec!["name", "bio", "rodeo_bio_year"]);
        assert_eq!(preview.rows[0][2], "1998");
        assert_eq!(preview.rows[1][2], PLACEHOLDER);
    }

    #[test]
    fn test_write_to() {
        let dir = tempfile::tempdir().unwrap();
        let preview = SamplePreview {
            table_name: "root_images".to_string(),
            header: vec!["a".to_string()],
            rows: Vec::new(),
        };

        let path = preview.write_to(dir.path()).unwrap();
        assert!(path.ends_with("sample-root_images-preview.txt"));
        assert_eq!(fs::read_to_string(path).unwrap(), preview.render());
    }
}
