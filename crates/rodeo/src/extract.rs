//! Per-extension extractors: baseline columns for a file and whether it
//! deserves its own table.
//!
//! Extractors are immutable records checked in priority order; the first one
//! whose extension list matches wins, otherwise the default extractor
//! applies. Evaluating an extractor never touches shared state.

use std::path::Path;

use crate::predict::PredictorId;
use crate::schema::{ColumnDef, PrimitiveType};

/// A rule keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extractor {
    /// Short name for diagnostics.
    pub name: &'static str,
    /// Extensions without the dot, lowercase.
    pub extensions: &'static [&'static str],
    /// Columns contributed to the containing directory table.
    base_schema: &'static [(&'static str, PrimitiveType)],
    /// Whether the file is queued for its own standalone table.
    pub creates_own_table: bool,
    /// Predictor used to enrich rows of the containing directory table.
    pub predictor: Option<PredictorId>,
}

/// Used when no registered extractor matches.
pub const DEFAULT_EXTRACTOR: Extractor = Extractor {
    name: "file",
    extensions: &[],
    base_schema: &[
        ("name", PrimitiveType::String),
        ("extension", PrimitiveType::String),
    ],
    creates_own_table: false,
    predictor: None,
};

/// Structured data files: always get a standalone table.
pub const CSV_EXTRACTOR: Extractor = Extractor {
    name: "csv",
    extensions: &["csv"],
    base_schema: &[
        ("name", PrimitiveType::String),
        ("extension", PrimitiveType::String),
        ("size", PrimitiveType::Int),
    ],
    creates_own_table: true,
    predictor: None,
};

/// Images: stay as rows of their directory table, enriched by the image predictor.
pub const IMAGE_EXTRACTOR: Extractor = Extractor {
    name: "image",
    extensions: &["png", "jpg", "jpeg"],
    base_schema: &[
        ("name", PrimitiveType::String),
        ("extension", PrimitiveType::String),
        ("size", PrimitiveType::Int),
        ("exif", PrimitiveType::String),
    ],
    creates_own_table: false,
    predictor: Some(PredictorId::Image),
};

/// Registered extractors in priority order.
pub const EXTRACTORS: &[Extractor] = &[CSV_EXTRACTOR, IMAGE_EXTRACTOR];

impl Extractor {
    /// Whether the filename's extension is handled by this extractor (case-insensitive).
    pub fn supports_file(&self, filename: impl AsRef<Path>) -> bool {
        extension_of(filename.as_ref())
            .is_some_and(|ext| self.extensions.contains(&ext.as_str()))
    }

    /// Baseline columns for a file plus every field of the associated predictor.
    pub fn schema_suggestion(&self, _filename: impl AsRef<Path>) -> Vec<ColumnDef> {
        let mut columns: Vec<ColumnDef> = self
            .base_schema
            .iter()
            .map(|(name, ty)| ColumnDef::new(*name, *ty))
            .collect();

        if let Some(predictor) = self.predictor {
            columns.extend(predictor.added_columns());
        }
        columns
    }

    /// Whether the file should get a standalone table.
    pub fn should_create_new_table(&self, _filename: impl AsRef<Path>) -> bool {
        self.creates_own_table
    }
}

/// First registered extractor supporting `filename`, else the default.
pub fn find_extractor(filename: impl AsRef<Path>) -> &'static Extractor {
    let filename = filename.as_ref();
    EXTRACTORS
        .iter()
        .find(|ex| ex.supports_file(filename))
        .unwrap_or(&DEFAULT_EXTRACTOR)
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_extractor() {
        assert_eq!(find_extractor("notes.csv").name, "csv");
        assert_eq!(find_extractor("dir/PHOTO.JPG").name, "image");
        assert_eq!(find_extractor("cat.jpeg").name, "image");
        assert_eq!(find_extractor("readme.md").name, "file");
        assert_eq!(find_extractor("csv").name, "file");
    }

    #[test]
    fn test_default_schema() {
        let schema = find_extractor("readme.md").schema_suggestion("readme.md");
        assert_eq!(
            schema,
            vec![ColumnDef::string("name"), ColumnDef::string("extension")]
        );
        assert!(!DEFAULT_EXTRACTOR.should_create_new_table("readme.md"));
    }

    #[test]
    fn test_csv_requests_own_table() {
        let ex = find_extractor("notes.csv");
        assert!(ex.should_create_new_table("notes.csv"));
        assert_eq!(
            ex.schema_suggestion("notes.csv")[2],
            ColumnDef::new("size", PrimitiveType::Int)
        );
        assert_eq!(ex.predictor, None);
    }

    #[test]
    fn test_image_schema_includes_predictor_fields() {
        let ex = find_extractor("cat.png");
        let schema = ex.schema_suggestion("cat.png");

        assert!(!ex.should_create_new_table("cat.png"));
        assert_eq!(ex.predictor, Some(PredictorId::Image));
        assert_eq!(schema[3], ColumnDef::string("exif"));
        assert!(schema.contains(&ColumnDef::string("object_labels")));
        assert!(schema.contains(&ColumnDef::string("emotion")));
        assert_eq!(schema.len(), 4 + PredictorId::Image.added_fields().len());
    }
}
