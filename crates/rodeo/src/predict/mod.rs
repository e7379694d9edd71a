//! Enrichment predictors and the registry that dispatches to them.
//!
//! A predictor declares the fields it adds to a table and decides, per
//! file or per value, whether it applies. Two operating domains exist:
//!
//! - **File**: applicability decided by filename alone (e.g. images sent to
//!   a labeling service).
//! - **Value**: applicability keyed by the value's primitive type and a
//!   predicate over the value itself (sentiment, year, units).
//!
//! The registry is built once and never mutated; lookups always return
//! predictors in registration order so repeated runs enrich identically.
//!
//! # Example
//!
//! ```
//! use rodeo::{Domain, PredictorId, PredictorRegistry, PrimitiveType};
//!
//! let registry = PredictorRegistry::new();
//! let domain = Domain::Value(PrimitiveType::String);
//! let found = registry.find_predictors(domain, "Born 1998 in a small town");
//! let ids: Vec<PredictorId> = found.iter().map(|p| p.id()).collect();
//! assert_eq!(ids, vec![PredictorId::Year]);
//! ```

mod cache;
mod image;
mod mock;
mod text;
mod vision;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::{ColumnDef, PrimitiveType};

pub use cache::{AnnotationCache, CachedAnnotator, content_key};
pub use image::{FaceAttributes, ImageAnnotations, ImageAnnotator, ImagePredictor, IMAGE_FIELDS};
pub use mock::{MockAnnotator, MockSentiment};
pub use text::{
    LexiconSentiment, SentimentAnalyzer, SentimentLabel, SentimentPredictor, SentimentScore,
    UnitsPredictor, YearPredictor, SENTIMENT_FIELDS, UNITS_FIELDS, UNIT_VOCABULARY, YEAR_FIELDS,
};
pub use vision::{VisionClient, VisionConfig};

/// Where a predictor operates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "type")]
pub enum Domain {
    /// Whole files, selected by filename.
    File,
    /// Scalar values of the given primitive type.
    Value(PrimitiveType),
}

/// What a predictor looks at.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    File(&'a Path),
    Value(&'a str),
}

/// Stable identifier of a built-in predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictorId {
    Image,
    Sentiment,
    Year,
    Units,
}

impl PredictorId {
    /// Fields the predictor adds, in declaration order.
    pub fn added_fields(&self) -> &'static [(&'static str, PrimitiveType)] {
        match self {
            PredictorId::Image => IMAGE_FIELDS,
            PredictorId::Sentiment => SENTIMENT_FIELDS,
            PredictorId::Year => YEAR_FIELDS,
            PredictorId::Units => UNITS_FIELDS,
        }
    }

    /// Added fields as column definitions.
    pub fn added_columns(&self) -> Vec<ColumnDef> {
        self.added_fields()
            .iter()
            .map(|(name, ty)| ColumnDef::new(*name, *ty))
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PredictorId::Image => "image",
            PredictorId::Sentiment => "sentiment",
            PredictorId::Year => "year",
            PredictorId::Units => "units",
        }
    }
}

impl fmt::Display for PredictorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single predicted value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Field name -> predicted value. Fields a predictor could not fill are absent.
pub type Prediction = IndexMap<String, FieldValue>;

/// Trait for enrichment predictors.
///
/// Implementations must be thread-safe (Send + Sync) so a registry can be
/// shared across schema-generation passes.
pub trait Predictor: Send + Sync {
    /// Identifier recorded as the owner of generated columns.
    fn id(&self) -> PredictorId;

    /// Domains this predictor is eligible for.
    fn domains(&self) -> &'static [Domain];

    /// Whether the predictor should run on this file or value.
    fn applies(&self, subject: &Subject<'_>) -> bool;

    /// Compute the declared fields for a subject.
    fn predict(&self, subject: &Subject<'_>) -> Result<Prediction>;

    /// Fields this predictor adds, in declaration order.
    fn added_fields(&self) -> &'static [(&'static str, PrimitiveType)] {
        self.id().added_fields()
    }

    /// Whether the predictor is eligible for a domain.
    fn operates_on(&self, domain: Domain) -> bool {
        self.domains().contains(&domain)
    }
}

/// Ordered, immutable set of predictors.
#[derive(Clone)]
pub struct PredictorRegistry {
    predictors: Vec<Arc<dyn Predictor>>,
}

impl PredictorRegistry {
    /// Built-in predictors with the lexicon sentiment analyzer and no image
    /// annotator (image predictions fail until one is supplied).
    pub fn new() -> Self {
        Self::builtin(None, Arc::new(LexiconSentiment::new()))
    }

    /// Built-in predictors in registration order: image, sentiment, year, units.
    pub fn builtin(
        annotator: Option<Arc<dyn ImageAnnotator>>,
        sentiment: Arc<dyn SentimentAnalyzer>,
    ) -> Self {
        Self::from_predictors(vec![
            Arc::new(ImagePredictor::new(annotator)),
            Arc::new(SentimentPredictor::new(sentiment)),
            Arc::new(YearPredictor),
            Arc::new(UnitsPredictor),
        ])
    }

    /// Built-in predictors using the given image annotator.
    pub fn with_image_annotator(annotator: Arc<dyn ImageAnnotator>) -> Self {
        Self::builtin(Some(annotator), Arc::new(LexiconSentiment::new()))
    }

    /// Registry over an explicit predictor list, kept in the given order.
    pub fn from_predictors(predictors: Vec<Arc<dyn Predictor>>) -> Self {
        Self { predictors }
    }

    /// Predictors eligible for `domain` whose predicate accepts `content`.
    ///
    /// For [`Domain::File`] the content is a filename; otherwise it is the raw value.
    pub fn find_predictors(&self, domain: Domain, content: &str) -> Vec<&dyn Predictor> {
        let subject = match domain {
            Domain::File => Subject::File(Path::new(content)),
            Domain::Value(_) => Subject::Value(content),
        };

        self.predictors
            .iter()
            .filter(|p| p.operates_on(domain))
            .filter(|p| p.applies(&subject))
            .map(|p| p.as_ref())
            .collect()
    }

    /// Look up a predictor by id.
    pub fn get(&self, id: PredictorId) -> Option<&dyn Predictor> {
        self.predictors
            .iter()
            .find(|p| p.id() == id)
            .map(|p| p.as_ref())
    }

    /// All predictors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Predictor> {
        self.predictors.iter().map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.predictors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictors.is_empty()
    }
}

impl Default for PredictorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PredictorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.predictors.iter().map(|p| p.id()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(found: &[&dyn Predictor]) -> Vec<PredictorId> {
        found.iter().map(|p| p.id()).collect()
    }

    #[test]
    fn test_registration_order() {
        let registry = PredictorRegistry::new();
        let all: Vec<PredictorId> = registry.iter().map(|p| p.id()).collect();
        assert_eq!(
            all,
            vec![
                PredictorId::Image,
                PredictorId::Sentiment,
                PredictorId::Year,
                PredictorId::Units
            ]
        );
    }

    #[test]
    fn test_file_domain() {
        let registry = PredictorRegistry::new();
        assert_eq!(
            ids(&registry.find_predictors(Domain::File, "photos/Cat.JPG")),
            vec![PredictorId::Image]
        );
        assert!(registry.find_predictors(Domain::File, "notes.csv").is_empty());
    }

    #[test]
    fn test_value_domain_requires_string_type() {
        let registry = PredictorRegistry::new();
        let text = "Born 1998 in a small town";

        assert_eq!(
            ids(&registry.find_predictors(Domain::Value(PrimitiveType::String), text)),
            vec![PredictorId::Year]
        );
        assert!(registry
            .find_predictors(Domain::Value(PrimitiveType::Int), text)
            .is_empty());
    }

    #[test]
    fn test_multiple_value_predictors_in_order() {
        let registry = PredictorRegistry::new();
        // 40+ chars, contains a year and a unit.
        let text = "In 1987 she baked with 2 cups of flour every morning";

        assert_eq!(
            ids(&registry.find_predictors(Domain::Value(PrimitiveType::String), text)),
            vec![PredictorId::Sentiment, PredictorId::Year, PredictorId::Units]
        );
    }

    #[test]
    fn test_value_never_matches_file_predictor() {
        let registry = PredictorRegistry::new();
        assert!(registry
            .find_predictors(Domain::Value(PrimitiveType::String), "cat.jpg")
            .is_empty());
    }

    #[test]
    fn test_added_columns() {
        let cols = PredictorId::Sentiment.added_columns();
        assert_eq!(cols[0], ColumnDef::string("sentiment"));
        assert_eq!(cols[1], ColumnDef::new("polarity", PrimitiveType::Float));
    }
}
