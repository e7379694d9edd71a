//! Image predictor backed by an external annotation service.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RodeoError};
use crate::schema::PrimitiveType;

use super::{Domain, FieldValue, Prediction, Predictor, PredictorId, Subject};

/// Fields added by the image predictor.
pub const IMAGE_FIELDS: &[(&str, PrimitiveType)] = &[
    ("filename", PrimitiveType::String),
    ("extension", PrimitiveType::String),
    ("object_labels", PrimitiveType::String),
    ("text", PrimitiveType::String),
    ("landmark", PrimitiveType::String),
    ("logo", PrimitiveType::String),
    ("colors", PrimitiveType::String),
    ("has_face", PrimitiveType::String),
    ("emotion", PrimitiveType::String),
];

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Face attributes of the most prominent detected face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceAttributes {
    pub roll_angle: f64,
    pub tilt_angle: f64,
    pub headwear: String,
    pub detection_confidence: f64,
    pub joy: String,
    pub surprise: String,
    pub sorrow: String,
    pub anger: String,
}

/// Structured annotations returned by an image annotation service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageAnnotations {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub landmarks: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logos: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub texts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face: Option<FaceAttributes>,
    /// Dominant colors as `#rrggbb`, most dominant first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
}

impl ImageAnnotations {
    /// Flatten annotations into the image predictor's string fields.
    ///
    /// Only fields with annotations are present.
    pub fn condense(&self) -> Prediction {
        let mut out = Prediction::new();

        let mut joined = |field: &str, values: &[String]| {
            if !values.is_empty() {
                out.insert(field.to_string(), FieldValue::Text(values.join("-")));
            }
        };
        joined("object_labels", &self.labels);
        joined("landmark", &self.landmarks);
        joined("logo", &self.logos);
        joined("text", &self.texts);
        joined("colors", &self.colors);

        if let Some(face) = &self.face {
            out.insert(
                "has_face".to_string(),
                FieldValue::Text(format!(
                    "Face Roll: {} Tilt: {} Headwear: {} Confidence: {}",
                    face.roll_angle, face.tilt_angle, face.headwear, face.detection_confidence
                )),
            );
            out.insert(
                "emotion".to_string(),
                FieldValue::Text(format!(
                    "Joy: {}, Surprise: {}, Sorrow: {}, Anger: {}",
                    face.joy, face.surprise, face.sorrow, face.anger
                )),
            );
        }

        out
    }
}

/// Trait for image annotation backends.
///
/// Calls may be slow and remote; wrap implementations in
/// [`super::CachedAnnotator`] so an unchanged file is annotated once.
pub trait ImageAnnotator: Send + Sync {
    /// Annotate raw image bytes.
    fn annotate(&self, image: &[u8]) -> Result<ImageAnnotations>;

    /// Name of the backend (for logging/debugging).
    fn name(&self) -> &str;
}

/// Labels images through an [`ImageAnnotator`].
pub struct ImagePredictor {
    annotator: Option<Arc<dyn ImageAnnotator>>,
}

impl ImagePredictor {
    pub fn new(annotator: Option<Arc<dyn ImageAnnotator>>) -> Self {
        Self { annotator }
    }

    /// Whether a filename has an image extension (case-insensitive).
    pub fn is_image(path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
    }
}

impl Predictor for ImagePredictor {
    fn id(&self) -> PredictorId {
        PredictorId::Image
    }

    fn domains(&self) -> &'static [Domain] {
        &[Domain::File]
    }

    fn applies(&self, subject: &Subject<'_>) -> bool {
        match subject {
            Subject::File(path) => Self::is_image(path),
            Subject::Value(_) => false,
        }
    }

    fn predict(&self, subject: &Subject<'_>) -> Result<Prediction> {
        let Subject::File(path) = subject else {
            return Err(RodeoError::prediction("image", "image predictor only accepts files"));
        };

        let annotator = self
            .annotator
            .as_ref()
            .ok_or_else(|| RodeoError::prediction("image", "no image annotator configured"))?;

        let bytes = fs::read(path).map_err(|e| {
            RodeoError::prediction("image", format!("cannot read '{}': {}", path.display(), e))
        })?;

        let annotations = annotator.annotate(&bytes)?;

        let mut prediction = Prediction::new();
        let filename = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|s| format!(".{}", s.to_string_lossy()))
            .unwrap_or_default();
        prediction.insert("filename".to_string(), FieldValue::Text(filename));
        prediction.insert("extension".to_string(), FieldValue::Text(extension));
        prediction.extend(annotations.condense());

        Ok(prediction)
    }
}
