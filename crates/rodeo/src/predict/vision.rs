//! Vision-style `images:annotate` REST client.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{Result, RodeoError};

use super::image::{FaceAttributes, ImageAnnotations, ImageAnnotator};

/// Default annotation endpoint.
const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Configuration for the vision client.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Annotation endpoint URL.
    pub endpoint: String,
    /// API key sent as the `key` query parameter.
    pub api_key: String,
    /// Upper bound for a single annotation request.
    pub timeout: Duration,
    /// Maximum results per feature (labels, logos, ...).
    pub max_results: u32,
}

impl VisionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
            max_results: 3,
        }
    }

    /// Read `RODEO_VISION_API_KEY` and optional `RODEO_VISION_ENDPOINT`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("RODEO_VISION_API_KEY").map_err(|_| {
            RodeoError::Config("RODEO_VISION_API_KEY environment variable not set".to_string())
        })?;
        let mut config = Self::new(api_key);
        if let Ok(endpoint) = std::env::var("RODEO_VISION_ENDPOINT") {
            config.endpoint = endpoint;
        }
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Annotates images through a remote vision service.
pub struct VisionClient {
    client: Client,
    config: VisionConfig,
}

impl VisionClient {
    pub fn new(config: VisionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RodeoError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(VisionConfig::from_env()?)
    }

    fn request_body(&self, image: &[u8]) -> serde_json::Value {
        let max = self.config.max_results;
        json!({
            "requests": [{
                "image": { "content": STANDARD.encode(image) },
                "features": [
                    { "type": "LABEL_DETECTION", "maxResults": max },
                    { "type": "FACE_DETECTION", "maxResults": 2 },
                    { "type": "LANDMARK_DETECTION", "maxResults": 2 },
                    { "type": "LOGO_DETECTION", "maxResults": max },
                    { "type": "IMAGE_PROPERTIES" },
                    { "type": "TEXT_DETECTION", "maxResults": 2 }
                ]
            }]
        })
    }

    fn error(&self, message: impl Into<String>) -> RodeoError {
        RodeoError::prediction("vision", message)
    }
}

impl ImageAnnotator for VisionClient {
    fn annotate(&self, image: &[u8]) -> Result<ImageAnnotations> {
        debug!(bytes = image.len(), endpoint = %self.config.endpoint, "annotating image");

        let response = self
            .client
            .post(&self.config.endpoint)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&self.request_body(image))
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    self.error(format!("timed out after {:?}", self.config.timeout))
                } else {
                    self.error(format!("request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(self.error(format!("API error ({}): {}", status, error_text)));
        }

        let parsed: AnnotateResponse = response
            .json()
            .map_err(|e| self.error(format!("Failed to parse API response: {}", e)))?;

        let first = parsed
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| self.error("empty response"))?;

        if let Some(err) = first.error {
            return Err(self.error(err.message));
        }

        Ok(first.into())
    }

    fn name(&self) -> &str {
        "vision"
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<SingleResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SingleResponse {
    label_annotations: Vec<EntityAnnotation>,
    landmark_annotations: Vec<EntityAnnotation>,
    logo_annotations: Vec<EntityAnnotation>,
    text_annotations: Vec<EntityAnnotation>,
    face_annotations: Vec<FaceAnnotation>,
    image_properties_annotation: Option<ImageProperties>,
    error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FaceAnnotation {
    roll_angle: f64,
    tilt_angle: f64,
    headwear_likelihood: String,
    detection_confidence: f64,
    joy_likelihood: String,
    surprise_likelihood: String,
    sorrow_likelihood: String,
    anger_likelihood: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ImageProperties {
    dominant_colors: DominantColors,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DominantColors {
    colors: Vec<ColorInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ColorInfo {
    color: Rgb,
    score: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Rgb {
    red: f64,
    green: f64,
    blue: f64,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
}

fn descriptions(annotations: Vec<EntityAnnotation>) -> Vec<String> {
    annotations
        .into_iter()
        .map(|a| a.description.trim().to_string())
        .filter(|d| !d.is_empty())
        .collect()
}

impl From<SingleResponse> for ImageAnnotations {
    fn from(r: SingleResponse) -> Self {
        let face = r.face_annotations.into_iter().next().map(|f| FaceAttributes {
            roll_angle: f.roll_angle,
            tilt_angle: f.tilt_angle,
            headwear: f.headwear_likelihood,
            detection_confidence: f.detection_confidence,
            joy: f.joy_likelihood,
            surprise: f.surprise_likelihood,
            sorrow: f.sorrow_likelihood,
            anger: f.anger_likelihood,
        });

        let mut colors = r
            .image_properties_annotation
            .map(|p| p.dominant_colors.colors)
            .unwrap_or_default();
        colors.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        let colors = colors
            .iter()
            .take(3)
            .map(|c| {
                format!(
                    "#{:02x}{:02x}{:02x}",
                    c.color.red.clamp(0.0, 255.0) as u8,
                    c.color.green.clamp(0.0, 255.0) as u8,
                    c.color.blue.clamp(0.0, 255.0) as u8
                )
            })
            .collect();

        ImageAnnotations {
            labels: descriptions(r.label_annotations),
            landmarks: descriptions(r.landmark_annotations),
            logos: descriptions(r.logo_annotations),
            // First text annotation is the full block; keep it short.
            texts: descriptions(r.text_annotations)
                .into_iter()
                .map(|t| t.replace('\n', " "))
                .take(2)
                .collect(),
            face,
            colors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "responses": [{
                "labelAnnotations": [
                    {"description": "Cat", "score": 0.98},
                    {"description": "Whiskers", "score": 0.91}
                ],
                "logoAnnotations": [{"description": "Acme"}],
                "textAnnotations": [{"description": "HELLO\nWORLD"}],
                "faceAnnotations": [{
                    "rollAngle": 1.5, "tiltAngle": -3.0,
                    "headwearLikelihood": "VERY_UNLIKELY",
                    "detectionConfidence": 0.9,
                    "joyLikelihood": "LIKELY",
                    "surpriseLikelihood": "UNLIKELY",
                    "sorrowLikelihood": "VERY_UNLIKELY",
                    "angerLikelihood": "VERY_UNLIKELY"
                }],
                "imagePropertiesAnnotation": {"dominantColors": {"colors": [
                    {"color": {"red": 10, "green": 20, "blue": 30}, "score": 0.2},
                    {"color": {"red": 255, "green": 0, "blue": 0}, "score": 0.7}
                ]}}
            }]
        }"#;

        let parsed: AnnotateResponse = serde_json::from_str(body).unwrap();
        let annotations: ImageAnnotations = parsed.responses.into_iter().next().unwrap().into();

        assert_eq!(annotations.labels, vec!["Cat", "Whiskers"]);
        assert_eq!(annotations.logos, vec!["Acme"]);
        assert_eq!(annotations.texts, vec!["HELLO WORLD"]);
        assert_eq!(annotations.colors, vec!["#ff0000", "#0a141e"]);
        assert_eq!(annotations.face.unwrap().joy, "LIKELY");
        assert!(annotations.landmarks.is_empty());
    }

    #[test]
    fn test_request_body_encodes_image() {
        let client = VisionClient::new(VisionConfig::new("k")).unwrap();
        let body = client.request_body(b"abc");
        assert_eq!(body["requests"][0]["image"]["content"], "YWJj");
        assert_eq!(body["requests"][0]["features"][0]["maxResults"], 3);
    }
}
