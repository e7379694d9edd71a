//! Mock analyzers for testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Result, RodeoError};

use super::image::{ImageAnnotations, ImageAnnotator};
use super::text::{SentimentAnalyzer, SentimentLabel, SentimentScore};

/// Mock image annotator that returns fixed annotations and counts calls.
pub struct MockAnnotator {
    response: Option<ImageAnnotations>,
    calls: AtomicUsize,
}

impl MockAnnotator {
    /// Annotator that always returns `response`.
    pub fn new(response: ImageAnnotations) -> Self {
        Self {
            response: Some(response),
            calls: AtomicUsize::new(0),
        }
    }

    /// Annotator whose every call fails, as an unreachable service would.
    pub fn failing() -> Self {
        Self {
            response: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `annotate` was invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockAnnotator {
    fn default() -> Self {
        Self::new(ImageAnnotations {
            labels: vec!["mock".to_string()],
            ..Default::default()
        })
    }
}

impl ImageAnnotator for MockAnnotator {
    fn annotate(&self, _image: &[u8]) -> Result<ImageAnnotations> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response
            .clone()
            .ok_or_else(|| RodeoError::prediction("mock", "service unavailable"))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Mock sentiment analyzer with a fixed answer.
pub struct MockSentiment {
    score: SentimentScore,
}

impl MockSentiment {
    pub fn new(sentiment: SentimentLabel, polarity: f64) -> Self {
        Self {
            score: SentimentScore {
                sentiment,
                polarity,
            },
        }
    }
}

impl Default for MockSentiment {
    fn default() -> Self {
        Self::new(SentimentLabel::Neutral, 0.0)
    }
}

impl SentimentAnalyzer for MockSentiment {
    fn analyze(&self, _text: &str) -> Result<SentimentScore> {
        Ok(self.score.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
