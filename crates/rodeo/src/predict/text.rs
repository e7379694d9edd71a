//! Value-domain predictors over free text.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RodeoError};
use crate::schema::PrimitiveType;

use super::{Domain, FieldValue, Prediction, Predictor, PredictorId, Subject};

/// Fields added by the sentiment predictor.
pub const SENTIMENT_FIELDS: &[(&str, PrimitiveType)] = &[
    ("sentiment", PrimitiveType::String),
    ("polarity", PrimitiveType::Float),
];

/// Fields added by the year predictor.
pub const YEAR_FIELDS: &[(&str, PrimitiveType)] = &[("year", PrimitiveType::Int)];

/// Fields added by the units predictor.
pub const UNITS_FIELDS: &[(&str, PrimitiveType)] = &[("units", PrimitiveType::String)];

/// Words recognized as units of measure.
pub const UNIT_VOCABULARY: &[&str] = &[
    "cups", "cup", "teaspoon", "teaspoons", "tablespoon", "tablespoons", "bottles", "gallon",
    "gallons", "pound", "pounds", "lb", "lbs", "oz", "ounces", "-ounces", "scoops", "cloves",
];

const STRING_VALUES: &[Domain] = &[Domain::Value(PrimitiveType::String)];

/// Sentiment needs some text to work with.
const SENTIMENT_MIN_CHARS: usize = 40;
const YEAR_MAX_CHARS: usize = 500;
const UNITS_MIN_CHARS: usize = 20;
const UNITS_MAX_CHARS: usize = 200;

/// Four-digit run in 1000-3999.
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[1-3][0-9]{3}").unwrap());

fn value_of<'a>(subject: &Subject<'a>) -> Option<&'a str> {
    match subject {
        Subject::Value(v) => Some(*v),
        Subject::File(_) => None,
    }
}

fn require_value<'a>(predictor: PredictorId, subject: &Subject<'a>) -> Result<&'a str> {
    value_of(subject).ok_or_else(|| {
        RodeoError::prediction(predictor.as_str(), "predictor only accepts values")
    })
}

// =============================================================================
// SENTIMENT
// =============================================================================

/// Coarse sentiment class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a sentiment analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub sentiment: SentimentLabel,
    /// In [-1.0, 1.0].
    pub polarity: f64,
}

/// Trait for sentiment classifiers.
pub trait SentimentAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Result<SentimentScore>;

    /// Name of the classifier (for logging/debugging).
    fn name(&self) -> &str;
}

/// Word-counting sentiment classifier over a small built-in lexicon.
#[derive(Debug, Clone)]
pub struct LexiconSentiment {
    positive: Vec<&'static str>,
    negative: Vec<&'static str>,
}

impl LexiconSentiment {
    pub fn new() -> Self {
        Self {
            positive: vec![
                "good", "great", "excellent", "amazing", "love", "loved", "lovely", "happy",
                "wonderful", "best", "delicious", "fantastic", "nice", "perfect", "enjoy",
                "enjoyed", "awesome", "beautiful", "glad", "recommend",
            ],
            negative: vec![
                "bad", "terrible", "awful", "hate", "hated", "worst", "poor", "sad", "horrible",
                "disappointing", "disappointed", "broken", "angry", "bland", "boring", "ugly",
                "never", "waste", "wrong", "problem",
            ],
        }
    }
}

impl Default for LexiconSentiment {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentAnalyzer for LexiconSentiment {
    fn analyze(&self, text: &str) -> Result<SentimentScore> {
        let mut positive = 0usize;
        let mut negative = 0usize;

        for word in text.split_whitespace() {
            let word = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if self.positive.contains(&word.as_str()) {
                positive += 1;
            } else if self.negative.contains(&word.as_str()) {
                negative += 1;
            }
        }

        let total = positive + negative;
        let polarity = if total == 0 {
            0.0
        } else {
            (positive as f64 - negative as f64) / total as f64
        };

        let sentiment = if polarity > 0.0 {
            SentimentLabel::Positive
        } else if polarity < 0.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };

        Ok(SentimentScore {
            sentiment,
            polarity,
        })
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

/// Adds sentiment and polarity for longer text values.
pub struct SentimentPredictor {
    analyzer: Arc<dyn SentimentAnalyzer>,
}

impl SentimentPredictor {
    pub fn new(analyzer: Arc<dyn SentimentAnalyzer>) -> Self {
        Self { analyzer }
    }

    pub fn should_predict_contents(contents: &str) -> bool {
        contents.chars().count() >= SENTIMENT_MIN_CHARS
    }
}

impl Predictor for SentimentPredictor {
    fn id(&self) -> PredictorId {
        PredictorId::Sentiment
    }

    fn domains(&self) -> &'static [Domain] {
        STRING_VALUES
    }

    fn applies(&self, subject: &Subject<'_>) -> bool {
        value_of(subject).is_some_and(Self::should_predict_contents)
    }

    fn predict(&self, subject: &Subject<'_>) -> Result<Prediction> {
        let text = require_value(self.id(), subject)?;
        let score = self.analyzer.analyze(text).map_err(|e| match e {
            RodeoError::Prediction { .. } => e,
            other => RodeoError::prediction(self.analyzer.name(), other.to_string()),
        })?;

        let mut prediction = Prediction::new();
        prediction.insert("sentiment".to_string(), score.sentiment.as_str().into());
        prediction.insert("polarity".to_string(), FieldValue::Float(score.polarity));
        Ok(prediction)
    }
}

// =============================================================================
// YEAR
// =============================================================================

/// Extracts the first year-like number (1000-3999) from short text.
#[derive(Debug, Clone, Copy, Default)]
pub struct YearPredictor;

impl YearPredictor {
    pub fn should_predict_contents(contents: &str) -> bool {
        contents.chars().count() <= YEAR_MAX_CHARS && YEAR.is_match(contents)
    }

    /// First four-digit run starting with 1, 2 or 3.
    pub fn first_year(contents: &str) -> Option<i64> {
        YEAR.find(contents).and_then(|m| m.as_str().parse().ok())
    }
}

impl Predictor for YearPredictor {
    fn id(&self) -> PredictorId {
        PredictorId::Year
    }

    fn domains(&self) -> &'static [Domain] {
        STRING_VALUES
    }

    fn applies(&self, subject: &Subject<'_>) -> bool {
        value_of(subject).is_some_and(Self::should_predict_contents)
    }

    fn predict(&self, subject: &Subject<'_>) -> Result<Prediction> {
        let text = require_value(self.id(), subject)?;

        let mut prediction = Prediction::new();
        if let Some(year) = Self::first_year(text) {
            prediction.insert("year".to_string(), FieldValue::Int(year));
        }
        Ok(prediction)
    }
}

// =============================================================================
// UNITS
// =============================================================================

/// Crude unit-of-measure detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitsPredictor;

impl UnitsPredictor {
    pub fn should_predict_contents(contents: &str) -> bool {
        let len = contents.chars().count();
        if !(UNITS_MIN_CHARS..=UNITS_MAX_CHARS).contains(&len) {
            return false;
        }
        contents
            .split_whitespace()
            .any(|w| UNIT_VOCABULARY.contains(&w))
    }

    /// Unit words in order of appearance.
    pub fn found_units(contents: &str) -> Vec<&str> {
        contents
            .split_whitespace()
            .filter(|w| UNIT_VOCABULARY.contains(w))
            .collect()
    }
}

impl Predictor for UnitsPredictor {
    fn id(&self) -> PredictorId {
        PredictorId::Units
    }

    fn domains(&self) -> &'static [Domain] {
        STRING_VALUES
    }

    fn applies(&self, subject: &Subject<'_>) -> bool {
        value_of(subject).is_some_and(Self::should_predict_contents)
    }

    fn predict(&self, subject: &Subject<'_>) -> Result<Prediction> {
        let text = require_value(self.id(), subject)?;

        let mut prediction = Prediction::new();
        prediction.insert(
            "units".to_string(),
            FieldValue::Text(Self::found_units(text).join("-")),
        );
        Ok(prediction)
    }
}
