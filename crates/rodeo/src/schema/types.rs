//! Primitive column types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RodeoError;

/// Primitive type of a column in a generated table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    /// Whole numbers.
    Int,
    /// Numbers with a fractional part or exponent.
    Float,
    /// Calendar dates.
    Date,
    /// true/false, yes/no.
    Boolean,
    /// Anything else.
    #[default]
    String,
}

impl PrimitiveType {
    /// Type name as rendered in a table definition.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::Int => "int",
            PrimitiveType::Float => "float",
            PrimitiveType::Date => "date",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::String => "string",
        }
    }

    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, PrimitiveType::Int | PrimitiveType::Float)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PrimitiveType {
    type Err = RodeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "int" | "integer" => Ok(PrimitiveType::Int),
            "float" | "double" => Ok(PrimitiveType::Float),
            "date" => Ok(PrimitiveType::Date),
            "boolean" | "bool" => Ok(PrimitiveType::Boolean),
            "string" => Ok(PrimitiveType::String),
            other => Err(RodeoError::Config(format!("Unknown column type: {}", other))),
        }
    }
}
