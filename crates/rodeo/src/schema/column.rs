//! Column definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::PrimitiveType;

/// A named, typed column.
///
/// Two definitions are equal only when both name and type match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Column type.
    #[serde(rename = "type")]
    pub column_type: PrimitiveType,
}

impl ColumnDef {
    /// Create a new column definition.
    pub fn new(name: impl Into<String>, column_type: PrimitiveType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    /// Shorthand for a `string` column.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, PrimitiveType::String)
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.column_type)
    }
}
