//! Column descriptors for model attributes.

use serde::{Deserialize, Serialize};

/// Column data types understood by ormkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Boolean value.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point.
    Float64,
    /// Fixed-precision decimal.
    Decimal,
    /// UTF-8 string.
    String,
    /// Binary data.
    Bytes,
    /// Timestamp.
    Timestamp,
    /// UUID (128-bit identifier).
    Uuid,
    /// Arbitrary JSON document.
    Json,
}

impl ColumnType {
    /// Check if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Int32 | ColumnType::Int64 | ColumnType::Float64 | ColumnType::Decimal
        )
    }
}

/// A column descriptor within a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    /// Column data type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Whether the column accepts NULL.
    #[serde(default)]
    pub nullable: bool,
    /// Whether the column is (part of) the primary key.
    #[serde(default, rename = "primaryKey")]
    pub primary_key: bool,
}

impl AttributeDef {
    /// Create a new non-nullable column.
    pub fn new(column_type: ColumnType) -> Self {
        Self {
            column_type,
            nullable: false,
            primary_key: false,
        }
    }

    /// Create a nullable column.
    pub fn nullable(column_type: ColumnType) -> Self {
        Self {
            column_type,
            nullable: true,
            primary_key: false,
        }
    }

    /// Create a primary key column.
    pub fn primary_key(column_type: ColumnType) -> Self {
        Self {
            column_type,
            nullable: false,
            primary_key: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_constructors() {
        let id = AttributeDef::primary_key(ColumnType::Int64);
        assert!(id.primary_key);
        assert!(!id.nullable);

        let note = AttributeDef::nullable(ColumnType::String);
        assert!(note.nullable);
        assert!(!note.primary_key);
    }

    #[test]
    fn test_attribute_json_shape() {
        let attr: AttributeDef =
            serde_json::from_str(r#"{"type": "int64", "primaryKey": true}"#).unwrap();
        assert_eq!(attr, AttributeDef::primary_key(ColumnType::Int64));
        assert!(ColumnType::Decimal.is_numeric());
        assert!(!ColumnType::Uuid.is_numeric());
    }
}
