//! Table and field descriptions for managed warehouse tables

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DssError, DssResult};

/// SQL type used when a field declares no (or an unknown) logical type
pub const DEFAULT_SQL_TYPE: &str = "VARCHAR(255)";

/// Logical field type, mapped onto a warehouse column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Date,
    Datetime,
    String,
    Double,
    Int,
    Currency,
}

impl FieldType {
    /// Map the logical type to its warehouse column type. Total, no error path.
    pub fn sql_type(self) -> &'static str {
        match self {
            FieldType::Date => "DATE",
            FieldType::Datetime => "TIMESTAMP",
            FieldType::String => "VARCHAR(255)",
            FieldType::Double => "DOUBLE PRECISION",
            FieldType::Int => "INTEGER",
            FieldType::Currency => "DECIMAL",
        }
    }

    /// Parse a logical type name; unknown names yield `None` (callers treat
    /// that as "no declared type" and fall back to [`DEFAULT_SQL_TYPE`]).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "date" => Some(FieldType::Date),
            "datetime" => Some(FieldType::Datetime),
            "string" => Some(FieldType::String),
            "double" => Some(FieldType::Double),
            "int" => Some(FieldType::Int),
            "currency" => Some(FieldType::Currency),
            _ => None,
        }
    }
}

/// A single field of a managed table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSpec {
    /// Field name
    pub name: String,
    /// Logical type; absent means "use the default string type"
    #[serde(
        default,
        rename = "type",
        deserialize_with = "lenient_field_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub field_type: Option<FieldType>,
}

impl FieldSpec {
    /// Create a new field spec
    pub fn new(name: impl Into<String>, field_type: Option<FieldType>) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    /// The warehouse column type for this field
    pub fn sql_type(&self) -> &'static str {
        self.field_type.map_or(DEFAULT_SQL_TYPE, FieldType::sql_type)
    }
}

// Unknown type names degrade to "no declared type" instead of failing the
// whole spec; the type mapper is total.
fn lenient_field_type<'de, D>(deserializer: D) -> Result<Option<FieldType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(FieldType::parse))
}

/// A managed table: name plus ordered field list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableSpec {
    /// Logical table name (physical name is derived by prefixing)
    pub name: String,
    /// Ordered caller fields; system columns are appended automatically
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl TableSpec {
    /// Create a table spec with the given fields
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Check the field-name uniqueness invariant
    pub fn validate(&self) -> DssResult<()> {
        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(DssError::InvalidSpec(format!(
                    "duplicate field name '{}' in table '{}'",
                    field.name, self.name
                )));
            }
        }
        Ok(())
    }
}
