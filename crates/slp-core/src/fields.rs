//! # Field Descriptors
//!
//! Column metadata handed to the generic table-rendering frontend. Each list
//! response carries one descriptor per visible column so the UI knows how to
//! sort, facet and format it without a per-screen schema.
//!
//! Descriptors are derived from PostgreSQL catalog rows ([`CatalogColumn`])
//! or synthesized for computed values via [`FieldDescriptor::synthetic`].

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// UI-facing column type.
///
/// Catalog types without a mapping are passed through under their native
/// name (`numeric`, `jsonb`, `boolean`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Enum,
    Date,
    Datetime,
    Native(String),
}

impl FieldType {
    /// Map an `information_schema.columns.data_type` value.
    pub fn from_catalog(data_type: &str) -> Self {
        match data_type {
            "USER-DEFINED" => Self::Enum,
            "integer" => Self::Number,
            "uuid" | "character varying" => Self::String,
            "timestamp" | "timestamp without time zone" | "timestamp with time zone" => {
                Self::Datetime
            }
            other => Self::Native(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Enum => "enum",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Native(name) => name,
        }
    }

    fn parse(s: &str) -> Self {
        match s {
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "enum" => Self::Enum,
            "date" => Self::Date,
            "datetime" => Self::Datetime,
            other => Self::Native(other.to_string()),
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// Description of one result column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Dot-path of the value inside a flattened row.
    pub name: String,
    pub title: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub sort: bool,
    pub facet: bool,
    /// Reserved; always `false`.
    pub search: bool,
    /// Allowed labels, present only for enum columns.
    pub values: Option<Vec<String>>,
}

impl FieldDescriptor {
    /// Descriptor for a computed value that has no catalog column.
    pub fn synthetic(name: &str, field_type: FieldType, facet: bool) -> Self {
        Self {
            name: name.to_string(),
            title: name.to_string(),
            field_type,
            sort: true,
            facet,
            search: false,
            values: None,
        }
    }
}

/// One row of `information_schema.columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogColumn {
    pub column_name: String,
    pub data_type: String,
    pub udt_name: String,
}

impl CatalogColumn {
    pub fn is_enum(&self) -> bool {
        self.data_type == "USER-DEFINED"
    }
}

/// Convert `snake_case` (or `kebab-case`) to `camelCase`.
///
/// The input is lowercased first, then every `_x` / `-x` pair becomes `X`.
/// A separator not followed by a lowercase ASCII letter is kept as-is.
pub fn snake_to_camel(input: &str) -> String {
    let lower = input.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut chars = lower.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' || c == '-' {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_lowercase() {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Build descriptors for one table.
///
/// `enum_labels` maps a `udt_name` to its labels in declaration order.
/// Columns named in `excludes` (by their snake_case catalog name) are
/// dropped. A non-empty `prefix` is joined to each name with a `.`.
pub fn describe_columns(
    columns: &[CatalogColumn],
    enum_labels: &HashMap<String, Vec<String>>,
    excludes: &[&str],
    prefix: &str,
) -> Vec<FieldDescriptor> {
    columns
        .iter()
        .filter(|column| !excludes.contains(&column.column_name.as_str()))
        .map(|column| {
            let camel = snake_to_camel(&column.column_name);
            let name = if prefix.is_empty() {
                camel
            } else {
                format!("{prefix}.{camel}")
            };
            let field_type = FieldType::from_catalog(&column.data_type);
            let values = if column.is_enum() {
                enum_labels.get(&column.udt_name).cloned()
            } else {
                None
            };

            FieldDescriptor {
                title: name.clone(),
                name,
                facet: field_type == FieldType::Enum,
                field_type,
                sort: true,
                search: false,
                values,
            }
        })
        .collect()
}

/// Remove structurally identical descriptors, keeping the first occurrence.
pub fn dedupe(fields: Vec<FieldDescriptor>) -> Vec<FieldDescriptor> {
    let mut out: Vec<FieldDescriptor> = Vec::with_capacity(fields.len());
    for field in fields {
        if !out.contains(&field) {
            out.push(field);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, data_type: &str, udt: &str) -> CatalogColumn {
        CatalogColumn {
            column_name: name.into(),
            data_type: data_type.into(),
            udt_name: udt.into(),
        }
    }

    #[test]
    fn camel_case_conversion() {
        assert_eq!(snake_to_camel("company_id"), "companyId");
        assert_eq!(snake_to_camel("point_serve_time"), "pointServeTime");
        assert_eq!(snake_to_camel("id"), "id");
        assert_eq!(snake_to_camel("Created_At"), "createdAt");
        assert_eq!(snake_to_camel("body-type"), "bodyType");
        assert_eq!(snake_to_camel("trailing_"), "trailing_");
        assert_eq!(snake_to_camel("line_1"), "line_1");
    }

    #[test]
    fn catalog_type_mapping() {
        assert_eq!(FieldType::from_catalog("integer"), FieldType::Number);
        assert_eq!(FieldType::from_catalog("uuid"), FieldType::String);
        assert_eq!(FieldType::from_catalog("character varying"), FieldType::String);
        assert_eq!(FieldType::from_catalog("timestamp"), FieldType::Datetime);
        assert_eq!(
            FieldType::from_catalog("timestamp with time zone"),
            FieldType::Datetime
        );
        assert_eq!(FieldType::from_catalog("USER-DEFINED"), FieldType::Enum);
        assert_eq!(
            FieldType::from_catalog("numeric"),
            FieldType::Native("numeric".into())
        );
    }

    #[test]
    fn field_type_serializes_as_plain_string() {
        assert_eq!(serde_json::to_value(FieldType::Datetime).unwrap(), "datetime");
        assert_eq!(
            serde_json::to_value(FieldType::Native("jsonb".into())).unwrap(),
            "jsonb"
        );
        let back: FieldType = serde_json::from_str("\"enum\"").unwrap();
        assert_eq!(back, FieldType::Enum);
    }

    #[test]
    fn excluded_columns_are_dropped_by_snake_name() {
        let columns = vec![
            col("a", "integer", "int4"),
            col("b", "integer", "int4"),
            col("c", "integer", "int4"),
        ];
        let names: Vec<String> = describe_columns(&columns, &HashMap::new(), &["b"], "")
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn exclusion_uses_original_name_not_camel_case() {
        let columns = vec![col("company_id", "uuid", "uuid")];
        let kept = describe_columns(&columns, &HashMap::new(), &["companyId"], "");
        assert_eq!(kept.len(), 1);
        let dropped = describe_columns(&columns, &HashMap::new(), &["company_id"], "");
        assert!(dropped.is_empty());
    }

    #[test]
    fn enum_columns_get_facet_and_values() {
        let columns = vec![
            col("status", "USER-DEFINED", "pool_status"),
            col("storage_id", "uuid", "uuid"),
        ];
        let mut labels = HashMap::new();
        labels.insert(
            "pool_status".to_string(),
            vec!["NEW".to_string(), "CLOSED".to_string()],
        );

        let fields = describe_columns(&columns, &labels, &[], "pool");
        assert_eq!(fields[0].name, "pool.status");
        assert_eq!(fields[0].title, "pool.status");
        assert_eq!(fields[0].field_type, FieldType::Enum);
        assert!(fields[0].facet);
        assert_eq!(
            fields[0].values.as_deref(),
            Some(&["NEW".to_string(), "CLOSED".to_string()][..])
        );

        assert_eq!(fields[1].name, "pool.storageId");
        assert!(!fields[1].facet);
        assert!(fields[1].values.is_none());
        assert!(fields[1].sort);
        assert!(!fields[1].search);
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let a = FieldDescriptor::synthetic("a", FieldType::String, false);
        let b = FieldDescriptor::synthetic("b", FieldType::String, false);
        let a_facet = FieldDescriptor::synthetic("a", FieldType::String, true);
        let out = dedupe(vec![a.clone(), b.clone(), a.clone(), a_facet.clone()]);
        assert_eq!(out, vec![a, b, a_facet]);
    }

    #[test]
    fn descriptor_json_shape() {
        let json =
            serde_json::to_value(FieldDescriptor::synthetic("actionType", FieldType::String, true))
                .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "actionType",
                "title": "actionType",
                "type": "string",
                "sort": true,
                "facet": true,
                "search": false,
                "values": null
            })
        );
    }
}
