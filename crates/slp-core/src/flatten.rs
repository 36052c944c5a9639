//! # Row Flattening
//!
//! Rows come back from PostgreSQL as `jsonb` trees (`to_jsonb(row)` plus
//! joined relations). The UI wants a single level of keys, so nested objects
//! are collapsed into dot-paths such as `order.recipient.street`.
//!
//! Keys are camelized first ([`camelize_columns`]) so the flattened names
//! line up with the descriptor names produced by [`crate::fields`].

use serde_json::{Map, Value};

use crate::fields::snake_to_camel;

/// Flatten a JSON object into dot-path keys.
///
/// Returns `None` for anything that is not an object. Nested objects are
/// expanded unless their key appears in `excluded`; excluded objects, arrays,
/// scalars and nulls are kept under their own key unchanged.
pub fn flatten(value: &Value, prefix: &str, excluded: &[&str]) -> Option<Map<String, Value>> {
    let object = value.as_object()?;
    let mut out = Map::new();
    flatten_into(object, prefix, excluded, &mut out);
    Some(out)
}

fn flatten_into(
    object: &Map<String, Value>,
    prefix: &str,
    excluded: &[&str],
    out: &mut Map<String, Value>,
) {
    for (key, value) in object {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            Value::Object(nested) if !excluded.contains(&key.as_str()) => {
                flatten_into(nested, &path, excluded, out);
            }
            other => {
                out.insert(path, other.clone());
            }
        }
    }
}

/// Flatten every row of a list, dropping non-object entries.
pub fn flatten_rows(rows: &[Value], excluded: &[&str]) -> Vec<Value> {
    rows.iter()
        .filter_map(|row| flatten(row, "", excluded))
        .map(Value::Object)
        .collect()
}

/// Convert column and relation keys from snake_case to camelCase.
///
/// Arrays are walked so nested collections (`actRows`, `orderDeliveries`)
/// come out consistent with their parent. A value stored under a key listed
/// in `opaque` is a `jsonb` column's content: its key is camelized, the
/// value itself is passed through as stored.
pub fn camelize_columns(value: Value, opaque: &[&str]) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| {
                    let v = if opaque.contains(&k.as_str()) {
                        v
                    } else {
                        camelize_columns(v, opaque)
                    };
                    (snake_to_camel(&k), v)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| camelize_columns(item, opaque))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_objects_become_dot_paths() {
        let row = json!({"id": 1, "order": {"recipient": {"street": "Main"}, "name": "x"}});
        let flat = flatten(&row, "", &[]).unwrap();
        assert_eq!(flat["id"], 1);
        assert_eq!(flat["order.recipient.street"], "Main");
        assert_eq!(flat["order.name"], "x");
        assert_eq!(flat.len(), 3);
    }

    #[test]
    fn excluded_keys_are_kept_whole() {
        let row = json!({"from": {"type": "DC"}, "to": {"type": "PUP"}, "id": 7});
        let flat = flatten(&row, "", &["from"]).unwrap();
        assert_eq!(flat["from"], json!({"type": "DC"}));
        assert_eq!(flat["to.type"], "PUP");
    }

    #[test]
    fn arrays_and_nulls_are_values() {
        let row = json!({"phones": ["1", "2"], "pool": null});
        let flat = flatten(&row, "", &[]).unwrap();
        assert_eq!(flat["phones"], json!(["1", "2"]));
        assert!(flat["pool"].is_null());
    }

    #[test]
    fn prefix_is_applied() {
        let flat = flatten(&json!({"a": {"b": 1}}), "root", &[]).unwrap();
        assert_eq!(flat["root.a.b"], 1);
    }

    #[test]
    fn non_objects_yield_none() {
        assert!(flatten(&Value::Null, "", &[]).is_none());
        assert!(flatten(&json!([1, 2]), "", &[]).is_none());
        assert!(flatten(&json!("x"), "", &[]).is_none());
    }

    #[test]
    fn flattening_flat_row_is_identity() {
        let row = json!({"a": 1, "b.c": "x"});
        let once = flatten(&row, "", &[]).unwrap();
        let twice = flatten(&Value::Object(once.clone()), "", &[]).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn camelize_walks_arrays() {
        let v = camelize_columns(
            json!({
                "order_deliveries": [{"mile_type": "FIRST_MILE"}],
                "created_at": "2024-01-01"
            }),
            &[],
        );
        assert_eq!(v["orderDeliveries"][0]["mileType"], "FIRST_MILE");
        assert_eq!(v["createdAt"], "2024-01-01");
    }

    #[test]
    fn opaque_column_contents_keep_their_keys() {
        let v = camelize_columns(
            json!({
                "sender": {
                    "company_id": "c1",
                    "working_days": {"mon_fri": {"start_at": "09:00"}}
                }
            }),
            &["working_days"],
        );
        assert_eq!(v["sender"]["companyId"], "c1");
        assert_eq!(v["sender"]["workingDays"], json!({"mon_fri": {"start_at": "09:00"}}));
    }

    #[test]
    fn flatten_rows_skips_non_objects() {
        let rows = vec![json!({"a": {"b": 1}}), json!(null)];
        let out = flatten_rows(&rows, &[]);
        assert_eq!(out, vec![json!({"a.b": 1})]);
    }
}
