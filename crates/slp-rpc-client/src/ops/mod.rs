//! Request structs for every backend operation the gateway sends.
//!
//! Payload schemas belong to the backend services. Each struct names the
//! keys the gateway itself fills in (path parameters, caller identity,
//! resolved values) and carries the client's validated body in a flattened
//! [`Payload`]. The body is declared first so gateway-supplied keys win on
//! collision.

pub mod fms;
pub mod geo;
pub mod oms;
pub mod tms;
pub mod ums;
pub mod wms;

/// Client-supplied JSON object forwarded as-is.
pub type Payload = serde_json::Map<String, serde_json::Value>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_values_override_body_keys() {
        let mut body = Payload::new();
        body.insert("companyId".into(), json!("from-body"));
        body.insert("name".into(), json!("Zone A"));

        let op = tms::ZoneCreate {
            body,
            company_id: "from-path".into(),
        };
        let v = serde_json::to_value(&op).unwrap();
        assert_eq!(v["companyId"], "from-path");
        assert_eq!(v["name"], "Zone A");
    }
}
