//! Typed backend operations.
//!
//! Every message the gateway sends to a backend service is a struct
//! implementing [`RpcOperation`]. The struct is the request payload; the
//! associated constants say where it goes and the associated type says what
//! comes back inside the envelope's `data`.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::QueueNames;

/// The six backend services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Transport management: routes, pools, zones, tariffs, planners.
    Tms,
    /// Warehouse management: storages, receiving and giving orders.
    Wms,
    /// Order management.
    Oms,
    /// Users, groups, drivers, authentication.
    Ums,
    /// Fleet: vehicles and their catalogs.
    Fms,
    /// Geography: places, zones, reverse geocoding.
    Geo,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tms => "tms",
            Self::Wms => "wms",
            Self::Oms => "oms",
            Self::Ums => "ums",
            Self::Fms => "fms",
            Self::Geo => "geo",
        }
    }

    /// Broker queue serving this service.
    pub fn queue<'a>(&self, queues: &'a QueueNames) -> &'a str {
        match self {
            Self::Tms => &queues.tms,
            Self::Wms => &queues.wms,
            Self::Oms => &queues.oms,
            Self::Ums => &queues.ums,
            Self::Fms => &queues.fms,
            Self::Geo => &queues.geo,
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to one backend operation.
pub trait RpcOperation: Serialize + Send + Sync {
    const SERVICE: Service;
    /// Operation name within the service, e.g. `route.create`.
    const PATTERN: &'static str;
    type Response: DeserializeOwned + Send;
}

/// Implement [`RpcOperation`] for a request struct.
///
/// ```ignore
/// rpc_operation!(RouteCreate => Tms, "route.create", serde_json::Value);
/// ```
#[macro_export]
macro_rules! rpc_operation {
    ($ty:ty => $service:ident, $pattern:expr, $response:ty) => {
        impl $crate::operation::RpcOperation for $ty {
            const SERVICE: $crate::operation::Service = $crate::operation::Service::$service;
            const PATTERN: &'static str = $pattern;
            type Response = $response;
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn services_resolve_their_queue() {
        let queues = QueueNames {
            ums: "users-v2".into(),
            ..QueueNames::default()
        };
        assert_eq!(Service::Ums.queue(&queues), "users-v2");
        assert_eq!(Service::Tms.queue(&queues), "tms");
        assert_eq!(Service::Geo.to_string(), "geo");
    }
}
