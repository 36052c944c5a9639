//! Fleet management service (FMS): vehicles and their reference catalogs.

use serde::Serialize;
use serde_json::Value;

use super::Payload;
use crate::rpc_operation;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleCreate {
    #[serde(flatten)]
    pub body: Payload,
    pub company_id: String,
}
rpc_operation!(VehicleCreate => Fms, "vehicle.create", Value);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleUpdate {
    #[serde(flatten)]
    pub body: Payload,
    pub id: String,
    pub company_id: String,
}
rpc_operation!(VehicleUpdate => Fms, "vehicle.update", Value);

/// Mileage entry; `id` is the vehicle id.
#[derive(Debug, Clone, Serialize)]
pub struct MileageCreate {
    #[serde(flatten)]
    pub body: Payload,
    pub id: String,
}
rpc_operation!(MileageCreate => Fms, "mileage.create", Value);

#[derive(Debug, Clone, Serialize)]
pub struct MileageUpdate {
    #[serde(flatten)]
    pub body: Payload,
    pub id: String,
}
rpc_operation!(MileageUpdate => Fms, "mileage.update", Value);

/// Reference catalogs editable through the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FleetCatalog {
    Producer,
    Model,
    Type,
    BodyType,
    Colour,
    Luggage,
}

impl FleetCatalog {
    pub const ALL: [FleetCatalog; 6] = [
        Self::Producer,
        Self::Model,
        Self::Type,
        Self::BodyType,
        Self::Colour,
        Self::Luggage,
    ];

    /// URL segment under `/vehicles`.
    pub fn segment(&self) -> &'static str {
        match self {
            Self::Producer => "producer",
            Self::Model => "model",
            Self::Type => "type",
            Self::BodyType => "body-type",
            Self::Colour => "colour",
            Self::Luggage => "luggage",
        }
    }

    /// Table holding the catalog rows.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Producer => "vehicle_producer",
            Self::Model => "vehicle_model",
            Self::Type => "vehicle_type",
            Self::BodyType => "vehicle_body_type",
            Self::Colour => "vehicle_colour",
            Self::Luggage => "luggage_dimension",
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.segment() == segment)
    }
}

macro_rules! catalog_operations {
    ($create:ident, $update:ident, $name:literal) => {
        #[derive(Debug, Clone, Serialize)]
        pub struct $create {
            #[serde(flatten)]
            pub body: Payload,
        }
        rpc_operation!($create => Fms, concat!($name, ".create"), Value);

        /// Catalog rows are keyed by integer id.
        #[derive(Debug, Clone, Serialize)]
        pub struct $update {
            #[serde(flatten)]
            pub body: Payload,
            pub id: i64,
        }
        rpc_operation!($update => Fms, concat!($name, ".update"), Value);
    };
}

catalog_operations!(ProducerCreate, ProducerUpdate, "producer");
catalog_operations!(ModelCreate, ModelUpdate, "model");
catalog_operations!(TypeCreate, TypeUpdate, "type");
catalog_operations!(BodyTypeCreate, BodyTypeUpdate, "body-type");
catalog_operations!(ColourCreate, ColourUpdate, "colour");
catalog_operations!(LuggageCreate, LuggageUpdate, "luggage");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::RpcOperation;

    #[test]
    fn catalog_patterns() {
        assert_eq!(ProducerCreate::PATTERN, "producer.create");
        assert_eq!(BodyTypeUpdate::PATTERN, "body-type.update");
        assert_eq!(LuggageCreate::PATTERN, "luggage.create");
    }

    #[test]
    fn catalog_segments_round_trip() {
        for catalog in FleetCatalog::ALL {
            assert_eq!(FleetCatalog::from_segment(catalog.segment()), Some(catalog));
        }
        assert_eq!(FleetCatalog::from_segment("wheels"), None);
        assert_eq!(FleetCatalog::Luggage.table(), "luggage_dimension");
    }
}
