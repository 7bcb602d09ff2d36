//! Domain types for the CorrLang object registry.
//!
//! Everything here mirrors what the registry hands back over the wire; the
//! client never owns these objects, it only reads and reports them.
//! All types are serializable/deserializable via serde + serde_json.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Registry-assigned object id ("oid"). Stable and unique across all kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The kind of an endpoint. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EndpointType {
    Dataset,
    Service,
    Source,
    Sink,
}

impl EndpointType {
    pub const ALL: [EndpointType; 4] = [
        EndpointType::Dataset,
        EndpointType::Service,
        EndpointType::Source,
        EndpointType::Sink,
    ];

    /// Whether a service address may be attached to endpoints of this kind.
    pub fn accepts_service_address(self) -> bool {
        !matches!(self, EndpointType::Dataset)
    }
}

impl fmt::Display for EndpointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointType::Dataset => write!(f, "DATASET"),
            EndpointType::Service => write!(f, "SERVICE"),
            EndpointType::Source => write!(f, "SOURCE"),
            EndpointType::Sink => write!(f, "SINK"),
        }
    }
}

impl FromStr for EndpointType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dataset" => Ok(EndpointType::Dataset),
            "service" => Ok(EndpointType::Service),
            "source" => Ok(EndpointType::Source),
            "sink" => Ok(EndpointType::Sink),
            other => Err(format!(
                "unknown endpoint kind '{other}'; expected: dataset, service, source, sink"
            )),
        }
    }
}

/// Type tag of a registry object as it appears in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Endpoint,
    Correspondence,
    View,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Endpoint => write!(f, "endpoint"),
            ObjectKind::Correspondence => write!(f, "correspondence"),
            ObjectKind::View => write!(f, "view"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A dataset attached to a `DATASET` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Remote URL or `file://` URI of the data.
    pub url: String,
    /// Assigned by the registry on attachment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
}

/// Network location of a service-like endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default)]
    pub tls: bool,
    #[serde(default)]
    pub udp: bool,
}

/// A named, typed access point registered under a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: ObjectId,
    pub project: String,
    pub name: String,
    #[serde(rename = "type")]
    pub endpoint_type: EndpointType,
    #[serde(default)]
    pub schema_registered: bool,
    #[serde(default)]
    pub datasets: Vec<Dataset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_address: Option<ServiceAddress>,
}

/// A named grouping of endpoints within a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correspondence {
    pub id: ObjectId,
    pub project: String,
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<ObjectId>,
}

/// A typed projection anchored to a correspondence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub id: ObjectId,
    pub project: String,
    pub name: String,
    pub correspondence: ObjectId,
    pub endpoint_type: EndpointType,
}

/// A technology plugin known to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechSpace {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub developer: String,
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
}

/// Listing projection shared by all object kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericObject {
    pub kind: ObjectKind,
    pub project: String,
    pub name: String,
    pub id: ObjectId,
}

/// What the registry reports about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub api_version: u32,
    pub pid: u64,
    pub started_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_type_parses_case_insensitively() {
        assert_eq!("DATASET".parse::<EndpointType>(), Ok(EndpointType::Dataset));
        assert_eq!("Sink".parse::<EndpointType>(), Ok(EndpointType::Sink));
        assert!("table".parse::<EndpointType>().unwrap_err().contains("table"));
    }

    #[test]
    fn endpoint_type_wire_name_is_uppercase() {
        let json = serde_json::to_string(&EndpointType::Service).expect("serialize");
        assert_eq!(json, "\"SERVICE\"");
        assert_eq!(EndpointType::Source.to_string(), "SOURCE");
    }

    #[test]
    fn only_datasets_reject_service_addresses() {
        let accepting: Vec<_> = EndpointType::ALL
            .into_iter()
            .filter(|t| t.accepts_service_address())
            .collect();
        assert_eq!(
            accepting,
            vec![EndpointType::Service, EndpointType::Source, EndpointType::Sink]
        );
    }

    #[test]
    fn object_id_is_transparent_on_the_wire() {
        let obj = GenericObject {
            kind: ObjectKind::View,
            project: "p".into(),
            name: "v".into(),
            id: ObjectId(7),
        };
        let json = serde_json::to_value(&obj).expect("serialize");
        assert_eq!(json["id"], 7);
        assert_eq!(json["kind"], "view");
    }
}
