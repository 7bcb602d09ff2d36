//! JSON bodies exchanged with the CorrLang service.
//!
//! Every call is `POST <base>/v1/<operation>` with one of the request structs
//! below; every reply is a [`RegistryResponse`] envelope.

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use corrl_core::{Document, EndpointType, GatewayError, ObjectId, ObjectKind, ServiceAddress};

pub const API_PREFIX: &str = "v1";

/// Reply envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RegistryResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Unwraps the payload, turning `ok=false` into a verbatim rejection.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, GatewayError> {
        if !self.ok {
            return Err(GatewayError::Rejected(
                self.error
                    .unwrap_or_else(|| "request rejected without a reason".to_string()),
            ));
        }
        serde_json::from_value(self.data.unwrap_or(Value::Null))
            .map_err(|err| GatewayError::Protocol(format!("unexpected reply payload: {err}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Empty {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownRequest {
    pub reason: String,
    pub grace_period_secs: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListObjectsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ObjectKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectRequest {
    pub id: ObjectId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEndpointRequest {
    pub project: String,
    pub name: String,
    #[serde(rename = "type")]
    pub endpoint_type: EndpointType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachDocumentRequest {
    pub endpoint: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub techspace: Option<String>,
    pub document: Document,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachServiceRequest {
    pub endpoint: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub techspace: Option<String>,
    pub address: ServiceAddress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSchemaRequest {
    pub endpoint: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub techspace: Option<String>,
    pub target: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeSpecRequest {
    pub project: String,
    pub path: PathBuf,
}
