//! [`RegistryGateway`] over HTTP/JSON.

use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use corrl_core::gateway::Result;
use corrl_core::{
    Correspondence, Dataset, Document, Endpoint, EndpointType, GatewayError, GenericObject,
    ObjectId, ObjectKind, RegistryGateway, ServiceAddress, ServiceInfo, TechSpace, View,
};

use crate::protocol::{
    AttachDocumentRequest, AttachServiceRequest, CreateEndpointRequest, Empty,
    ExportSchemaRequest, ListObjectsRequest, MergeSpecRequest, ObjectRequest, RegistryResponse,
    ShutdownRequest, API_PREFIX,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client for a CorrLang service at `base_url`.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Client for the service on `localhost:<port>`.
    pub fn localhost(port: u16) -> Self {
        Self::new(format!("http://localhost:{port}"))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn call<B: Serialize, T: DeserializeOwned>(&self, operation: &str, body: &B) -> Result<T> {
        let url = format!("{}/{API_PREFIX}/{operation}", self.base_url);
        tracing::debug!(%url, "registry call");

        let response = match self.agent.post(&url).send_json(body) {
            Ok(response) => response,
            // Rejections may come with an error status; the envelope still carries the reason.
            Err(ureq::Error::Status(code, response)) => {
                tracing::debug!(%url, code, "registry answered with error status");
                response
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(GatewayError::Transport {
                    address: self.base_url.clone(),
                    message: transport.to_string(),
                });
            }
        };

        let status = response.status();
        let envelope: RegistryResponse = response.into_json().map_err(|err| {
            GatewayError::Protocol(format!(
                "unreadable reply from {operation} (HTTP {status}): {err}"
            ))
        })?;
        envelope.into_data()
    }
}

impl RegistryGateway for HttpGateway {
    fn status(&self) -> Result<ServiceInfo> {
        self.call("status", &Empty {})
    }

    fn request_shutdown(&self, reason: &str, grace_period_secs: u32) -> Result<()> {
        self.call(
            "shutdown",
            &ShutdownRequest {
                reason: reason.to_string(),
                grace_period_secs,
            },
        )
    }

    fn list_techspaces(&self) -> Result<Vec<TechSpace>> {
        self.call("techspaces/list", &Empty {})
    }

    fn list_objects(
        &self,
        kind: Option<ObjectKind>,
        project: Option<&str>,
    ) -> Result<Vec<GenericObject>> {
        self.call(
            "objects/list",
            &ListObjectsRequest {
                kind,
                project: project.map(str::to_string),
            },
        )
    }

    fn endpoint(&self, id: ObjectId) -> Result<Endpoint> {
        self.call("endpoints/get", &ObjectRequest { id })
    }

    fn correspondence(&self, id: ObjectId) -> Result<Correspondence> {
        self.call("correspondences/get", &ObjectRequest { id })
    }

    fn view(&self, id: ObjectId) -> Result<View> {
        self.call("views/get", &ObjectRequest { id })
    }

    fn create_endpoint(
        &self,
        project: &str,
        name: &str,
        endpoint_type: EndpointType,
    ) -> Result<Endpoint> {
        self.call(
            "endpoints/create",
            &CreateEndpointRequest {
                project: project.to_string(),
                name: name.to_string(),
                endpoint_type,
            },
        )
    }

    fn attach_schema(
        &self,
        endpoint: ObjectId,
        techspace: Option<&str>,
        document: &Document,
    ) -> Result<()> {
        self.call(
            "endpoints/schema",
            &AttachDocumentRequest {
                endpoint,
                techspace: techspace.map(str::to_string),
                document: document.clone(),
            },
        )
    }

    fn attach_dataset(
        &self,
        endpoint: ObjectId,
        techspace: Option<&str>,
        document: &Document,
    ) -> Result<Dataset> {
        self.call(
            "endpoints/dataset",
            &AttachDocumentRequest {
                endpoint,
                techspace: techspace.map(str::to_string),
                document: document.clone(),
            },
        )
    }

    fn attach_service_address(
        &self,
        endpoint: ObjectId,
        techspace: Option<&str>,
        address: &ServiceAddress,
    ) -> Result<()> {
        self.call(
            "endpoints/service",
            &AttachServiceRequest {
                endpoint,
                techspace: techspace.map(str::to_string),
                address: address.clone(),
            },
        )
    }

    fn export_schema(
        &self,
        endpoint: ObjectId,
        techspace: Option<&str>,
        target: &Path,
    ) -> Result<()> {
        self.call(
            "endpoints/schema/export",
            &ExportSchemaRequest {
                endpoint,
                techspace: techspace.map(str::to_string),
                target: target.to_path_buf(),
            },
        )
    }

    fn delete_object(&self, id: ObjectId) -> Result<()> {
        self.call("objects/delete", &ObjectRequest { id })
    }

    fn merge_spec_file(&self, project: &str, path: &Path) -> Result<()> {
        self.call(
            "projects/merge",
            &MergeSpecRequest {
                project: project.to_string(),
                path: path.to_path_buf(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        assert_eq!(HttpGateway::new("http://host:1/").base_url(), "http://host:1");
        assert_eq!(HttpGateway::localhost(6969).base_url(), "http://localhost:6969");
    }
}
