//! The call surface of the remote registry.
//!
//! [`RegistryGateway`] is the only boundary between the client logic and the
//! CorrLang service. Every method is exactly one blocking round trip; there is
//! no batching and no transaction spanning several calls.
//!
//! Implementations:
//! - `corrl_client::HttpGateway`: JSON over HTTP to a running service
//! - [`crate::memory::InMemoryRegistry`]: in-process registry for tests

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::types::{
    Correspondence, Dataset, Endpoint, EndpointType, GenericObject, ObjectId, ObjectKind,
    ServiceAddress, ServiceInfo, TechSpace, View,
};

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Where the registry should read a schema or dataset from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "location", rename_all = "lowercase")]
pub enum Document {
    /// Absolute path on the machine running the service.
    File(PathBuf),
    Url(String),
}

pub trait RegistryGateway {
    fn status(&self) -> Result<ServiceInfo>;

    fn request_shutdown(&self, reason: &str, grace_period_secs: u32) -> Result<()>;

    fn list_techspaces(&self) -> Result<Vec<TechSpace>>;

    /// Looks the techspace up in [`Self::list_techspaces`]; `None` if unknown.
    fn techspace(&self, name: &str) -> Result<Option<TechSpace>> {
        Ok(self
            .list_techspaces()?
            .into_iter()
            .find(|techspace| techspace.name == name))
    }

    /// Lists objects, optionally narrowed to one kind and/or one project.
    fn list_objects(
        &self,
        kind: Option<ObjectKind>,
        project: Option<&str>,
    ) -> Result<Vec<GenericObject>>;

    fn endpoint(&self, id: ObjectId) -> Result<Endpoint>;

    fn correspondence(&self, id: ObjectId) -> Result<Correspondence>;

    fn view(&self, id: ObjectId) -> Result<View>;

    fn create_endpoint(
        &self,
        project: &str,
        name: &str,
        endpoint_type: EndpointType,
    ) -> Result<Endpoint>;

    fn attach_schema(
        &self,
        endpoint: ObjectId,
        techspace: Option<&str>,
        document: &Document,
    ) -> Result<()>;

    fn attach_dataset(
        &self,
        endpoint: ObjectId,
        techspace: Option<&str>,
        document: &Document,
    ) -> Result<Dataset>;

    fn attach_service_address(
        &self,
        endpoint: ObjectId,
        techspace: Option<&str>,
        address: &ServiceAddress,
    ) -> Result<()>;

    fn export_schema(
        &self,
        endpoint: ObjectId,
        techspace: Option<&str>,
        target: &Path,
    ) -> Result<()>;

    fn delete_object(&self, id: ObjectId) -> Result<()>;

    fn merge_spec_file(&self, project: &str, path: &Path) -> Result<()>;
}
