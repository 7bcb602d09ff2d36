//! In-process registry implementing [`RegistryGateway`].
//!
//! Enforces the same business rules as the CorrLang service (endpoint kinds,
//! schema-before-dataset, unique names per project and kind) so the apply
//! saga can be exercised without a running service. Supports one-shot
//! failure injection per operation and records every call it receives.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::GatewayError;
use crate::gateway::{Document, RegistryGateway, Result};
use crate::types::{
    Correspondence, Dataset, Endpoint, EndpointType, GenericObject, ObjectId, ObjectKind,
    ServiceAddress, ServiceInfo, TechSpace, View,
};

pub const API_VERSION: u32 = 2;

/// One remote operation, as seen by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Status,
    RequestShutdown,
    ListTechSpaces,
    ListObjects,
    GetEndpoint,
    GetCorrespondence,
    GetView,
    CreateEndpoint,
    AttachSchema,
    AttachDataset,
    AttachServiceAddress,
    ExportSchema,
    DeleteObject,
    MergeSpecFile,
}

#[derive(Debug, Clone)]
enum Entry {
    Endpoint(Endpoint),
    Correspondence(Correspondence),
    View(View),
}

impl Entry {
    fn summary(&self) -> GenericObject {
        let (kind, project, name, id) = match self {
            Entry::Endpoint(e) => (ObjectKind::Endpoint, &e.project, &e.name, e.id),
            Entry::Correspondence(c) => (ObjectKind::Correspondence, &c.project, &c.name, c.id),
            Entry::View(v) => (ObjectKind::View, &v.project, &v.name, v.id),
        };
        GenericObject {
            kind,
            project: project.clone(),
            name: name.clone(),
            id,
        }
    }
}

#[derive(Debug)]
struct State {
    next_id: u32,
    objects: BTreeMap<ObjectId, Entry>,
    techspaces: Vec<TechSpace>,
    failures: HashMap<Operation, VecDeque<GatewayError>>,
    calls: Vec<Operation>,
    merged_specs: Vec<(String, PathBuf)>,
    exported_schemas: Vec<(ObjectId, PathBuf)>,
    shutdown_reason: Option<String>,
    started_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct InMemoryRegistry {
    state: RefCell<State>,
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRegistry {
    /// Empty registry without any techspaces.
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State {
                next_id: 1,
                objects: BTreeMap::new(),
                techspaces: Vec::new(),
                failures: HashMap::new(),
                calls: Vec::new(),
                merged_specs: Vec::new(),
                exported_schemas: Vec::new(),
                shutdown_reason: None,
                started_at: Utc::now(),
            }),
        }
    }

    /// Registry seeded with the techspaces a stock service ships with.
    pub fn with_default_techspaces() -> Self {
        let registry = Self::new();
        let developer = "The CorrLang team <mailto:info@corrlang.io>";
        registry.add_techspace(TechSpace {
            name: "JSON".into(),
            description: "JSON Schema and JSON documents".into(),
            developer: developer.into(),
            capabilities: caps(&[
                "PARSE_SCHEMA",
                "PARSE_SCHEMA_FROM_URL",
                "PARSE_DATA",
                "SERIALIZE_DATA",
            ]),
        });
        registry.add_techspace(TechSpace {
            name: "PUML".into(),
            description: "PlantUML class diagrams".into(),
            developer: developer.into(),
            capabilities: caps(&["PARSE_SCHEMA", "SERIALIZE_SCHEMA"]),
        });
        registry.add_techspace(TechSpace {
            name: "GRAPH_QL".into(),
            description: "GraphQL SDL and services".into(),
            developer: developer.into(),
            capabilities: caps(&["PARSE_SCHEMA", "PARSE_SCHEMA_FROM_URL", "SERVICE_QUERY"]),
        });
        registry
    }

    pub fn add_techspace(&self, techspace: TechSpace) {
        self.state.borrow_mut().techspaces.push(techspace);
    }

    /// Registers a correspondence directly, bypassing the gateway.
    pub fn insert_correspondence(
        &self,
        project: &str,
        name: &str,
        endpoints: Vec<ObjectId>,
    ) -> ObjectId {
        let mut state = self.state.borrow_mut();
        let id = state.allocate_id();
        state.objects.insert(
            id,
            Entry::Correspondence(Correspondence {
                id,
                project: project.to_string(),
                name: name.to_string(),
                endpoints,
            }),
        );
        id
    }

    /// Registers a view directly, bypassing the gateway.
    pub fn insert_view(
        &self,
        project: &str,
        name: &str,
        correspondence: ObjectId,
        endpoint_type: EndpointType,
    ) -> ObjectId {
        let mut state = self.state.borrow_mut();
        let id = state.allocate_id();
        state.objects.insert(
            id,
            Entry::View(View {
                id,
                project: project.to_string(),
                name: name.to_string(),
                correspondence,
                endpoint_type,
            }),
        );
        id
    }

    /// The next call of `operation` fails with `error` instead of running.
    pub fn fail_next(&self, operation: Operation, error: GatewayError) {
        self.state
            .borrow_mut()
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Every operation received so far, in order.
    pub fn calls(&self) -> Vec<Operation> {
        self.state.borrow().calls.clone()
    }

    pub fn object_count(&self) -> usize {
        self.state.borrow().objects.len()
    }

    pub fn merged_specs(&self) -> Vec<(String, PathBuf)> {
        self.state.borrow().merged_specs.clone()
    }

    pub fn exported_schemas(&self) -> Vec<(ObjectId, PathBuf)> {
        self.state.borrow().exported_schemas.clone()
    }

    pub fn shutdown_reason(&self) -> Option<String> {
        self.state.borrow().shutdown_reason.clone()
    }

    /// Records the call and pops an injected failure, if any.
    fn enter(&self, operation: Operation) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(operation);
        match state.failures.get_mut(&operation).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl State {
    fn allocate_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    fn endpoint_mut(&mut self, id: ObjectId) -> Result<&mut Endpoint> {
        match self.objects.get_mut(&id) {
            Some(Entry::Endpoint(endpoint)) => Ok(endpoint),
            _ => Err(rejected(format!("Endpoint with oid:'{id}' not found!"))),
        }
    }

    fn check_techspace(&self, techspace: Option<&str>) -> Result<()> {
        match techspace {
            Some(name) if !self.techspaces.iter().any(|t| t.name == name) => {
                Err(rejected(format!("Techspace '{name}' is not registered!")))
            }
            _ => Ok(()),
        }
    }
}

impl RegistryGateway for InMemoryRegistry {
    fn status(&self) -> Result<ServiceInfo> {
        self.enter(Operation::Status)?;
        Ok(ServiceInfo {
            api_version: API_VERSION,
            pid: u64::from(std::process::id()),
            started_at: self.state.borrow().started_at,
        })
    }

    fn request_shutdown(&self, reason: &str, _grace_period_secs: u32) -> Result<()> {
        self.enter(Operation::RequestShutdown)?;
        self.state.borrow_mut().shutdown_reason = Some(reason.to_string());
        Ok(())
    }

    fn list_techspaces(&self) -> Result<Vec<TechSpace>> {
        self.enter(Operation::ListTechSpaces)?;
        Ok(self.state.borrow().techspaces.clone())
    }

    fn list_objects(
        &self,
        kind: Option<ObjectKind>,
        project: Option<&str>,
    ) -> Result<Vec<GenericObject>> {
        self.enter(Operation::ListObjects)?;
        Ok(self
            .state
            .borrow()
            .objects
            .values()
            .map(Entry::summary)
            .filter(|o| kind.map_or(true, |k| o.kind == k))
            .filter(|o| project.map_or(true, |p| o.project == p))
            .collect())
    }

    fn endpoint(&self, id: ObjectId) -> Result<Endpoint> {
        self.enter(Operation::GetEndpoint)?;
        self.state.borrow_mut().endpoint_mut(id).map(|e| e.clone())
    }

    fn correspondence(&self, id: ObjectId) -> Result<Correspondence> {
        self.enter(Operation::GetCorrespondence)?;
        match self.state.borrow().objects.get(&id) {
            Some(Entry::Correspondence(c)) => Ok(c.clone()),
            _ => Err(rejected(format!("Correspondence with oid:'{id}' not found!"))),
        }
    }

    fn view(&self, id: ObjectId) -> Result<View> {
        self.enter(Operation::GetView)?;
        match self.state.borrow().objects.get(&id) {
            Some(Entry::View(v)) => Ok(v.clone()),
            _ => Err(rejected(format!("View with oid:'{id}' not found!"))),
        }
    }

    fn create_endpoint(
        &self,
        project: &str,
        name: &str,
        endpoint_type: EndpointType,
    ) -> Result<Endpoint> {
        self.enter(Operation::CreateEndpoint)?;
        let mut state = self.state.borrow_mut();
        let duplicate = state.objects.values().any(|entry| {
            matches!(entry, Entry::Endpoint(e)
                if e.project == project && e.name == name && e.endpoint_type == endpoint_type)
        });
        if duplicate {
            return Err(rejected(format!(
                "Endpoint '{name}' of type '{endpoint_type}' already exists in project '{project}'!"
            )));
        }

        let id = state.allocate_id();
        let endpoint = Endpoint {
            id,
            project: project.to_string(),
            name: name.to_string(),
            endpoint_type,
            schema_registered: false,
            datasets: Vec::new(),
            service_address: None,
        };
        state.objects.insert(id, Entry::Endpoint(endpoint.clone()));
        Ok(endpoint)
    }

    fn attach_schema(
        &self,
        endpoint: ObjectId,
        techspace: Option<&str>,
        document: &Document,
    ) -> Result<()> {
        self.enter(Operation::AttachSchema)?;
        let mut state = self.state.borrow_mut();
        state.check_techspace(techspace)?;
        readable(document)?;
        state.endpoint_mut(endpoint)?.schema_registered = true;
        Ok(())
    }

    fn attach_dataset(
        &self,
        endpoint: ObjectId,
        techspace: Option<&str>,
        document: &Document,
    ) -> Result<Dataset> {
        self.enter(Operation::AttachDataset)?;
        let mut state = self.state.borrow_mut();
        state.check_techspace(techspace)?;
        let target = state.endpoint_mut(endpoint)?;
        if target.endpoint_type != EndpointType::Dataset {
            return Err(rejected(format!(
                "Endpoint '{}' (oid: {}) needs to be of type 'DATASET' to register datasets!",
                target.name, target.id
            )));
        }
        if !target.schema_registered {
            return Err(rejected(format!(
                "Endpoint '{}' (oid: {}) has no schema defined!",
                target.name, target.id
            )));
        }
        readable(document)?;

        let dataset = Dataset {
            url: match document {
                Document::File(path) => format!("file://{}", path.display()),
                Document::Url(url) => url.clone(),
            },
            uuid: Some(Uuid::new_v4()),
        };
        target.datasets.push(dataset.clone());
        Ok(dataset)
    }

    fn attach_service_address(
        &self,
        endpoint: ObjectId,
        techspace: Option<&str>,
        address: &ServiceAddress,
    ) -> Result<()> {
        self.enter(Operation::AttachServiceAddress)?;
        let mut state = self.state.borrow_mut();
        state.check_techspace(techspace)?;
        let target = state.endpoint_mut(endpoint)?;
        if !target.endpoint_type.accepts_service_address() {
            return Err(rejected(format!(
                "Endpoint '{}' (oid: {}) needs to be of type 'SERVICE', 'SOURCE' or 'SINK' \
                 to register a service address!",
                target.name, target.id
            )));
        }
        target.service_address = Some(address.clone());
        Ok(())
    }

    fn export_schema(
        &self,
        endpoint: ObjectId,
        techspace: Option<&str>,
        target: &Path,
    ) -> Result<()> {
        self.enter(Operation::ExportSchema)?;
        let mut state = self.state.borrow_mut();
        state.check_techspace(techspace)?;
        let source = state.endpoint_mut(endpoint)?;
        if !source.schema_registered {
            return Err(rejected(format!(
                "Endpoint '{}' (oid: {}) has no schema defined!",
                source.name, source.id
            )));
        }
        state.exported_schemas.push((endpoint, target.to_path_buf()));
        Ok(())
    }

    fn delete_object(&self, id: ObjectId) -> Result<()> {
        self.enter(Operation::DeleteObject)?;
        match self.state.borrow_mut().objects.remove(&id) {
            Some(_) => Ok(()),
            None => Err(rejected(format!("Object with oid:'{id}' not found!"))),
        }
    }

    fn merge_spec_file(&self, project: &str, path: &Path) -> Result<()> {
        self.enter(Operation::MergeSpecFile)?;
        if !path.is_file() {
            return Err(rejected(format!(
                "Specification file '{}' does not exist!",
                path.display()
            )));
        }
        self.state
            .borrow_mut()
            .merged_specs
            .push((project.to_string(), path.to_path_buf()));
        Ok(())
    }
}

fn readable(document: &Document) -> Result<()> {
    match document {
        Document::File(path) if !path.is_file() => Err(rejected(format!(
            "File '{}' does not exist!",
            path.display()
        ))),
        _ => Ok(()),
    }
}

fn rejected(reason: String) -> GatewayError {
    GatewayError::Rejected(reason)
}

fn caps(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}
