//! Read-side commands and the one-shot service commands.
//!
//! These are thin: resolve a name if needed, make one or two gateway calls,
//! wrap the answer in an [`Outcome`].

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::{CoreError, GatewayError};
use crate::gateway::RegistryGateway;
use crate::outcome::{Details, Outcome, ServiceStatus};
use crate::resolver::resolve;
use crate::types::{ObjectId, ObjectKind};

/// Which object `get` should describe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    TechSpace(String),
    Endpoint(String),
    Correspondence(String),
    View(String),
}

impl Selector {
    /// Picks the selector from the `-t`, `-e`, `-c` and `-v` values, in that
    /// order of precedence.
    pub fn from_flags(
        techspace: Option<String>,
        endpoint: Option<String>,
        correspondence: Option<String>,
        view: Option<String>,
    ) -> Result<Self, CoreError> {
        techspace
            .map(Selector::TechSpace)
            .or_else(|| endpoint.map(Selector::Endpoint))
            .or_else(|| correspondence.map(Selector::Correspondence))
            .or_else(|| view.map(Selector::View))
            .ok_or_else(|| {
                CoreError::validation(
                    "Missing required option! Please specify one of '-t <techspace>', \
                     '-e <endpoint>', '-c <correspondence>', or '-v <view>' to get the \
                     details of the respective object.",
                )
            })
    }
}

/// `get`: details of one object.
pub fn describe<G: RegistryGateway + ?Sized>(
    gateway: &G,
    project: &str,
    selector: &Selector,
) -> Result<Outcome, CoreError> {
    let details = match selector {
        Selector::TechSpace(name) => {
            let techspace = gateway
                .techspace(name)?
                .ok_or_else(|| CoreError::UnknownTechSpace(name.clone()))?;
            Details::TechSpace(techspace)
        }
        Selector::Endpoint(name) => {
            let id = require(gateway, project, name, ObjectKind::Endpoint)?;
            Details::Endpoint(gateway.endpoint(id)?)
        }
        Selector::Correspondence(name) => {
            let id = require(gateway, project, name, ObjectKind::Correspondence)?;
            let correspondence = gateway.correspondence(id)?;
            let endpoint_names = correspondence
                .endpoints
                .iter()
                .map(|&endpoint| gateway.endpoint(endpoint).map(|e| e.name))
                .collect::<Result<Vec<_>, _>>()?;
            Details::Correspondence {
                correspondence,
                endpoint_names,
            }
        }
        Selector::View(name) => {
            let id = require(gateway, project, name, ObjectKind::View)?;
            let view = gateway.view(id)?;
            let correspondence_name = gateway.correspondence(view.correspondence)?.name;
            Details::View {
                view,
                correspondence_name,
            }
        }
    };
    Ok(Outcome::Details(details))
}

/// `list`: every object of `project`, or of all projects when `None`.
pub fn list<G: RegistryGateway + ?Sized>(
    gateway: &G,
    project: Option<&str>,
) -> Result<Outcome, CoreError> {
    Ok(Outcome::ObjectList {
        entries: gateway.list_objects(None, project)?,
    })
}

/// `plugins`: names of the registered techspaces.
pub fn techspaces<G: RegistryGateway + ?Sized>(gateway: &G) -> Result<Outcome, CoreError> {
    Ok(Outcome::TechSpaces {
        names: gateway
            .list_techspaces()?
            .into_iter()
            .map(|techspace| techspace.name)
            .collect(),
    })
}

/// `schema`: have the registry write `endpoint`'s schema to `target`.
///
/// `target` must already be absolute; the service resolves it on its side.
pub fn export_schema<G: RegistryGateway + ?Sized>(
    gateway: &G,
    project: &str,
    endpoint: &str,
    techspace: Option<&str>,
    target: &Path,
) -> Result<Outcome, CoreError> {
    let id = require(gateway, project, endpoint, ObjectKind::Endpoint)?;
    gateway.export_schema(id, techspace, target)?;
    tracing::info!(endpoint, %id, target = %target.display(), "schema exported");
    Ok(Outcome::SchemaExported {
        path: target.to_path_buf(),
    })
}

/// `apply -f`: merge a specification file into `project`.
pub fn merge_spec<G: RegistryGateway + ?Sized>(
    gateway: &G,
    project: &str,
    path: &Path,
) -> Result<Outcome, CoreError> {
    gateway.merge_spec_file(project, path)?;
    Ok(Outcome::SpecMerged {
        project: project.to_string(),
        path: path.to_path_buf(),
    })
}

/// `status`: an unreachable service is reported as offline, not as an error.
pub fn service_status<G: RegistryGateway + ?Sized>(
    gateway: &G,
    port: u16,
    observed_at: DateTime<Utc>,
) -> Result<Outcome, CoreError> {
    let info = match gateway.status() {
        Ok(info) => Some(info),
        Err(GatewayError::Transport { .. }) => None,
        Err(err) => return Err(err.into()),
    };
    Ok(Outcome::ServiceStatus(ServiceStatus {
        port,
        info,
        observed_at,
    }))
}

/// `down`: ask a running service to shut down.
pub fn shutdown<G: RegistryGateway + ?Sized>(
    gateway: &G,
    reason: &str,
) -> Result<Outcome, CoreError> {
    match gateway.status() {
        Ok(_) => {
            gateway.request_shutdown(reason, 1)?;
            Ok(Outcome::ServiceStopped { was_running: true })
        }
        Err(GatewayError::Transport { .. }) => Ok(Outcome::ServiceStopped { was_running: false }),
        Err(err) => Err(err.into()),
    }
}

fn require<G: RegistryGateway + ?Sized>(
    gateway: &G,
    project: &str,
    name: &str,
    kind: ObjectKind,
) -> Result<ObjectId, CoreError> {
    resolve(gateway, Some(project), name, kind)?.ok_or_else(|| CoreError::NotFound {
        kind: match kind {
            ObjectKind::Endpoint => "endpoint",
            ObjectKind::Correspondence => "correspondence",
            ObjectKind::View => "view",
        },
        name: name.to_string(),
        project: project.to_string(),
    })
}
