//! Command outcomes and how they are rendered.
//!
//! Every command ends in exactly one [`Outcome`]. Variants are plain data;
//! rendering is their `Display` impl and never looks at the clock, the
//! terminal or the environment, so tests can compare rendered strings directly.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use tabled::{settings::Style, Table, Tabled};

use crate::types::{
    Correspondence, Endpoint, GenericObject, ObjectId, ObjectKind, ServiceInfo, TechSpace, View,
};

/// Identity of an object a command created or changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub project: String,
    pub name: String,
    pub id: ObjectId,
    pub kind: ObjectKind,
}

/// Snapshot of the service as seen by `status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    pub port: u16,
    /// `None` when the service did not answer.
    pub info: Option<ServiceInfo>,
    /// When the snapshot was taken; uptime is measured against this.
    pub observed_at: DateTime<Utc>,
}

impl ServiceStatus {
    pub fn running(&self) -> bool {
        self.info.is_some()
    }
}

/// Detail views for `get`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Details {
    TechSpace(TechSpace),
    Endpoint(Endpoint),
    Correspondence {
        correspondence: Correspondence,
        /// Names of the bound endpoints, in binding order.
        endpoint_names: Vec<String>,
    },
    View {
        view: View,
        correspondence_name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    InstallInfo {
        cli_version: String,
        home: PathBuf,
        service_version: Option<String>,
    },
    Installed {
        version: String,
        home: PathBuf,
        /// An earlier installation's `lib`/`bin` were replaced.
        overwritten: bool,
    },
    ServiceStarted {
        port: u16,
        already_running: bool,
    },
    ServiceStopped {
        was_running: bool,
    },
    ServiceStatus(ServiceStatus),
    TechSpaces {
        names: Vec<String>,
    },
    ObjectList {
        entries: Vec<GenericObject>,
    },
    Created(ObjectRef),
    Updated(ObjectRef),
    SchemaExported {
        path: PathBuf,
    },
    SpecMerged {
        project: String,
        path: PathBuf,
    },
    Details(Details),
}

pub const LOGO: &str = "╔═╗┌─┐┬─┐┬─┐╦  ┌─┐┌┐┌┌─┐\n\
                        ║  │ │├┬┘├┬┘║  ├─┤││││ ┬\n\
                        ╚═╝└─┘┴└─┴└─╩═╝┴ ┴┘└┘└─┘";

#[derive(Tabled)]
struct ObjectRow {
    #[tabled(rename = "type")]
    kind: String,
    #[tabled(rename = "project")]
    project: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "oid")]
    id: u32,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::InstallInfo {
                cli_version,
                home,
                service_version,
            } => {
                writeln!(f, "{LOGO}")?;
                writeln!(f, "CorrLang CLI version: {cli_version}")?;
                writeln!(f, "CorrLang home: {}", home.display())?;
                match service_version {
                    Some(version) => write!(f, "CorrLang service version: {version}"),
                    None => write!(f, "CorrLang service not installed."),
                }
            }
            Outcome::Installed {
                version,
                home,
                overwritten,
            } => {
                if *overwritten {
                    writeln!(f, "Replaced the previous installation in {}.", home.display())?;
                }
                write!(
                    f,
                    "CorrLang version {version} was successfully installed at: {}",
                    home.display()
                )
            }
            Outcome::ServiceStarted {
                port,
                already_running,
            } => {
                if *already_running {
                    write!(f, "CorrLang core service is already running on TCP/{port}.")
                } else {
                    write!(f, "CorrLang core service started on TCP/{port}.")
                }
            }
            Outcome::ServiceStopped { was_running } => {
                if *was_running {
                    write!(f, "CorrLang core service has been stopped.")
                } else {
                    write!(f, "CorrLang core service was not running.")
                }
            }
            Outcome::ServiceStatus(status) => render_status(f, status),
            Outcome::TechSpaces { names } => {
                write!(f, "Techspaces")?;
                if names.is_empty() {
                    return write!(f, "\n<empty>");
                }
                for name in names {
                    write!(f, "\n - {name}")?;
                }
                Ok(())
            }
            Outcome::ObjectList { entries } => {
                if entries.is_empty() {
                    return write!(f, "<empty>");
                }
                let rows: Vec<ObjectRow> = entries
                    .iter()
                    .map(|entry| ObjectRow {
                        kind: entry.kind.to_string(),
                        project: entry.project.clone(),
                        name: entry.name.clone(),
                        id: entry.id.0,
                    })
                    .collect();
                let mut table = Table::new(rows);
                table.with(Style::rounded());
                write!(f, "{table}")
            }
            Outcome::Created(object) => write!(
                f,
                "{} '{}' created in project '{}' (oid: {}).",
                object.kind, object.name, object.project, object.id
            ),
            Outcome::Updated(object) => write!(
                f,
                "{} '{}' in project '{}' (oid: {}) updated.",
                object.kind, object.name, object.project, object.id
            ),
            Outcome::SchemaExported { path } => {
                write!(f, "Schema exported to: {}", path.display())
            }
            Outcome::SpecMerged { project, path } => write!(
                f,
                "Specification '{}' merged into project '{project}'.",
                path.display()
            ),
            Outcome::Details(details) => render_details(f, details),
        }
    }
}

fn render_status(f: &mut fmt::Formatter<'_>, status: &ServiceStatus) -> fmt::Result {
    writeln!(f, "=== CorrLang Service Status ===")?;
    let Some(info) = &status.info else {
        return write!(f, "Status      : OFFLINE");
    };
    writeln!(f, "Status      : RUNNING")?;
    writeln!(f, "API version : {}", info.api_version)?;
    writeln!(f, "Service PID : {}", info.pid)?;
    writeln!(f, "Service Port: TCP/{}", status.port)?;
    writeln!(
        f,
        "Startup TS  : {}",
        info.started_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )?;
    write!(
        f,
        "Uptime      : {}",
        format_uptime(status.observed_at - info.started_at)
    )
}

fn render_details(f: &mut fmt::Formatter<'_>, details: &Details) -> fmt::Result {
    match details {
        Details::TechSpace(techspace) => {
            writeln!(f, "=== {} ===", techspace.name)?;
            writeln!(f, "{}", techspace.description)?;
            writeln!(f, "developed by: {}", techspace.developer)?;
            write!(f, "capabilities:")?;
            for capability in &techspace.capabilities {
                write!(f, "\n - {capability}")?;
            }
            Ok(())
        }
        Details::Endpoint(endpoint) => {
            writeln!(f, "=== {} ===", endpoint.name)?;
            writeln!(f, "project  : {}", endpoint.project)?;
            writeln!(f, "oid      : {}", endpoint.id)?;
            writeln!(f, "type     : {}", endpoint.endpoint_type)?;
            write!(
                f,
                "schema   : {}",
                if endpoint.schema_registered {
                    "registered"
                } else {
                    "unavailable"
                }
            )?;
            if !endpoint.datasets.is_empty() {
                write!(f, "\ndatasets :")?;
                for dataset in &endpoint.datasets {
                    match dataset.uuid {
                        Some(uuid) => write!(f, "\n - {uuid} <{}>", dataset.url)?,
                        None => write!(f, "\n - <{}>", dataset.url)?,
                    }
                }
            }
            if let Some(address) = &endpoint.service_address {
                if let Some(url) = &address.url {
                    write!(f, "\nURI      : {url}")?;
                }
                if let Some(port) = address.port {
                    let transport = if address.udp { "UDP" } else { "TCP" };
                    write!(f, "\nservice  : {transport}/{}:{port}", address.host)?;
                }
            }
            Ok(())
        }
        Details::Correspondence {
            correspondence,
            endpoint_names,
        } => {
            writeln!(f, "=== {} ===", correspondence.name)?;
            writeln!(f, "project   : {}", correspondence.project)?;
            writeln!(f, "oid       : {}", correspondence.id)?;
            write!(f, "endpoints :")?;
            for name in endpoint_names {
                write!(f, "\n - {name}")?;
            }
            Ok(())
        }
        Details::View {
            view,
            correspondence_name,
        } => {
            writeln!(f, "=== {} ===", view.name)?;
            writeln!(f, "project        : {}", view.project)?;
            writeln!(f, "oid            : {}", view.id)?;
            writeln!(f, "correspondence : {correspondence_name}")?;
            write!(f, "endpoint type  : {}", view.endpoint_type)
        }
    }
}

/// `"2h 03m 07s"`; negative spans (clock skew) render as zero.
fn format_uptime(span: chrono::Duration) -> String {
    let secs = span.num_seconds().max(0);
    format!("{}h {:02}m {:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}
