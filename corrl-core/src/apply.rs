//! The apply saga: attach one configuration to an endpoint, creating the
//! endpoint first if it does not exist yet.
//!
//! # Steps
//!
//! ```text
//! validate + classify ──► resolve ──► (create) ──► attach ──► Created | Updated
//!                                                    │
//!                                                    └─ rejected ──► delete if ours ──► Failed
//! ```
//!
//! The registry has no transactions. If the attach step is rejected, an
//! endpoint minted by this very call is deleted again; an endpoint that
//! already existed is never touched. A crash between create and attach leaves
//! an unconfigured endpoint behind; nothing on the client can undo that.

use crate::classify::{classify, ClassifyContext, Resource};
use crate::error::{CoreError, GatewayError};
use crate::gateway::{Document, RegistryGateway};
use crate::outcome::{ObjectRef, Outcome};
use crate::resolver::resolve;
use crate::types::{EndpointType, ObjectId, ObjectKind, ServiceAddress};

/// The single configuration change an apply request carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `--schema <file|url>`
    Schema(String),
    /// `--data <file|url>`
    Dataset(String),
    /// `--service <url|host:port>`
    ServiceAddress(String),
}

impl Directive {
    /// Builds the directive from the three optional flag values.
    ///
    /// Exactly one must be present.
    pub fn from_flags(
        schema: Option<String>,
        dataset: Option<String>,
        service: Option<String>,
    ) -> Result<Self, CoreError> {
        let mut given: Vec<Directive> = [
            schema.map(Directive::Schema),
            dataset.map(Directive::Dataset),
            service.map(Directive::ServiceAddress),
        ]
        .into_iter()
        .flatten()
        .collect();

        match given.len() {
            0 => Err(CoreError::validation(
                "No direct modification option specified! \
                 Use either '--schema <file>', '--data <file>', or '--service <url>'!",
            )),
            1 => Ok(given.remove(0)),
            _ => Err(CoreError::validation(
                "Only one of '--schema', '--data' and '--service' may be given per apply!",
            )),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Directive::Schema(_) => "schema",
            Directive::Dataset(_) => "dataset",
            Directive::ServiceAddress(_) => "service address",
        }
    }
}

/// A validated apply request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyRequest {
    pub project: String,
    pub endpoint: String,
    /// Needed only when the endpoint has to be created.
    pub kind: Option<EndpointType>,
    pub techspace: Option<String>,
    pub directive: Directive,
}

/// The remote mutation, with its payload already classified.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Mutation {
    Schema(Document),
    Dataset(Document),
    ServiceAddress(ServiceAddress),
}

impl Mutation {
    fn prepare(directive: &Directive) -> Result<Self, CoreError> {
        Ok(match directive {
            Directive::Schema(raw) => Mutation::Schema(document(raw)?),
            Directive::Dataset(raw) => Mutation::Dataset(document(raw)?),
            Directive::ServiceAddress(raw) => Mutation::ServiceAddress(service_address(raw)?),
        })
    }

    fn run<G: RegistryGateway + ?Sized>(
        &self,
        gateway: &G,
        endpoint: ObjectId,
        techspace: Option<&str>,
    ) -> Result<(), GatewayError> {
        match self {
            Mutation::Schema(doc) => gateway.attach_schema(endpoint, techspace, doc),
            Mutation::Dataset(doc) => gateway
                .attach_dataset(endpoint, techspace, doc)
                .map(|dataset| {
                    tracing::debug!(url = %dataset.url, uuid = ?dataset.uuid, "dataset registered");
                }),
            Mutation::ServiceAddress(address) => {
                gateway.attach_service_address(endpoint, techspace, address)
            }
        }
    }
}

/// How the target endpoint was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Existing(ObjectId),
    /// Minted by this call; the only case in which compensation may delete it.
    Created(ObjectId),
}

impl Target {
    fn id(self) -> ObjectId {
        match self {
            Target::Existing(id) | Target::Created(id) => id,
        }
    }
}

/// Runs the apply saga against `gateway`.
///
/// Returns [`Outcome::Created`] when the endpoint was created by this call and
/// [`Outcome::Updated`] when it already existed.
pub fn apply<G: RegistryGateway + ?Sized>(
    gateway: &G,
    request: &ApplyRequest,
) -> Result<Outcome, CoreError> {
    let mutation = Mutation::prepare(&request.directive)?;
    let techspace = request.techspace.as_deref();
    let project = request.project.as_str();
    let name = request.endpoint.as_str();

    let target = match resolve(gateway, Some(project), name, ObjectKind::Endpoint)? {
        Some(id) => Target::Existing(id),
        None => {
            let kind = request.kind.ok_or_else(|| {
                CoreError::validation(format!(
                    "Endpoint '{name}' does not exist in project '{project}'; \
                     specify '-k <endpoint-kind>' to create it!"
                ))
            })?;
            let created = gateway.create_endpoint(project, name, kind)?;
            tracing::info!(endpoint = name, project, id = %created.id, %kind, "endpoint created");
            Target::Created(created.id)
        }
    };

    match mutation.run(gateway, target.id(), techspace) {
        Ok(()) => {
            tracing::info!(
                endpoint = name,
                id = %target.id(),
                "{} registered",
                request.directive.label()
            );
            let object = ObjectRef {
                project: project.to_string(),
                name: name.to_string(),
                id: target.id(),
                kind: ObjectKind::Endpoint,
            };
            Ok(match target {
                Target::Created(_) => Outcome::Created(object),
                Target::Existing(_) => Outcome::Updated(object),
            })
        }
        Err(original) => Err(compensate(gateway, target, name, original)),
    }
}

/// Undo the create step if, and only if, this call performed it.
fn compensate<G: RegistryGateway + ?Sized>(
    gateway: &G,
    target: Target,
    name: &str,
    original: GatewayError,
) -> CoreError {
    let Target::Created(id) = target else {
        tracing::warn!(
            endpoint = name,
            error = %original,
            "configuration rejected; endpoint left unchanged"
        );
        return original.into();
    };

    tracing::warn!(
        endpoint = name,
        %id,
        error = %original,
        "configuration rejected; removing created endpoint"
    );
    match gateway.delete_object(id) {
        Ok(()) => original.into(),
        Err(compensation) => {
            tracing::error!(
                endpoint = name,
                %id,
                error = %compensation,
                "failed to remove created endpoint"
            );
            CoreError::CompensationFailed {
                id,
                name: name.to_string(),
                original,
                compensation,
            }
        }
    }
}

fn document(raw: &str) -> Result<Document, CoreError> {
    match classify(raw, ClassifyContext::UrlOnly)? {
        Resource::LocalFile(path) => Ok(Document::File(path)),
        Resource::RemoteUrl(url) => Ok(Document::Url(url.to_string())),
        Resource::SocketAddress { .. } => Err(CoreError::validation(format!(
            "'{raw}' must be a file or a URL"
        ))),
    }
}

fn service_address(raw: &str) -> Result<ServiceAddress, CoreError> {
    match classify(raw, ClassifyContext::SocketAllowed)? {
        Resource::SocketAddress { host, port } => Ok(ServiceAddress {
            url: None,
            host,
            port: Some(port),
            tls: false,
            udp: false,
        }),
        Resource::RemoteUrl(url) => {
            let host = url.host_str().ok_or_else(|| {
                CoreError::validation(format!(
                    "'{raw}' has no host; a service address must be a URL or 'host:port'"
                ))
            })?;
            Ok(ServiceAddress {
                host: host.to_string(),
                port: url.port_or_known_default(),
                tls: url.scheme() == "https",
                udp: false,
                url: Some(url.to_string()),
            })
        }
        Resource::LocalFile(path) => Err(CoreError::validation(format!(
            "'{}' is a local file; a service address must be a URL or 'host:port'",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_directive_is_required() {
        let none = Directive::from_flags(None, None, None).unwrap_err();
        assert!(matches!(none, CoreError::Validation(_)));

        let two = Directive::from_flags(Some("a".into()), None, Some("b".into())).unwrap_err();
        assert!(two.to_string().contains("Only one"));

        let one = Directive::from_flags(None, Some("d.json".into()), None).expect("one");
        assert_eq!(one, Directive::Dataset("d.json".into()));
    }

    #[test]
    fn socket_service_address_has_no_url() {
        let address = service_address("db.internal:5432").expect("socket");
        assert_eq!(address.host, "db.internal");
        assert_eq!(address.port, Some(5432));
        assert_eq!(address.url, None);
    }

    #[test]
    fn https_service_address_is_tls_with_default_port() {
        let address = service_address("https://api.example.org/graphql").expect("url");
        assert!(address.tls);
        assert_eq!(address.port, Some(443));
        assert_eq!(address.host, "api.example.org");
        assert_eq!(address.url.as_deref(), Some("https://api.example.org/graphql"));
    }

    #[test]
    fn host_named_like_a_scheme_is_still_a_socket() {
        let address = service_address("httpd:8080").expect("socket");
        assert_eq!(address.host, "httpd");
        assert_eq!(address.port, Some(8080));
        assert_eq!(address.url, None);
    }

    #[test]
    fn hostless_service_url_is_rejected() {
        let err = service_address("unix:/tmp/registry.sock").unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)), "{err:?}");
        assert!(err.to_string().contains("no host"));
    }

    #[test]
    fn unparseable_document_is_a_classify_error() {
        let err = document("definitely-missing-file.json").unwrap_err();
        assert!(matches!(err, CoreError::Classify(_)));
    }
}
