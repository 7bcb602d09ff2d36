//! Name → id resolution against the live registry.
//!
//! Every call re-queries the registry; nothing is cached, so two calls can
//! disagree if someone else mutates the registry in between.

use crate::gateway::{RegistryGateway, Result};
use crate::types::{ObjectId, ObjectKind};

/// Id of the first `kind` object named exactly `name` (case-sensitive).
///
/// With `project == None` the search spans all projects and the first match in
/// the registry's listing order wins. No match is `Ok(None)`, not an error.
pub fn resolve<G: RegistryGateway + ?Sized>(
    gateway: &G,
    project: Option<&str>,
    name: &str,
    kind: ObjectKind,
) -> Result<Option<ObjectId>> {
    let found = gateway
        .list_objects(Some(kind), project)?
        .into_iter()
        .find(|object| object.name == name)
        .map(|object| object.id);

    tracing::debug!(
        %kind,
        name,
        project = project.unwrap_or("<all>"),
        found = ?found,
        "resolved object name"
    );
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryRegistry;
    use crate::types::EndpointType;

    #[test]
    fn resolves_exact_name_only() {
        let registry = InMemoryRegistry::new();
        let created = registry
            .create_endpoint("shop", "Orders", EndpointType::Dataset)
            .expect("create");

        let hit =
            resolve(&registry, Some("shop"), "Orders", ObjectKind::Endpoint).expect("resolve");
        assert_eq!(hit, Some(created.id));

        let miss =
            resolve(&registry, Some("shop"), "orders", ObjectKind::Endpoint).expect("resolve");
        assert_eq!(miss, None, "matching is case-sensitive");
    }

    #[test]
    fn scopes_by_project_and_kind() {
        let registry = InMemoryRegistry::new();
        registry
            .create_endpoint("a", "Shared", EndpointType::Service)
            .expect("create");
        let corr = registry.insert_correspondence("b", "Shared", vec![]);

        assert_eq!(
            resolve(&registry, Some("b"), "Shared", ObjectKind::Endpoint).expect("resolve"),
            None
        );
        assert_eq!(
            resolve(&registry, Some("b"), "Shared", ObjectKind::Correspondence).expect("resolve"),
            Some(corr)
        );
    }

    #[test]
    fn unscoped_search_returns_first_in_listing_order() {
        let registry = InMemoryRegistry::new();
        let first = registry
            .create_endpoint("p1", "Same", EndpointType::Sink)
            .expect("create");
        registry
            .create_endpoint("p2", "Same", EndpointType::Sink)
            .expect("create");

        let found = resolve(&registry, None, "Same", ObjectKind::Endpoint).expect("resolve");
        assert_eq!(found, Some(first.id));
    }

    #[test]
    fn resolution_is_idempotent_without_mutation() {
        let registry = InMemoryRegistry::new();
        registry
            .create_endpoint("p", "E", EndpointType::Source)
            .expect("create");

        let once = resolve(&registry, Some("p"), "E", ObjectKind::Endpoint).expect("resolve");
        let twice = resolve(&registry, Some("p"), "E", ObjectKind::Endpoint).expect("resolve");
        assert_eq!(once, twice);
        let absent = resolve(&registry, Some("p"), "X", ObjectKind::Endpoint).expect("resolve");
        assert_eq!(
            absent,
            resolve(&registry, Some("p"), "X", ObjectKind::Endpoint).expect("resolve")
        );
    }
}
