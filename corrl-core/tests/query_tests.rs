use assert_fs::prelude::*;
use chrono::Utc;
use corrl_core::memory::Operation;
use corrl_core::query::{self, Selector};
use corrl_core::{
    CoreError, Details, Document, EndpointType, GatewayError, InMemoryRegistry, ObjectId,
    Outcome, RegistryGateway,
};
use predicates::prelude::*;
use tempfile::TempDir;

fn transport() -> GatewayError {
    GatewayError::Transport {
        address: "http://localhost:6969".into(),
        message: "connection refused".into(),
    }
}

/// Two endpoints bound by a correspondence with one view on top.
fn seeded() -> InMemoryRegistry {
    let registry = InMemoryRegistry::with_default_techspaces();
    let orders = registry
        .create_endpoint("shop", "Orders", EndpointType::Dataset)
        .expect("orders");
    let stock = registry
        .create_endpoint("shop", "Stock", EndpointType::Service)
        .expect("stock");
    let corr = registry.insert_correspondence("shop", "Fulfilment", vec![orders.id, stock.id]);
    registry.insert_view("shop", "Combined", corr, EndpointType::Service);
    registry
        .create_endpoint("lab", "Orders", EndpointType::Sink)
        .expect("other project");
    registry
}

#[test]
fn correspondence_details_name_its_endpoints_in_order() {
    let registry = seeded();

    let outcome = query::describe(&registry, "shop", &Selector::Correspondence("Fulfilment".into()))
        .expect("describe");

    let Outcome::Details(Details::Correspondence { endpoint_names, .. }) = &outcome else {
        panic!("unexpected outcome {outcome:?}");
    };
    assert_eq!(endpoint_names, &["Orders", "Stock"]);
    assert!(outcome.to_string().ends_with("endpoints :\n - Orders\n - Stock"));
}

#[test]
fn view_details_show_correspondence_name() {
    let registry = seeded();

    let text = query::describe(&registry, "shop", &Selector::View("Combined".into()))
        .expect("describe")
        .to_string();

    assert!(text.starts_with("=== Combined ==="), "got: {text}");
    assert!(text.contains("correspondence : Fulfilment"), "got: {text}");
    assert!(text.ends_with("endpoint type  : SERVICE"), "got: {text}");
}

#[test]
fn endpoint_lookup_is_scoped_to_project() {
    let registry = seeded();

    let outcome = query::describe(&registry, "lab", &Selector::Endpoint("Orders".into()))
        .expect("describe");

    let Outcome::Details(Details::Endpoint(endpoint)) = outcome else {
        panic!("expected endpoint");
    };
    assert_eq!(endpoint.project, "lab");
    assert_eq!(endpoint.endpoint_type, EndpointType::Sink);
}

#[test]
fn missing_object_is_not_found() {
    let registry = seeded();

    let err = query::describe(&registry, "shop", &Selector::View("Nope".into())).unwrap_err();

    assert!(matches!(err, CoreError::NotFound { kind: "view", .. }));
    assert_eq!(
        err.to_string(),
        "cannot find view with name 'Nope' in project 'shop'"
    );
}

#[test]
fn techspace_details_and_unknown_techspace() {
    let registry = seeded();

    let text = query::describe(&registry, "shop", &Selector::TechSpace("PUML".into()))
        .expect("describe")
        .to_string();
    assert!(text.starts_with("=== PUML ==="), "got: {text}");
    assert!(text.contains("developed by: The CorrLang team"), "got: {text}");
    assert!(text.contains(" - SERIALIZE_SCHEMA"), "got: {text}");

    let err = query::describe(&registry, "shop", &Selector::TechSpace("XML".into())).unwrap_err();
    assert_eq!(err.to_string(), "Techspace 'XML' not found!");
}

#[test]
fn list_filters_by_project_or_returns_everything() {
    let registry = seeded();

    let Outcome::ObjectList { entries } = query::list(&registry, Some("lab")).expect("list") else {
        panic!("expected list");
    };
    assert_eq!(entries.len(), 1);

    let Outcome::ObjectList { entries } = query::list(&registry, None).expect("list") else {
        panic!("expected list");
    };
    let ids: Vec<ObjectId> = entries.iter().map(|e| e.id).collect();
    assert_eq!(ids, (1..=5).map(ObjectId).collect::<Vec<_>>());
}

#[test]
fn plugins_lists_techspace_names() {
    let registry = InMemoryRegistry::with_default_techspaces();
    let text = query::techspaces(&registry).expect("plugins").to_string();
    assert_eq!(text, "Techspaces\n - JSON\n - PUML\n - GRAPH_QL");
}

#[test]
fn export_schema_requires_a_registered_schema() {
    let registry = seeded();
    let dir = TempDir::new().expect("tempdir");
    let target = dir.path().join("orders.puml");

    let err = query::export_schema(&registry, "shop", "Orders", Some("PUML"), &target).unwrap_err();
    assert!(err.rejection().is_some_and(|r| r.contains("has no schema defined")));

    registry
        .attach_schema(ObjectId(1), None, &Document::Url("http://s/orders".into()))
        .expect("schema");
    let outcome = query::export_schema(&registry, "shop", "Orders", Some("PUML"), &target)
        .expect("export");

    assert_eq!(outcome, Outcome::SchemaExported { path: target.clone() });
    assert_eq!(registry.exported_schemas(), vec![(ObjectId(1), target)]);
}

#[test]
fn export_schema_of_unknown_endpoint_makes_no_export_call() {
    let registry = seeded();
    let err = query::export_schema(&registry, "shop", "Ghost", None, std::path::Path::new("/tmp/x"))
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { kind: "endpoint", .. }));
    assert!(!registry.calls().contains(&Operation::ExportSchema));
}

#[test]
fn merge_spec_records_the_file() {
    let registry = InMemoryRegistry::new();
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let child = dir.child("shop.corr");
    child.write_str("endpoint Orders {}").expect("write");
    child.assert(predicate::path::is_file());
    let spec = child.path().to_path_buf();

    let outcome = query::merge_spec(&registry, "shop", &spec).expect("merge");

    assert_eq!(
        outcome.to_string(),
        format!("Specification '{}' merged into project 'shop'.", spec.display())
    );
    assert_eq!(registry.merged_specs(), vec![("shop".to_string(), spec)]);
}

#[test]
fn merge_spec_of_missing_file_is_rejected() {
    let registry = InMemoryRegistry::new();
    let err = query::merge_spec(&registry, "shop", std::path::Path::new("/nonexistent/x.corr"))
        .unwrap_err();
    assert!(err.rejection().is_some_and(|r| r.starts_with("Specification file")));
}

#[test]
fn status_reports_running_service() {
    let registry = InMemoryRegistry::new();
    let outcome = query::service_status(&registry, 6969, Utc::now()).expect("status");
    let Outcome::ServiceStatus(status) = outcome else {
        panic!("expected status");
    };
    assert!(status.running());
    assert_eq!(status.info.map(|i| i.api_version), Some(2));
}

#[test]
fn status_of_unreachable_service_is_offline_not_an_error() {
    let registry = InMemoryRegistry::new();
    registry.fail_next(Operation::Status, transport());

    let outcome = query::service_status(&registry, 7000, Utc::now()).expect("status");

    assert!(outcome.to_string().ends_with("Status      : OFFLINE"));
}

#[test]
fn status_protocol_error_is_still_an_error() {
    let registry = InMemoryRegistry::new();
    registry.fail_next(Operation::Status, GatewayError::Protocol("garbled".into()));
    assert!(query::service_status(&registry, 7000, Utc::now()).is_err());
}

#[test]
fn shutdown_forwards_reason_to_running_service() {
    let registry = InMemoryRegistry::new();

    let outcome = query::shutdown(&registry, "CLI Request: PID=42").expect("down");

    assert_eq!(outcome, Outcome::ServiceStopped { was_running: true });
    assert_eq!(registry.shutdown_reason().as_deref(), Some("CLI Request: PID=42"));
}

#[test]
fn shutdown_of_stopped_service_is_a_no_op() {
    let registry = InMemoryRegistry::new();
    registry.fail_next(Operation::Status, transport());

    let outcome = query::shutdown(&registry, "CLI Request: PID=42").expect("down");

    assert_eq!(outcome, Outcome::ServiceStopped { was_running: false });
    assert_eq!(registry.calls(), vec![Operation::Status]);
    assert_eq!(registry.shutdown_reason(), None);
}
