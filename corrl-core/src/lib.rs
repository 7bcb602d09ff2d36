//! corrl core library: registry domain types, the apply saga, outcomes.
//!
//! Public API surface:
//! - [`types`]: registry objects and newtypes
//! - [`error`]: [`CoreError`], [`GatewayError`], [`ClassifyError`]
//! - [`classify`]: file / URL / socket classification of user input
//! - [`gateway`]: the [`RegistryGateway`] call surface
//! - [`resolver`]: name → id lookup
//! - [`apply`]: create-or-update with compensation
//! - [`query`]: `get`, `list`, `schema`, `status`, `down`
//! - [`outcome`]: command results and their rendering
//! - [`memory`]: in-process registry

pub mod apply;
pub mod classify;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod outcome;
pub mod query;
pub mod resolver;
pub mod types;

pub use apply::{apply, ApplyRequest, Directive};
pub use classify::{classify, ClassifyContext, Resource};
pub use error::{ClassifyError, CoreError, GatewayError};
pub use gateway::{Document, RegistryGateway};
pub use memory::InMemoryRegistry;
pub use outcome::{Details, ObjectRef, Outcome, ServiceStatus};
pub use query::Selector;
pub use types::{
    Correspondence, Dataset, Endpoint, EndpointType, GenericObject, ObjectId, ObjectKind,
    ServiceAddress, ServiceInfo, TechSpace, View,
};
