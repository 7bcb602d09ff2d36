//! Talking to a CorrLang installation: settings, the installer, the HTTP
//! gateway and the service launcher.

pub mod config;
mod error;
pub mod http;
pub mod install;
pub mod launcher;
pub mod paths;
pub mod protocol;

pub use config::{installed_version, Environment, Overrides, Settings};
pub use error::ClientError;
pub use http::HttpGateway;
pub use install::{delete_tree, install, Installation, InstallRequest};
pub use launcher::{ensure_running, Startup, StartupPoll};
