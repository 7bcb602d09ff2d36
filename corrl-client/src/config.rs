//! Layered settings: command-line flag, then environment, then a file in the
//! CorrLang home, then the built-in default.
//!
//! Nothing here reads the process environment directly except
//! [`Environment::from_process`]; tests build an [`Environment`] by hand.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, ClientError};
use crate::paths::{default_home, port_file, version_file, DEFAULT_PORT};

pub const ENV_HOME: &str = "CORRLANG_HOME";
pub const ENV_PORT: &str = "CORRLANG_PORT";
pub const ENV_JAVA: &str = "CORRLANG_JAVA";
pub const ENV_JAVA_HOME: &str = "JAVA_HOME";

/// Snapshot of the environment values the settings depend on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub corrlang_home: Option<PathBuf>,
    pub corrlang_port: Option<String>,
    pub corrlang_java: Option<PathBuf>,
    pub java_home: Option<PathBuf>,
    pub user_home: Option<PathBuf>,
}

impl Environment {
    pub fn from_process() -> Self {
        let non_empty = |key: &str| std::env::var_os(key).filter(|value| !value.is_empty());
        Self {
            corrlang_home: non_empty(ENV_HOME).map(PathBuf::from),
            corrlang_port: non_empty(ENV_PORT).map(lossy),
            corrlang_java: non_empty(ENV_JAVA).map(PathBuf::from),
            java_home: non_empty(ENV_JAVA_HOME).map(PathBuf::from),
            user_home: dirs::home_dir(),
        }
    }
}

fn lossy(value: OsString) -> String {
    value.to_string_lossy().into_owned()
}

/// Values given on the command line, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub home: Option<PathBuf>,
    pub port: Option<u16>,
    pub java_home: Option<PathBuf>,
}

/// Fully resolved client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Always absolute.
    pub home: PathBuf,
    pub port: u16,
    pub java: PathBuf,
}

impl Settings {
    pub fn resolve(overrides: &Overrides, env: &Environment) -> Result<Self, ClientError> {
        let home = resolve_home(overrides.home.as_deref(), env)?;
        let port = resolve_port(overrides.port, env, &home)?;
        let java = resolve_java(overrides.java_home.as_deref(), env);
        tracing::debug!(home = %home.display(), port, java = %java.display(), "settings resolved");
        Ok(Self { home, port, java })
    }
}

/// `--home` → `CORRLANG_HOME` → `~/.corrlang`.
pub fn resolve_home(flag: Option<&Path>, env: &Environment) -> Result<PathBuf, ClientError> {
    let home = match flag.or(env.corrlang_home.as_deref()) {
        Some(home) => home.to_path_buf(),
        None => default_home(env.user_home.as_deref().ok_or(ClientError::NoHomeDir)?),
    };
    std::path::absolute(&home).map_err(|err| io_err(home, err))
}

/// `--port` → `CORRLANG_PORT` → `<home>/PORT` → 6969.
pub fn resolve_port(flag: Option<u16>, env: &Environment, home: &Path) -> Result<u16, ClientError> {
    if let Some(port) = flag {
        return Ok(port);
    }
    if let Some(raw) = &env.corrlang_port {
        return parse_port(raw, ENV_PORT);
    }
    Ok(read_port_file(home)?.unwrap_or(DEFAULT_PORT))
}

/// The port the running service announced, or `None` if it has not.
///
/// An empty file counts as not yet written.
pub fn read_port_file(home: &Path) -> Result<Option<u16>, ClientError> {
    let path = port_file(home);
    match fs::read_to_string(&path) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => parse_port(&raw, &path.display().to_string()).map(Some),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

fn parse_port(raw: &str, origin: &str) -> Result<u16, ClientError> {
    raw.trim()
        .parse::<u16>()
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| ClientError::InvalidPort {
            value: raw.trim().to_string(),
            origin: origin.to_string(),
        })
}

/// `--java-home` → `CORRLANG_JAVA` → `JAVA_HOME`, each as `<dir>/bin/java`;
/// otherwise whatever `java` is on the `PATH`.
pub fn resolve_java(flag: Option<&Path>, env: &Environment) -> PathBuf {
    flag.or(env.corrlang_java.as_deref())
        .or(env.java_home.as_deref())
        .map(|dir| dir.join("bin").join("java"))
        .unwrap_or_else(|| PathBuf::from("java"))
}

/// Contents of `<home>/VERSION`, or `None` when no service is installed.
pub fn installed_version(home: &Path) -> Result<Option<String>, ClientError> {
    let path = version_file(home);
    match fs::read_to_string(&path) {
        Ok(raw) => Ok(Some(raw.trim().to_string()).filter(|v| !v.is_empty())),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}
