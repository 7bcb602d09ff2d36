//! Starting the CorrLang core service and waiting for it to come up.
//!
//! The service writes `<home>/PORT` once it listens; that file is the only
//! readiness signal.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::sleep;
use std::time::Duration;

use crate::config::read_port_file;
use crate::error::{io_err, ClientError};
use crate::paths::{config_file, lib_dir, port_file, SERVICE_MAIN_CLASS};

/// Linear back-off for the readiness wait: attempt `n` sleeps `n * step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupPoll {
    pub max_attempts: u32,
    pub step: Duration,
}

impl Default for StartupPoll {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            step: Duration::from_millis(100),
        }
    }
}

/// Result of [`ensure_running`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Startup {
    pub port: u16,
    pub already_running: bool,
}

/// Starts the service unless its PORT file says it is already up.
pub fn ensure_running(home: &Path, java: &Path, poll: StartupPoll) -> Result<Startup, ClientError> {
    if let Some(port) = read_port_file(home)? {
        tracing::info!(port, "core service already running");
        return Ok(Startup {
            port,
            already_running: true,
        });
    }

    spawn_service(home, java)?;
    let port = wait_for_port(home, poll)?;
    Ok(Startup {
        port,
        already_running: false,
    })
}

/// Launches `<java> -cp <jars> CoreServiceMain <home>/config.toml` detached
/// from this process, with all standard streams discarded.
pub fn spawn_service(home: &Path, java: &Path) -> Result<(), ClientError> {
    let classpath = service_classpath(home)?;
    let child = Command::new(java)
        .arg("-cp")
        .arg(&classpath)
        .arg(SERVICE_MAIN_CLASS)
        .arg(config_file(home))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| ClientError::Launch {
            java: java.to_path_buf(),
            source,
        })?;
    tracing::info!(pid = child.id(), java = %java.display(), "started core service process");
    Ok(())
}

/// Every `*.jar` in `<home>/lib`, sorted, joined with the platform separator.
pub fn service_classpath(home: &Path) -> Result<String, ClientError> {
    let dir = lib_dir(home);
    let mut jars: Vec<PathBuf> = match fs::read_dir(&dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "jar"))
            .collect(),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(err) => return Err(io_err(dir, err)),
    };
    if jars.is_empty() {
        return Err(ClientError::NotInstalled(dir));
    }
    jars.sort();

    let separator = if cfg!(windows) { ";" } else { ":" };
    Ok(jars
        .iter()
        .map(|jar| jar.display().to_string())
        .collect::<Vec<_>>()
        .join(separator))
}

/// Polls for the PORT file, sleeping `attempt * step` before each check.
pub fn wait_for_port(home: &Path, poll: StartupPoll) -> Result<u16, ClientError> {
    for attempt in 0..poll.max_attempts {
        sleep(poll.step * attempt);
        if let Some(port) = read_port_file(home)? {
            tracing::debug!(attempt, port, "core service is up");
            return Ok(port);
        }
    }
    Err(ClientError::StartupTimeout {
        port_file: port_file(home),
        attempts: poll.max_attempts,
    })
}
