use std::path::PathBuf;

use thiserror::Error;

/// Error surface for configuration, the service launcher and the HTTP client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A port value could not be parsed; `source` names where it came from.
    #[error("invalid port '{value}' from {origin}")]
    InvalidPort { value: String, origin: String },

    #[error("cannot determine the user's home directory; set CORRLANG_HOME or pass --home")]
    NoHomeDir,

    #[error("failed to launch CorrLang core service with '{java}': {source}")]
    Launch {
        java: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no CorrLang service libraries found in {0}; is CorrLang installed?")]
    NotInstalled(PathBuf),

    #[error("CorrLang core service did not write {port_file} within {attempts} attempts")]
    StartupTimeout { port_file: PathBuf, attempts: u32 },

    #[error("unknown CorrLang version '{version}'; known versions: {known}")]
    UnknownVersion { version: String, known: String },

    #[error("CorrLang is already installed in {0}; drop --no-overwrite to replace it")]
    AlreadyInstalled(PathBuf),

    #[error("failed to download {url}: {message}")]
    Download { url: String, message: String },

    #[error("unreadable CorrLang distribution archive: {0}")]
    Archive(#[from] zip::result::ZipError),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ClientError {
    ClientError::Io {
        path: path.into(),
        source,
    }
}
