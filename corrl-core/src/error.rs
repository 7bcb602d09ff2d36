//! Error types for corrl-core.

use thiserror::Error;

use crate::types::ObjectId;

/// Failures of a single registry round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The registry could not be reached at all.
    #[error("CorrLang service unreachable at {address}: {message}")]
    Transport { address: String, message: String },

    /// The registry refused the request. The reason is passed through verbatim.
    #[error("{0}")]
    Rejected(String),

    /// The registry answered with something this client cannot read.
    #[error("registry protocol error: {0}")]
    Protocol(String),
}

/// Raised by [`crate::classify::classify`] for input that is neither a file, a URL
/// nor a socket address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("'{raw}' is neither an existing file nor a valid URL: {reason}")]
    Invalid { raw: String, reason: String },
}

/// All errors that can arise from core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed or incomplete request. Always raised before any remote call.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    /// A read request named an object that does not exist.
    #[error("cannot find {kind} with name '{name}' in project '{project}'")]
    NotFound {
        kind: &'static str,
        name: String,
        project: String,
    },

    /// `get -t` named a techspace the registry does not know.
    #[error("Techspace '{0}' not found!")]
    UnknownTechSpace(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The configuration step was rejected and removing the endpoint created
    /// for it failed as well, leaving an orphan behind.
    #[error(
        "failed to remove endpoint '{name}' (oid: {id}) after its configuration was rejected: \
         {compensation}; original error: {original}"
    )]
    CompensationFailed {
        id: ObjectId,
        name: String,
        original: GatewayError,
        compensation: GatewayError,
    },
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    /// The verbatim registry reason if this is a remote rejection.
    pub fn rejection(&self) -> Option<&str> {
        match self {
            CoreError::Gateway(GatewayError::Rejected(reason)) => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_message_is_verbatim() {
        let err = CoreError::from(GatewayError::Rejected("has no schema defined".into()));
        assert_eq!(err.to_string(), "has no schema defined");
        assert_eq!(err.rejection(), Some("has no schema defined"));
    }

    #[test]
    fn compensation_failure_mentions_both_errors() {
        let err = CoreError::CompensationFailed {
            id: ObjectId(4),
            name: "Orders".into(),
            original: GatewayError::Rejected("bad schema".into()),
            compensation: GatewayError::Transport {
                address: "http://localhost:6969".into(),
                message: "connection refused".into(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("'Orders' (oid: 4)"), "got: {msg}");
        assert!(msg.contains("connection refused"), "got: {msg}");
        assert!(msg.contains("original error: bad schema"), "got: {msg}");
        assert_eq!(err.rejection(), None);
    }
}
