use thiserror::Error;

/// Failure reported by a transport ([`crate::Connector`] or [`crate::Link`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("operation timed out")]
    Timeout,
    #[error("link is not connected")]
    NotConnected,
    #[error("device not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        TransportError::Io(e.to_string())
    }
}

/// Failure reported by [`crate::LinkManager`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// No usable connection after exhausting every attempt. The manager has
    /// already dropped its connection when this is returned.
    #[error("link unavailable after {attempts} attempt(s): {cause}")]
    ConnectionFailure {
        attempts: u32,
        #[source]
        cause: TransportError,
    },
    #[error("write failed: {0}")]
    WriteFailure(#[source] TransportError),
    #[error("liveness probe failed: {0}")]
    VerificationFailure(#[source] TransportError),
}

impl LinkError {
    /// The transport error underneath
    pub fn cause(&self) -> &TransportError {
        match self {
            LinkError::ConnectionFailure { cause, .. } => cause,
            LinkError::WriteFailure(e) | LinkError::VerificationFailure(e) => e,
        }
    }
}
