use thiserror::Error;

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Uniform failure contract for every backend call.
///
/// The gateway never decides whether a failure means the session is gone;
/// callers use [`GatewayError::is_authorization_failure`] for that.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("network failure calling {path}: {source}")]
    Network {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{message}")]
    Backend { status: u16, message: String },
    #[error("malformed response from {path}: {source}")]
    MalformedResponse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl GatewayError {
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Expired, invalid or missing bearer token.
    pub fn is_authorization_failure(&self) -> bool {
        matches!(self, Self::Backend { status: 401, .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            Self::Network { source, .. } => source.status().map(|status| status.as_u16()),
            Self::MalformedResponse { .. } => None,
        }
    }
}
