//! Error taxonomy for the gateway
//!
//! Provider clients report [`ProviderError`]. Everything that leaves the
//! facade is a [`GatewayError`].

/// Failure reported by a [`MailProvider`](crate::provider::MailProvider)
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider rejected the credential (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("Provider resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Provider returned HTTP {status}")]
    Status { status: u16 },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Failed to decode provider response: {message}")]
    Decode { message: String },
}

/// How a request layer should surface a [`GatewayError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent something unusable (HTTP 400 territory)
    ClientInput,
    /// The requested message or thread does not exist (HTTP 404)
    NotFound,
    /// The gateway or the provider failed (HTTP 5xx)
    ServerSide,
}

/// Error returned by every public gateway operation
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Access token is required")]
    MissingCredential,

    #[error("Invalid page number {page} or no more pages available")]
    ExhaustedPages { page: u32 },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Invalid reply context: {reason}")]
    InvalidReplyContext { reason: String },

    #[error("Mail provider unavailable: {message}")]
    ProviderUnavailable { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Token storage error: {message}")]
    Storage { message: String },
}

impl GatewayError {
    /// Classify the error for the request layer
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::MissingCredential
            | GatewayError::ExhaustedPages { .. }
            | GatewayError::InvalidReplyContext { .. }
            | GatewayError::InvalidArgument { .. } => ErrorKind::ClientInput,
            GatewayError::NotFound { .. } => ErrorKind::NotFound,
            GatewayError::ProviderUnavailable { .. } | GatewayError::Storage { .. } => {
                ErrorKind::ServerSide
            }
        }
    }

    pub(crate) fn invalid_reply(reason: impl Into<String>) -> Self {
        GatewayError::InvalidReplyContext {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        GatewayError::InvalidArgument {
            message: message.into(),
        }
    }
}

impl From<ProviderError> for GatewayError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::NotFound { resource } => GatewayError::NotFound { resource },
            other => GatewayError::ProviderUnavailable {
                message: other.to_string(),
            },
        }
    }
}

impl From<anyhow::Error> for GatewayError {
    fn from(e: anyhow::Error) -> Self {
        GatewayError::Storage {
            message: format!("{:#}", e),
        }
    }
}

pub type Result<T, E = GatewayError> = std::result::Result<T, E>;
