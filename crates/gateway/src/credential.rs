//! Bearer credential passed into every provider call

use std::fmt;

use crate::error::{GatewayError, Result};

/// Opaque bearer token authorizing provider calls for one user
///
/// Owned by the caller and handed by reference to each provider call. The
/// token never shows up in `Debug` output, so it can't leak through logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a bearer token, rejecting empty or whitespace-only input
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(GatewayError::MissingCredential);
        }
        Ok(Self(token))
    }

    /// Raw token for the `Authorization` header
    pub fn bearer(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}
