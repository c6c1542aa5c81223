//! Mail provider contract
//!
//! The gateway never talks HTTP directly. Everything goes through a
//! [`MailProvider`], and the caller's credential is handed to every call so
//! no provider session outlives a single operation.

mod memory;

pub use memory::{InMemoryProvider, ProviderCall, SentRecord};

use crate::credential::Credential;
use crate::error::ProviderError;
use crate::gmail::api::{GmailMessage, ListMessagesResponse, ProfileResponse, SentMessage, ThreadResponse};
use crate::models::{MessageId, ThreadId};

/// How much of a message the provider should return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageFormat {
    /// Headers and snippet only
    Metadata,
    /// Headers plus the full part tree with inline bodies
    Full,
}

impl MessageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageFormat::Metadata => "metadata",
            MessageFormat::Full => "full",
        }
    }
}

/// Operations the gateway needs from a remote mailbox
///
/// Implementations must be safe to call from several threads at once; list
/// pages fetch their messages concurrently.
pub trait MailProvider: Send + Sync {
    /// List message references, `page_size` at a time
    fn list_messages(
        &self,
        credential: &Credential,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ListMessagesResponse, ProviderError>;

    /// Get a single message
    fn get_message(
        &self,
        credential: &Credential,
        id: &MessageId,
        format: MessageFormat,
    ) -> Result<GmailMessage, ProviderError>;

    /// Get every message of a thread, in provider order
    fn get_thread(
        &self,
        credential: &Credential,
        thread_id: &ThreadId,
    ) -> Result<ThreadResponse, ProviderError>;

    /// Submit an already encoded RFC 2822 message into an existing thread
    fn send_raw_message(
        &self,
        credential: &Credential,
        raw: &str,
        thread_id: &ThreadId,
    ) -> Result<SentMessage, ProviderError>;

    /// Get the authenticated user's profile
    fn get_profile(&self, credential: &Credential) -> Result<ProfileResponse, ProviderError>;
}
