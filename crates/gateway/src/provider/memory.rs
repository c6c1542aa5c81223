//! In-memory mail provider
//!
//! Serves a fixed mailbox from memory and records every call it receives.
//! Used for tests and for running the gateway without network access.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use super::{MailProvider, MessageFormat};
use crate::credential::Credential;
use crate::error::ProviderError;
use crate::gmail::api::{
    GmailMessage, ListMessagesResponse, MessageRef, ProfileResponse, SentMessage, ThreadResponse,
};
use crate::models::{MessageId, ThreadId};

/// A provider call as seen by [`InMemoryProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    ListMessages {
        page_size: u32,
        page_token: Option<String>,
    },
    GetMessage {
        id: String,
        format: MessageFormat,
    },
    GetThread {
        thread_id: String,
    },
    SendRawMessage {
        thread_id: String,
    },
    GetProfile,
}

/// A message submitted through [`MailProvider::send_raw_message`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRecord {
    pub id: String,
    pub raw: String,
    pub thread_id: String,
}

/// Mailbox served from memory, newest message first
#[derive(Default)]
pub struct InMemoryProvider {
    mailbox: RwLock<Vec<GmailMessage>>,
    profile_email: RwLock<Option<String>>,
    accepted_token: RwLock<Option<String>>,
    failing_messages: RwLock<HashMap<String, u16>>,
    failing_threads: RwLock<HashMap<String, u16>>,
    calls: Mutex<Vec<ProviderCall>>,
    sent: Mutex<Vec<SentRecord>>,
}

impl InMemoryProvider {
    const TOKEN_PREFIX: &'static str = "offset-";

    /// Create an empty mailbox with no profile address
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the address returned by `get_profile`
    pub fn with_profile_email(self, email: impl Into<String>) -> Self {
        *self
            .profile_email
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(email.into());
        self
    }

    /// Reject every call whose bearer token differs from `token`
    pub fn with_accepted_token(self, token: impl Into<String>) -> Self {
        *self
            .accepted_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token.into());
        self
    }

    /// Append a message to the end of the mailbox
    pub fn add_message(&self, message: GmailMessage) {
        self.mailbox
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }

    /// Make `get_thread` fail with a server error for this thread
    pub fn fail_thread(&self, thread_id: impl Into<String>) {
        self.fail_thread_with_status(thread_id, 500);
    }

    /// Make `get_thread` fail as if the API answered with `status`
    pub fn fail_thread_with_status(&self, thread_id: impl Into<String>, status: u16) {
        self.failing_threads
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(thread_id.into(), status);
    }

    /// Make `get_message` fail as if the API answered with `status`
    ///
    /// The message still shows up in listings.
    pub fn fail_message_with_status(&self, id: impl Into<String>, status: u16) {
        self.failing_messages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into(), status);
    }

    /// All calls received so far, in arrival order
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Only the `list_messages` calls received so far
    pub fn list_calls(&self) -> Vec<ProviderCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, ProviderCall::ListMessages { .. }))
            .collect()
    }

    /// Forget recorded calls
    pub fn clear_calls(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Messages submitted so far
    pub fn sent(&self) -> Vec<SentRecord> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: ProviderCall, credential: &Credential) -> Result<(), ProviderError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);

        let accepted = self
            .accepted_token
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match accepted.as_deref() {
            Some(token) if token != credential.bearer() => {
                Err(ProviderError::Unauthorized { status: 401 })
            }
            _ => Ok(()),
        }
    }

    fn injected_failure(
        failures: &RwLock<HashMap<String, u16>>,
        key: &str,
        resource: String,
    ) -> Result<(), ProviderError> {
        let status = failures
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied();
        match status {
            None => Ok(()),
            Some(status @ (401 | 403)) => Err(ProviderError::Unauthorized { status }),
            Some(404) => Err(ProviderError::NotFound { resource }),
            Some(status) => Err(ProviderError::Status { status }),
        }
    }

    fn parse_token(token: Option<&str>) -> Result<usize, ProviderError> {
        match token {
            None => Ok(0),
            Some(t) => t
                .strip_prefix(Self::TOKEN_PREFIX)
                .and_then(|n| n.parse().ok())
                .ok_or(ProviderError::Status { status: 400 }),
        }
    }
}

impl MailProvider for InMemoryProvider {
    fn list_messages(
        &self,
        credential: &Credential,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ListMessagesResponse, ProviderError> {
        self.record(
            ProviderCall::ListMessages {
                page_size,
                page_token: page_token.map(str::to_string),
            },
            credential,
        )?;

        let mailbox = self.mailbox.read().unwrap_or_else(PoisonError::into_inner);
        let start = Self::parse_token(page_token)?.min(mailbox.len());
        let end = start.saturating_add(page_size.max(1) as usize).min(mailbox.len());

        let refs: Vec<MessageRef> = mailbox[start..end]
            .iter()
            .map(|m| MessageRef {
                id: m.id.clone(),
                thread_id: m.thread_id.clone(),
            })
            .collect();

        Ok(ListMessagesResponse {
            messages: if refs.is_empty() { None } else { Some(refs) },
            next_page_token: (end < mailbox.len()).then(|| format!("{}{}", Self::TOKEN_PREFIX, end)),
            result_size_estimate: Some(mailbox.len() as u32),
        })
    }

    fn get_message(
        &self,
        credential: &Credential,
        id: &MessageId,
        format: MessageFormat,
    ) -> Result<GmailMessage, ProviderError> {
        self.record(
            ProviderCall::GetMessage {
                id: id.as_str().to_string(),
                format,
            },
            credential,
        )?;

        Self::injected_failure(
            &self.failing_messages,
            id.as_str(),
            format!("message {}", id.as_str()),
        )?;

        let mailbox = self.mailbox.read().unwrap_or_else(PoisonError::into_inner);
        let mut message = mailbox
            .iter()
            .find(|m| m.id == id.as_str())
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                resource: format!("message {}", id.as_str()),
            })?;

        // Metadata responses carry headers but no content
        if format == MessageFormat::Metadata
            && let Some(payload) = message.payload.as_mut()
        {
            payload.body = None;
            payload.parts.clear();
        }

        Ok(message)
    }

    fn get_thread(
        &self,
        credential: &Credential,
        thread_id: &ThreadId,
    ) -> Result<ThreadResponse, ProviderError> {
        self.record(
            ProviderCall::GetThread {
                thread_id: thread_id.as_str().to_string(),
            },
            credential,
        )?;

        Self::injected_failure(
            &self.failing_threads,
            thread_id.as_str(),
            format!("thread {}", thread_id.as_str()),
        )?;

        let mailbox = self.mailbox.read().unwrap_or_else(PoisonError::into_inner);
        let messages: Vec<GmailMessage> = mailbox
            .iter()
            .filter(|m| m.thread_id.as_deref() == Some(thread_id.as_str()))
            .cloned()
            .collect();

        if messages.is_empty() {
            return Err(ProviderError::NotFound {
                resource: format!("thread {}", thread_id.as_str()),
            });
        }

        Ok(ThreadResponse {
            id: thread_id.as_str().to_string(),
            messages,
        })
    }

    fn send_raw_message(
        &self,
        credential: &Credential,
        raw: &str,
        thread_id: &ThreadId,
    ) -> Result<SentMessage, ProviderError> {
        self.record(
            ProviderCall::SendRawMessage {
                thread_id: thread_id.as_str().to_string(),
            },
            credential,
        )?;

        let mut sent = self.sent.lock().unwrap_or_else(PoisonError::into_inner);
        let id = format!("sent-{}", sent.len() + 1);
        sent.push(SentRecord {
            id: id.clone(),
            raw: raw.to_string(),
            thread_id: thread_id.as_str().to_string(),
        });

        Ok(SentMessage {
            id,
            thread_id: Some(thread_id.as_str().to_string()),
            label_ids: vec!["SENT".to_string()],
        })
    }

    fn get_profile(&self, credential: &Credential) -> Result<ProfileResponse, ProviderError> {
        self.record(ProviderCall::GetProfile, credential)?;

        let mailbox_len = self
            .mailbox
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();

        Ok(ProfileResponse {
            email_address: self
                .profile_email
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            messages_total: Some(mailbox_len as u64),
            threads_total: None,
        })
    }
}
