//! Reply composition and submission
//!
//! A reply is threaded two ways: the provider gets the original `threadId`,
//! and the message itself carries `In-Reply-To`/`References` pointing at the
//! original `Message-ID` header (not the provider's internal message id).

use base64::prelude::*;
use log::{debug, info};

use crate::credential::Credential;
use crate::error::{GatewayError, Result};
use crate::gmail::{find_header, message_id_header};
use crate::models::{MessageId, SendConfirmation, ThreadId};
use crate::provider::{MailProvider, MessageFormat};

const REPLY_PREFIX: &str = "Re:";

/// Everything needed to thread a reply onto an existing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyContext {
    pub thread_id: ThreadId,
    /// `Message-ID` header of the message being answered
    pub message_id_header: String,
    /// Reply recipient (the original sender)
    pub to: String,
    /// Reply sender (the authenticated user)
    pub from: String,
}

impl ReplyContext {
    /// Build a context, rejecting any blank field
    pub fn new(
        thread_id: impl Into<String>,
        message_id_header: impl Into<String>,
        to: impl Into<String>,
        from: impl Into<String>,
    ) -> Result<Self> {
        let thread_id = thread_id.into();
        let message_id_header = message_id_header.into();
        let to = to.into();
        let from = from.into();

        if thread_id.trim().is_empty() {
            return Err(GatewayError::invalid_reply("original thread id not found"));
        }
        if message_id_header.trim().is_empty() {
            return Err(GatewayError::invalid_reply("original Message-ID not found"));
        }
        if to.trim().is_empty() {
            return Err(GatewayError::invalid_reply("original sender not found"));
        }
        if from.trim().is_empty() {
            return Err(GatewayError::invalid_reply("own email address not found"));
        }

        Ok(Self {
            thread_id: ThreadId::new(thread_id),
            message_id_header,
            to,
            from,
        })
    }
}

/// A reply ready to be rendered into a message block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyDraft {
    pub in_reply_to: String,
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

impl ReplyDraft {
    /// Draft a reply within `context`; the subject gets a single "Re: " prefix
    pub fn new(context: &ReplyContext, subject: &str, body: &str) -> Self {
        Self {
            in_reply_to: context.message_id_header.clone(),
            to: context.to.clone(),
            from: context.from.clone(),
            subject: normalize_subject(subject),
            body: body.to_string(),
        }
    }

    /// Render headers and body as a plain-text RFC 2822 message
    pub fn message_block(&self) -> String {
        let lines = [
            format!("To: {}", header_value(&self.to)),
            format!("From: {}", header_value(&self.from)),
            format!("Subject: {}", header_value(&self.subject)),
            format!("In-Reply-To: {}", header_value(&self.in_reply_to)),
            format!("References: {}", header_value(&self.in_reply_to)),
            r#"Content-Type: text/plain; charset="UTF-8""#.to_string(),
            "MIME-Version: 1.0".to_string(),
            String::new(),
            self.body.clone(),
        ];
        lines.join("\n")
    }
}

/// A reply encoded for raw submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMessage {
    /// base64url message block without padding
    pub raw: String,
    pub thread_id: ThreadId,
}

/// Prefix "Re: " unless the subject already starts with "Re:"
///
/// The check is case-sensitive, so "RE: x" still gets a prefix.
pub fn normalize_subject(subject: &str) -> String {
    if subject.starts_with(REPLY_PREFIX) {
        subject.to_string()
    } else {
        format!("{} {}", REPLY_PREFIX, subject)
    }
}

/// Encode a message block in the provider's raw transport encoding
pub fn encode_raw(block: &str) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(block.as_bytes())
}

/// Compose and encode a reply
pub fn compose(context: &ReplyContext, subject: &str, body: &str) -> EncodedMessage {
    let draft = ReplyDraft::new(context, subject, body);
    EncodedMessage {
        raw: encode_raw(&draft.message_block()),
        thread_id: context.thread_id.clone(),
    }
}

/// Look up threading data for a reply to `message_id`
///
/// Reads the original's thread id, `Message-ID` and `From` headers, and the
/// caller's own address from their profile. Nothing is sent here.
pub fn resolve_reply_context<P: MailProvider + ?Sized>(
    provider: &P,
    credential: &Credential,
    message_id: &MessageId,
) -> Result<ReplyContext> {
    let original = provider.get_message(credential, message_id, MessageFormat::Metadata)?;

    let thread_id = original
        .thread_id
        .as_deref()
        .ok_or_else(|| GatewayError::invalid_reply("original thread id not found"))?;
    let payload = original
        .payload
        .as_ref()
        .ok_or_else(|| GatewayError::invalid_reply("original message has no headers"))?;
    let message_id_header = message_id_header(payload)
        .ok_or_else(|| GatewayError::invalid_reply("original Message-ID not found"))?;
    let to = find_header(payload, "From")
        .ok_or_else(|| GatewayError::invalid_reply("original sender not found"))?;

    let profile = provider.get_profile(credential)?;
    let from = profile
        .email_address
        .ok_or_else(|| GatewayError::invalid_reply("own email address not found"))?;

    ReplyContext::new(thread_id, message_id_header, to, from)
}

/// Reply to `message_id` inside its thread
pub fn send_reply<P: MailProvider + ?Sized>(
    provider: &P,
    credential: &Credential,
    message_id: &MessageId,
    subject: &str,
    body: &str,
) -> Result<SendConfirmation> {
    let context = resolve_reply_context(provider, credential, message_id)?;
    let encoded = compose(&context, subject, body);

    debug!(
        "Submitting reply to {} in thread {} ({} encoded bytes)",
        message_id.as_str(),
        encoded.thread_id.as_str(),
        encoded.raw.len()
    );

    let sent = provider.send_raw_message(credential, &encoded.raw, &encoded.thread_id)?;
    let thread_id = sent.thread_id.map(ThreadId::new).unwrap_or(encoded.thread_id);

    info!("Sent reply {} in thread {}", sent.id, thread_id.as_str());
    Ok(SendConfirmation::new(MessageId::new(sent.id), thread_id))
}

/// Header values are single-line; fold any line breaks into spaces
fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
