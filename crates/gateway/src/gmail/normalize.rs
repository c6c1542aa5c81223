//! Gmail API response normalization
//!
//! Converts raw Gmail messages into gateway summaries and details.

use super::api::{GmailMessage, PartTree};
use super::body::extract_body;
use crate::models::{MessageDetail, MessageId, MessageSummary, ThreadId};

pub const NO_SUBJECT: &str = "No Subject";
pub const UNKNOWN_SENDER: &str = "Unknown Sender";
pub const UNKNOWN_RECIPIENT: &str = "Unknown Recipient";

/// Summarize a message for a list page
///
/// Missing headers fall back to fixed defaults instead of failing.
pub fn summarize(msg: &GmailMessage) -> MessageSummary {
    let payload = msg.payload.as_ref();

    MessageSummary {
        id: MessageId::new(&msg.id),
        snippet: msg.snippet.clone().unwrap_or_default(),
        subject: header_or(payload, "Subject", NO_SUBJECT),
        from: header_or(payload, "From", UNKNOWN_SENDER),
    }
}

/// Parse a full-format message into a detail without replies
pub fn parse_detail(msg: &GmailMessage) -> MessageDetail {
    let payload = msg.payload.as_ref();

    MessageDetail {
        id: MessageId::new(&msg.id),
        thread_id: msg.thread_id.as_deref().map(ThreadId::new),
        from: header_or(payload, "From", UNKNOWN_SENDER),
        to: header_or(payload, "To", UNKNOWN_RECIPIENT),
        subject: header_or(payload, "Subject", NO_SUBJECT),
        body: payload
            .map(extract_body)
            .unwrap_or_else(|| super::NO_CONTENT.to_string()),
        replies: Vec::new(),
    }
}

/// Find a header value by exact (case-sensitive) name
pub fn find_header<'a>(payload: &'a PartTree, name: &str) -> Option<&'a str> {
    payload
        .headers
        .iter()
        .find(|h| h.name == name)
        .map(|h| h.value.as_str())
}

/// Find the RFC 5322 `Message-ID` header of a message
///
/// Exact spelling wins; otherwise falls back to any casing (`Message-Id`
/// is common from some MTAs).
pub fn message_id_header(payload: &PartTree) -> Option<&str> {
    find_header(payload, "Message-ID").or_else(|| {
        payload
            .headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case("Message-ID"))
            .map(|h| h.value.as_str())
    })
}

fn header_or(payload: Option<&PartTree>, name: &str, default: &str) -> String {
    payload
        .and_then(|p| find_header(p, name))
        .unwrap_or(default)
        .to_string()
}
