//! Message models returned by the gateway

use super::ThreadId;
use serde::{Deserialize, Serialize};

/// Unique identifier for a message (provider message ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Compact view of a message for list pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSummary {
    pub id: MessageId,
    /// Provider-generated preview of the body
    pub snippet: String,
    pub subject: String,
    pub from: String,
}

/// One page of message summaries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    /// Summaries in provider order
    pub summaries: Vec<MessageSummary>,
    /// Provider's estimate of the total result count (0 when not reported)
    pub total_estimate: u32,
    /// Continuation token for the page after this one
    pub next_token: Option<String>,
}

/// A message with its decoded body and the other messages of its thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDetail {
    pub id: MessageId,
    /// Thread the message belongs to, if the provider reported one
    pub thread_id: Option<ThreadId>,
    pub from: String,
    pub to: String,
    pub subject: String,
    /// First plain-text body, or "No Content"
    pub body: String,
    /// Other messages of the thread in provider order.
    ///
    /// Never contains the message itself, and replies never carry replies
    /// of their own.
    pub replies: Vec<MessageDetail>,
}

/// Acknowledgement returned after a reply was submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendConfirmation {
    /// Provider ID of the sent message
    pub id: MessageId,
    /// Thread the reply was attached to
    pub thread_id: ThreadId,
    pub message: String,
}

impl SendConfirmation {
    pub const SENT_IN_THREAD: &'static str = "Reply sent successfully in the same thread!";

    pub fn new(id: MessageId, thread_id: ThreadId) -> Self {
        Self {
            id,
            thread_id,
            message: Self::SENT_IN_THREAD.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_serializes_as_plain_string() {
        let summary = MessageSummary {
            id: MessageId::new("m1"),
            snippet: "hello".to_string(),
            subject: "Hi".to_string(),
            from: "a@x.com".to_string(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["id"], "m1");
    }

    #[test]
    fn test_detail_uses_camel_case_keys() {
        let detail = MessageDetail {
            id: MessageId::new("m1"),
            thread_id: Some(ThreadId::new("t1")),
            from: "a@x.com".to_string(),
            to: "b@y.com".to_string(),
            subject: "Hi".to_string(),
            body: "Body".to_string(),
            replies: Vec::new(),
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["threadId"], "t1");
        assert!(json["replies"].as_array().unwrap().is_empty());
    }
}
