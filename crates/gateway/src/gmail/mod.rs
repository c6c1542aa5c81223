//! Gmail API integration
//!
//! This module provides:
//! - Wire types for the Gmail REST API
//! - A blocking HTTP client implementing [`MailProvider`](crate::provider::MailProvider)
//! - Header and body extraction from raw messages

mod body;
mod client;
mod normalize;

pub use body::{NO_CONTENT, decode_base64_body, extract_body};
pub use client::GmailClient;
pub use normalize::{
    NO_SUBJECT, UNKNOWN_RECIPIENT, UNKNOWN_SENDER, find_header, message_id_header, parse_detail,
    summarize,
};

/// Gmail API response types
pub mod api {
    use serde::{Deserialize, Serialize};

    /// Response from listing messages
    #[derive(Debug, Clone, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ListMessagesResponse {
        pub messages: Option<Vec<MessageRef>>,
        pub next_page_token: Option<String>,
        pub result_size_estimate: Option<u32>,
    }

    /// Reference to a message (just ID and thread ID)
    #[derive(Debug, Clone, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessageRef {
        pub id: String,
        pub thread_id: Option<String>,
    }

    /// Message as returned by `messages.get` and inside threads
    #[derive(Debug, Clone, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GmailMessage {
        pub id: String,
        #[serde(default)]
        pub thread_id: Option<String>,
        #[serde(default)]
        pub snippet: Option<String>,
        #[serde(default)]
        pub payload: Option<PartTree>,
    }

    /// Recursive MIME part layout of a message
    ///
    /// The top-level `payload` and every nested part share this shape.
    #[derive(Debug, Clone, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PartTree {
        #[serde(default)]
        pub mime_type: String,
        #[serde(default)]
        pub headers: Vec<Header>,
        #[serde(default)]
        pub body: Option<PartBody>,
        #[serde(default)]
        pub parts: Vec<PartTree>,
    }

    /// Email header (name-value pair)
    #[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
    pub struct Header {
        pub name: String,
        pub value: String,
    }

    impl Header {
        pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                value: value.into(),
            }
        }
    }

    /// Part body (base64url encoded when inline)
    #[derive(Debug, Clone, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PartBody {
        pub size: Option<u32>,
        pub data: Option<String>,
    }

    /// Response from `threads.get`
    #[derive(Debug, Clone, Default, Deserialize, Serialize)]
    pub struct ThreadResponse {
        pub id: String,
        #[serde(default)]
        pub messages: Vec<GmailMessage>,
    }

    /// Response from `users.getProfile`
    #[derive(Debug, Clone, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProfileResponse {
        pub email_address: Option<String>,
        pub messages_total: Option<u64>,
        pub threads_total: Option<u64>,
    }

    /// Body of `messages.send`
    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SendMessageRequest<'a> {
        pub raw: &'a str,
        pub thread_id: &'a str,
    }

    /// Response from `messages.send`
    #[derive(Debug, Clone, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SentMessage {
        pub id: String,
        #[serde(default)]
        pub thread_id: Option<String>,
        #[serde(default)]
        pub label_ids: Vec<String>,
    }
}
