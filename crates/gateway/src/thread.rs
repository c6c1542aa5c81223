//! Message detail with its flattened reply thread

use log::{debug, warn};

use crate::credential::Credential;
use crate::error::{GatewayError, Result};
use crate::gmail::api::GmailMessage;
use crate::gmail::parse_detail;
use crate::models::{MessageDetail, MessageId, ThreadId};
use crate::provider::{MailProvider, MessageFormat};

/// Fetch a message and the other messages of its thread
///
/// Replies come back flat and in provider order, with the requested message
/// filtered out. Any failure to fetch the message itself (missing, rejected
/// credential, provider outage) is reported as [`GatewayError::NotFound`];
/// failing to fetch the thread only costs the replies.
pub fn get_detail<P: MailProvider + ?Sized>(
    provider: &P,
    credential: &Credential,
    message_id: &MessageId,
) -> Result<MessageDetail> {
    let message = provider
        .get_message(credential, message_id, MessageFormat::Full)
        .map_err(|e| {
            warn!("Fetching message {} failed: {}", message_id.as_str(), e);
            GatewayError::NotFound {
                resource: format!("message {}", message_id.as_str()),
            }
        })?;
    let mut detail = parse_detail(&message);

    let Some(thread_id) = detail.thread_id.clone() else {
        debug!("Message {} has no thread, skipping replies", message_id.as_str());
        return Ok(detail);
    };

    detail.replies = fetch_replies(provider, credential, &thread_id, message_id);
    Ok(detail)
}

/// Fetch a thread and parse every message except `exclude`
///
/// Returns an empty list if the thread can't be fetched.
fn fetch_replies<P: MailProvider + ?Sized>(
    provider: &P,
    credential: &Credential,
    thread_id: &ThreadId,
    exclude: &MessageId,
) -> Vec<MessageDetail> {
    match provider.get_thread(credential, thread_id) {
        Ok(thread) => {
            let replies = flatten_replies(&thread.messages, exclude);
            debug!(
                "Thread {} has {} replies besides {}",
                thread_id.as_str(),
                replies.len(),
                exclude.as_str()
            );
            replies
        }
        Err(e) => {
            warn!(
                "Failed to fetch thread {} for message {}: {}",
                thread_id.as_str(),
                exclude.as_str(),
                e
            );
            Vec::new()
        }
    }
}

/// Parse thread messages into replies, dropping every copy of `exclude`
pub fn flatten_replies(messages: &[GmailMessage], exclude: &MessageId) -> Vec<MessageDetail> {
    messages
        .iter()
        .filter(|m| m.id != exclude.as_str())
        .map(parse_detail)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gmail::api::{Header, PartBody, PartTree};
    use crate::provider::InMemoryProvider;
    use base64::prelude::*;

    fn message(id: &str, thread_id: &str, from: &str, body: &str) -> GmailMessage {
        GmailMessage {
            id: id.to_string(),
            thread_id: Some(thread_id.to_string()),
            snippet: Some(body.to_string()),
            payload: Some(PartTree {
                mime_type: "text/plain".to_string(),
                headers: vec![
                    Header::new("From", from),
                    Header::new("To", "me@y.com"),
                    Header::new("Subject", "Plans"),
                ],
                body: Some(PartBody {
                    size: Some(body.len() as u32),
                    data: Some(BASE64_URL_SAFE_NO_PAD.encode(body)),
                }),
                parts: Vec::new(),
            }),
        }
    }

    fn cred() -> Credential {
        Credential::new("token").unwrap()
    }

    #[test]
    fn test_detail_with_replies_in_thread_order() {
        let provider = InMemoryProvider::new();
        provider.add_message(message("m1", "t1", "a@x.com", "First"));
        provider.add_message(message("m2", "t1", "b@x.com", "Second"));
        provider.add_message(message("m3", "t1", "c@x.com", "Third"));
        provider.add_message(message("m4", "t2", "d@x.com", "Other thread"));

        let detail = get_detail(&provider, &cred(), &MessageId::new("m2")).unwrap();

        assert_eq!(detail.id.as_str(), "m2");
        assert_eq!(detail.body, "Second");
        let ids: Vec<&str> = detail.replies.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m3"]);
        assert!(detail.replies.iter().all(|r| r.replies.is_empty()));
        assert_eq!(detail.replies[1].from, "c@x.com");
    }

    #[test]
    fn test_flatten_replies_drops_duplicates_of_requested_id() {
        let messages = vec![
            message("m1", "t1", "a@x.com", "First"),
            message("m1", "t1", "a@x.com", "First again"),
            message("m2", "t1", "b@x.com", "Second"),
        ];
        let replies = flatten_replies(&messages, &MessageId::new("m1"));
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].id.as_str(), "m2");
    }

    #[test]
    fn test_thread_failure_degrades_to_no_replies() {
        let provider = InMemoryProvider::new();
        provider.add_message(message("m1", "t1", "a@x.com", "First"));
        provider.add_message(message("m2", "t1", "b@x.com", "Second"));
        provider.fail_thread("t1");

        let detail = get_detail(&provider, &cred(), &MessageId::new("m1")).unwrap();

        assert_eq!(detail.body, "First");
        assert!(detail.replies.is_empty());
    }

    #[test]
    fn test_missing_message_is_not_found() {
        let provider = InMemoryProvider::new();
        let result = get_detail(&provider, &cred(), &MessageId::new("ghost"));
        assert!(matches!(result, Err(GatewayError::NotFound { .. })));
    }

    #[test]
    fn test_rejected_credential_is_not_found() {
        let provider = InMemoryProvider::new().with_accepted_token("good");
        provider.add_message(message("m1", "t1", "a@x.com", "First"));

        let revoked = Credential::new("revoked").unwrap();
        let err = get_detail(&provider, &revoked, &MessageId::new("m1")).unwrap_err();

        assert!(matches!(err, GatewayError::NotFound { ref resource } if resource == "message m1"));
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
    }

    #[test]
    fn test_provider_outage_on_message_is_not_found() {
        let provider = InMemoryProvider::new();
        provider.add_message(message("m1", "t1", "a@x.com", "First"));
        provider.fail_message_with_status("m1", 503);

        let result = get_detail(&provider, &cred(), &MessageId::new("m1"));

        assert!(matches!(result, Err(GatewayError::NotFound { .. })));
    }

    #[test]
    fn test_thread_not_found_degrades_to_no_replies() {
        let provider = InMemoryProvider::new();
        provider.add_message(message("m1", "t1", "a@x.com", "First"));
        provider.add_message(message("m2", "t1", "b@x.com", "Second"));
        provider.fail_thread_with_status("t1", 404);

        let detail = get_detail(&provider, &cred(), &MessageId::new("m1")).unwrap();

        assert_eq!(detail.body, "First");
        assert!(detail.replies.is_empty());
    }

    #[test]
    fn test_message_without_thread_has_no_replies() {
        let provider = InMemoryProvider::new();
        let mut msg = message("m1", "t1", "a@x.com", "Loner");
        msg.thread_id = None;
        provider.add_message(msg);

        let detail = get_detail(&provider, &cred(), &MessageId::new("m1")).unwrap();

        assert!(detail.replies.is_empty());
        assert_eq!(provider.calls().len(), 1);
    }
}
