//! Gmail API HTTP client
//!
//! Implements [`MailProvider`] against the Gmail REST API.
//! Uses synchronous HTTP (ureq) to be executor-agnostic. The client holds no
//! credentials: the bearer token arrives with each call.

use std::time::Duration;

use log::debug;
use serde::de::DeserializeOwned;

use super::api::{
    GmailMessage, ListMessagesResponse, ProfileResponse, SendMessageRequest, SentMessage,
    ThreadResponse,
};
use crate::config::GatewayConfig;
use crate::credential::Credential;
use crate::error::ProviderError;
use crate::models::{MessageId, ThreadId};
use crate::provider::{MailProvider, MessageFormat};

/// Gmail API client
pub struct GmailClient {
    agent: ureq::Agent,
    base_url: String,
}

impl GmailClient {
    /// Default Gmail API base URL
    pub const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1";

    /// Largest page Gmail will return from `messages.list`
    pub const MAX_PAGE_SIZE: u32 = 500;

    /// Create a client for the given API base URL
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from gateway configuration
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(&config.api_base_url, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorization(credential: &Credential) -> String {
        format!("Bearer {}", credential.bearer())
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        credential: &Credential,
        resource: &str,
    ) -> Result<T, ProviderError> {
        debug!("GET {}", url);

        let mut response = self
            .agent
            .get(url)
            .header("Authorization", &Self::authorization(credential))
            .call()
            .map_err(|e| map_call_error(e, resource))?;

        response
            .body_mut()
            .read_json()
            .map_err(|e| ProviderError::Decode {
                message: format!("{}: {}", resource, e),
            })
    }

    /// Build the `messages.list` URL
    fn list_url(&self, page_size: u32, page_token: Option<&str>) -> String {
        let mut url = format!(
            "{}/users/me/messages?maxResults={}",
            self.base_url,
            page_size.clamp(1, Self::MAX_PAGE_SIZE)
        );

        if let Some(token) = page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
        }

        url
    }

    fn message_url(&self, id: &MessageId, format: MessageFormat) -> String {
        format!(
            "{}/users/me/messages/{}?format={}",
            self.base_url,
            urlencoding::encode(id.as_str()),
            format.as_str()
        )
    }

    fn thread_url(&self, thread_id: &ThreadId) -> String {
        format!(
            "{}/users/me/threads/{}?format=full",
            self.base_url,
            urlencoding::encode(thread_id.as_str())
        )
    }
}

/// Map a ureq request failure into a provider error
fn map_call_error(e: ureq::Error, resource: &str) -> ProviderError {
    match e {
        ureq::Error::StatusCode(status @ (401 | 403)) => ProviderError::Unauthorized { status },
        ureq::Error::StatusCode(404) => ProviderError::NotFound {
            resource: resource.to_string(),
        },
        ureq::Error::StatusCode(status) => ProviderError::Status { status },
        other => ProviderError::Transport {
            message: other.to_string(),
        },
    }
}

impl MailProvider for GmailClient {
    fn list_messages(
        &self,
        credential: &Credential,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ListMessagesResponse, ProviderError> {
        let url = self.list_url(page_size, page_token);
        self.get_json(&url, credential, "message list")
    }

    fn get_message(
        &self,
        credential: &Credential,
        id: &MessageId,
        format: MessageFormat,
    ) -> Result<GmailMessage, ProviderError> {
        let url = self.message_url(id, format);
        self.get_json(&url, credential, &format!("message {}", id.as_str()))
    }

    fn get_thread(
        &self,
        credential: &Credential,
        thread_id: &ThreadId,
    ) -> Result<ThreadResponse, ProviderError> {
        let url = self.thread_url(thread_id);
        self.get_json(&url, credential, &format!("thread {}", thread_id.as_str()))
    }

    fn send_raw_message(
        &self,
        credential: &Credential,
        raw: &str,
        thread_id: &ThreadId,
    ) -> Result<SentMessage, ProviderError> {
        let url = format!("{}/users/me/messages/send", self.base_url);
        debug!("POST {} (thread {})", url, thread_id.as_str());

        let request = SendMessageRequest {
            raw,
            thread_id: thread_id.as_str(),
        };

        let mut response = self
            .agent
            .post(&url)
            .header("Authorization", &Self::authorization(credential))
            .send_json(&request)
            .map_err(|e| map_call_error(e, "send"))?;

        response
            .body_mut()
            .read_json()
            .map_err(|e| ProviderError::Decode {
                message: format!("send: {}", e),
            })
    }

    fn get_profile(&self, credential: &Credential) -> Result<ProfileResponse, ProviderError> {
        let url = format!("{}/users/me/profile", self.base_url);
        self.get_json(&url, credential, "profile")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GmailClient {
        GmailClient::new("https://mail.example.com/v1/", Duration::from_secs(5))
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(client().base_url(), "https://mail.example.com/v1");
    }

    #[test]
    fn test_list_url() {
        let c = client();
        assert_eq!(
            c.list_url(10, None),
            "https://mail.example.com/v1/users/me/messages?maxResults=10"
        );
        assert_eq!(
            c.list_url(10_000, Some("abc+/=")),
            "https://mail.example.com/v1/users/me/messages?maxResults=500&pageToken=abc%2B%2F%3D"
        );
    }

    #[test]
    fn test_message_and_thread_urls() {
        let c = client();
        assert_eq!(
            c.message_url(&MessageId::new("m1"), MessageFormat::Metadata),
            "https://mail.example.com/v1/users/me/messages/m1?format=metadata"
        );
        assert_eq!(
            c.thread_url(&ThreadId::new("t1")),
            "https://mail.example.com/v1/users/me/threads/t1?format=full"
        );
    }

    #[test]
    fn test_map_call_error() {
        assert!(matches!(
            map_call_error(ureq::Error::StatusCode(401), "profile"),
            ProviderError::Unauthorized { status: 401 }
        ));
        assert!(matches!(
            map_call_error(ureq::Error::StatusCode(404), "message m1"),
            ProviderError::NotFound { ref resource } if resource == "message m1"
        ));
        assert!(matches!(
            map_call_error(ureq::Error::StatusCode(502), "profile"),
            ProviderError::Status { status: 502 }
        ));
    }
}
