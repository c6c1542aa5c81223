//! Mail gateway facade
//!
//! The three operations a request layer calls: list a page, show a message
//! with its replies, and reply in-thread. Each call takes the caller's bearer
//! token and keeps nothing from it afterwards.

use log::{error, info};
use rayon::prelude::*;

use crate::config::GatewayConfig;
use crate::credential::Credential;
use crate::error::{GatewayError, Result};
use crate::gmail::{GmailClient, summarize};
use crate::models::{MessageDetail, MessageId, MessagePage, MessageSummary, SendConfirmation};
use crate::pagination::{PageCursor, resolve_page_token};
use crate::provider::{MailProvider, MessageFormat};
use crate::{reply, thread};

/// Stateless facade over a [`MailProvider`]
pub struct MailGateway<P: MailProvider> {
    provider: P,
    config: GatewayConfig,
    fetch_pool: rayon::ThreadPool,
}

impl MailGateway<GmailClient> {
    /// Create a gateway talking to the Gmail API described by `config`
    pub fn gmail(config: GatewayConfig) -> Result<Self> {
        let client = GmailClient::from_config(&config);
        Self::new(client, config)
    }
}

impl<P: MailProvider> MailGateway<P> {
    /// Create a gateway over any provider
    pub fn new(provider: P, config: GatewayConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| GatewayError::invalid_argument(format!("{:#}", e)))?;

        let fetch_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.max_concurrent_fetches)
            .thread_name(|i| format!("gateway-fetch-{}", i))
            .build()
            .map_err(|e| GatewayError::invalid_argument(format!("fetch pool: {}", e)))?;

        Ok(Self {
            provider,
            config,
            fetch_pool,
        })
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// List one page of message summaries
    ///
    /// Pages are numbered from 1. Reaching page N replays N - 1 list calls
    /// (see [`resolve_page_token`]).
    pub fn list(&self, credential: &str, page: u32, page_size: u32) -> Result<MessagePage> {
        let credential = Credential::new(credential)?;
        if page_size > self.config.max_page_size {
            return Err(GatewayError::invalid_argument(format!(
                "page size must be at most {}",
                self.config.max_page_size
            )));
        }
        let cursor = PageCursor::new(page, page_size)?;

        info!("Listing page {} ({} per page)", page, page_size);

        let result = self.list_page(&credential, &cursor);
        log_failure("list", &result);
        result
    }

    /// List the first page using the configured default page size
    pub fn list_default(&self, credential: &str) -> Result<MessagePage> {
        self.list(credential, 1, self.config.default_page_size)
    }

    /// Fetch a message with its decoded body and flat reply list
    pub fn detail(&self, credential: &str, message_id: &str) -> Result<MessageDetail> {
        let credential = Credential::new(credential)?;
        let message_id = parse_message_id(message_id)?;

        info!("Fetching detail for message {}", message_id.as_str());

        let result = thread::get_detail(&self.provider, &credential, &message_id);
        log_failure("detail", &result);
        result
    }

    /// Reply to a message inside its thread
    pub fn send_reply(
        &self,
        credential: &str,
        message_id: &str,
        subject: &str,
        body: &str,
    ) -> Result<SendConfirmation> {
        let credential = Credential::new(credential)?;
        let message_id = parse_message_id(message_id)?;
        if subject.is_empty() || body.is_empty() {
            return Err(GatewayError::invalid_argument(
                "subject and message are required",
            ));
        }

        info!("Replying to message {}", message_id.as_str());

        let result = reply::send_reply(&self.provider, &credential, &message_id, subject, body);
        log_failure("send_reply", &result);
        result
    }

    fn list_page(&self, credential: &Credential, cursor: &PageCursor) -> Result<MessagePage> {
        let page_token = resolve_page_token(&self.provider, credential, cursor)?;

        let listing = self.provider.list_messages(
            credential,
            cursor.page_size(),
            page_token.as_deref(),
        )?;

        let ids: Vec<MessageId> = listing
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(|m| MessageId::new(m.id))
            .collect();

        Ok(MessagePage {
            summaries: self.summarize_all(credential, &ids)?,
            total_estimate: listing.result_size_estimate.unwrap_or(0),
            next_token: listing.next_page_token,
        })
    }

    /// Fetch and summarize messages concurrently, keeping `ids` order
    fn summarize_all(&self, credential: &Credential, ids: &[MessageId]) -> Result<Vec<MessageSummary>> {
        let provider = &self.provider;

        self.fetch_pool.install(|| {
            ids.par_iter()
                .map(|id| {
                    provider
                        .get_message(credential, id, MessageFormat::Metadata)
                        .map(|msg| summarize(&msg))
                        .map_err(GatewayError::from)
                })
                .collect()
        })
    }
}

fn parse_message_id(id: &str) -> Result<MessageId> {
    let id = id.trim();
    if id.is_empty() {
        return Err(GatewayError::invalid_argument("message id is required"));
    }
    Ok(MessageId::new(id))
}

fn log_failure<T>(operation: &str, result: &Result<T>) {
    if let Err(e) = result {
        error!("{} failed: {}", operation, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::InMemoryProvider;

    fn gateway() -> MailGateway<InMemoryProvider> {
        MailGateway::new(InMemoryProvider::new(), GatewayConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_credential_rejected_before_provider() {
        let gw = gateway();

        assert!(matches!(gw.list("", 1, 10), Err(GatewayError::MissingCredential)));
        assert!(matches!(gw.detail(" ", "m1"), Err(GatewayError::MissingCredential)));
        assert!(matches!(
            gw.send_reply("", "m1", "Hi", "Body"),
            Err(GatewayError::MissingCredential)
        ));
        assert!(gw.provider().calls().is_empty());
    }

    #[test]
    fn test_invalid_paging_arguments() {
        let gw = gateway();

        assert!(matches!(gw.list("tok", 0, 10), Err(GatewayError::InvalidArgument { .. })));
        assert!(matches!(gw.list("tok", 1, 0), Err(GatewayError::InvalidArgument { .. })));
        assert!(matches!(gw.list("tok", 1, 501), Err(GatewayError::InvalidArgument { .. })));
        assert!(gw.provider().calls().is_empty());
    }

    #[test]
    fn test_reply_requires_subject_and_body() {
        let gw = gateway();

        assert!(matches!(
            gw.send_reply("tok", "m1", "", "Body"),
            Err(GatewayError::InvalidArgument { .. })
        ));
        assert!(matches!(
            gw.send_reply("tok", "m1", "Hi", ""),
            Err(GatewayError::InvalidArgument { .. })
        ));
        assert!(matches!(
            gw.detail("tok", ""),
            Err(GatewayError::InvalidArgument { .. })
        ));
        assert!(gw.provider().calls().is_empty());
    }

    #[test]
    fn test_empty_mailbox_lists_nothing() {
        let gw = gateway();
        let page = gw.list_default("tok").unwrap();
        assert!(page.summaries.is_empty());
        assert_eq!(page.total_estimate, 0);
        assert_eq!(page.next_token, None);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GatewayConfig {
            max_concurrent_fetches: 0,
            ..GatewayConfig::default()
        };
        assert!(MailGateway::new(InMemoryProvider::new(), config).is_err());
    }
}
