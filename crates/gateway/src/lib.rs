//! Gateway crate - page- and thread-oriented access to a Gmail mailbox
//!
//! This crate translates a token-authenticated mail provider into a simpler
//! API:
//! - Page-number pagination emulated over continuation tokens
//! - Message detail with a flat, de-duplicated reply thread
//! - Correctly threaded plain-text replies
//!
//! Every operation takes the caller's bearer token; nothing about a request
//! is kept once it returns. Token persistence lives in [`storage`] for the
//! request layer to use.

pub mod config;
pub mod credential;
pub mod error;
pub mod gateway;
pub mod gmail;
pub mod models;
pub mod pagination;
pub mod provider;
pub mod reply;
pub mod storage;
pub mod thread;

pub use config::GatewayConfig;
pub use credential::Credential;
pub use error::{ErrorKind, GatewayError, ProviderError};
pub use gateway::MailGateway;
pub use gmail::{GmailClient, extract_body, summarize};
pub use models::{MessageDetail, MessageId, MessagePage, MessageSummary, SendConfirmation, ThreadId};
pub use pagination::{PageCursor, resolve_page_token};
pub use provider::{InMemoryProvider, MailProvider, MessageFormat};
pub use reply::{EncodedMessage, ReplyContext, ReplyDraft, compose, normalize_subject};
pub use storage::{InMemoryTokenStore, SqliteTokenStore, StoredUser, TokenStore};
pub use thread::get_detail;
