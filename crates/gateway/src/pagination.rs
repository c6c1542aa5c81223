//! Page-number pagination over continuation tokens
//!
//! The provider only hands out forward-only `nextPageToken`s, so reaching
//! page N means replaying the list call N - 1 times from the start.

use log::debug;

use crate::credential::Credential;
use crate::error::{GatewayError, Result};
use crate::provider::MailProvider;

/// A 1-based page number plus the page size it was counted with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page_number: u32,
    page_size: u32,
}

impl PageCursor {
    /// Create a cursor; both values must be at least 1
    pub fn new(page_number: u32, page_size: u32) -> Result<Self> {
        if page_number == 0 {
            return Err(GatewayError::invalid_argument("page must be 1 or greater"));
        }
        if page_size == 0 {
            return Err(GatewayError::invalid_argument("page size must be 1 or greater"));
        }
        Ok(Self {
            page_number,
            page_size,
        })
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn is_first_page(&self) -> bool {
        self.page_number == 1
    }
}

/// Resolve the continuation token that starts the cursor's page
///
/// Page 1 needs no token and makes no provider call. Any other page costs
/// `page_number - 1` sequential list round-trips, each fed the token from the
/// one before; nothing is cached between calls, so every request re-walks
/// from page 1. Fails with [`GatewayError::ExhaustedPages`] when the provider
/// runs out of pages first.
pub fn resolve_page_token<P: MailProvider + ?Sized>(
    provider: &P,
    credential: &Credential,
    cursor: &PageCursor,
) -> Result<Option<String>> {
    if cursor.is_first_page() {
        return Ok(None);
    }

    let mut page_token: Option<String> = None;

    for current_page in 1..cursor.page_number {
        let response = provider.list_messages(credential, cursor.page_size, page_token.as_deref())?;

        match response.next_page_token {
            Some(token) => {
                debug!(
                    "Walked page {} of {} (page size {})",
                    current_page, cursor.page_number, cursor.page_size
                );
                page_token = Some(token);
            }
            None => {
                debug!(
                    "Provider ran out of pages after page {} (wanted page {})",
                    current_page, cursor.page_number
                );
                return Err(GatewayError::ExhaustedPages {
                    page: cursor.page_number,
                });
            }
        }
    }

    Ok(page_token)
}
