//! Token storage
//!
//! The request layer keeps each user's OAuth tokens keyed by email.
//! The trait-based design allows swapping between in-memory and SQLite
//! backends.

mod memory;
mod sqlite;
mod traits;

pub use memory::InMemoryTokenStore;
pub use sqlite::SqliteTokenStore;
pub use traits::{StoredUser, TokenStore};
