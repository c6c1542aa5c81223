//! Domain models produced by the gateway

mod message;
mod thread;

pub use message::{MessageDetail, MessageId, MessagePage, MessageSummary, SendConfirmation};
pub use thread::ThreadId;
