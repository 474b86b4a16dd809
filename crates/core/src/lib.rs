//! Core logic: the conversation store, the completion-request
//! coordinator, and the session that ties them together.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod conversation;
mod model_client;
mod session;

pub use session::{REPLY_ERROR_PREFIX, Session, SessionBuilder, Snapshot};
