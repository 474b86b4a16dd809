//! An abstraction layer for chat-completion services.
//!
//! This crate establishes a unified protocol between the conversation
//! session and the completion service it talks to, so that the session
//! can switch between services (or a scripted fake in tests) without
//! modifying the core codebase.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod provider;
mod reply;
mod request;

pub use error::*;
pub use provider::*;
pub use reply::*;
pub use request::*;
