//! Job-description analysis — drives the remote assistant workflow.
//!
//! ARCHITECTURAL RULE: every Assistants API interaction goes through the
//! `AssistantsApi` trait in `client`. The saga, poller, and compensation
//! pass never touch HTTP directly.

pub mod client;
pub mod compensation;
pub mod extract;
pub mod handlers;
pub mod poller;
pub mod prompts;
pub mod saga;

#[cfg(test)]
pub(crate) mod mock;
