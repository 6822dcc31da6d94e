use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::analysis::saga::AnalysisSaga;
use crate::chat::client::ChatClient;
use crate::chat::log::ConversationLog;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The job-analysis saga, holding the Assistants API client behind its trait.
    pub analysis: AnalysisSaga,
    pub chat: ChatClient,
    /// In-memory conversation logs keyed by session id. The lock is only held
    /// for append/snapshot, never across a remote call.
    pub conversations: Arc<Mutex<HashMap<Uuid, ConversationLog>>>,
    pub config: Config,
}
