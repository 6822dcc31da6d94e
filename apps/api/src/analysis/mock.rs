//! Scripted in-memory `AssistantsApi` shared by the saga, poller,
//! compensation, and extractor tests. Records every call, hands out fresh
//! ids per resource kind, and can be told to fail specific calls.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::client::{
    ApiError, AssistantsApi, MessageContent, MessageText, Run, RunStatus, ThreadMessage,
};
use super::compensation::ResourceKind;

pub fn assistant_message(text: &str) -> ThreadMessage {
    ThreadMessage {
        role: "assistant".to_string(),
        content: vec![MessageContent {
            text: Some(MessageText {
                value: text.to_string(),
            }),
        }],
    }
}

pub fn user_message(text: &str) -> ThreadMessage {
    ThreadMessage {
        role: "user".to_string(),
        content: vec![MessageContent {
            text: Some(MessageText {
                value: text.to_string(),
            }),
        }],
    }
}

fn scripted_failure() -> ApiError {
    ApiError::Status {
        status: 500,
        body: "scripted failure".to_string(),
    }
}

#[derive(Default)]
pub struct MockApi {
    calls: Mutex<Vec<String>>,
    counters: Mutex<HashMap<&'static str, u32>>,
    fail_call: Option<&'static str>,
    fail_deletes: Vec<ResourceKind>,
    /// Scripted run-status replies, consumed front to back. `Err(())` stands
    /// for a transport blip. Once drained, the mock answers `in_progress`
    /// forever, which is how timeout scenarios are scripted.
    statuses: Mutex<VecDeque<Result<RunStatus, ()>>>,
    messages: Mutex<Vec<ThreadMessage>>,
}

impl MockApi {
    /// Makes the named create/fetch call fail with a scripted HTTP 500.
    pub fn failing_at(mut self, call: &'static str) -> Self {
        self.fail_call = Some(call);
        self
    }

    /// Makes deletes of the given kinds fail with a scripted HTTP 500.
    pub fn failing_deletes(mut self, kinds: &[ResourceKind]) -> Self {
        self.fail_deletes = kinds.to_vec();
        self
    }

    pub fn script_statuses(
        &self,
        statuses: impl IntoIterator<Item = Result<RunStatus, ()>>,
    ) {
        self.statuses.lock().unwrap().extend(statuses);
    }

    pub fn set_messages(&self, messages: Vec<ThreadMessage>) {
        *self.messages.lock().unwrap() = messages;
    }

    pub fn call_count(&self, name: &str) -> usize {
        let prefix = format!("{name}:");
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| *call == name || call.starts_with(&prefix))
            .count()
    }

    /// Delete calls in the order they were issued, as `"delete_<kind>:<id>"`.
    pub fn deletes(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with("delete_"))
            .cloned()
            .collect()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn create(&self, call: &'static str, prefix: &'static str) -> Result<String, ApiError> {
        self.record(call);
        if self.fail_call == Some(call) {
            return Err(scripted_failure());
        }
        let mut counters = self.counters.lock().unwrap();
        let n = counters.entry(prefix).or_insert(0);
        *n += 1;
        Ok(format!("{prefix}{n}"))
    }

    fn delete(&self, kind: ResourceKind, call: &'static str, id: &str) -> Result<(), ApiError> {
        self.record(format!("{call}:{id}"));
        if self.fail_deletes.contains(&kind) {
            return Err(scripted_failure());
        }
        Ok(())
    }
}

#[async_trait]
impl AssistantsApi for MockApi {
    async fn create_file(
        &self,
        _filename: &str,
        _media_type: &str,
        _bytes: Bytes,
    ) -> Result<String, ApiError> {
        self.create("create_file", "f")
    }

    async fn create_vector_store(&self, _name: &str, _file_id: &str) -> Result<String, ApiError> {
        self.create("create_vector_store", "v")
    }

    async fn create_assistant(
        &self,
        _instructions: &str,
        _vector_store_id: &str,
    ) -> Result<String, ApiError> {
        self.create("create_assistant", "a")
    }

    async fn create_thread(&self) -> Result<String, ApiError> {
        self.create("create_thread", "t")
    }

    async fn add_message(&self, _thread_id: &str, _content: &str) -> Result<String, ApiError> {
        self.create("add_message", "m")
    }

    async fn create_run(&self, _thread_id: &str, _assistant_id: &str) -> Result<Run, ApiError> {
        let id = self.create("create_run", "r")?;
        Ok(Run {
            id,
            status: RunStatus::Queued,
        })
    }

    async fn run_status(&self, _thread_id: &str, _run_id: &str) -> Result<RunStatus, ApiError> {
        self.record("run_status");
        match self.statuses.lock().unwrap().pop_front() {
            Some(Ok(status)) => Ok(status),
            Some(Err(())) => Err(scripted_failure()),
            None => Ok(RunStatus::InProgress),
        }
    }

    async fn list_messages(&self, _thread_id: &str) -> Result<Vec<ThreadMessage>, ApiError> {
        self.record("list_messages");
        if self.fail_call == Some("list_messages") {
            return Err(scripted_failure());
        }
        Ok(self.messages.lock().unwrap().clone())
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), ApiError> {
        self.delete(ResourceKind::File, "delete_file", file_id)
    }

    async fn delete_vector_store(&self, vector_store_id: &str) -> Result<(), ApiError> {
        self.delete(
            ResourceKind::VectorStore,
            "delete_vector_store",
            vector_store_id,
        )
    }

    async fn delete_assistant(&self, assistant_id: &str) -> Result<(), ApiError> {
        self.delete(ResourceKind::Assistant, "delete_assistant", assistant_id)
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<(), ApiError> {
        self.delete(ResourceKind::Thread, "delete_thread", thread_id)
    }
}
