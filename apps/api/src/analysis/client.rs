//! Remote client for the OpenAI Assistants v2 API.
//!
//! One method per remote operation, each mapping to exactly one HTTP call.
//! The client is stateless: it encodes requests, interprets statuses, and
//! parses bodies. What to create and when is the saga's business.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

/// Protocol-version header required by the Assistants endpoints.
const OPENAI_BETA: &str = "assistants=v2";
/// The model backing the job-description analyzer assistant.
pub const ASSISTANT_MODEL: &str = "gpt-4o";
const ASSISTANT_NAME: &str = "Job Description Analyzer";
const ASSISTANT_DESCRIPTION: &str =
    "Analyzes an uploaded job description against the candidate profile";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure or undecodable body, distinct from a non-2xx reply.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Status { status: u16, body: String },
}

/// Lifecycle state of an assistant run, as reported by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    Cancelled,
    Expired,
    /// Statuses this client does not model (e.g. `requires_action`).
    /// Non-terminal: the poller keeps waiting on them.
    #[serde(other)]
    Other,
}

impl RunStatus {
    /// Terminal failure states. `Completed` is terminal too but handled
    /// separately since it is the success case.
    pub fn is_terminal_failure(self) -> bool {
        matches!(
            self,
            RunStatus::Failed | RunStatus::Cancelled | RunStatus::Expired
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
}

/// One entry of a thread's message list.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadMessage {
    pub role: String,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageContent {
    #[serde(default)]
    pub text: Option<MessageText>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageText {
    pub value: String,
}

#[derive(Debug, Deserialize)]
struct CreatedObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<ThreadMessage>,
}

/// The seam between the saga and the wire. Production uses
/// `OpenAiAssistants`; tests script a mock against the same trait.
#[async_trait]
pub trait AssistantsApi: Send + Sync {
    async fn create_file(
        &self,
        filename: &str,
        media_type: &str,
        bytes: Bytes,
    ) -> Result<String, ApiError>;
    async fn create_vector_store(&self, name: &str, file_id: &str) -> Result<String, ApiError>;
    async fn create_assistant(
        &self,
        instructions: &str,
        vector_store_id: &str,
    ) -> Result<String, ApiError>;
    async fn create_thread(&self) -> Result<String, ApiError>;
    async fn add_message(&self, thread_id: &str, content: &str) -> Result<String, ApiError>;
    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run, ApiError>;
    async fn run_status(&self, thread_id: &str, run_id: &str) -> Result<RunStatus, ApiError>;
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, ApiError>;
    async fn delete_file(&self, file_id: &str) -> Result<(), ApiError>;
    async fn delete_vector_store(&self, vector_store_id: &str) -> Result<(), ApiError>;
    async fn delete_assistant(&self, assistant_id: &str) -> Result<(), ApiError>;
    async fn delete_thread(&self, thread_id: &str) -> Result<(), ApiError>;
}

/// Production Assistants API client over a shared connection pool.
/// Credential and base URL are injected at construction.
pub struct OpenAiAssistants {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiAssistants {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
            api_key,
        }
    }

    /// Every request carries the bearer credential and the protocol-version
    /// header; each one is built fresh so nothing leaks between invocations.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", OPENAI_BETA)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ApiError> {
        debug!(path, "POST");
        let response = self.request(Method::POST, path).json(body).send().await?;
        Self::parse(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path, "GET");
        let response = self.request(Method::GET, path).send().await?;
        Self::parse(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        debug!(path, "DELETE");
        let response = self.request(Method::DELETE, path).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AssistantsApi for OpenAiAssistants {
    /// The one call that is multipart rather than JSON.
    async fn create_file(
        &self,
        filename: &str,
        media_type: &str,
        bytes: Bytes,
    ) -> Result<String, ApiError> {
        let part = Part::bytes(bytes.to_vec())
            .file_name(filename.to_string())
            .mime_str(media_type)?;
        let form = Form::new().text("purpose", "assistants").part("file", part);

        debug!(path = "/files", "POST (multipart)");
        let response = self
            .request(Method::POST, "/files")
            .multipart(form)
            .send()
            .await?;
        let created: CreatedObject = Self::parse(response).await?;
        Ok(created.id)
    }

    async fn create_vector_store(&self, name: &str, file_id: &str) -> Result<String, ApiError> {
        let created: CreatedObject = self
            .post_json(
                "/vector_stores",
                &json!({ "name": name, "file_ids": [file_id] }),
            )
            .await?;
        Ok(created.id)
    }

    async fn create_assistant(
        &self,
        instructions: &str,
        vector_store_id: &str,
    ) -> Result<String, ApiError> {
        let created: CreatedObject = self
            .post_json(
                "/assistants",
                &json!({
                    "name": ASSISTANT_NAME,
                    "description": ASSISTANT_DESCRIPTION,
                    "model": ASSISTANT_MODEL,
                    "instructions": instructions,
                    "tools": [{ "type": "file_search" }],
                    "tool_resources": {
                        "file_search": { "vector_store_ids": [vector_store_id] }
                    }
                }),
            )
            .await?;
        Ok(created.id)
    }

    async fn create_thread(&self) -> Result<String, ApiError> {
        let created: CreatedObject = self.post_json("/threads", &json!({})).await?;
        Ok(created.id)
    }

    async fn add_message(&self, thread_id: &str, content: &str) -> Result<String, ApiError> {
        let created: CreatedObject = self
            .post_json(
                &format!("/threads/{thread_id}/messages"),
                &json!({ "role": "user", "content": content }),
            )
            .await?;
        Ok(created.id)
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run, ApiError> {
        self.post_json(
            &format!("/threads/{thread_id}/runs"),
            &json!({ "assistant_id": assistant_id }),
        )
        .await
    }

    async fn run_status(&self, thread_id: &str, run_id: &str) -> Result<RunStatus, ApiError> {
        let run: Run = self
            .get_json(&format!("/threads/{thread_id}/runs/{run_id}"))
            .await?;
        Ok(run.status)
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, ApiError> {
        let list: MessageList = self
            .get_json(&format!("/threads/{thread_id}/messages"))
            .await?;
        Ok(list.data)
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/files/{file_id}")).await
    }

    async fn delete_vector_store(&self, vector_store_id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/vector_stores/{vector_store_id}"))
            .await
    }

    async fn delete_assistant(&self, assistant_id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/assistants/{assistant_id}")).await
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/threads/{thread_id}")).await
    }
}
