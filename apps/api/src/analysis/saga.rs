//! Resource Pipeline Driver — the job-analysis saga.
//!
//! Creates the dependent resource chain file → vector store → assistant →
//! thread → message → run, waits for the run under a timeout, extracts the
//! analysis text, and compensates whatever was created no matter how the
//! pipeline ended. The pipeline body and the compensation pass are separate
//! so the "always compensate" invariant holds structurally instead of by
//! convention in each failure branch.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::analysis::client::{ApiError, AssistantsApi};
use crate::analysis::compensation::{compensate, CreatedResource, ResourceKind};
use crate::analysis::extract::extract_analysis;
use crate::analysis::poller::{poll_run, PollConfig, RunOutcome};
use crate::analysis::prompts::{build_user_prompt, ANALYST_INSTRUCTIONS, VECTOR_STORE_NAME};

/// Failure taxonomy for the saga. Each variant is attributable to exactly one
/// pipeline step; transport errors stay wrapped inside the step that hit them.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("file upload failed: {0}")]
    UploadFailed(#[source] ApiError),

    #[error("vector store creation failed: {0}")]
    VectorStoreFailed(#[source] ApiError),

    #[error("assistant creation failed: {0}")]
    AssistantCreationFailed(#[source] ApiError),

    #[error("thread creation failed: {0}")]
    ThreadCreationFailed(#[source] ApiError),

    #[error("adding message to thread failed: {0}")]
    MessageFailed(#[source] ApiError),

    #[error("assistant run failed: {0}")]
    RunFailed(String),

    /// A local decision, distinct from the remote `expired` state: the run
    /// may still finish after we stop watching it.
    #[error("assistant run did not finish within the configured timeout")]
    RunTimedOut,

    #[error("retrieving thread messages failed: {0}")]
    RetrievalFailed(#[source] ApiError),

    #[error("assistant message did not contain the expected text content")]
    ExtractionMalformed,

    #[error("analysis cancelled by caller")]
    Cancelled,
}

impl AnalysisError {
    /// Short step tag for log attribution.
    pub fn step(&self) -> &'static str {
        match self {
            AnalysisError::UploadFailed(_) => "upload",
            AnalysisError::VectorStoreFailed(_) => "vector_store",
            AnalysisError::AssistantCreationFailed(_) => "assistant",
            AnalysisError::ThreadCreationFailed(_) => "thread",
            AnalysisError::MessageFailed(_) => "message",
            AnalysisError::RunFailed(_) => "run",
            AnalysisError::RunTimedOut => "run_poll",
            AnalysisError::RetrievalFailed(_) => "retrieval",
            AnalysisError::ExtractionMalformed => "extraction",
            AnalysisError::Cancelled => "cancelled",
        }
    }

    /// Generic user-facing message. Step detail stays in the logs; the
    /// timeout is worded distinctly because the remote job may still finish.
    pub fn user_message(&self) -> &'static str {
        match self {
            AnalysisError::UploadFailed(_) => {
                "Sorry, I couldn't upload this document. Please try again."
            }
            AnalysisError::RunTimedOut => {
                "The analysis is taking too long. Please try again later."
            }
            AnalysisError::RetrievalFailed(_) | AnalysisError::ExtractionMalformed => {
                "Sorry, I couldn't retrieve the analysis results."
            }
            AnalysisError::Cancelled => "The analysis was cancelled.",
            _ => "Sorry, I couldn't analyze this document. Please try again later.",
        }
    }
}

/// An uploaded job-description document. Input only; the saga never creates
/// one of these.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub media_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct JobDetails {
    pub title: String,
    pub company: Option<String>,
}

/// The saga entry point carried in `AppState`. Cloning shares the underlying
/// API client; each `analyze` call is an isolated unit of work with its own
/// ledger.
#[derive(Clone)]
pub struct AnalysisSaga {
    api: Arc<dyn AssistantsApi>,
    poll: PollConfig,
}

impl AnalysisSaga {
    pub fn new(api: Arc<dyn AssistantsApi>, poll: PollConfig) -> Self {
        Self { api, poll }
    }

    /// Runs the full analysis. Whatever the pipeline outcome — success, step
    /// failure, timeout, or cancellation — every resource recorded in the
    /// ledger gets exactly one cleanup attempt before this returns, and
    /// cleanup failures never change the primary result.
    pub async fn analyze(
        &self,
        document: UploadedDocument,
        job: JobDetails,
        cancel: CancellationToken,
    ) -> Result<String, AnalysisError> {
        // Size/emptiness are validated at the HTTP boundary.
        debug_assert!(!document.bytes.is_empty());

        let mut ledger: Vec<CreatedResource> = Vec::new();
        let result = self.run_pipeline(document, &job, &mut ledger, &cancel).await;

        compensate(self.api.as_ref(), &ledger).await;

        result
    }

    async fn run_pipeline(
        &self,
        document: UploadedDocument,
        job: &JobDetails,
        ledger: &mut Vec<CreatedResource>,
        cancel: &CancellationToken,
    ) -> Result<String, AnalysisError> {
        let file_id = step(
            cancel,
            self.api
                .create_file(&document.filename, &document.media_type, document.bytes),
            AnalysisError::UploadFailed,
        )
        .await?;
        info!(%file_id, "file uploaded");
        ledger.push(CreatedResource {
            kind: ResourceKind::File,
            id: file_id.clone(),
        });

        let vector_store_id = step(
            cancel,
            self.api.create_vector_store(VECTOR_STORE_NAME, &file_id),
            AnalysisError::VectorStoreFailed,
        )
        .await?;
        info!(%vector_store_id, "vector store created");
        ledger.push(CreatedResource {
            kind: ResourceKind::VectorStore,
            id: vector_store_id.clone(),
        });

        let assistant_id = step(
            cancel,
            self.api
                .create_assistant(ANALYST_INSTRUCTIONS, &vector_store_id),
            AnalysisError::AssistantCreationFailed,
        )
        .await?;
        info!(%assistant_id, "assistant created");
        ledger.push(CreatedResource {
            kind: ResourceKind::Assistant,
            id: assistant_id.clone(),
        });

        let thread_id = step(
            cancel,
            self.api.create_thread(),
            AnalysisError::ThreadCreationFailed,
        )
        .await?;
        info!(%thread_id, "thread created");
        ledger.push(CreatedResource {
            kind: ResourceKind::Thread,
            id: thread_id.clone(),
        });

        let prompt = build_user_prompt(job);
        step(
            cancel,
            self.api.add_message(&thread_id, &prompt),
            AnalysisError::MessageFailed,
        )
        .await?;

        let run = step(cancel, self.api.create_run(&thread_id, &assistant_id), |e| {
            AnalysisError::RunFailed(e.to_string())
        })
        .await?;
        if run.status.is_terminal_failure() {
            return Err(AnalysisError::RunFailed(format!(
                "run entered {:?} on creation",
                run.status
            )));
        }
        info!(run_id = %run.id, "run started");

        match poll_run(self.api.as_ref(), &thread_id, &run.id, self.poll, cancel).await {
            RunOutcome::Completed => {}
            RunOutcome::Failed(status) => {
                return Err(AnalysisError::RunFailed(format!(
                    "run ended in terminal state {status:?}"
                )));
            }
            RunOutcome::TimedOut => return Err(AnalysisError::RunTimedOut),
            RunOutcome::Cancelled => return Err(AnalysisError::Cancelled),
        }

        let messages = step(
            cancel,
            self.api.list_messages(&thread_id),
            AnalysisError::RetrievalFailed,
        )
        .await?;

        extract_analysis(&messages)
    }
}

/// Races one remote call against the invocation's cancellation signal, then
/// tags any API failure with its pipeline step.
async fn step<T, F, C>(
    cancel: &CancellationToken,
    call: F,
    classify: C,
) -> Result<T, AnalysisError>
where
    F: Future<Output = Result<T, ApiError>>,
    C: FnOnce(ApiError) -> AnalysisError,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AnalysisError::Cancelled),
        result = call => result.map_err(classify),
    }
}
