//! Compensation Manager — best-effort teardown of saga-created resources.
//!
//! Every ledger entry gets exactly one delete attempt. A failed delete never
//! stops the remaining ones, and nothing here can fail the saga: outcomes are
//! aggregated into a report for logging only.

use tracing::{info, warn};

use crate::analysis::client::AssistantsApi;

/// Remote resource kinds the saga owns and must delete. Message and run ids
/// live inside their thread and are not separately deletable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    File,
    VectorStore,
    Assistant,
    Thread,
}

impl ResourceKind {
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::File => "file",
            ResourceKind::VectorStore => "vector store",
            ResourceKind::Assistant => "assistant",
            ResourceKind::Thread => "thread",
        }
    }
}

/// One ledger entry: a resource the pipeline successfully created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedResource {
    pub kind: ResourceKind,
    pub id: String,
}

#[derive(Debug, Default)]
pub struct CompensationReport {
    pub succeeded: Vec<CreatedResource>,
    pub failed: Vec<CreatedResource>,
}

/// Deletes every resource in the ledger, newest first. Safe on a partial or
/// empty ledger.
pub async fn compensate(api: &dyn AssistantsApi, ledger: &[CreatedResource]) -> CompensationReport {
    let mut report = CompensationReport::default();

    for resource in ledger.iter().rev() {
        let result = match resource.kind {
            ResourceKind::File => api.delete_file(&resource.id).await,
            ResourceKind::VectorStore => api.delete_vector_store(&resource.id).await,
            ResourceKind::Assistant => api.delete_assistant(&resource.id).await,
            ResourceKind::Thread => api.delete_thread(&resource.id).await,
        };

        match result {
            Ok(()) => {
                info!(kind = resource.kind.label(), id = %resource.id, "resource deleted");
                report.succeeded.push(resource.clone());
            }
            Err(e) => {
                // An orphaned resource is recoverable by a manual sweep;
                // masking the saga's primary outcome is not.
                warn!(
                    kind = resource.kind.label(),
                    id = %resource.id,
                    error = %e,
                    "resource cleanup failed"
                );
                report.failed.push(resource.clone());
            }
        }
    }

    if report.failed.is_empty() {
        if !report.succeeded.is_empty() {
            info!("cleaned up all {} resources", report.succeeded.len());
        }
    } else {
        warn!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "some resources failed to clean up"
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::mock::MockApi;

    fn full_ledger() -> Vec<CreatedResource> {
        vec![
            CreatedResource {
                kind: ResourceKind::File,
                id: "f1".to_string(),
            },
            CreatedResource {
                kind: ResourceKind::VectorStore,
                id: "v1".to_string(),
            },
            CreatedResource {
                kind: ResourceKind::Assistant,
                id: "a1".to_string(),
            },
            CreatedResource {
                kind: ResourceKind::Thread,
                id: "t1".to_string(),
            },
        ]
    }

    #[tokio::test]
    async fn test_deletes_every_resource_newest_first() {
        let api = MockApi::default();
        let report = compensate(&api, &full_ledger()).await;

        assert_eq!(
            api.deletes(),
            vec![
                "delete_thread:t1",
                "delete_assistant:a1",
                "delete_vector_store:v1",
                "delete_file:f1",
            ]
        );
        assert_eq!(report.succeeded.len(), 4);
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_one_failed_delete_does_not_stop_the_others() {
        let api = MockApi::default().failing_deletes(&[ResourceKind::Assistant]);
        let report = compensate(&api, &full_ledger()).await;

        // All four attempts were made despite the assistant delete failing.
        assert_eq!(api.deletes().len(), 4);
        assert_eq!(report.succeeded.len(), 3);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].kind, ResourceKind::Assistant);
        assert_eq!(report.failed[0].id, "a1");
    }

    #[tokio::test]
    async fn test_all_deletes_failing_still_attempts_each() {
        let api = MockApi::default().failing_deletes(&[
            ResourceKind::File,
            ResourceKind::VectorStore,
            ResourceKind::Assistant,
            ResourceKind::Thread,
        ]);
        let report = compensate(&api, &full_ledger()).await;

        assert_eq!(api.deletes().len(), 4);
        assert!(report.succeeded.is_empty());
        assert_eq!(report.failed.len(), 4);
    }

    #[tokio::test]
    async fn test_empty_ledger_is_a_no_op() {
        let api = MockApi::default();
        let report = compensate(&api, &[]).await;

        assert!(api.deletes().is_empty());
        assert!(report.succeeded.is_empty());
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_partial_ledger_deletes_only_what_was_created() {
        let api = MockApi::default();
        let ledger = vec![CreatedResource {
            kind: ResourceKind::File,
            id: "f1".to_string(),
        }];
        let report = compensate(&api, &ledger).await;

        assert_eq!(api.deletes(), vec!["delete_file:f1"]);
        assert_eq!(report.succeeded.len(), 1);
    }
}
