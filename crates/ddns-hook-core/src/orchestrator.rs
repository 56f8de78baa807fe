//! Request orchestration
//!
//! Each update request runs as its own tokio task. The request frame races
//! the task's result against the caller's cancellation and a deadline, and
//! turns whichever comes first into exactly one response.
//!
//! ## State Machine
//!
//! ```text
//!            spawn task
//! Start ───────────────► Racing ──── result ─────► Ok(report)  → 200
//!                          │                  └──► Err(e)      → e.status_code()
//!                          ├──── cancel ─────────► 500 "request cancelled"
//!                          └──── deadline ───────► 500 "request deadline exceeded ..."
//! ```
//!
//! On the cancel and deadline paths the task's token is cancelled, so its
//! in-flight provider calls are dropped. The result channel is a `oneshot`,
//! so the task never blocks on a receiver that has gone away.

use crate::config::HookConfig;
use crate::engine::{ReconciliationReport, ZoneReconciler};
use crate::error::{Error, Result};
use crate::request::{UpdateForm, UpdateRequest};
use crate::traits::DnsProviderFactory;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Response body for a successful update
pub const SUCCESS_MESSAGE: &str = "Update successful.";

/// Status and body of the response to an update request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResponse {
    /// HTTP status code
    pub status: u16,
    /// Plain-text body
    pub body: String,
}

impl UpdateResponse {
    fn success() -> Self {
        Self {
            status: 200,
            body: SUCCESS_MESSAGE.to_string(),
        }
    }

    fn from_error(err: &Error) -> Self {
        Self {
            status: err.status_code(),
            body: err.to_string(),
        }
    }
}

/// Runs update requests as cancellable background tasks
#[derive(Clone)]
pub struct UpdateOrchestrator {
    /// Applies validated requests
    reconciler: ZoneReconciler,

    /// Deadline for one request
    request_timeout: Duration,
}

impl UpdateOrchestrator {
    /// Create a new orchestrator
    pub fn new(factory: Arc<dyn DnsProviderFactory>, config: &HookConfig) -> Self {
        Self {
            reconciler: ZoneReconciler::new(factory, config),
            request_timeout: config.request_timeout(),
        }
    }

    /// Handle one update request
    ///
    /// `cancel` is the request's own cancellation signal. Dropping the
    /// returned future also cancels the background task.
    pub async fn handle(&self, form: UpdateForm, cancel: CancellationToken) -> UpdateResponse {
        debug!("Update handler started");

        let task_cancel = cancel.child_token();
        let _task_guard = task_cancel.clone().drop_guard();

        let (result_tx, result_rx) = oneshot::channel();
        let reconciler = self.reconciler.clone();
        let task_token = task_cancel.clone();
        tokio::spawn(async move {
            let outcome = run_update(&reconciler, form, &task_token).await;
            if result_tx.send(outcome).is_err() {
                debug!("Update result discarded, request already answered");
            }
        });

        // Cancellation is checked first: a cancelled request never reports success.
        let response = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                let e = Error::cancelled("request cancelled");
                warn!("{}", e);
                UpdateResponse::from_error(&e)
            }
            outcome = result_rx => match outcome {
                Ok(Ok(_report)) => UpdateResponse::success(),
                Ok(Err(e)) => {
                    if matches!(e, Error::Validation(_)) {
                        info!("Rejected update request: {}", e);
                    } else {
                        error!("Update request failed: {}", e);
                    }
                    UpdateResponse::from_error(&e)
                }
                Err(_) => {
                    let e = Error::Other("update task ended without a result".to_string());
                    error!("{}", e);
                    UpdateResponse::from_error(&e)
                }
            },
            _ = tokio::time::sleep(self.request_timeout) => {
                task_cancel.cancel();
                let e = Error::cancelled(format!(
                    "request deadline exceeded after {}s",
                    self.request_timeout.as_secs()
                ));
                warn!("{}", e);
                UpdateResponse::from_error(&e)
            }
        };

        debug!(status = response.status, "Update handler ended");
        response
    }
}

/// Parse and apply one request; runs inside the spawned task
async fn run_update(
    reconciler: &ZoneReconciler,
    form: UpdateForm,
    cancel: &CancellationToken,
) -> Result<ReconciliationReport> {
    let request = UpdateRequest::parse(form)?;
    info!(zone = %request.zone, "Request received at {}", request.received_at);

    let report = reconciler.apply(&request, cancel).await?;

    if report.is_clean() {
        info!(zone = %report.zone, hostnames = report.hostnames.len(), "Update finished");
    } else {
        warn!(
            zone = %report.zone,
            hostnames = report.hostnames.len(),
            failed = report.failure_count(),
            "Update finished with failures"
        );
    }

    Ok(report)
}
