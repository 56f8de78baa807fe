//! Zone reconciliation engine
//!
//! The ZoneReconciler is responsible for:
//! - Building an authenticated provider from the request's token
//! - Resolving the zone identifier
//! - Reconciling the base zone hostname, then every subdomain in order
//! - Collecting per-hostname outcomes into a [`ReconciliationReport`]
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐
//! │ ZoneReconciler │─── token ───► DnsProviderFactory
//! └────────────────┘
//!         │ for each hostname (base zone first)
//!         ▼
//! ┌────────────────┐           ┌─────────────────┐
//! │ resolve_       │──────────►│ reconcile_      │ (A, then AAAA)
//! │ existing       │           │ record          │
//! └────────────────┘           └─────────────────┘
//!         │                            │
//!         └────────────┬───────────────┘
//!                      ▼
//!               ┌─────────────┐
//!               │ DnsProvider │
//!               └─────────────┘
//! ```
//!
//! ## Failure Policy
//!
//! | Failure point                          | Effect                                 |
//! |----------------------------------------|----------------------------------------|
//! | Token rejected, zone not found         | `Err(Error::ProviderSetup)`            |
//! | Lookup/create/update on any hostname   | Logged, recorded in the report, `Ok`   |
//! | Cancellation                           | `Err(Error::Cancelled)`, work abandoned|

pub mod reconciler;
pub mod report;
pub mod resolver;

pub use reconciler::reconcile_record;
pub use report::{
    HostnameReport, HostnameStatus, ReconciliationReport, RecordOutcome, RecordReport,
};
pub use resolver::{ExistingRecords, resolve_existing};

use crate::config::HookConfig;
use crate::error::{Error, Result};
use crate::record::RecordType;
use crate::request::UpdateRequest;
use crate::traits::{DnsProvider, DnsProviderFactory};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Applies an update request to the base zone and its subdomains
///
/// Cheap to clone; every request gets its own provider instance.
#[derive(Clone)]
pub struct ZoneReconciler {
    /// Builds an authenticated provider per request
    factory: Arc<dyn DnsProviderFactory>,

    /// Proxy flag for newly created records
    proxied: bool,
}

impl ZoneReconciler {
    /// Create a new reconciler
    pub fn new(factory: Arc<dyn DnsProviderFactory>, config: &HookConfig) -> Self {
        Self {
            factory,
            proxied: config.proxied,
        }
    }

    /// Reconcile every hostname of a request
    ///
    /// The base zone is attempted first, then each subdomain label in the
    /// order supplied. Failures on individual hostnames are recorded in the
    /// report and never abort the remaining hostnames.
    ///
    /// # Returns
    ///
    /// - `Ok(ReconciliationReport)`: Provider setup succeeded; see the report for per-hostname outcomes
    /// - `Err(Error::ProviderSetup)`: The token was rejected or the zone lookup failed
    /// - `Err(Error::Cancelled)`: `cancel` fired; in-flight provider calls were dropped
    pub async fn apply(
        &self,
        request: &UpdateRequest,
        cancel: &CancellationToken,
    ) -> Result<ReconciliationReport> {
        let provider = self
            .factory
            .create(&request.token)
            .map_err(Error::provider_setup)?;

        let zone_id = cancellable(cancel, provider.zone_id(&request.zone))
            .await
            .map_err(|e| if e.is_cancelled() { e } else { Error::provider_setup(e) })?;

        let mut report = ReconciliationReport::new(&request.zone);

        let base = self
            .reconcile_hostname(provider.as_ref(), &zone_id, &request.zone, request, cancel)
            .await?;
        report.hostnames.push(base);

        for label in &request.records {
            let hostname = format!("{}.{}", label, request.zone);

            if label.is_empty() {
                warn!(hostname = %hostname, "Empty subdomain label, skipping");
                report.hostnames.push(HostnameReport {
                    hostname,
                    status: HostnameStatus::Skipped,
                });
                continue;
            }

            let entry = self
                .reconcile_hostname(provider.as_ref(), &zone_id, &hostname, request, cancel)
                .await?;
            report.hostnames.push(entry);
        }

        Ok(report)
    }

    /// Resolve and reconcile one hostname
    ///
    /// Only cancellation is returned as an error; everything else is
    /// captured in the hostname report.
    async fn reconcile_hostname(
        &self,
        provider: &dyn DnsProvider,
        zone_id: &str,
        hostname: &str,
        request: &UpdateRequest,
        cancel: &CancellationToken,
    ) -> Result<HostnameReport> {
        info!("Checking changes for {}", hostname);

        let existing = match cancellable(cancel, resolve_existing(provider, zone_id, hostname)).await
        {
            Ok(existing) => existing,
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                error!(hostname, "{}: {}", provider.provider_name(), e);
                return Ok(HostnameReport {
                    hostname: hostname.to_string(),
                    status: HostnameStatus::LookupFailed(e),
                });
            }
        };

        let desired = [
            (RecordType::A, request.ipv4.as_deref()),
            (RecordType::Aaaa, request.ipv6.as_deref()),
        ];

        let mut records = Vec::new();
        for (record_type, content) in desired {
            let Some(content) = content else {
                continue;
            };

            let result = cancellable(
                cancel,
                reconcile_record(
                    provider,
                    existing.get(record_type),
                    hostname,
                    zone_id,
                    record_type,
                    content,
                    self.proxied,
                ),
            )
            .await;

            let outcome = match result {
                Ok(outcome) => Ok(outcome),
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => {
                    let e = Error::record_operation(hostname, record_type, e);
                    error!(hostname, record_type = %record_type, "{}: {}", provider.provider_name(), e);
                    Err(e)
                }
            };
            records.push(RecordReport {
                record_type,
                outcome,
            });
        }

        Ok(HostnameReport {
            hostname: hostname.to_string(),
            status: HostnameStatus::Reconciled(records),
        })
    }
}

/// Run a provider call unless `cancel` fires first
///
/// On cancellation the call's future is dropped, which aborts the
/// underlying request.
async fn cancellable<T>(
    cancel: &CancellationToken,
    operation: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::cancelled("reconciliation cancelled")),
        result = operation => result,
    }
}
