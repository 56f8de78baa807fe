//! Per-request reconciliation report
//!
//! Record failures never fail a request. Instead of disappearing into the
//! log they are collected here, one entry per hostname in processing order.

use crate::error::Error;
use crate::record::RecordType;

/// What the reconciler did for one (hostname, type) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// No record existed; one was created
    Created {
        /// Content of the new record
        content: String,
    },
    /// The record existed with different content and was updated
    Updated {
        /// Content before the update
        previous: String,
        /// Content after the update
        content: String,
    },
    /// The record already had the desired content (no-op)
    Unchanged {
        /// The current content
        content: String,
    },
}

/// Outcome of one record type on one hostname
#[derive(Debug)]
pub struct RecordReport {
    /// Record type that was reconciled
    pub record_type: RecordType,
    /// The outcome, or an [`Error::RecordOperation`]
    pub outcome: Result<RecordOutcome, Error>,
}

/// Status of one hostname
#[derive(Debug)]
pub enum HostnameStatus {
    /// Existing records were resolved and each requested type reconciled
    Reconciled(Vec<RecordReport>),
    /// Looking up the existing records failed; nothing was changed
    LookupFailed(Error),
    /// The hostname was not attempted (empty subdomain label)
    Skipped,
}

/// Report for one hostname
#[derive(Debug)]
pub struct HostnameReport {
    /// Fully-qualified hostname
    pub hostname: String,
    /// What happened
    pub status: HostnameStatus,
}

impl HostnameReport {
    /// Whether any lookup or record operation on this hostname failed
    pub fn has_failures(&self) -> bool {
        match &self.status {
            HostnameStatus::Reconciled(records) => records.iter().any(|r| r.outcome.is_err()),
            HostnameStatus::LookupFailed(_) => true,
            HostnameStatus::Skipped => false,
        }
    }

    /// Outcome for one record type, if that type was reconciled successfully
    pub fn outcome(&self, record_type: RecordType) -> Option<&RecordOutcome> {
        match &self.status {
            HostnameStatus::Reconciled(records) => records
                .iter()
                .find(|r| r.record_type == record_type)
                .and_then(|r| r.outcome.as_ref().ok()),
            _ => None,
        }
    }
}

/// Report for a whole update request
#[derive(Debug, Default)]
pub struct ReconciliationReport {
    /// Zone the request targeted
    pub zone: String,
    /// One entry per hostname, base zone first
    pub hostnames: Vec<HostnameReport>,
}

impl ReconciliationReport {
    /// Create an empty report for a zone
    pub fn new(zone: impl Into<String>) -> Self {
        Self {
            zone: zone.into(),
            hostnames: Vec::new(),
        }
    }

    /// Hostnames in the order they were processed (skipped ones included)
    pub fn hostnames(&self) -> Vec<&str> {
        self.hostnames.iter().map(|h| h.hostname.as_str()).collect()
    }

    /// Look up the report for a hostname
    pub fn hostname(&self, hostname: &str) -> Option<&HostnameReport> {
        self.hostnames.iter().find(|h| h.hostname == hostname)
    }

    /// Number of hostnames with at least one failure
    pub fn failure_count(&self) -> usize {
        self.hostnames.iter().filter(|h| h.has_failures()).count()
    }

    /// Whether every hostname was reconciled without error
    pub fn is_clean(&self) -> bool {
        self.failure_count() == 0
    }
}
