//! Update request parsing and validation
//!
//! An update arrives as five loosely-typed form fields. [`UpdateRequest::parse`]
//! checks every rule, collects every failure, and either returns a fully
//! populated request or a single [`Error::Validation`] listing all problems.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use tracing::{info, warn};

/// Raw form fields of an update request
///
/// Absent fields deserialize as empty strings.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UpdateForm {
    /// Provider API token
    pub token: String,
    /// Zone name, e.g. "example.com"
    pub zone: String,
    /// Comma-separated subdomain labels
    pub records: String,
    /// Desired IPv4 address
    pub ipv4: String,
    /// Desired IPv6 address
    pub ipv6: String,
}

impl UpdateForm {
    /// Overlay `other` onto `self`, keeping `other`'s value wherever it is non-empty
    ///
    /// Used to combine query-string fields with form-body fields, the body winning.
    pub fn merged_with(self, other: UpdateForm) -> Self {
        fn pick(base: String, overlay: String) -> String {
            if overlay.is_empty() { base } else { overlay }
        }

        Self {
            token: pick(self.token, other.token),
            zone: pick(self.zone, other.zone),
            records: pick(self.records, other.records),
            ipv4: pick(self.ipv4, other.ipv4),
            ipv6: pick(self.ipv6, other.ipv6),
        }
    }
}

impl fmt::Debug for UpdateForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateForm")
            .field("token", &"<REDACTED>")
            .field("zone", &self.zone)
            .field("records", &self.records)
            .field("ipv4", &self.ipv4)
            .field("ipv6", &self.ipv6)
            .finish()
    }
}

/// A validated update request
///
/// Invariants: `token`, `zone` and the raw records field were non-empty, and
/// at least one of `ipv4` / `ipv6` is present.
#[derive(Clone)]
pub struct UpdateRequest {
    /// Provider API token
    /// ⚠️ NEVER log this value
    pub token: String,
    /// Zone name
    pub zone: String,
    /// Subdomain labels in the order supplied
    ///
    /// This is the raw comma split: empty labels are kept as they are.
    pub records: Vec<String>,
    /// Desired IPv4 address
    pub ipv4: Option<String>,
    /// Desired IPv6 address
    pub ipv6: Option<String>,
    /// When the request was received
    pub received_at: DateTime<Utc>,
}

impl UpdateRequest {
    /// Validate raw form fields into an update request
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateRequest)`: Every rule passed
    /// - `Err(Error::Validation)`: One message per failed rule, in rule order
    pub fn parse(form: UpdateForm) -> Result<Self> {
        let records: Vec<String> = form.records.split(',').map(str::to_string).collect();

        info!(
            zone = %form.zone,
            records = ?records,
            ipv4 = %form.ipv4,
            ipv6 = %form.ipv6,
            "Parsed update request"
        );

        let mut missing = Vec::new();
        if form.token.is_empty() {
            missing.push("token");
        }
        if form.zone.is_empty() {
            missing.push("zone");
        }
        if form.records.is_empty() {
            missing.push("records");
        }
        if form.ipv4.is_empty() && form.ipv6.is_empty() {
            missing.push("ipv4 or ipv6");
        }

        if !missing.is_empty() {
            return Err(Error::validation(
                missing
                    .into_iter()
                    .map(|field| format!("Missing {} URL parameter.", field))
                    .collect(),
            ));
        }

        // Not rejected here: the provider decides whether the content is acceptable.
        if !form.ipv4.is_empty() && form.ipv4.parse::<Ipv4Addr>().is_err() {
            warn!(ipv4 = %form.ipv4, "ipv4 parameter is not an IPv4 address");
        }
        if !form.ipv6.is_empty() && form.ipv6.parse::<Ipv6Addr>().is_err() {
            warn!(ipv6 = %form.ipv6, "ipv6 parameter is not an IPv6 address");
        }

        Ok(Self {
            token: form.token,
            zone: form.zone,
            records,
            ipv4: non_empty(form.ipv4),
            ipv6: non_empty(form.ipv6),
            received_at: Utc::now(),
        })
    }
}

impl fmt::Debug for UpdateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateRequest")
            .field("token", &"<REDACTED>")
            .field("zone", &self.zone)
            .field("records", &self.records)
            .field("ipv4", &self.ipv4)
            .field("ipv6", &self.ipv6)
            .field("received_at", &self.received_at)
            .finish()
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
