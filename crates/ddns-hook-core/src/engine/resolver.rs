//! Record resolver
//!
//! Fetches the current A and AAAA record for one hostname.

use crate::error::Result;
use crate::record::{AddressRecord, RecordType};
use crate::traits::DnsProvider;
use tracing::{debug, warn};

/// The current A and AAAA record of a hostname, each possibly absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingRecords {
    /// Current A record
    pub a: Option<AddressRecord>,
    /// Current AAAA record
    pub aaaa: Option<AddressRecord>,
}

impl ExistingRecords {
    /// Select the current records from a provider listing
    ///
    /// When the listing holds several records of one type, the last one wins.
    /// The others are neither updated nor reported, only logged.
    pub fn from_listing(hostname: &str, records: Vec<AddressRecord>) -> Self {
        let mut existing = Self::default();

        for record in records {
            let slot = match record.record_type {
                RecordType::A => &mut existing.a,
                RecordType::Aaaa => &mut existing.aaaa,
            };
            if let Some(previous) = slot.replace(record) {
                warn!(
                    hostname,
                    record_type = %previous.record_type,
                    ignored_id = %previous.id,
                    "Multiple records of the same type, using the last one"
                );
            }
        }

        existing
    }

    /// The current record of a given type
    pub fn get(&self, record_type: RecordType) -> Option<&AddressRecord> {
        match record_type {
            RecordType::A => self.a.as_ref(),
            RecordType::Aaaa => self.aaaa.as_ref(),
        }
    }
}

/// Query the provider for the address records named exactly `hostname`
///
/// Provider errors are returned verbatim. There are no retries.
pub async fn resolve_existing(
    provider: &dyn DnsProvider,
    zone_id: &str,
    hostname: &str,
) -> Result<ExistingRecords> {
    let records = provider.list_address_records(zone_id, hostname).await?;
    debug!(hostname, count = records.len(), "Listed address records");

    Ok(ExistingRecords::from_listing(hostname, records))
}
