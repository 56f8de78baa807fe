//! Record reconciler
//!
//! Decides between no-op, create and update for one (hostname, type) pair
//! and carries the decision out. The existing record is fetched beforehand
//! by the resolver, so this stays free of lookup concerns.

use crate::error::Result;
use crate::record::{AddressRecord, NewAddressRecord, RecordType};
use crate::traits::DnsProvider;
use tracing::{debug, info};

use super::report::RecordOutcome;

/// Bring one record in line with the desired content
///
/// - No existing record: create one with `proxied` set
/// - Existing record with the desired content: no provider call
/// - Existing record with other content: update it by id
///
/// Provider errors are returned unmodified. There are no retries.
pub async fn reconcile_record(
    provider: &dyn DnsProvider,
    existing: Option<&AddressRecord>,
    hostname: &str,
    zone_id: &str,
    record_type: RecordType,
    content: &str,
    proxied: bool,
) -> Result<RecordOutcome> {
    let Some(record) = existing else {
        info!(
            hostname,
            record_type = %record_type,
            "No existing {} record found for {}. Creating new one.",
            record_type,
            hostname
        );

        let new_record = NewAddressRecord {
            record_type,
            name: hostname.to_string(),
            content: content.to_string(),
            proxied,
        };
        provider.create_address_record(zone_id, &new_record).await?;

        return Ok(RecordOutcome::Created {
            content: content.to_string(),
        });
    };

    debug!(
        hostname,
        record_type = %record_type,
        record_id = %record.id,
        "Existing record found"
    );

    if record.content == content {
        return Ok(RecordOutcome::Unchanged {
            content: record.content.clone(),
        });
    }

    info!(
        hostname,
        record_type = %record_type,
        "Updating {} record for {}: {} -> {}",
        record_type,
        hostname,
        record.content,
        content
    );
    provider
        .update_address_record(zone_id, record, content)
        .await?;

    Ok(RecordOutcome::Updated {
        previous: record.content.clone(),
        content: content.to_string(),
    })
}
