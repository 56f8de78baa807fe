// # DNS Provider Trait
//
// Defines the interface the reconciliation engine needs from an upstream
// DNS provider.
//
// ## Implementations
//
// - Cloudflare: `ddns-hook-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_hook_core::traits::{DnsProvider, DnsProviderFactory};
//
// async fn lookup(factory: &dyn DnsProviderFactory, token: &str) -> ddns_hook_core::Result<()> {
//     let provider = factory.create(token)?;
//     let zone_id = provider.zone_id("example.com").await?;
//     let records = provider.list_address_records(&zone_id, "www.example.com").await?;
//     println!("{} record(s)", records.len());
//     Ok(())
// }
// ```

use crate::record::{AddressRecord, NewAddressRecord};
use async_trait::async_trait;

/// Trait for DNS provider implementations
///
/// A provider is constructed per request from the caller's token and is
/// dropped when the request finishes. It performs exactly one API call per
/// method invocation.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoints only
/// - ✅ Parse provider-specific responses
/// - ✅ Return success or failure
///
/// ## Forbidden Capabilities
/// - ❌ Spawn tasks or threads (the orchestrator owns the request task)
/// - ❌ Implement retry logic or backoff (failures are reported, never retried)
/// - ❌ Decide whether a change is needed (owned by the reconciler)
/// - ❌ Cache state beyond a single request
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Resolve a zone name (e.g. "example.com") to the provider's zone identifier
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The zone identifier
    /// - `Err(Error)`: If the token is rejected, the zone doesn't exist, or the request failed
    async fn zone_id(&self, zone_name: &str) -> Result<String, crate::Error>;

    /// List the A and AAAA records named exactly `record_name`
    ///
    /// Records of other types are not returned. The order is the provider's
    /// order.
    async fn list_address_records(
        &self,
        zone_id: &str,
        record_name: &str,
    ) -> Result<Vec<AddressRecord>, crate::Error>;

    /// Create an address record
    async fn create_address_record(
        &self,
        zone_id: &str,
        record: &NewAddressRecord,
    ) -> Result<AddressRecord, crate::Error>;

    /// Change the content of an existing address record
    ///
    /// The record is addressed by `record.id`; its other fields are left as
    /// they are.
    async fn update_address_record(
        &self,
        zone_id: &str,
        record: &AddressRecord,
        content: &str,
    ) -> Result<AddressRecord, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing authenticated DNS providers
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance authenticated with `api_token`
    ///
    /// # Returns
    ///
    /// A boxed DnsProvider trait object, or an error if the token is unusable
    fn create(&self, api_token: &str) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
