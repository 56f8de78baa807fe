// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare implementation of the DDNS hook's
// `DnsProvider` trait.
//
// ## Behavior
//
// - ✅ One HTTP request per trait method call
// - ✅ Full error propagation (the engine decides what a failure means)
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Specific error handling for HTTP status codes (401/403, 404, 409, 429, 5xx)
// - ✅ Cloudflare envelope errors (`success: false`) surfaced verbatim
// - ✅ Dry-run mode for safe testing
// - ❌ NO retry logic (a failed call is reported, never repeated)
// - ❌ NO caching (a provider lives for one request)
// - ❌ NO background tasks
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
// - Each caller supplies its own token; nothing is shared between requests
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Patch DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`

mod models;

use async_trait::async_trait;
use ddns_hook_core::record::{AddressRecord, NewAddressRecord};
use ddns_hook_core::traits::{DnsProvider, DnsProviderFactory};
use ddns_hook_core::{Error, Result};
use models::{CreateRecordBody, DnsRecord, Envelope, UpdateRecordBody, Zone};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER_NAME: &str = "cloudflare";

/// Settings shared by every provider the factory builds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudflareOptions {
    /// API base URL, without a trailing slash
    pub api_base: String,
    /// Perform lookups but only log writes
    pub dry_run: bool,
}

impl Default for CloudflareOptions {
    fn default() -> Self {
        Self {
            api_base: CLOUDFLARE_API_BASE.to_string(),
            dry_run: false,
        }
    }
}

/// Cloudflare DNS provider
///
/// Built per request from the caller's token.
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (zone lookup, record lookup)
/// - Log the intended POST/PATCH payload
/// - **NOT** actually modify DNS records
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip writes
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:Read and DNS:Edit permissions
    /// - `options`: API base URL and dry-run flag
    ///
    /// # Returns
    ///
    /// - `Err(Error::Authentication)`: If the token is empty
    /// - `Err(Error::Http)`: If the HTTP client cannot be built
    pub fn new(api_token: impl Into<String>, options: &CloudflareOptions) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::auth("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            api_base: options.api_base.trim_end_matches('/').to_string(),
            client,
            dry_run: options.dry_run,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Send a request and unwrap the Cloudflare envelope
    ///
    /// `context` names the operation in error messages (e.g. "Zone lookup").
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<T> {
        let response = request
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("HTTP request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response".to_string());

        decode_response(status, &body, context)
    }
}

/// Turn an HTTP status and body into the envelope's `result`
fn decode_response<T: DeserializeOwned>(status: u16, body: &str, context: &str) -> Result<T> {
    if !(200..300).contains(&status) {
        return Err(status_error(status, body, context));
    }

    let envelope: Envelope<T> = serde_json::from_str(body).map_err(|e| {
        Error::provider(PROVIDER_NAME, format!("Failed to parse response: {}", e))
    })?;

    if !envelope.success {
        return Err(Error::provider(
            PROVIDER_NAME,
            format!("{} failed: {}", context, envelope.error_summary()),
        ));
    }

    envelope.result.ok_or_else(|| {
        Error::provider(PROVIDER_NAME, "Invalid response format: result is missing")
    })
}

/// Map a non-success HTTP status to a specific error
fn status_error(status: u16, body: &str, context: &str) -> Error {
    match status {
        401 | 403 => Error::auth(format!(
            "Invalid API token or insufficient permissions. Status: {}",
            status
        )),
        404 => Error::not_found(format!("{}: {}", context, body)),
        409 => Error::provider(
            PROVIDER_NAME,
            format!(
                "Conflict: Record is being updated by another process. Status: {}",
                status
            ),
        ),
        429 => Error::rate_limited(format!(
            "Rate limit exceeded. Please retry later. Status: {}",
            status
        )),
        500..=599 => Error::provider(
            PROVIDER_NAME,
            format!("Cloudflare server error (transient): {} - {}", status, body),
        ),
        _ => Error::provider(
            PROVIDER_NAME,
            format!("{} failed: {} - {}", context, status, body),
        ),
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// ```http
    /// GET /zones?name=example.com
    /// ```
    async fn zone_id(&self, zone_name: &str) -> Result<String> {
        tracing::debug!("Looking up zone ID for domain: {}", zone_name);

        let request = self
            .client
            .get(self.url("/zones"))
            .query(&[("name", zone_name)]);
        let zones: Vec<Zone> = self.send(request, "Zone lookup").await?;

        let zone = zones
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("Zone not found: {}", zone_name)))?;

        tracing::debug!("Found zone ID: {}", zone.id);
        Ok(zone.id)
    }

    /// ```http
    /// GET /zones/:zone_id/dns_records?name=www.example.com
    /// ```
    async fn list_address_records(
        &self,
        zone_id: &str,
        record_name: &str,
    ) -> Result<Vec<AddressRecord>> {
        let request = self
            .client
            .get(self.url(&format!("/zones/{}/dns_records", zone_id)))
            .query(&[("name", record_name)]);
        let records: Vec<DnsRecord> = self.send(request, "Record lookup").await?;

        Ok(records
            .into_iter()
            .filter_map(DnsRecord::into_address_record)
            .collect())
    }

    /// ```http
    /// POST /zones/:zone_id/dns_records
    /// { "type": "A", "name": "www.example.com", "content": "1.2.3.4", "proxied": true, "ttl": 1 }
    /// ```
    async fn create_address_record(
        &self,
        zone_id: &str,
        record: &NewAddressRecord,
    ) -> Result<AddressRecord> {
        let url = self.url(&format!("/zones/{}/dns_records", zone_id));
        let body = CreateRecordBody::from(record);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send POST request to {} with payload: {}",
                url,
                serde_json::to_string(&body)?
            );
            return Ok(AddressRecord {
                id: "dry-run".to_string(),
                name: record.name.clone(),
                record_type: record.record_type,
                content: record.content.clone(),
                proxied: Some(record.proxied),
                ttl: None,
            });
        }

        let created: DnsRecord = self
            .send(self.client.post(&url).json(&body), "Record creation")
            .await?;

        tracing::info!("DNS record created: {} -> {}", created.name, created.content);
        created.into_address_record().ok_or_else(|| {
            Error::provider(PROVIDER_NAME, "Created record is not an address record")
        })
    }

    /// ```http
    /// PATCH /zones/:zone_id/dns_records/:record_id
    /// { "content": "1.2.3.4" }
    /// ```
    async fn update_address_record(
        &self,
        zone_id: &str,
        record: &AddressRecord,
        content: &str,
    ) -> Result<AddressRecord> {
        let url = self.url(&format!("/zones/{}/dns_records/{}", zone_id, record.id));
        let body = UpdateRecordBody { content };

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PATCH request to {} with payload: {}",
                url,
                serde_json::to_string(&body)?
            );
            return Ok(AddressRecord {
                content: content.to_string(),
                ..record.clone()
            });
        }

        let updated: DnsRecord = self
            .send(self.client.patch(&url).json(&body), "Record update")
            .await?;

        tracing::info!(
            "DNS record updated successfully: {} -> {}",
            updated.name,
            updated.content
        );
        updated.into_address_record().ok_or_else(|| {
            Error::provider(PROVIDER_NAME, "Updated record is not an address record")
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating Cloudflare providers from request tokens
#[derive(Debug, Clone, Default)]
pub struct CloudflareFactory {
    options: CloudflareOptions,
}

impl CloudflareFactory {
    /// Create a factory with the given options
    pub fn new(options: CloudflareOptions) -> Self {
        if options.dry_run {
            tracing::warn!("Cloudflare provider running in DRY-RUN mode - no changes will be made");
        }
        Self { options }
    }
}

impl DnsProviderFactory for CloudflareFactory {
    fn create(&self, api_token: &str) -> Result<Box<dyn DnsProvider>> {
        Ok(Box::new(CloudflareProvider::new(api_token, &self.options)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddns_hook_core::RecordType;

    const RECORDS_BODY: &str = r#"{
        "success": true,
        "errors": [],
        "messages": [],
        "result": [
            {"id": "a1", "name": "www.example.com", "type": "A", "content": "1.2.3.4", "proxied": true, "ttl": 1},
            {"id": "t1", "name": "www.example.com", "type": "TXT", "content": "hello", "proxied": false, "ttl": 300},
            {"id": "q1", "name": "www.example.com", "type": "AAAA", "content": "2001:db8::1", "proxied": false, "ttl": 300}
        ],
        "result_info": {"page": 1, "per_page": 100, "count": 3, "total_count": 3}
    }"#;

    #[test]
    fn test_factory_creation() {
        let factory = CloudflareFactory::default();
        assert!(factory.create("test_token").is_ok());
    }

    #[test]
    fn test_factory_missing_token() {
        let factory = CloudflareFactory::default();
        let err = factory.create("").err().unwrap();
        assert!(matches!(err, Error::Authentication(_)));
    }

    #[test]
    fn test_dry_run_mode() {
        let dry = CloudflareProvider::new(
            "token",
            &CloudflareOptions {
                dry_run: true,
                ..Default::default()
            },
        )
        .unwrap();
        let live = CloudflareProvider::new("token", &CloudflareOptions::default()).unwrap();

        assert!(dry.dry_run, "Dry-run provider should have dry_run=true");
        assert!(!live.dry_run, "Live provider should have dry_run=false");
    }

    #[test]
    fn test_api_base_trailing_slash_is_trimmed() {
        let provider = CloudflareProvider::new(
            "token",
            &CloudflareOptions {
                api_base: "http://localhost:8080/client/v4/".to_string(),
                dry_run: false,
            },
        )
        .unwrap();
        assert_eq!(
            provider.url("/zones"),
            "http://localhost:8080/client/v4/zones"
        );
    }

    #[test]
    fn test_provider_name() {
        let provider = CloudflareProvider::new("token", &CloudflareOptions::default()).unwrap();
        assert_eq!(provider.provider_name(), "cloudflare");
    }

    #[test]
    fn test_api_token_not_exposed_in_debug() {
        let provider =
            CloudflareProvider::new("secret_token_12345", &CloudflareOptions::default()).unwrap();

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret_token"));
        assert!(debug_str.contains("CloudflareProvider"));
    }

    #[test]
    fn test_record_listing_keeps_address_records_in_order() {
        let records: Vec<DnsRecord> = decode_response(200, RECORDS_BODY, "Record lookup").unwrap();
        let records: Vec<AddressRecord> = records
            .into_iter()
            .filter_map(DnsRecord::into_address_record)
            .collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "a1");
        assert_eq!(records[0].record_type, RecordType::A);
        assert_eq!(records[0].proxied, Some(true));
        assert_eq!(records[1].id, "q1");
        assert_eq!(records[1].record_type, RecordType::Aaaa);
        assert_eq!(records[1].content, "2001:db8::1");
    }

    #[test]
    fn test_unsuccessful_envelope_is_an_error() {
        let body = r#"{
            "success": false,
            "errors": [{"code": 9109, "message": "Invalid access token"}],
            "messages": [],
            "result": null
        }"#;

        let err = decode_response::<Vec<Zone>>(200, body, "Zone lookup").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Provider error (cloudflare): Zone lookup failed: 9109 Invalid access token"
        );
    }

    #[test]
    fn test_http_status_mapping() {
        assert!(matches!(
            status_error(401, "", "Zone lookup"),
            Error::Authentication(_)
        ));
        assert!(matches!(
            status_error(403, "", "Zone lookup"),
            Error::Authentication(_)
        ));
        assert!(matches!(
            status_error(404, "", "Record lookup"),
            Error::NotFound(_)
        ));
        assert!(matches!(
            status_error(429, "", "Record update"),
            Error::RateLimited(_)
        ));
        assert!(matches!(
            status_error(503, "busy", "Record update"),
            Error::Provider { .. }
        ));
        assert!(matches!(
            decode_response::<Vec<Zone>>(400, "bad request", "Zone lookup"),
            Err(Error::Provider { .. })
        ));
    }

    #[test]
    fn test_create_body_enables_proxy() {
        let record = NewAddressRecord {
            record_type: RecordType::Aaaa,
            name: "www.example.com".to_string(),
            content: "2001:db8::1".to_string(),
            proxied: true,
        };

        let body = serde_json::to_value(CreateRecordBody::from(&record)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "type": "AAAA",
                "name": "www.example.com",
                "content": "2001:db8::1",
                "proxied": true,
                "ttl": 1
            })
        );
    }

    #[tokio::test]
    async fn test_dry_run_create_makes_no_request() {
        // The base URL is unroutable; a real request would fail.
        let provider = CloudflareProvider::new(
            "token",
            &CloudflareOptions {
                api_base: "http://127.0.0.1:9".to_string(),
                dry_run: true,
            },
        )
        .unwrap();

        let record = NewAddressRecord {
            record_type: RecordType::A,
            name: "www.example.com".to_string(),
            content: "1.2.3.4".to_string(),
            proxied: true,
        };
        let created = provider.create_address_record("zone", &record).await.unwrap();
        assert_eq!(created.id, "dry-run");
        assert_eq!(created.content, "1.2.3.4");

        let existing = AddressRecord {
            id: "a1".to_string(),
            name: "www.example.com".to_string(),
            record_type: RecordType::A,
            content: "1.2.3.4".to_string(),
            proxied: Some(true),
            ttl: Some(1),
        };
        let updated = provider
            .update_address_record("zone", &existing, "5.6.7.8")
            .await
            .unwrap();
        assert_eq!(updated.id, "a1");
        assert_eq!(updated.content, "5.6.7.8");
    }
}
