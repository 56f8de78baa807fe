//! Cloudflare API v4 wire types

use ddns_hook_core::record::{AddressRecord, NewAddressRecord, RecordType};
use serde::{Deserialize, Serialize};

/// One entry of the `errors` array of an API envelope
#[derive(Debug, Deserialize)]
pub(crate) struct ApiMessage {
    pub code: i64,
    pub message: String,
}

/// The envelope wrapping every Cloudflare API response
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    pub result: Option<T>,
}

impl<T> Envelope<T> {
    /// Joined error messages, e.g. "9109 Invalid access token; 1003 Invalid zone"
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{} {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Zone {
    pub id: String,
}

/// A DNS record as returned by the API
#[derive(Debug, Deserialize)]
pub(crate) struct DnsRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    #[serde(default)]
    pub proxied: Option<bool>,
    #[serde(default)]
    pub ttl: Option<u32>,
}

impl DnsRecord {
    /// Convert to the core model; records other than A/AAAA yield `None`
    pub fn into_address_record(self) -> Option<AddressRecord> {
        let record_type = RecordType::from_wire(&self.kind)?;
        Some(AddressRecord {
            id: self.id,
            name: self.name,
            record_type,
            content: self.content,
            proxied: self.proxied,
            ttl: self.ttl,
        })
    }
}

/// Body of `POST /zones/:zone_id/dns_records`
#[derive(Debug, Serialize)]
pub(crate) struct CreateRecordBody<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: &'a str,
    pub content: &'a str,
    pub proxied: bool,
    /// 1 means "automatic"
    pub ttl: u32,
}

impl<'a> From<&'a NewAddressRecord> for CreateRecordBody<'a> {
    fn from(record: &'a NewAddressRecord) -> Self {
        Self {
            kind: record.record_type.as_str(),
            name: &record.name,
            content: &record.content,
            proxied: record.proxied,
            ttl: 1,
        }
    }
}

/// Body of `PATCH /zones/:zone_id/dns_records/:record_id`
#[derive(Debug, Serialize)]
pub(crate) struct UpdateRecordBody<'a> {
    pub content: &'a str,
}
