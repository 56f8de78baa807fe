//! Address record model
//!
//! A mirror of the provider's view of a single A or AAAA record. The hook
//! never owns these records; they are fetched, compared and discarded
//! within one request.

use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS record type handled by the hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// A record (IPv4)
    #[serde(rename = "A")]
    A,
    /// AAAA record (IPv6)
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// Wire name of the record type ("A" or "AAAA")
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }

    /// Parse a provider's type string; anything other than A/AAAA yields `None`
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "A" => Some(RecordType::A),
            "AAAA" => Some(RecordType::Aaaa),
            _ => None,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An existing address record as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Provider-specific record identifier, used for updates
    pub id: String,
    /// Fully-qualified record name
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Record content (an IP literal)
    pub content: String,
    /// Whether the provider proxies traffic for this record, if it reports it
    #[serde(default)]
    pub proxied: Option<bool>,
    /// Time-to-live, if the provider reports it
    #[serde(default)]
    pub ttl: Option<u32>,
}

/// Parameters for creating an address record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAddressRecord {
    /// Record type
    pub record_type: RecordType,
    /// Fully-qualified record name
    pub name: String,
    /// Record content (an IP literal)
    pub content: String,
    /// Enable the provider's traffic proxying
    pub proxied: bool,
}
