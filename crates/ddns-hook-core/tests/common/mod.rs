//! Test doubles and common utilities for reconciliation contract tests
//!
//! The mock provider keeps an in-memory zone and logs every call, so tests
//! can assert exactly which provider operations a request caused.

#![allow(dead_code)]

use ddns_hook_core::error::{Error, Result};
use ddns_hook_core::record::{AddressRecord, NewAddressRecord, RecordType};
use ddns_hook_core::request::UpdateForm;
use ddns_hook_core::traits::{DnsProvider, DnsProviderFactory};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const VALID_TOKEN: &str = "valid-token";
pub const ZONE: &str = "example.com";
pub const ZONE_ID: &str = "zone-123";

/// A provider call, as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ZoneLookup(String),
    List(String),
    Create {
        name: String,
        record_type: RecordType,
        content: String,
        proxied: bool,
    },
    Update {
        id: String,
        content: String,
    },
}

impl Operation {
    pub fn is_write(&self) -> bool {
        matches!(self, Operation::Create { .. } | Operation::Update { .. })
    }
}

/// State shared between the factory, every provider it builds, and the test
#[derive(Default)]
struct MockState {
    records: Mutex<Vec<AddressRecord>>,
    operations: Mutex<Vec<Operation>>,
    failing_hostnames: Mutex<HashSet<String>>,
    failing_writes: Mutex<HashSet<(String, RecordType)>>,
    hang_on_list: AtomicBool,
    abandoned: AtomicBool,
    next_id: AtomicUsize,
}

/// Sets a flag when dropped; used to observe an abandoned provider call
struct DropFlag(Arc<MockState>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.abandoned.store(true, Ordering::SeqCst);
    }
}

/// A mock DnsProvider backed by an in-memory zone
pub struct MockDnsProvider {
    state: Arc<MockState>,
}

impl MockDnsProvider {
    fn log(&self, operation: Operation) {
        self.state.operations.lock().unwrap().push(operation);
    }

    fn fail_if_requested(&self, hostname: &str) -> Result<()> {
        if self.state.failing_hostnames.lock().unwrap().contains(hostname) {
            return Err(Error::provider("mock", format!("forced failure for {hostname}")));
        }
        Ok(())
    }

    fn fail_write_if_requested(&self, hostname: &str, record_type: RecordType) -> Result<()> {
        let key = (hostname.to_string(), record_type);
        if self.state.failing_writes.lock().unwrap().contains(&key) {
            return Err(Error::provider(
                "mock",
                format!("forced {record_type} write failure for {hostname}"),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn zone_id(&self, zone_name: &str) -> Result<String> {
        self.log(Operation::ZoneLookup(zone_name.to_string()));
        if zone_name == ZONE {
            Ok(ZONE_ID.to_string())
        } else {
            Err(Error::not_found(format!("Zone not found: {zone_name}")))
        }
    }

    async fn list_address_records(
        &self,
        _zone_id: &str,
        record_name: &str,
    ) -> Result<Vec<AddressRecord>> {
        self.log(Operation::List(record_name.to_string()));

        if self.state.hang_on_list.load(Ordering::SeqCst) {
            let _flag = DropFlag(Arc::clone(&self.state));
            std::future::pending::<()>().await;
        }

        self.fail_if_requested(record_name)?;

        Ok(self
            .state
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.name == record_name)
            .cloned()
            .collect())
    }

    async fn create_address_record(
        &self,
        _zone_id: &str,
        record: &NewAddressRecord,
    ) -> Result<AddressRecord> {
        self.log(Operation::Create {
            name: record.name.clone(),
            record_type: record.record_type,
            content: record.content.clone(),
            proxied: record.proxied,
        });
        self.fail_write_if_requested(&record.name, record.record_type)?;

        let id = format!("new-{}", self.state.next_id.fetch_add(1, Ordering::SeqCst));
        let created = AddressRecord {
            id,
            name: record.name.clone(),
            record_type: record.record_type,
            content: record.content.clone(),
            proxied: Some(record.proxied),
            ttl: Some(1),
        };
        self.state.records.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_address_record(
        &self,
        _zone_id: &str,
        existing: &AddressRecord,
        content: &str,
    ) -> Result<AddressRecord> {
        let record_id = existing.id.as_str();
        self.log(Operation::Update {
            id: record_id.to_string(),
            content: content.to_string(),
        });
        self.fail_write_if_requested(&existing.name, existing.record_type)?;

        let mut records = self.state.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| Error::not_found(format!("DNS record not found: {record_id}")))?;
        record.content = content.to_string();
        Ok(record.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Factory handing out mock providers that share one zone
#[derive(Clone, Default)]
pub struct MockProviderFactory {
    state: Arc<MockState>,
}

impl MockProviderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing record
    pub fn with_record(self, id: &str, name: &str, record_type: RecordType, content: &str) -> Self {
        self.state.records.lock().unwrap().push(AddressRecord {
            id: id.to_string(),
            name: name.to_string(),
            record_type,
            content: content.to_string(),
            proxied: Some(false),
            ttl: Some(300),
        });
        self
    }

    /// Make record listings for `hostname` fail
    pub fn failing_for(self, hostname: &str) -> Self {
        self.state
            .failing_hostnames
            .lock()
            .unwrap()
            .insert(hostname.to_string());
        self
    }

    /// Make creates and updates of one (hostname, type) pair fail
    pub fn failing_writes_for(self, hostname: &str, record_type: RecordType) -> Self {
        self.state
            .failing_writes
            .lock()
            .unwrap()
            .insert((hostname.to_string(), record_type));
        self
    }

    /// Make record listings never complete
    pub fn hanging(self) -> Self {
        self.state.hang_on_list.store(true, Ordering::SeqCst);
        self
    }

    /// A provider authenticated with the valid token
    pub fn create_provider(&self) -> Box<dyn DnsProvider> {
        self.create(VALID_TOKEN).expect("valid token is accepted")
    }

    /// Every provider call made so far, in order
    pub fn operations(&self) -> Vec<Operation> {
        self.state.operations.lock().unwrap().clone()
    }

    /// Only the create and update calls
    pub fn writes(&self) -> Vec<Operation> {
        self.operations().into_iter().filter(Operation::is_write).collect()
    }

    /// Hostnames listed, in order
    pub fn listed_hostnames(&self) -> Vec<String> {
        self.operations()
            .into_iter()
            .filter_map(|op| match op {
                Operation::List(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    /// Current content of the zone
    pub fn records(&self) -> Vec<AddressRecord> {
        self.state.records.lock().unwrap().clone()
    }

    /// Whether a hanging call was dropped before completing
    pub fn call_abandoned(&self) -> bool {
        self.state.abandoned.load(Ordering::SeqCst)
    }
}

impl DnsProviderFactory for MockProviderFactory {
    fn create(&self, api_token: &str) -> Result<Box<dyn DnsProvider>> {
        if api_token != VALID_TOKEN {
            return Err(Error::auth("Invalid API token"));
        }
        Ok(Box::new(MockDnsProvider {
            state: Arc::clone(&self.state),
        }))
    }
}

/// Helper to build a raw form
pub fn form(token: &str, zone: &str, records: &str, ipv4: &str, ipv6: &str) -> UpdateForm {
    UpdateForm {
        token: token.to_string(),
        zone: zone.to_string(),
        records: records.to_string(),
        ipv4: ipv4.to_string(),
        ipv6: ipv6.to_string(),
    }
}
