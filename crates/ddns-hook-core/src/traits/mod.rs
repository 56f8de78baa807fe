//! Core traits for the DDNS hook
//!
//! This module defines the abstract interfaces that provider implementations must follow.
//!
//! - [`DnsProvider`]: Look up and change address records via a provider API
//! - [`DnsProviderFactory`]: Build an authenticated provider from a caller's token

pub mod dns_provider;

pub use dns_provider::{DnsProvider, DnsProviderFactory};
