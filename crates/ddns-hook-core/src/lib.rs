// # ddns-hook-core
//
// Core library for the request-driven DDNS hook.
//
// ## Architecture Overview
//
// A client (typically a router reporting its public address) calls the hook
// with a provider token, a zone, a list of subdomains and its current
// addresses. This library makes the provider's A/AAAA records match:
//
// - **UpdateRequest**: Validates the raw form fields
// - **DnsProvider**: Trait for looking up and changing records via provider APIs
// - **ZoneReconciler**: Applies a request to the base zone and each subdomain
// - **UpdateOrchestrator**: Runs a request as a cancellable, time-bounded task
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Reconciliation logic is separate from providers and transport
// 2. **Best Effort**: A failing hostname never stops the others; outcomes are reported
// 3. **Request-Scoped**: No state survives a request, providers are built per request
// 4. **Cancellation**: A cancelled request stops its provider calls
// 5. **Idempotency**: Reapplying an already-correct state makes no changes

pub mod config;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod record;
pub mod request;
pub mod traits;

// Re-export core types for convenience
pub use config::HookConfig;
pub use engine::{ReconciliationReport, RecordOutcome, ZoneReconciler};
pub use error::{Error, Result};
pub use orchestrator::{SUCCESS_MESSAGE, UpdateOrchestrator, UpdateResponse};
pub use record::{AddressRecord, NewAddressRecord, RecordType};
pub use request::{UpdateForm, UpdateRequest};
pub use traits::{DnsProvider, DnsProviderFactory};
