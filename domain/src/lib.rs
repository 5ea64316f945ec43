//! Integration domain: the registry of supported providers, typed
//! credentials, outbound connector calls, OAuth code exchange, persistence of
//! integration records and the manager that ties them together.

// Re-exports from `entity` crate via `entity_api`, so consumers of `domain`
// do not depend on either directly.
pub use entity_api::{integration_status, integrations, provider, Id};

pub mod completion;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod integration;
pub mod oauth_exchange;
pub mod registry;
pub mod store;
