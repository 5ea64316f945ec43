pub use entity::{integration_status, integrations, provider, Id};

pub mod error;
pub mod integration;
