//! Typed resource identifiers
//!
//! Each identifier renders the canonical ARM path through
//! [`ResourceIdentifier::id`] and a human-readable label through `Display`.

mod automation_account;
mod domain_service;
mod dsc_node_configuration;

pub use automation_account::AutomationAccountId;
pub use domain_service::DomainServiceId;
pub use dsc_node_configuration::DscNodeConfigurationId;

pub use azcore::resource_id::ResourceIdentifier;
