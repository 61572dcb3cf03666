//! Resource types known to the provider, keyed by their Terraform type name

use azcore::{Diagnostics, ParseError, ResourceIdentifier};
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::parse::{AutomationAccountId, DomainServiceId, DscNodeConfigurationId};
use crate::validate;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("Cannot import {resource_type}: {source}")]
    InvalidId {
        resource_type: String,
        #[source]
        source: ParseError,
    },

    #[error("Cannot import {resource_type}: {diagnostics}")]
    Rejected {
        resource_type: String,
        diagnostics: Diagnostics,
    },
}

/// How a resource type is imported and validated
#[derive(Clone, Copy)]
pub struct ResourceType {
    pub name: &'static str,
    /// Parses an identifier and returns it in canonical form
    pub import: fn(&str) -> Result<String, ParseError>,
    pub validate_id: fn(&str, &str, &mut Diagnostics),
}

fn canonical<T: ResourceIdentifier>(input: &str) -> Result<String, ParseError> {
    let id = T::parse(input)?;
    tracing::debug!("Importing {}", id);
    Ok(id.id())
}

pub fn resource_types() -> &'static HashMap<&'static str, ResourceType> {
    static TYPES: OnceLock<HashMap<&'static str, ResourceType>> = OnceLock::new();

    TYPES.get_or_init(|| {
        [
            ResourceType {
                name: "azurerm_active_directory_domain_service",
                import: canonical::<DomainServiceId>,
                validate_id: validate::domain_service_id,
            },
            ResourceType {
                name: "azurerm_automation_account",
                import: canonical::<AutomationAccountId>,
                validate_id: validate::automation_account_id,
            },
            ResourceType {
                name: "azurerm_automation_dsc_nodeconfiguration",
                import: canonical::<DscNodeConfigurationId>,
                validate_id: validate::dsc_node_configuration_id,
            },
        ]
        .into_iter()
        .map(|t| (t.name, t))
        .collect()
    })
}

pub fn lookup(resource_type: &str) -> Result<&'static ResourceType, RegistryError> {
    resource_types()
        .get(resource_type)
        .ok_or_else(|| RegistryError::UnknownResourceType(resource_type.to_string()))
}

/// Validates `id` for `resource_type` and returns its canonical form
pub fn import(resource_type: &str, id: &str) -> Result<String, RegistryError> {
    let entry = lookup(resource_type)?;
    let canonical = (entry.import)(id).map_err(|source| RegistryError::InvalidId {
        resource_type: resource_type.to_string(),
        source,
    })?;

    let mut diagnostics = Diagnostics::new();
    (entry.validate_id)(&canonical, "id", &mut diagnostics);
    if diagnostics.has_errors() {
        return Err(RegistryError::Rejected {
            resource_type: resource_type.to_string(),
            diagnostics,
        });
    }

    Ok(canonical)
}
