pub mod api;
pub mod config;
pub mod parse;
pub mod registry;
pub mod validate;

use azcore::{Context, Diagnostics};
use std::collections::HashMap;

pub use config::ProviderConfig;

/// Entry point tying configuration, the API client and the resource registry
pub struct AzureRmProvider {
    client: Option<api::Client>,
    config: Option<ProviderConfig>,
}

impl Default for AzureRmProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AzureRmProvider {
    pub fn new() -> Self {
        Self {
            client: None,
            config: None,
        }
    }

    /// Configures the provider; values not given fall back to `ARM_*` variables
    pub fn configure(&mut self, values: &HashMap<String, String>) -> Diagnostics {
        let mut diags = Diagnostics::new();

        match ProviderConfig::from_values(values) {
            Ok(config) => match api::Client::from_config(&config) {
                Ok(client) => {
                    tracing::info!(
                        endpoint = %config.endpoint,
                        subscription_id = %config.subscription_id,
                        "provider configured"
                    );
                    self.client = Some(client);
                    self.config = Some(config);
                }
                Err(e) => {
                    diags.add_error(
                        format!("Failed to create API client: {}", e),
                        None::<String>,
                    );
                }
            },
            Err(config_diags) => diags.extend(config_diags),
        }

        diags
    }

    pub fn client(&self) -> Result<&api::Client, api::ApiError> {
        self.client
            .as_ref()
            .ok_or_else(|| api::ApiError::AuthError("Provider not configured".to_string()))
    }

    /// A fresh context bounded by the configured operation timeout
    pub fn operation_context(&self) -> Context {
        self.config
            .as_ref()
            .map(ProviderConfig::operation_context)
            .unwrap_or_default()
    }

    pub fn resource_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = registry::resource_types().keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Canonical form of an imported identifier
    pub fn import(&self, resource_type: &str, id: &str) -> Result<String, registry::RegistryError> {
        registry::import(resource_type, id)
    }
}
