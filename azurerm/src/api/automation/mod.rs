pub mod dsc_node_configurations;

use crate::api::Client;

pub const API_VERSION: &str = "2018-01-15";

/// Automation API providing configuration-management operations
pub struct AutomationApi<'a> {
    client: &'a Client,
}

impl<'a> AutomationApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// DSC node configuration operations
    pub fn dsc_node_configurations(&self) -> dsc_node_configurations::DscNodeConfigurationsApi<'a> {
        dsc_node_configurations::DscNodeConfigurationsApi::new(self.client)
    }
}
