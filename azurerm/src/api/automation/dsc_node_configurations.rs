//! DSC node configuration (`automationAccounts/nodeConfigurations`) API implementation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::API_VERSION;
use crate::api::client::Submitted;
use crate::api::common::{ApiQueryParams, ArmResource, PaginationParams};
use crate::api::error::ApiError;
use crate::api::Client;
use crate::parse::{AutomationAccountId, DscNodeConfigurationId};
use crate::validate;
use azcore::{Diagnostics, ResourceIdentifier};

/// A compiled DSC node configuration as returned by the service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DscNodeConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub properties: DscNodeConfigurationProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DscNodeConfigurationProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<DscConfigurationAssociation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ContentSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub increment_node_configuration_build: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DscConfigurationAssociation {
    pub name: String,
}

/// MOF content of the configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<ContentHash>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentHash {
    pub algorithm: String,
    pub value: String,
}

/// Request body for create or update
#[derive(Debug, Clone, Serialize)]
pub struct CreateDscNodeConfigurationRequest {
    pub name: String,
    pub properties: CreateDscNodeConfigurationProperties,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDscNodeConfigurationProperties {
    pub source: ContentSource,
    pub configuration: DscConfigurationAssociation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub increment_node_configuration_build: Option<bool>,
}

impl CreateDscNodeConfigurationRequest {
    /// Embedded MOF content for `<configuration>.<node>`
    pub fn embedded(name: &str, content: impl Into<String>) -> Self {
        let configuration = name.split('.').next().unwrap_or(name).to_string();
        Self {
            name: name.to_string(),
            properties: CreateDscNodeConfigurationProperties {
                source: ContentSource {
                    hash: None,
                    source_type: Some("embeddedContent".to_string()),
                    value: Some(content.into()),
                    version: None,
                },
                configuration: DscConfigurationAssociation {
                    name: configuration,
                },
                increment_node_configuration_build: None,
            },
            tags: HashMap::new(),
        }
    }
}

impl ArmResource for DscNodeConfiguration {
    type Id = DscNodeConfigurationId;

    const API_VERSION: &'static str = API_VERSION;
}

/// DSC node configurations API
pub struct DscNodeConfigurationsApi<'a> {
    client: &'a Client,
}

impl<'a> DscNodeConfigurationsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &DscNodeConfigurationId) -> Result<DscNodeConfiguration, ApiError> {
        self.client
            .get(&id.id(), &ApiQueryParams::api_version(API_VERSION))
            .await
    }

    /// Compiles a configuration. The service may answer synchronously.
    pub async fn create_or_update(
        &self,
        id: &DscNodeConfigurationId,
        request: &CreateDscNodeConfigurationRequest,
    ) -> Result<Submitted<DscNodeConfiguration>, ApiError> {
        let mut diags = Diagnostics::new();
        validate::automation_account_name(
            &id.automation_account_name,
            "automation_account_name",
            &mut diags,
        );
        validate::dsc_node_configuration_name(&id.name, "name", &mut diags);
        ApiError::check(diags)?;

        tracing::debug!("Creating or updating {}", id);
        self.client
            .begin(
                reqwest::Method::PUT,
                &id.id(),
                &ApiQueryParams::api_version(API_VERSION),
                Some(request),
            )
            .await
    }

    pub async fn delete(&self, id: &DscNodeConfigurationId) -> Result<Submitted<()>, ApiError> {
        tracing::debug!("Deleting {}", id);
        self.client
            .delete_resource::<DscNodeConfiguration>(id)
            .await
    }

    /// Every node configuration of an automation account, across all pages
    pub async fn list_by_automation_account(
        &self,
        account: &AutomationAccountId,
        pagination: &PaginationParams,
    ) -> Result<Vec<DscNodeConfiguration>, ApiError> {
        let path = format!("{}/nodeConfigurations", account.id());
        let params = ApiQueryParams::api_version(API_VERSION).extend(pagination.to_query_params());
        self.client.list(&path, &params).await
    }
}
