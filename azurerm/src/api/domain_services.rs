//! Azure AD Domain Services (`Microsoft.AAD/domainServices`) API implementation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::client::Submitted;
use super::common::{ApiQueryParams, ArmResource};
use super::error::ApiError;
use crate::api::Client;
use crate::parse::DomainServiceId;
use crate::validate;
use azcore::{Diagnostics, ResourceIdentifier};

pub const API_VERSION: &str = "2020-01-01";

/// `Enabled`/`Disabled` switches used throughout the domain service payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Toggle {
    Enabled,
    Disabled,
}

impl From<bool> for Toggle {
    fn from(value: bool) -> Self {
        if value {
            Toggle::Enabled
        } else {
            Toggle::Disabled
        }
    }
}

impl From<Toggle> for bool {
    fn from(value: Toggle) -> Self {
        value == Toggle::Enabled
    }
}

/// A managed domain
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainService {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub properties: DomainServiceProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainServiceProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered_sync: Option<Toggle>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replica_sets: Vec<ReplicaSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ldaps_settings: Option<LdapsSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_settings: Option<NotificationSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_security_settings: Option<DomainSecuritySettings>,

    // Read-only
    #[serde(skip_serializing)]
    pub deployment_id: Option<String>,
    #[serde(skip_serializing)]
    pub sync_owner: Option<String>,
    #[serde(skip_serializing)]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing)]
    pub version: Option<i32>,
    #[serde(skip_serializing)]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[serde(skip_serializing)]
    pub replica_set_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub domain_controller_ip_address: Vec<String>,
    #[serde(skip_serializing)]
    pub service_status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LdapsSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ldaps: Option<Toggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_access: Option<Toggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pfx_certificate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pfx_certificate_password: Option<String>,
    #[serde(skip_serializing)]
    pub certificate_thumbprint: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_global_admins: Option<Toggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_dc_admins: Option<Toggle>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_recipients: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainSecuritySettings {
    #[serde(rename = "ntlmV1", skip_serializing_if = "Option::is_none")]
    pub ntlm_v1: Option<Toggle>,
    #[serde(rename = "tlsV1", skip_serializing_if = "Option::is_none")]
    pub tls_v1: Option<Toggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_ntlm_passwords: Option<Toggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_kerberos_passwords: Option<Toggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_on_prem_passwords: Option<Toggle>,
}

impl ArmResource for DomainService {
    type Id = DomainServiceId;

    const API_VERSION: &'static str = API_VERSION;
}

/// Domain Services API
pub struct DomainServicesApi<'a> {
    client: &'a Client,
}

impl<'a> DomainServicesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Identifier for a domain in the client's subscription
    pub fn id(&self, resource_group: &str, name: &str) -> DomainServiceId {
        DomainServiceId::new(self.client.subscription_id(), resource_group, name)
    }

    pub async fn get(&self, id: &DomainServiceId) -> Result<DomainService, ApiError> {
        self.client
            .get(&id.id(), &ApiQueryParams::api_version(API_VERSION))
            .await
    }

    /// Whether the domain exists; only a 404 counts as absent
    pub async fn exists(&self, id: &DomainServiceId) -> Result<bool, ApiError> {
        Ok(self.client.read::<DomainService>(id).await?.is_some())
    }

    /// Starts creating or updating a domain. Provisioning takes tens of
    /// minutes; the returned operation is polled by the caller.
    pub async fn create_or_update(
        &self,
        id: &DomainServiceId,
        domain: &DomainService,
    ) -> Result<Submitted<DomainService>, ApiError> {
        let mut diags = Diagnostics::new();
        validate::resource_group_name(&id.resource_group, "resource_group_name", &mut diags);
        if let Some(domain_name) = &domain.properties.domain_name {
            validate::domain_name(domain_name, "domain_name", &mut diags);
        }
        ApiError::check(diags)?;

        tracing::debug!("Creating or updating {}", id);
        self.client.put_resource(id, domain).await
    }

    pub async fn delete(&self, id: &DomainServiceId) -> Result<Submitted<()>, ApiError> {
        tracing::debug!("Deleting {}", id);
        self.client.delete_resource::<DomainService>(id).await
    }

    pub async fn list_by_resource_group(
        &self,
        resource_group: &str,
    ) -> Result<Vec<DomainService>, ApiError> {
        let path = format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.AAD/domainServices",
            self.client.subscription_id(),
            resource_group
        );
        self.client
            .list(&path, &ApiQueryParams::api_version(API_VERSION))
            .await
    }
}
