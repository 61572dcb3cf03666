use azcore::error::ParseError;
use azcore::resource_id::{ResourceId, ResourceIdentifier};
use std::fmt;

use super::automation_account::PROVIDER;
use super::AutomationAccountId;

/// Identifier of a DSC node configuration inside an automation account
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DscNodeConfigurationId {
    pub subscription_id: String,
    pub resource_group: String,
    pub automation_account_name: String,
    pub name: String,
}

impl DscNodeConfigurationId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        automation_account_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            automation_account_name: automation_account_name.into(),
            name: name.into(),
        }
    }

    pub fn automation_account(&self) -> AutomationAccountId {
        AutomationAccountId::new(
            self.subscription_id.clone(),
            self.resource_group.clone(),
            self.automation_account_name.clone(),
        )
    }
}

impl fmt::Display for DscNodeConfigurationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dsc Node Configuration: (Node Configuration Name {:?} / Automation Account Name {:?} / Resource Group {:?})",
            self.name, self.automation_account_name, self.resource_group
        )
    }
}

impl ResourceIdentifier for DscNodeConfigurationId {
    fn id(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/{}/automationAccounts/{}/nodeConfigurations/{}",
            self.subscription_id,
            self.resource_group,
            PROVIDER,
            self.automation_account_name,
            self.name
        )
    }

    fn parse(input: &str) -> Result<Self, ParseError> {
        let mut id = ResourceId::parse(input)?;
        id.require_provider(PROVIDER)?;

        let resource_group = id.resource_group()?.to_string();
        let automation_account_name = id.pop_segment("automationAccounts")?;
        let name = id.pop_segment("nodeConfigurations")?;
        let subscription_id = std::mem::take(&mut id.subscription_id);

        id.finish()?;

        Ok(Self {
            subscription_id,
            resource_group,
            automation_account_name,
            name,
        })
    }
}
