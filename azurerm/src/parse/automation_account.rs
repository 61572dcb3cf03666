use azcore::error::ParseError;
use azcore::resource_id::{ResourceId, ResourceIdentifier};
use std::fmt;

pub(super) const PROVIDER: &str = "Microsoft.Automation";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AutomationAccountId {
    pub subscription_id: String,
    pub resource_group: String,
    pub name: String,
}

impl AutomationAccountId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for AutomationAccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Automation Account: (Name {:?} / Resource Group {:?})",
            self.name, self.resource_group
        )
    }
}

impl ResourceIdentifier for AutomationAccountId {
    fn id(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/{}/automationAccounts/{}",
            self.subscription_id, self.resource_group, PROVIDER, self.name
        )
    }

    fn parse(input: &str) -> Result<Self, ParseError> {
        let mut id = ResourceId::parse(input)?;
        id.require_provider(PROVIDER)?;

        let resource_group = id.resource_group()?.to_string();
        let name = id.pop_segment("automationAccounts")?;
        let subscription_id = std::mem::take(&mut id.subscription_id);

        id.finish()?;

        Ok(Self {
            subscription_id,
            resource_group,
            name,
        })
    }
}
