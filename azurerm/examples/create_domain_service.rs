use azcore::{OperationStatus, ResourceIdentifier};
use azurerm::api::domain_services::{DomainService, DomainServiceProperties, Toggle};
use azurerm::api::Client;
use azurerm::ProviderConfig;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    let config = match ProviderConfig::from_env() {
        Ok(config) => config,
        Err(diags) => {
            for diag in &diags.errors {
                error!("{}", diag.summary);
            }
            return Err("set ARM_SUBSCRIPTION_ID and ARM_ACCESS_TOKEN".into());
        }
    };

    let resource_group =
        std::env::var("ARM_RESOURCE_GROUP").unwrap_or_else(|_| "aadds-example".to_string());
    let domain_name =
        std::env::var("AADDS_DOMAIN_NAME").unwrap_or_else(|_| "corp.example.com".to_string());

    let client = Client::from_config(&config)?;
    let api = client.domain_services();
    let id = api.id(&resource_group, "corp");

    info!("Endpoint: {}", config.endpoint);
    info!("Creating {} at {}", id, id.id());

    let domain = DomainService {
        location: Some("westeurope".to_string()),
        properties: DomainServiceProperties {
            domain_name: Some(domain_name),
            sku: Some("Standard".to_string()),
            filtered_sync: Some(Toggle::Disabled),
            ..Default::default()
        },
        ..Default::default()
    };

    let ctx = config.operation_context();
    let submitted = api.create_or_update(&id, &domain).await?;

    let Some(mut operation) = submitted.into_operation() else {
        info!("Domain service updated synchronously");
        return Ok(());
    };

    // Drive the poller by hand to report progress between polls
    loop {
        match operation.done(&ctx, &client).await {
            Ok(true) => break,
            Ok(false) => info!("Status: {}", operation.status()),
            Err(e) if e.is_retryable() => error!("Transient polling failure: {}", e),
            Err(e) => return Err(e.into()),
        }

        let delay = client.polling_policy().delay_for(operation.polling_delay());
        tokio::time::sleep(delay).await;
    }

    if operation.status() == OperationStatus::Succeeded {
        let created = operation.result(&ctx, &client).await?;
        info!(
            "Provisioned: {:?}",
            created.properties.provisioning_state.unwrap_or_default()
        );
    } else {
        let err = operation.result(&ctx, &client).await.unwrap_err();
        error!("Provisioning ended with {}: {}", operation.status(), err);
    }

    Ok(())
}
