use azcore::ResourceIdentifier;
use azurerm::parse::DomainServiceId;
use azurerm::AzureRmProvider;
use std::collections::HashMap;
use std::env;

const USAGE: &str = "usage: azurerm import <resource-type> <id> | azurerm status <domain-service-id>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let mut provider = AzureRmProvider::new();

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["import", resource_type, id] => {
            println!("{}", provider.import(resource_type, id)?);
        }
        ["status", id] => {
            let id = DomainServiceId::parse(id)?;

            let diags = provider.configure(&HashMap::new());
            if diags.has_errors() {
                for diag in &diags.errors {
                    tracing::error!("{}", diag.summary);
                }
                return Err("provider configuration is incomplete".into());
            }

            let domain = provider.client()?.domain_services().get(&id).await?;
            println!(
                "{}: {}",
                id,
                domain
                    .properties
                    .provisioning_state
                    .as_deref()
                    .unwrap_or("Unknown")
            );
        }
        _ => {
            eprintln!("{}", USAGE);
            eprintln!(
                "environment: ARM_SUBSCRIPTION_ID, ARM_ACCESS_TOKEN, ARM_ENDPOINT (default {})",
                azurerm::config::DEFAULT_ENDPOINT
            );
            std::process::exit(2);
        }
    }

    Ok(())
}
