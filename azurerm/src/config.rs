//! Provider configuration
//!
//! Values set explicitly in the provider block win; anything unset falls back
//! to the matching `ARM_*` environment variable, then to a default.

use azcore::{BearerAuthorizer, Context, Diagnostics, PollingPolicy};
use std::collections::HashMap;
use std::time::Duration;

use crate::api::RetryConfig;

pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub subscription_id: String,
    pub access_token: String,
    pub request_timeout: Duration,
    pub polling_interval: Duration,
    pub operation_timeout: Duration,
    pub max_retries: u32,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint", &self.endpoint)
            .field("subscription_id", &self.subscription_id)
            .field("access_token", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .field("polling_interval", &self.polling_interval)
            .field("operation_timeout", &self.operation_timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

fn lookup(values: &HashMap<String, String>, key: &str, env: &str) -> Option<String> {
    values
        .get(key)
        .filter(|v| !v.is_empty())
        .cloned()
        .or_else(|| std::env::var(env).ok().filter(|v| !v.is_empty()))
}

fn seconds(
    values: &HashMap<String, String>,
    key: &str,
    env: &str,
    default: Duration,
    diags: &mut Diagnostics,
) -> Duration {
    match lookup(values, key, env) {
        None => default,
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(0) | Err(_) => {
                diags.add_attribute_error(
                    key,
                    format!("{} must be a positive number of seconds", key),
                    Some(format!("Got {:?} (from provider config or {} env var)", raw, env)),
                );
                default
            }
            Ok(secs) => Duration::from_secs(secs),
        },
    }
}

impl ProviderConfig {
    /// Builds the configuration, reporting every problem at once
    pub fn from_values(values: &HashMap<String, String>) -> Result<Self, Diagnostics> {
        let mut diags = Diagnostics::new();

        let endpoint = lookup(values, "endpoint", "ARM_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        if url::Url::parse(&endpoint).is_err() {
            diags.add_attribute_error(
                "endpoint",
                "endpoint must be an absolute URL",
                Some(format!("Got {:?}", endpoint)),
            );
        }

        let subscription_id = lookup(values, "subscription_id", "ARM_SUBSCRIPTION_ID");
        if subscription_id.is_none() {
            diags.add_error(
                "subscription_id is required (set in provider config or ARM_SUBSCRIPTION_ID env var)",
                None::<String>,
            );
        }

        let access_token = lookup(values, "access_token", "ARM_ACCESS_TOKEN");
        if access_token.is_none() {
            diags.add_error(
                "access_token is required (set in provider config or ARM_ACCESS_TOKEN env var)",
                None::<String>,
            );
        }

        let polling_interval = seconds(
            values,
            "polling_interval_seconds",
            "ARM_POLLING_INTERVAL_SECONDS",
            DEFAULT_POLLING_INTERVAL,
            &mut diags,
        );
        let operation_timeout = seconds(
            values,
            "operation_timeout_seconds",
            "ARM_OPERATION_TIMEOUT_SECONDS",
            DEFAULT_OPERATION_TIMEOUT,
            &mut diags,
        );
        let request_timeout = seconds(
            values,
            "request_timeout_seconds",
            "ARM_REQUEST_TIMEOUT_SECONDS",
            DEFAULT_REQUEST_TIMEOUT,
            &mut diags,
        );

        let max_retries = match lookup(values, "max_retries", "ARM_MAX_RETRIES") {
            None => RetryConfig::default().max_retries,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                diags.add_attribute_error(
                    "max_retries",
                    "max_retries must be a non-negative integer",
                    Some(format!(
                        "Got {:?} (from provider config or ARM_MAX_RETRIES env var)",
                        raw
                    )),
                );
                RetryConfig::default().max_retries
            }),
        };

        match (subscription_id, access_token) {
            (Some(subscription_id), Some(access_token)) if !diags.has_errors() => Ok(Self {
                endpoint,
                subscription_id,
                access_token,
                request_timeout,
                polling_interval,
                operation_timeout,
                max_retries,
            }),
            _ => Err(diags),
        }
    }

    /// Configuration drawn from the environment alone
    pub fn from_env() -> Result<Self, Diagnostics> {
        Self::from_values(&HashMap::new())
    }

    pub fn authorizer(&self) -> BearerAuthorizer {
        BearerAuthorizer::new(self.access_token.clone())
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            timeout_seconds: self.request_timeout.as_secs(),
            ..RetryConfig::default()
        }
    }

    pub fn polling_policy(&self) -> PollingPolicy {
        PollingPolicy {
            interval: self.polling_interval,
            max_delay: PollingPolicy::default().max_delay.max(self.polling_interval),
            ..PollingPolicy::default()
        }
    }

    /// A context bounded by the operation timeout
    pub fn operation_context(&self) -> Context {
        Context::new().with_timeout(self.operation_timeout)
    }
}
