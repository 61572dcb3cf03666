//! Test helpers for the Resource Manager API

use std::sync::Arc;
use std::time::Duration;

use azcore::{BearerAuthorizer, PollingPolicy};

use super::{Client, RetryConfig};

pub const SUBSCRIPTION_ID: &str = "12345678-1234-9876-4563-123456789012";

/// Client against `url` with millisecond retry and polling delays
pub fn create_test_client(url: &str) -> Client {
    Client::with_config(
        url,
        SUBSCRIPTION_ID,
        Arc::new(BearerAuthorizer::new("test-token")),
        RetryConfig {
            max_retries: 3,
            initial_backoff_ms: 1,
            max_backoff_ms: 10,
            timeout_seconds: 5,
        },
        PollingPolicy {
            interval: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
            max_attempts: Some(20),
            max_transient_errors: 2,
            initial_backoff: Duration::from_millis(1),
        },
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_backoff_ms, 100);
        assert_eq!(config.max_backoff_ms, 10000);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_client_subscription() {
        let client = create_test_client("http://127.0.0.1:1");
        assert_eq!(client.subscription_id(), SUBSCRIPTION_ID);
        assert_eq!(client.polling_policy().max_attempts, Some(20));
    }
}
