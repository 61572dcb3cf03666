//! Azure Resource Manager API client
//!
//! `Client` owns authorization, request ids and transient-error retries;
//! the per-service modules only know paths, payloads and `api-version`s.

pub mod automation;
pub mod client;
pub mod common;
pub mod domain_services;
pub mod error;

#[cfg(test)]
pub mod test_helpers;

pub use client::{Client, RetryConfig, Submitted};
pub use common::{ApiErrorDetails, ApiQueryParams, ArmResource, PaginationParams};
pub use error::ApiError;
