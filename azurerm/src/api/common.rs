//! Common types and utilities for the Resource Manager API

use azcore::ResourceIdentifier;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A resource type addressed by a typed identifier and served at a fixed
/// `api-version`
pub trait ArmResource: Serialize + DeserializeOwned + Send {
    type Id: ResourceIdentifier + Sync;

    const API_VERSION: &'static str;
}

/// The `{"error": {...}}` envelope returned for failed requests
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetails,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ApiErrorDetails {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ApiErrorDetails>,
}

/// One page of a collection
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiListResponse<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    pub next_link: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ApiQueryParams {
    params: Vec<(String, String)>,
}

impl ApiQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_version(version: &str) -> Self {
        Self::new().add("api-version", version)
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn add_optional<K: Into<String>, V: ToString>(mut self, key: K, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.params.push((key.into(), v.to_string()));
        }
        self
    }

    pub fn extend(mut self, other: ApiQueryParams) -> Self {
        self.params.extend(other.params);
        self
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}

/// OData paging options understood by list operations
#[derive(Debug, Clone, Default)]
pub struct PaginationParams {
    pub top: Option<u32>,
    pub skip: Option<u32>,
    pub filter: Option<String>,
    pub inline_count: Option<String>,
}

impl PaginationParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    pub fn with_skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_inline_count(mut self, inline_count: impl Into<String>) -> Self {
        self.inline_count = Some(inline_count.into());
        self
    }

    pub fn to_query_params(&self) -> ApiQueryParams {
        ApiQueryParams::new()
            .add_optional("$filter", self.filter.as_deref())
            .add_optional("$skip", self.skip)
            .add_optional("$top", self.top)
            .add_optional("$inlinecount", self.inline_count.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_encode_values() {
        let query = ApiQueryParams::api_version("2020-01-01")
            .add("name", "a b&c")
            .add_optional("missing", None::<String>)
            .to_query_string();

        assert_eq!(query, "?api-version=2020-01-01&name=a%20b%26c");
    }

    #[test]
    fn empty_query_has_no_separator() {
        assert_eq!(ApiQueryParams::new().to_query_string(), "");
    }

    #[test]
    fn pagination_uses_odata_names() {
        let query = ApiQueryParams::api_version("2018-01-15")
            .extend(
                PaginationParams::new()
                    .with_filter("properties/configurationName eq 'web'")
                    .with_skip(20)
                    .with_top(10)
                    .to_query_params(),
            )
            .to_query_string();

        assert!(query.starts_with("?api-version=2018-01-15&"));
        assert!(query.contains("$skip=20"));
        assert!(query.contains("$top=10"));
        assert!(query.contains("$filter=properties%2FconfigurationName%20eq%20%27web%27"));
    }

    #[test]
    fn error_envelope_with_nested_details() {
        let body = r#"{"error":{"code":"InvalidParameter","message":"bad sku","details":[{"code":"Sku","message":"unknown"}]}}"#;
        let parsed: ApiErrorResponse = serde_json::from_str(body).unwrap();

        assert_eq!(parsed.error.code, "InvalidParameter");
        assert_eq!(parsed.error.details.len(), 1);
        assert_eq!(parsed.error.to_string(), "InvalidParameter: bad sku");
    }

    #[test]
    fn list_page_without_next_link() {
        let page: ApiListResponse<serde_json::Value> =
            serde_json::from_str(r#"{"value":[{"id":"a"},{"id":"b"}]}"#).unwrap();
        assert_eq!(page.value.len(), 2);
        assert!(page.next_link.is_none());
    }
}
