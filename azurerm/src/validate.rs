//! Attribute validation functions
//!
//! Each function appends diagnostics for `attribute` rather than failing, so
//! a whole configuration can be checked in one pass.

use azcore::validator::{
    Diagnostics, ResourceIdValidator, StringLengthValidator, StringPatternValidator, Validator,
};
use azcore::ResourceIdentifier;
use regex::Regex;
use std::sync::OnceLock;

use crate::parse::{AutomationAccountId, DomainServiceId, DscNodeConfigurationId};

fn pattern(
    cell: &'static OnceLock<StringPatternValidator>,
    regex: &str,
    description: &str,
) -> &'static StringPatternValidator {
    cell.get_or_init(|| StringPatternValidator {
        pattern: Regex::new(regex).unwrap_or_else(|e| panic!("invalid pattern {}: {}", regex, e)),
        description: description.to_string(),
    })
}

/// A domain service ID whose resource group name is also valid
pub fn domain_service_id(value: &str, attribute: &str, diags: &mut Diagnostics) {
    ResourceIdValidator::<DomainServiceId>::new().validate(value, attribute, diags);

    if let Ok(id) = DomainServiceId::parse(value) {
        resource_group_name(&id.resource_group, attribute, diags);
    }
}

/// An automation account ID with valid resource group and account names
pub fn automation_account_id(value: &str, attribute: &str, diags: &mut Diagnostics) {
    ResourceIdValidator::<AutomationAccountId>::new().validate(value, attribute, diags);

    if let Ok(id) = AutomationAccountId::parse(value) {
        resource_group_name(&id.resource_group, attribute, diags);
        automation_account_name(&id.name, attribute, diags);
    }
}

/// A node configuration ID whose every name segment is valid
pub fn dsc_node_configuration_id(value: &str, attribute: &str, diags: &mut Diagnostics) {
    ResourceIdValidator::<DscNodeConfigurationId>::new().validate(value, attribute, diags);

    if let Ok(id) = DscNodeConfigurationId::parse(value) {
        resource_group_name(&id.resource_group, attribute, diags);
        automation_account_name(&id.automation_account_name, attribute, diags);
        dsc_node_configuration_name(&id.name, attribute, diags);
    }
}

/// Up to 90 word characters, hyphens, periods or parentheses, not ending in a period
pub fn resource_group_name(value: &str, attribute: &str, diags: &mut Diagnostics) {
    static PATTERN: OnceLock<StringPatternValidator> = OnceLock::new();

    StringLengthValidator {
        min: Some(1),
        max: Some(90),
    }
    .validate(value, attribute, diags);

    if value.is_empty() {
        return;
    }

    pattern(
        &PATTERN,
        r"^[-\w._()]+$",
        "alphanumerics, underscores, parentheses, hyphens and periods",
    )
    .validate(value, attribute, diags);

    if value.ends_with('.') {
        diags.add_attribute_error(
            attribute,
            format!("{} cannot end with a period", attribute),
            Some(format!("Got {:?}", value)),
        );
    }
}

/// A DNS name whose first label doubles as the NetBIOS name
pub fn domain_name(value: &str, attribute: &str, diags: &mut Diagnostics) {
    static PATTERN: OnceLock<StringPatternValidator> = OnceLock::new();

    pattern(
        &PATTERN,
        r"^([a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,63}$",
        "a fully qualified domain name",
    )
    .validate(value, attribute, diags);

    let prefix = value.split('.').next().unwrap_or_default();
    if prefix.len() > 15 {
        diags.add_attribute_error(
            attribute,
            format!(
                "the first label of {} must be at most 15 characters",
                attribute
            ),
            Some(format!("Got {:?} ({} characters)", prefix, prefix.len())),
        );
    }
}

/// 6 to 50 characters; starts with a letter, ends with a letter or digit
pub fn automation_account_name(value: &str, attribute: &str, diags: &mut Diagnostics) {
    static PATTERN: OnceLock<StringPatternValidator> = OnceLock::new();

    pattern(
        &PATTERN,
        r"^[a-zA-Z][-a-zA-Z0-9]{4,48}[a-zA-Z0-9]$",
        "6-50 letters, digits or hyphens, starting with a letter and ending with a letter or digit",
    )
    .validate(value, attribute, diags);
}

/// `<configuration>.<node>`
pub fn dsc_node_configuration_name(value: &str, attribute: &str, diags: &mut Diagnostics) {
    static PATTERN: OnceLock<StringPatternValidator> = OnceLock::new();

    pattern(
        &PATTERN,
        r"^[a-zA-Z0-9_]+\.[a-zA-Z0-9_.\-]+$",
        "the form <configuration>.<node>",
    )
    .validate(value, attribute, diags);
}
