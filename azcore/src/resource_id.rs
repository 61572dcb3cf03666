//! ARM resource identifier parsing and formatting
//!
//! [`ResourceId`] is the generic scanner: it splits an ARM path into its
//! subscription, resource group, provider namespace and the remaining
//! `{key}/{value}` pairs. Typed identifiers pop the segments they expect and
//! then call [`ResourceId::finish`], which rejects anything left over.

use std::fmt;

use crate::error::ParseError;

const SUBSCRIPTIONS: &str = "subscriptions";
const RESOURCE_GROUPS: &str = "resourceGroups";
const PROVIDERS: &str = "providers";

/// A typed resource identifier with a canonical path form
pub trait ResourceIdentifier: Sized + fmt::Display {
    /// Canonical ARM path, e.g. `/subscriptions/{id}/resourceGroups/{rg}/...`
    fn id(&self) -> String;

    /// Strictly parses a path into this identifier
    fn parse(input: &str) -> Result<Self, ParseError>;
}

/// A partially consumed ARM path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    pub subscription_id: String,
    pub resource_group: Option<String>,
    pub provider: Option<String>,
    segments: Vec<(String, String)>,
    input: String,
}

impl ResourceId {
    /// Splits `input` into key/value pairs.
    ///
    /// The path must start with `/subscriptions/{id}`, have an even number
    /// of components and no empty components. Keys are matched
    /// case-insensitively.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        if input.is_empty() {
            return Err(ParseError::malformed(input, "cannot parse an empty ID"));
        }

        if !input.starts_with('/') {
            return Err(ParseError::malformed(input, "ID must start with '/'"));
        }

        let path = &input[1..];
        let path = path.strip_suffix('/').unwrap_or(path);
        let components: Vec<&str> = path.split('/').collect();

        if components.iter().any(|c| c.is_empty()) {
            return Err(ParseError::malformed(input, "ID contains an empty segment"));
        }

        if components.len() % 2 != 0 {
            return Err(ParseError::malformed(
                input,
                "the number of path segments is not divisible by 2",
            ));
        }

        let mut pairs = components
            .chunks(2)
            .map(|pair| (pair[0].to_string(), pair[1].to_string()));

        let subscription_id = match pairs.next() {
            Some((key, value)) if key.eq_ignore_ascii_case(SUBSCRIPTIONS) => value,
            _ => {
                return Err(ParseError::malformed(
                    input,
                    "ID was missing the 'subscriptions' element",
                ))
            }
        };

        let mut id = Self {
            subscription_id,
            resource_group: None,
            provider: None,
            segments: pairs.collect(),
            input: input.to_string(),
        };

        id.resource_group = id.take(RESOURCE_GROUPS);
        id.provider = id.take(PROVIDERS);

        Ok(id)
    }

    /// The string this identifier was parsed from
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Remaining, not yet consumed segments
    pub fn segments(&self) -> &[(String, String)] {
        &self.segments
    }

    pub fn resource_group(&self) -> Result<&str, ParseError> {
        self.resource_group.as_deref().ok_or_else(|| {
            ParseError::malformed(&self.input, "ID was missing the 'resourceGroups' element")
        })
    }

    /// Ensures the provider namespace matches `namespace` (case-insensitively)
    pub fn require_provider(&self, namespace: &str) -> Result<(), ParseError> {
        match self.provider.as_deref() {
            Some(provider) if provider.eq_ignore_ascii_case(namespace) => Ok(()),
            Some(provider) => Err(ParseError::malformed(
                &self.input,
                format!("expected provider {:?} but got {:?}", namespace, provider),
            )),
            None => Err(ParseError::malformed(
                &self.input,
                "ID was missing the 'providers' element",
            )),
        }
    }

    /// Removes the segment named `key` and returns its value
    pub fn pop_segment(&mut self, key: &str) -> Result<String, ParseError> {
        self.take(key).ok_or_else(|| {
            ParseError::malformed(&self.input, format!("ID was missing the '{}' element", key))
        })
    }

    /// Rejects any segment that was not popped
    pub fn finish(self) -> Result<(), ParseError> {
        match self.segments.into_iter().next() {
            Some((key, value)) => Err(ParseError::UnexpectedSegment {
                input: self.input,
                key,
                value,
            }),
            None => Ok(()),
        }
    }

    fn take(&mut self, key: &str) -> Option<String> {
        let index = self
            .segments
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))?;
        Some(self.segments.remove(index).1)
    }
}

/// Renders the canonical path of whatever has not been consumed yet
impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", SUBSCRIPTIONS, self.subscription_id)?;
        if let Some(resource_group) = &self.resource_group {
            write!(f, "/{}/{}", RESOURCE_GROUPS, resource_group)?;
        }
        if let Some(provider) = &self.provider {
            write!(f, "/{}/{}", PROVIDERS, provider)?;
        }
        for (key, value) in &self.segments {
            write!(f, "/{}/{}", key, value)?;
        }
        Ok(())
    }
}
