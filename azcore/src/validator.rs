//! Attribute validators
//!
//! Validators never fail fast; they push [`Diagnostic`]s so every problem in
//! a configuration is reported at once.

use std::fmt;
use std::marker::PhantomData;

use crate::resource_id::ResourceIdentifier;

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// A warning or error about a single attribute
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub summary: String,
    pub detail: Option<String>,
    pub attribute: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, summary: impl Into<String>, detail: Option<impl Into<String>>) {
        self.errors.push(Diagnostic {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: detail.map(Into::into),
            attribute: None,
        });
    }

    pub fn add_attribute_error(
        &mut self,
        attribute: &str,
        summary: impl Into<String>,
        detail: Option<impl Into<String>>,
    ) {
        self.errors.push(Diagnostic {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: detail.map(Into::into),
            attribute: Some(attribute.to_string()),
        });
    }

    pub fn add_warning(&mut self, summary: impl Into<String>, detail: Option<impl Into<String>>) {
        self.warnings.push(Diagnostic {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: detail.map(Into::into),
            attribute: None,
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Error summaries joined with `; `, each followed by its detail
impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diag) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            f.write_str(&diag.summary)?;
            if let Some(detail) = &diag.detail {
                write!(f, " ({})", detail)?;
            }
        }
        Ok(())
    }
}

pub trait Validator: Send + Sync {
    fn validate(&self, value: &str, attribute_path: &str, diagnostics: &mut Diagnostics);
}

pub struct StringLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Validator for StringLengthValidator {
    fn validate(&self, value: &str, attribute_path: &str, diagnostics: &mut Diagnostics) {
        let length = value.chars().count();
        if let Some(min) = self.min {
            if length < min {
                diagnostics.add_attribute_error(
                    attribute_path,
                    format!("{} must have minimum length of {}", attribute_path, min),
                    Some(format!("Got length {}", length)),
                );
            }
        }
        if let Some(max) = self.max {
            if length > max {
                diagnostics.add_attribute_error(
                    attribute_path,
                    format!("{} must have maximum length of {}", attribute_path, max),
                    Some(format!("Got length {}", length)),
                );
            }
        }
    }
}

pub struct StringPatternValidator {
    pub pattern: regex::Regex,
    pub description: String,
}

impl Validator for StringPatternValidator {
    fn validate(&self, value: &str, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if !self.pattern.is_match(value) {
            diagnostics.add_attribute_error(
                attribute_path,
                format!("{} must match {}", attribute_path, self.description),
                Some(format!("Value '{}' does not match pattern", value)),
            );
        }
    }
}

/// Checks that a value parses as the resource identifier `T`
pub struct ResourceIdValidator<T> {
    _id: PhantomData<fn() -> T>,
}

impl<T> ResourceIdValidator<T> {
    pub fn new() -> Self {
        Self { _id: PhantomData }
    }
}

impl<T> Default for ResourceIdValidator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ResourceIdentifier> Validator for ResourceIdValidator<T> {
    fn validate(&self, value: &str, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Err(e) = T::parse(value) {
            diagnostics.add_attribute_error(
                attribute_path,
                format!("{} is not a valid resource ID", attribute_path),
                Some(e.to_string()),
            );
        }
    }
}
