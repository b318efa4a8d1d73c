//! Resource Errors
//!
//! Typed errors for schema loading, name resolution and reference parsing.

use super::registry::AttributeSpec;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while loading resource definitions
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("failed to parse resource YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("resource '{resource}' declares no attributes")]
    EmptyAttributes { resource: String },

    #[error("resource '{resource}' lists attribute '{attribute}' more than once")]
    DuplicateAttribute { resource: String, attribute: String },

    #[error("attribute '{attribute}' has conflicting definitions")]
    ConflictingAttribute { attribute: String },

    #[error(
        "resource '{resource}' ends with '{attribute}', which is a parent attribute of other resources"
    )]
    TerminalIsParent { resource: String, attribute: String },

    #[error("invalid path template for resource '{resource}': {source}")]
    InvalidTemplate {
        resource: String,
        #[source]
        source: TemplateError,
    },

    #[error("unknown resource '{name}' (known: {})", .known.join(", "))]
    UnknownResource { name: String, known: Vec<String> },
}

/// Errors in a collection path template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template is empty")]
    Empty,

    #[error("empty segment in '{template}'")]
    EmptySegment { template: String },

    #[error("segment '{segment}' mixes a placeholder with literal text")]
    MixedSegment { segment: String },

    #[error("placeholder '{name}' appears more than once")]
    RepeatedPlaceholder { name: String },

    #[error("placeholder '{name}' is not an attribute of the resource")]
    UnknownPlaceholder { name: String },

    #[error("attribute '{name}' does not appear in the template")]
    MissingPlaceholder { name: String },
}

/// Resolution failure. Every unresolved attribute is reported, in attribute order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error(
        "missing required attribute(s) for {resource}: {}",
        .missing.iter().map(|a| a.parameter_name.as_str()).collect::<Vec<_>>().join(", ")
    )]
    MissingAttribute {
        resource: String,
        missing: Vec<Arc<AttributeSpec>>,
    },
}

impl ResolutionError {
    /// Parameter names of the missing attributes, outermost first
    pub fn parameter_names(&self) -> Vec<&str> {
        match self {
            ResolutionError::MissingAttribute { missing, .. } => {
                missing.iter().map(|a| a.parameter_name.as_str()).collect()
            }
        }
    }

    /// The missing attribute definitions, for rendering help text
    pub fn missing(&self) -> &[Arc<AttributeSpec>] {
        match self {
            ResolutionError::MissingAttribute { missing, .. } => missing,
        }
    }

    /// Name of the resource type that failed to resolve
    pub fn resource(&self) -> &str {
        match self {
            ResolutionError::MissingAttribute { resource, .. } => resource,
        }
    }
}

/// Errors raised while parsing an existing reference back into a name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid resource URL '{reference}': {source}")]
    InvalidUrl {
        reference: String,
        #[source]
        source: url::ParseError,
    },

    #[error("'{reference}' does not match any known resource path")]
    NoMatch { reference: String },

    #[error("'{reference}' matches several resources: {}", .candidates.join(", "))]
    Ambiguous {
        reference: String,
        candidates: Vec<String>,
    },

    #[error("unknown collection '{collection}'")]
    UnknownCollection { collection: String },
}
