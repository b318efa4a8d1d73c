//! Qualified Names
//!
//! The output of resolution: a fully composed resource identifier ready to
//! hand to an API client.

use super::registry::ResourceSpec;
use serde::Serialize;
use std::fmt;

/// One resolved attribute value, keyed by its internal attribute name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameParam {
    pub attribute: String,
    pub value: String,
}

/// Fully-qualified resource name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualifiedName {
    resource: String,
    collection: String,
    api_version: String,
    relative_name: String,
    params: Vec<NameParam>,
}

impl QualifiedName {
    pub(crate) fn new(spec: &ResourceSpec, relative_name: String, params: Vec<NameParam>) -> Self {
        Self {
            resource: spec.name().to_string(),
            collection: spec.collection().to_string(),
            api_version: spec.api_version().to_string(),
            relative_name,
            params,
        }
    }

    /// Resource type name, e.g. `disk`
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Relative name, e.g. `projects/p/zones/z/disks/d`
    pub fn relative_name(&self) -> &str {
        &self.relative_name
    }

    /// Resolved values in attribute order
    pub fn params(&self) -> &[NameParam] {
        &self.params
    }

    /// Look up a resolved value by attribute name
    pub fn param(&self, attribute: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.attribute == attribute)
            .map(|p| p.value.as_str())
    }

    /// The resource's own identifying value
    pub fn id(&self) -> &str {
        self.params.last().map(|p| p.value.as_str()).unwrap_or_default()
    }

    /// Full REST URL for the resource
    pub fn self_link(&self) -> String {
        let service = self
            .collection
            .split_once('.')
            .map(|(service, _)| service)
            .unwrap_or(&self.collection);
        format!(
            "https://{service}.googleapis.com/{service}/{}/{}",
            self.api_version, self.relative_name
        )
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.relative_name)
    }
}
