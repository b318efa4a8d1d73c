//! Resource Registry - Load resource name schemas from YAML
//!
//! This module loads resource definitions from embedded YAML files (and any
//! user-supplied overrides) and provides lookup functions for the rest of the
//! application. Attribute definitions are interned so that a shared
//! attribute such as `project` exists exactly once.

use super::error::{RegistryError, TemplateError};
use super::template::PathTemplate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, OnceLock};

/// Embedded resource YAML files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[include_str!("../resources/compute.yaml")];

/// API version used when a definition does not name one
const DEFAULT_API_VERSION: &str = "v1";

/// One positional component of a resource name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSpec {
    /// User-facing key: flag name and key of provided values and defaults
    pub parameter_name: String,
    /// Field key in the resolved parameter map
    pub attribute_name: String,
    /// Help text; `{resource}` is replaced with the resource type name
    #[serde(default)]
    pub help: String,
}

impl AttributeSpec {
    /// Help text rendered for a particular resource type
    pub fn help_for(&self, resource: &str) -> String {
        self.help.replace("{resource}", resource)
    }

    /// Command-line flag for this attribute
    pub fn flag(&self) -> String {
        format!("--{}", self.parameter_name.replace('_', "-"))
    }
}

/// Resource definition as written in YAML
#[derive(Debug, Clone, Deserialize)]
struct ResourceDef {
    collection: String,
    #[serde(default)]
    api_version: Option<String>,
    #[serde(default)]
    path: Option<String>,
    attributes: Vec<AttributeSpec>,
}

/// Schema for one resource type's qualified name
#[derive(Debug, Clone)]
pub struct ResourceSpec {
    name: String,
    collection: String,
    api_version: String,
    attributes: Vec<Arc<AttributeSpec>>,
    path: PathTemplate,
}

impl ResourceSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Opaque API collection identifier, e.g. `compute.disks`
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// API service name (the collection prefix)
    pub fn service(&self) -> &str {
        self.collection
            .split_once('.')
            .map(|(service, _)| service)
            .unwrap_or(&self.collection)
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Attributes, outermost parent first
    pub fn attributes(&self) -> &[Arc<AttributeSpec>] {
        &self.attributes
    }

    /// The resource's own identifying attribute
    pub fn terminal(&self) -> &Arc<AttributeSpec> {
        // Construction rejects empty attribute lists.
        &self.attributes[self.attributes.len() - 1]
    }

    /// Parent attributes (everything but the terminal)
    pub fn parents(&self) -> &[Arc<AttributeSpec>] {
        &self.attributes[..self.attributes.len() - 1]
    }

    pub fn path(&self) -> &PathTemplate {
        &self.path
    }
}

/// Loaded set of resource specs
#[derive(Debug, Clone, Default)]
pub struct Registry {
    resources: BTreeMap<String, ResourceSpec>,
    attributes: BTreeMap<String, Arc<AttributeSpec>>,
}

/// Global registry loaded from the embedded YAML
static REGISTRY: OnceLock<Registry> = OnceLock::new();

impl Registry {
    /// Get the built-in registry (loads from embedded YAML on first access)
    pub fn builtin() -> &'static Registry {
        REGISTRY.get_or_init(|| {
            Self::from_yaml_documents(RESOURCE_FILES)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource YAML: {}", e))
        })
    }

    /// Built-in definitions extended (or overridden by name) with extra documents
    pub fn builtin_with<S: AsRef<str>>(extra: &[S]) -> Result<Self, RegistryError> {
        let docs: Vec<&str> = RESOURCE_FILES
            .iter()
            .copied()
            .chain(extra.iter().map(|doc| doc.as_ref()))
            .collect();
        Self::from_yaml_documents(&docs)
    }

    /// Load from YAML documents. Later documents replace earlier definitions
    /// with the same resource name.
    pub fn from_yaml_documents<S: AsRef<str>>(docs: &[S]) -> Result<Self, RegistryError> {
        let mut defs: BTreeMap<String, ResourceDef> = BTreeMap::new();
        for doc in docs {
            let partial: BTreeMap<String, ResourceDef> = serde_yaml::from_str(doc.as_ref())?;
            defs.extend(partial);
        }

        let registry = Self::build(defs)?;
        tracing::debug!(
            "Loaded {} resources with {} shared attributes",
            registry.resources.len(),
            registry.attributes.len()
        );
        Ok(registry)
    }

    fn build(defs: BTreeMap<String, ResourceDef>) -> Result<Self, RegistryError> {
        let mut registry = Registry::default();

        for (name, def) in defs {
            if def.attributes.is_empty() {
                return Err(RegistryError::EmptyAttributes { resource: name });
            }

            let mut seen = HashSet::new();
            let mut attributes = Vec::with_capacity(def.attributes.len());
            for attribute in def.attributes {
                if !seen.insert(attribute.parameter_name.clone()) {
                    return Err(RegistryError::DuplicateAttribute {
                        resource: name,
                        attribute: attribute.parameter_name,
                    });
                }
                attributes.push(registry.intern(attribute)?);
            }

            let path = match def.path {
                Some(source) => PathTemplate::parse(&source),
                None => Ok(PathTemplate::derive(&attributes)),
            }
            .and_then(|path| path.check_params(&attributes).map(|_| path))
            .map_err(|source: TemplateError| RegistryError::InvalidTemplate {
                resource: name.clone(),
                source,
            })?;

            let spec = ResourceSpec {
                name: name.clone(),
                collection: def.collection,
                api_version: def
                    .api_version
                    .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
                attributes,
                path,
            };
            registry.resources.insert(name, spec);
        }

        registry.check_terminals()?;
        Ok(registry)
    }

    /// Return the single authoritative definition for an attribute
    fn intern(&mut self, attribute: AttributeSpec) -> Result<Arc<AttributeSpec>, RegistryError> {
        match self.attributes.get(&attribute.parameter_name) {
            Some(existing) if **existing == attribute => Ok(Arc::clone(existing)),
            Some(_) => Err(RegistryError::ConflictingAttribute {
                attribute: attribute.parameter_name,
            }),
            None => {
                let shared = Arc::new(attribute);
                self.attributes
                    .insert(shared.parameter_name.clone(), Arc::clone(&shared));
                Ok(shared)
            }
        }
    }

    /// A terminal attribute may only be a parent elsewhere when the
    /// resource is the one that attribute names (e.g. `zone` ends `zone`).
    fn check_terminals(&self) -> Result<(), RegistryError> {
        let parents: HashSet<&str> = self
            .resources
            .values()
            .flat_map(|spec| spec.parents())
            .map(|attribute| attribute.parameter_name.as_str())
            .collect();

        for spec in self.resources.values() {
            let terminal = spec.terminal();
            if parents.contains(terminal.parameter_name.as_str())
                && terminal.parameter_name != spec.name
            {
                return Err(RegistryError::TerminalIsParent {
                    resource: spec.name.clone(),
                    attribute: terminal.parameter_name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Get a resource spec by name
    pub fn get(&self, name: &str) -> Option<&ResourceSpec> {
        self.resources.get(name)
    }

    /// Get a resource spec by name, or an error listing the known names
    pub fn require(&self, name: &str) -> Result<&ResourceSpec, RegistryError> {
        self.get(name).ok_or_else(|| RegistryError::UnknownResource {
            name: name.to_string(),
            known: self.resource_names().into_iter().map(String::from).collect(),
        })
    }

    /// Get all resource names, sorted
    pub fn resource_names(&self) -> Vec<&str> {
        self.resources.keys().map(|s| s.as_str()).collect()
    }

    /// Get a shared attribute definition by parameter name
    pub fn attribute(&self, parameter_name: &str) -> Option<&Arc<AttributeSpec>> {
        self.attributes.get(parameter_name)
    }

    /// Iterate resource specs in name order
    pub fn iter(&self) -> impl Iterator<Item = &ResourceSpec> {
        self.resources.values()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
