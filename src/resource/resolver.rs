//! Resource Name Resolver
//!
//! Turns a resource spec plus partial user input into a qualified name.
//! Each parent attribute takes its explicitly provided value if present,
//! otherwise the ambient default. The resource's own identifying attribute
//! is never defaulted. Resolution is a pure function of its inputs.

use super::error::ResolutionError;
use super::name::{NameParam, QualifiedName};
use super::registry::ResourceSpec;
use std::collections::HashMap;
use std::sync::Arc;

/// Values keyed by attribute parameter name
pub type ParamValues = HashMap<String, String>;

/// Resolve a qualified name for `spec`.
///
/// Parent attributes fall back to `defaults`; the terminal attribute is only
/// taken from `provided`. An empty string counts as provided; omit the key to
/// leave a value unset. Fails with every missing attribute listed in
/// attribute order.
pub fn resolve(
    spec: &ResourceSpec,
    provided: &ParamValues,
    defaults: &ParamValues,
) -> Result<QualifiedName, ResolutionError> {
    let mut values: HashMap<&str, &str> = HashMap::with_capacity(spec.attributes().len());
    let mut missing = Vec::new();

    let terminal = spec.terminal();
    for attribute in spec.attributes() {
        let key = attribute.parameter_name.as_str();
        let value = match provided.get(key) {
            Some(value) => Some(value),
            None if Arc::ptr_eq(attribute, terminal) => None,
            None => defaults.get(key),
        };
        match value {
            Some(value) => {
                values.insert(key, value.as_str());
            }
            None => missing.push(Arc::clone(attribute)),
        }
    }

    if !missing.is_empty() {
        return Err(ResolutionError::MissingAttribute {
            resource: spec.name().to_string(),
            missing,
        });
    }

    Ok(assemble(spec, &values))
}

/// Build the qualified name once every parameter has a value
pub(crate) fn assemble(spec: &ResourceSpec, values: &HashMap<&str, &str>) -> QualifiedName {
    let params = spec
        .attributes()
        .iter()
        .map(|attribute| NameParam {
            attribute: attribute.attribute_name.clone(),
            value: values
                .get(attribute.parameter_name.as_str())
                .copied()
                .unwrap_or_default()
                .to_string(),
        })
        .collect();

    QualifiedName::new(spec, spec.path().expand(values), params)
}

impl ResourceSpec {
    /// Resolve this spec; see [`resolve`]
    pub fn resolve(
        &self,
        provided: &ParamValues,
        defaults: &ParamValues,
    ) -> Result<QualifiedName, ResolutionError> {
        resolve(self, provided, defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Registry;

    fn values(pairs: &[(&str, &str)]) -> ParamValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn spec(name: &str) -> &'static ResourceSpec {
        Registry::builtin().get(name).unwrap()
    }

    #[test]
    fn test_disk_with_ambient_project() {
        let name = resolve(
            spec("disk"),
            &values(&[("zone", "us-central1-a"), ("disk", "boot-disk")]),
            &values(&[("project", "my-proj")]),
        )
        .unwrap();

        assert_eq!(
            name.relative_name(),
            "projects/my-proj/zones/us-central1-a/disks/boot-disk"
        );
        assert_eq!(name.collection(), "compute.disks");
        assert_eq!(name.param("zone"), Some("us-central1-a"));
        assert_eq!(name.id(), "boot-disk");
        assert_eq!(
            name.self_link(),
            "https://compute.googleapis.com/compute/v1/projects/my-proj/zones/us-central1-a/disks/boot-disk"
        );
    }

    #[test]
    fn test_subnetwork_reports_all_missing() {
        let err = resolve(spec("subnetwork"), &values(&[]), &values(&[])).unwrap_err();
        assert_eq!(err.parameter_names(), vec!["project", "region", "subnetwork"]);
        assert_eq!(err.resource(), "subnetwork");
        assert_eq!(
            err.to_string(),
            "missing required attribute(s) for subnetwork: project, region, subnetwork"
        );
    }

    #[test]
    fn test_explicit_value_wins() {
        let name = resolve(
            spec("image"),
            &values(&[("project", "A"), ("image", "debian")]),
            &values(&[("project", "B")]),
        )
        .unwrap();
        assert_eq!(name.to_string(), "projects/A/global/images/debian");
    }

    #[test]
    fn test_terminal_never_taken_from_defaults() {
        let err = resolve(
            spec("zone"),
            &values(&[]),
            &values(&[("project", "p"), ("zone", "us-east1-b")]),
        )
        .unwrap_err();
        assert_eq!(err.parameter_names(), vec!["zone"]);

        for name in Registry::builtin().resource_names() {
            let resource = spec(name);
            let everything: Vec<(&str, &str)> = resource
                .attributes()
                .iter()
                .map(|a| (a.parameter_name.as_str(), "default-value"))
                .collect();
            let err = resolve(resource, &values(&[]), &values(&everything)).unwrap_err();
            assert_eq!(
                err.parameter_names(),
                vec![resource.terminal().parameter_name.as_str()],
                "{} should not take its own name from defaults",
                name
            );
        }
    }

    #[test]
    fn test_terminal_missing_with_parent_defaults() {
        let err = resolve(
            spec("instance"),
            &values(&[]),
            &values(&[("project", "p"), ("zone", "z")]),
        )
        .unwrap_err();
        assert_eq!(err.parameter_names(), vec!["instance"]);
    }

    #[test]
    fn test_empty_string_counts_as_provided() {
        let name = resolve(
            spec("zone"),
            &values(&[("project", ""), ("zone", "us-east1-b")]),
            &values(&[("project", "fallback")]),
        )
        .unwrap();
        assert_eq!(name.relative_name(), "projects//zones/us-east1-b");
    }

    #[test]
    fn test_shared_missing_attribute_is_interned_definition() {
        let err = resolve(spec("disk"), &values(&[("disk", "d")]), &values(&[])).unwrap_err();
        let project = Registry::builtin().attribute("project").unwrap();
        assert!(Arc::ptr_eq(&err.missing()[0], project));
    }

    #[test]
    fn test_spec_method_matches_free_function() {
        let provided = values(&[("project", "p"), ("region", "us-east1")]);
        let defaults = values(&[]);
        assert_eq!(
            spec("region").resolve(&provided, &defaults),
            resolve(spec("region"), &provided, &defaults)
        );
    }
}
