//! Collection path templates
//!
//! A template such as `projects/{project}/zones/{zone}/disks/{disk}` is a
//! `/`-separated list of segments. Each segment is either literal text or a
//! single `{parameter}` placeholder.

use super::error::TemplateError;
use super::registry::AttributeSpec;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Parsed collection path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a template string
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let trimmed = source.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(TemplateError::Empty);
        }

        let mut segments = Vec::new();
        let mut seen = HashSet::new();

        for raw in trimmed.split('/') {
            if raw.is_empty() {
                return Err(TemplateError::EmptySegment {
                    template: source.to_string(),
                });
            }

            let has_braces = raw.contains('{') || raw.contains('}');
            if !has_braces {
                segments.push(Segment::Literal(raw.to_string()));
                continue;
            }

            let name = raw
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .filter(|name| !name.is_empty() && !name.contains(['{', '}']))
                .ok_or_else(|| TemplateError::MixedSegment {
                    segment: raw.to_string(),
                })?;

            if !seen.insert(name) {
                return Err(TemplateError::RepeatedPlaceholder {
                    name: name.to_string(),
                });
            }
            segments.push(Segment::Param(name.to_string()));
        }

        Ok(Self {
            source: trimmed.to_string(),
            segments,
        })
    }

    /// Build the conventional template for an attribute chain:
    /// `project, zone, disk` becomes `projects/{project}/zones/{zone}/disks/{disk}`.
    pub fn derive(attributes: &[Arc<AttributeSpec>]) -> Self {
        let mut segments = Vec::with_capacity(attributes.len() * 2);
        for attribute in attributes {
            segments.push(Segment::Literal(format!("{}s", attribute.attribute_name)));
            segments.push(Segment::Param(attribute.parameter_name.clone()));
        }

        let source = segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.clone(),
                Segment::Param(name) => format!("{{{}}}", name),
            })
            .collect::<Vec<_>>()
            .join("/");

        Self { source, segments }
    }

    /// Check that placeholders and attributes correspond one to one
    pub fn check_params(&self, attributes: &[Arc<AttributeSpec>]) -> Result<(), TemplateError> {
        let declared: HashSet<&str> = attributes
            .iter()
            .map(|a| a.parameter_name.as_str())
            .collect();
        let used: HashSet<&str> = self.params().collect();

        if let Some(name) = self.params().find(|name| !declared.contains(name)) {
            return Err(TemplateError::UnknownPlaceholder {
                name: name.to_string(),
            });
        }

        if let Some(attribute) = attributes
            .iter()
            .find(|a| !used.contains(a.parameter_name.as_str()))
        {
            return Err(TemplateError::MissingPlaceholder {
                name: attribute.parameter_name.clone(),
            });
        }

        Ok(())
    }

    /// Placeholder names in template order
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitute placeholder values. Placeholders without a value expand to
    /// an empty segment; callers supply a value for every parameter.
    pub fn expand(&self, values: &HashMap<&str, &str>) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.as_str(),
                Segment::Param(name) => values.get(name.as_str()).copied().unwrap_or_default(),
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Match a relative path against the template, returning
    /// `(parameter, value)` pairs in template order.
    pub fn captures<'p>(&self, path: &'p str) -> Option<Vec<(&str, &'p str)>> {
        let parts: Vec<&str> = path.trim_matches('/').split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut captured = Vec::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(text) if text == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(_) if part.is_empty() => return None,
                Segment::Param(name) => captured.push((name.as_str(), part)),
            }
        }
        Some(captured)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: &str) -> Arc<AttributeSpec> {
        Arc::new(AttributeSpec {
            parameter_name: name.to_string(),
            attribute_name: name.to_string(),
            help: String::new(),
        })
    }

    #[test]
    fn test_parse_and_params() {
        let template = PathTemplate::parse("projects/{project}/global/images/{image}").unwrap();
        assert_eq!(template.params().collect::<Vec<_>>(), vec!["project", "image"]);
        assert_eq!(template.as_str(), "projects/{project}/global/images/{image}");
    }

    #[test]
    fn test_parse_rejects_mixed_segment() {
        let err = PathTemplate::parse("projects/p-{project}").unwrap_err();
        assert_eq!(
            err,
            TemplateError::MixedSegment {
                segment: "p-{project}".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rejects_repeated_placeholder() {
        let err = PathTemplate::parse("a/{x}/b/{x}").unwrap_err();
        assert!(matches!(err, TemplateError::RepeatedPlaceholder { .. }));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(PathTemplate::parse(" / ").unwrap_err(), TemplateError::Empty);
        assert!(matches!(
            PathTemplate::parse("a//{x}").unwrap_err(),
            TemplateError::EmptySegment { .. }
        ));
    }

    #[test]
    fn test_derive_from_attributes() {
        let template = PathTemplate::derive(&[attr("project"), attr("zone"), attr("disk")]);
        assert_eq!(
            template.as_str(),
            "projects/{project}/zones/{zone}/disks/{disk}"
        );
    }

    #[test]
    fn test_check_params() {
        let template = PathTemplate::parse("projects/{project}/zones/{zone}").unwrap();
        assert!(template.check_params(&[attr("project"), attr("zone")]).is_ok());
        assert_eq!(
            template.check_params(&[attr("project")]).unwrap_err(),
            TemplateError::UnknownPlaceholder {
                name: "zone".to_string()
            }
        );
        assert_eq!(
            template
                .check_params(&[attr("project"), attr("zone"), attr("disk")])
                .unwrap_err(),
            TemplateError::MissingPlaceholder {
                name: "disk".to_string()
            }
        );
    }

    #[test]
    fn test_expand_and_capture() {
        let template = PathTemplate::parse("projects/{project}/zones/{zone}").unwrap();
        let values = HashMap::from([("project", "p"), ("zone", "z")]);
        assert_eq!(template.expand(&values), "projects/p/zones/z");

        let captured = template.captures("projects/p/zones/z").unwrap();
        assert_eq!(captured, vec![("project", "p"), ("zone", "z")]);

        assert!(template.captures("projects/p/regions/z").is_none());
        assert!(template.captures("projects/p/zones").is_none());
        assert!(template.captures("projects//zones/z").is_none());
    }
}
