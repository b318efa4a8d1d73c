//! Reference Parsing
//!
//! Reads an existing relative name or self-link back into a qualified name
//! by matching it against the registry's path templates.

use super::error::ParseError;
use super::name::QualifiedName;
use super::registry::{Registry, ResourceSpec};
use super::resolver::assemble;
use std::collections::HashMap;
use url::Url;

impl Registry {
    /// Parse `reference` (relative name or full URL). With `collection`, only
    /// specs whose collection or name equals it are considered.
    ///
    /// Every path segment is one value, so names resolved from an empty
    /// value or a value containing `/` do not parse back; they yield
    /// [`ParseError::NoMatch`] or match a different shape.
    pub fn parse(
        &self,
        reference: &str,
        collection: Option<&str>,
    ) -> Result<QualifiedName, ParseError> {
        let path = relative_path(reference)?;

        let candidates: Vec<&ResourceSpec> = match collection {
            Some(hint) => {
                let specs: Vec<_> = self
                    .iter()
                    .filter(|spec| spec.collection() == hint || spec.name() == hint)
                    .collect();
                if specs.is_empty() {
                    return Err(ParseError::UnknownCollection {
                        collection: hint.to_string(),
                    });
                }
                specs
            }
            None => self.iter().collect(),
        };

        // Templates name every attribute, so a capture is a complete value set.
        let mut matches: Vec<(&ResourceSpec, HashMap<&str, &str>)> = candidates
            .into_iter()
            .filter_map(|spec| {
                let captured = spec.path().captures(&path)?;
                Some((spec, captured.into_iter().collect()))
            })
            .collect();

        match matches.len() {
            0 => Err(ParseError::NoMatch {
                reference: reference.to_string(),
            }),
            1 => {
                let (spec, values) = matches.remove(0);
                tracing::debug!("Parsed '{}' as {}", reference, spec.name());
                Ok(assemble(spec, &values))
            }
            _ => Err(ParseError::Ambiguous {
                reference: reference.to_string(),
                candidates: matches
                    .iter()
                    .map(|(spec, _)| spec.name().to_string())
                    .collect(),
            }),
        }
    }
}

/// Reduce a reference to its relative path. URLs keep the path from the
/// first `projects` segment on.
fn relative_path(reference: &str) -> Result<String, ParseError> {
    let reference = reference.trim();
    if !reference.contains("://") {
        return Ok(reference.trim_matches('/').to_string());
    }

    let url = Url::parse(reference).map_err(|source| ParseError::InvalidUrl {
        reference: reference.to_string(),
        source,
    })?;

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    let start = segments
        .iter()
        .position(|segment| *segment == "projects")
        .ok_or_else(|| ParseError::NoMatch {
            reference: reference.to_string(),
        })?;

    Ok(segments[start..].join("/"))
}
