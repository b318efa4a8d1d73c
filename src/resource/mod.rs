//! Resource name layer
//!
//! This module provides a data-driven approach to naming GCP resources.
//! Resource definitions are loaded from YAML files at compile time, allowing
//! new resource types to be added without code changes.
//!
//! # Architecture
//!
//! - [`registry`] - Loads, interns and validates resource definitions
//! - [`template`] - Collection path templates (`projects/{project}/...`)
//! - [`resolver`] - Resolves partial input plus defaults into a qualified name
//! - [`name`] - The resolved [`QualifiedName`]
//! - [`parse`] - Reads relative names and self-links back into names
//!
//! # Resource Definitions
//!
//! Resources are defined in YAML files under `src/resources/`:
//! - `compute.yaml` - Compute Engine resources (projects, zones, disks, ...)
//!
//! # Example
//!
//! ```
//! use gcpref::resource::{Registry, ParamValues};
//!
//! let disk = Registry::builtin().get("disk").unwrap();
//! let provided = ParamValues::from([
//!     ("zone".to_string(), "us-central1-a".to_string()),
//!     ("disk".to_string(), "boot-disk".to_string()),
//! ]);
//! let defaults = ParamValues::from([("project".to_string(), "my-proj".to_string())]);
//!
//! let name = disk.resolve(&provided, &defaults).unwrap();
//! assert_eq!(name.to_string(), "projects/my-proj/zones/us-central1-a/disks/boot-disk");
//! ```

mod error;
pub mod name;
mod parse;
pub mod registry;
pub mod resolver;
pub mod template;

pub use error::{ParseError, RegistryError, ResolutionError, TemplateError};
pub use name::{NameParam, QualifiedName};
pub use registry::{AttributeSpec, Registry, ResourceSpec};
pub use resolver::{resolve, ParamValues};
pub use template::PathTemplate;
