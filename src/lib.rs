//! gcpref - resolve Google Cloud Platform resource names
//!
//! A YAML schema describes, per resource type, which parent attributes
//! (project, region, zone) compose its fully-qualified name. The
//! [`resource`] layer loads that schema once and resolves partial user input
//! plus ambient defaults ([`config`], [`gcloud`]) into qualified names.

pub mod config;
pub mod gcloud;
pub mod resource;
